//! Threshold Calculators
//!
//! Derives churn thresholds from gap statistics, either one shared Fixed
//! Value (FV) for the whole population or one Individual Fixed Value (IFV)
//! per player, and precomputes both for every prefix window of the history.
use crate::data::{DaySymbol, PlayerHistories};
use crate::errors::ChurnError;
use crate::gaps::gap_stats;
use hashbrown::HashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;

/// Calculate the population Fixed Value and the per-player Last Absence.
///
/// The FV is the mean, over all players, of each player's own closed-run
/// average. Every player counts once, whatever their individual run count;
/// a player that never returned contributes 0.
pub fn fv_calculation<'a, I>(players: I) -> (f64, HashMap<String, u32>)
where
    I: IntoIterator<Item = (&'a str, &'a [DaySymbol])>,
{
    let mut sum = 0.0;
    let mut players_qnt = 0usize;
    let mut last_absence = HashMap::new();
    for (player, history) in players {
        let stats = gap_stats(history);
        sum += stats.closed_run_average;
        players_qnt += 1;
        last_absence.insert(player.to_string(), stats.trailing_absence);
    }

    let fv = if players_qnt > 0 {
        sum / players_qnt as f64
    } else {
        0.0
    };
    (fv, last_absence)
}

/// Calculate the per-player Individual Fixed Values and Last Absences.
pub fn ifv_calculation<'a, I>(players: I) -> (HashMap<String, f64>, HashMap<String, u32>)
where
    I: IntoIterator<Item = (&'a str, &'a [DaySymbol])>,
{
    let mut players_ifv = HashMap::new();
    let mut last_absence = HashMap::new();
    for (player, history) in players {
        let stats = gap_stats(history);
        players_ifv.insert(player.to_string(), stats.closed_run_average);
        last_absence.insert(player.to_string(), stats.trailing_absence);
    }

    (players_ifv, last_absence)
}

/// The FV, IFV and Last Absence values for the history prefix ending at one
/// given day.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowRecord {
    /// Population threshold for this prefix.
    pub fv: f64,
    /// Per-player thresholds for this prefix.
    pub ifv: HashMap<String, f64>,
    /// Per-player trailing absence at the end of this prefix.
    pub last_absence: HashMap<String, u32>,
}

/// Precomputed [`WindowRecord`]s for every prefix of the full history,
/// keyed by the 1-indexed end day. Produced once, immutable afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowRecords {
    days: usize,
    records: Vec<WindowRecord>,
}

impl WindowRecords {
    /// Apply both threshold calculators to every prefix `1..=N` of the full
    /// history. Prefixes are independent, so they are computed in parallel.
    pub fn precompute(data: &PlayerHistories) -> Self {
        let days = data.days();
        let records = (1..=days)
            .into_par_iter()
            .map(|end_day| {
                let (fv, _) = fv_calculation(data.prefix(end_day));
                let (ifv, last_absence) = ifv_calculation(data.prefix(end_day));
                WindowRecord {
                    fv,
                    ifv,
                    last_absence,
                }
            })
            .collect();
        WindowRecords { days, records }
    }

    /// Number of days the underlying history spans.
    pub fn days(&self) -> usize {
        self.days
    }

    /// The record for the prefix ending at `end_day` (1-indexed).
    pub fn get(&self, end_day: usize) -> Option<&WindowRecord> {
        if end_day == 0 {
            return None;
        }
        self.records.get(end_day - 1)
    }

    /// Save the records as a json object to a file.
    ///
    /// * `path` - Path to save records.
    pub fn save(&self, path: &str) -> Result<(), ChurnError> {
        let records = self.json_dump()?;
        match fs::write(path, records) {
            Err(e) => Err(ChurnError::UnableToWrite(e.to_string())),
            Ok(_) => Ok(()),
        }
    }

    /// Dump the records as a json object
    pub fn json_dump(&self) -> Result<String, ChurnError> {
        match serde_json::to_string(self) {
            Ok(s) => Ok(s),
            Err(e) => Err(ChurnError::UnableToWrite(e.to_string())),
        }
    }

    /// Load records from a Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    pub fn from_json(json_str: &str) -> Result<Self, ChurnError> {
        match serde_json::from_str::<WindowRecords>(json_str) {
            Ok(r) => Ok(r),
            Err(e) => Err(ChurnError::UnableToRead(e.to_string())),
        }
    }

    /// Load records from a path to a json records object.
    ///
    /// * `path` - Path to load records from.
    pub fn load(path: &str) -> Result<Self, ChurnError> {
        let json_str = match fs::read_to_string(path) {
            Ok(s) => Ok(s),
            Err(e) => Err(ChurnError::UnableToRead(e.to_string())),
        }?;
        Self::from_json(&json_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PlayerHistories;

    fn two_players() -> PlayerHistories {
        let raw = "p1,-1,1,0,0,1,0,0,0,1,0\np2,1,0,1,1,0,0,1,0,0,0\n";
        PlayerHistories::from_reader(raw.as_bytes(), b',').unwrap()
    }

    #[test]
    fn test_fv_is_mean_of_player_averages() {
        let data = two_players();
        // p1: one closed run of 2, p2: closed runs of 1 and 2.
        let (fv, la) = fv_calculation(data.prefix(5));
        assert_eq!(fv, 1.5);
        assert_eq!(la["p1"], 0);
        assert_eq!(la["p2"], 1);
    }

    #[test]
    fn test_ifv_keeps_players_apart() {
        let data = two_players();
        let (ifv, la) = ifv_calculation(data.prefix(5));
        assert_eq!(ifv["p1"], 2.0);
        assert_eq!(ifv["p2"], 1.0);
        assert_eq!(la["p1"], 0);
        assert_eq!(la["p2"], 1);
    }

    #[test]
    fn test_no_closed_runs_defaults_to_zero() {
        let raw = "p1,-1,1,0,0\np2,-1,-1,1,0\n";
        let data = PlayerHistories::from_reader(raw.as_bytes(), b',').unwrap();
        let (fv, la) = fv_calculation(data.iter());
        assert_eq!(fv, 0.0);
        assert_eq!(la["p1"], 2);
        assert_eq!(la["p2"], 1);
        let (ifv, _) = ifv_calculation(data.iter());
        assert_eq!(ifv["p1"], 0.0);
        assert_eq!(ifv["p2"], 0.0);
    }

    #[test]
    fn test_precompute_covers_every_prefix() {
        let data = two_players();
        let records = WindowRecords::precompute(&data);
        assert_eq!(records.days(), 10);
        assert!(records.get(0).is_none());
        assert!(records.get(11).is_none());
        for end_day in 1..=10 {
            let record = records.get(end_day).unwrap();
            assert_eq!(record.ifv.len(), 2);
            assert_eq!(record.last_absence.len(), 2);
        }
        // Day 5 matches the direct calculation.
        let record = records.get(5).unwrap();
        assert_eq!(record.fv, 1.5);
        assert_eq!(record.ifv["p1"], 2.0);
        assert_eq!(record.last_absence["p2"], 1);
    }

    #[test]
    fn test_json_round_trip() {
        let data = two_players();
        let records = WindowRecords::precompute(&data);
        let dumped = records.json_dump().unwrap();
        let loaded = WindowRecords::from_json(&dumped).unwrap();
        assert_eq!(loaded.days(), records.days());
        assert_eq!(loaded.get(5).unwrap().fv, records.get(5).unwrap().fv);
    }
}
