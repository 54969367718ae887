//! Data
//!
//! Player activity histories and their ingestion from delimited text logs.
//! Each player's history is one symbol per calendar day.
use crate::errors::ChurnError;
use crate::utils::items_to_strings;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// One day of a player's activity log.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DaySymbol {
    /// Before the player's first day of activity. Only valid as a prefix.
    Pre,
    /// The player was active that day.
    Active,
    /// The player was absent that day.
    Absent,
}

impl FromStr for DaySymbol {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-1" => Ok(DaySymbol::Pre),
            "1" => Ok(DaySymbol::Active),
            "0" => Ok(DaySymbol::Absent),
            _ => Err(ChurnError::ParseString(
                s.to_string(),
                "DaySymbol".to_string(),
                items_to_strings(vec!["-1", "0", "1"]),
            )),
        }
    }
}

/// The full set of player histories, all spanning the same number of days.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlayerHistories {
    histories: HashMap<String, Vec<DaySymbol>>,
    days: usize,
}

impl PlayerHistories {
    pub fn new() -> Self {
        PlayerHistories::default()
    }

    /// Add one player's history. The first insertion fixes the number of days
    /// every later history must match.
    pub fn insert(&mut self, player: String, history: Vec<DaySymbol>) -> Result<(), ChurnError> {
        if self.histories.contains_key(&player) {
            return Err(ChurnError::DuplicatePlayer(player));
        }
        if self.histories.is_empty() {
            self.days = history.len();
        } else if history.len() != self.days {
            return Err(ChurnError::UnevenHistory {
                player,
                expected: self.days,
                found: history.len(),
            });
        }
        self.histories.insert(player, history);
        Ok(())
    }

    /// Load player histories from delimited text without headers, where each
    /// row is a player id followed by one `-1`/`0`/`1` token per day.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, ChurnError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut data = PlayerHistories::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| ChurnError::UnableToRead(e.to_string()))?;
            let player = match record.get(0) {
                Some(p) => p.to_string(),
                None => continue,
            };
            let history = record
                .iter()
                .skip(1)
                .map(DaySymbol::from_str)
                .collect::<Result<Vec<_>, _>>()?;
            data.insert(player, history)?;
        }
        Ok(data)
    }

    /// Load player histories from a delimited text file.
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, ChurnError> {
        let file = std::fs::File::open(path).map_err(|e| ChurnError::UnableToRead(e.to_string()))?;
        Self::from_reader(file, delimiter)
    }

    /// Number of days each history spans.
    pub fn days(&self) -> usize {
        self.days
    }

    /// Number of players.
    pub fn player_count(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Iterate over the first `days` days of every player's history.
    pub fn prefix(&self, days: usize) -> impl Iterator<Item = (&str, &[DaySymbol])> {
        self.histories
            .iter()
            .map(move |(player, history)| (player.as_str(), &history[..days]))
    }

    /// Iterate over the full histories.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DaySymbol])> {
        self.prefix(self.days)
    }
}
