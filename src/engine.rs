//! Window Walker / Redefinition Engine
//!
//! Slides a fixed-size window one day at a time over the precomputed window
//! records, measures how far each new window's churn labeling has drifted from
//! the currently accepted definition, and in redefinition mode replaces the
//! accepted FV/IFV once the drift crosses the tolerance.
use crate::errors::ChurnError;
use crate::labels::label;
use crate::metric::{cdcr, confusion_matrix, std_dev_around, ConfusionMatrix, RunningMean};
use crate::threshold::{WindowRecord, WindowRecords};
use crate::utils::items_to_strings;
use hashbrown::HashMap;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operating mode of the walk.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// The accepted thresholds are frozen at the first window; drift is
    /// always measured against that single origin.
    Baseline,
    /// The accepted thresholds are replaced by the current window's values
    /// whenever the corresponding track's CDCR reaches the tolerance.
    Redefine,
}

impl FromStr for WalkMode {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Baseline" => Ok(WalkMode::Baseline),
            "Redefine" => Ok(WalkMode::Redefine),
            _ => Err(ChurnError::ParseString(
                s.to_string(),
                "WalkMode".to_string(),
                items_to_strings(vec!["Baseline", "Redefine"]),
            )),
        }
    }
}

/// The churn definition the walk currently treats as ground truth.
///
/// Seeded from the first fitting window, then reassigned only at
/// redefinition points in [`WalkMode::Redefine`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WalkState {
    pub accepted_fv: f64,
    pub accepted_ifv: HashMap<String, f64>,
}

impl WalkState {
    /// An unseeded state; the first step fills it and emits nothing.
    pub fn new() -> Self {
        WalkState::default()
    }
}

/// Agreement metrics of one comparison track for one window.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrackMetrics {
    pub matrix: ConfusionMatrix,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub cdcr: f64,
}

impl TrackMetrics {
    fn from_matrix(matrix: ConfusionMatrix) -> Self {
        let f1_score = matrix.f1_score();
        TrackMetrics {
            matrix,
            precision: matrix.precision(),
            recall: matrix.recall(),
            f1_score,
            cdcr: cdcr(f1_score),
        }
    }
}

/// One per-window emission of the walk.
#[derive(Debug, Clone, Serialize)]
pub struct WindowEmission {
    /// 1-indexed day the window ends on.
    pub end_day: usize,
    /// The accepted FV the window was labeled against.
    pub fv: f64,
    /// Spread of the current window's IFVs around the accepted FV.
    pub std_dev: f64,
    /// Number of players compared.
    pub players: usize,
    /// Accepted-FV labeling against the current labeling.
    pub fv_track: TrackMetrics,
    /// Accepted-IFV labeling against the current labeling.
    pub ifv_track: TrackMetrics,
}

/// One transition of the walk: consume the record of the window ending at
/// `end_day` and produce the next state plus, after the seeding window, an
/// emission.
///
/// The current-window labeling is always passed as the truth side of the
/// confusion tally, matching the CDCR definition.
pub fn step(
    mut state: WalkState,
    record: &WindowRecord,
    end_day: usize,
    mode: WalkMode,
    tolerance: f64,
) -> Result<(WalkState, Option<WindowEmission>), ChurnError> {
    if state.accepted_ifv.is_empty() {
        state.accepted_fv = record.fv;
        state.accepted_ifv = record.ifv.clone();
        return Ok((state, None));
    }

    let mut labels_current = HashMap::with_capacity(state.accepted_ifv.len());
    let mut labels_accepted_fv = HashMap::with_capacity(state.accepted_ifv.len());
    let mut labels_accepted_ifv = HashMap::with_capacity(state.accepted_ifv.len());
    for (player, accepted_ifv) in &state.accepted_ifv {
        let trailing = *record
            .last_absence
            .get(player)
            .ok_or_else(|| ChurnError::InconsistentRecords(player.clone()))?;
        let current_ifv = *record
            .ifv
            .get(player)
            .ok_or_else(|| ChurnError::InconsistentRecords(player.clone()))?;

        labels_current.insert(player.clone(), label(trailing, current_ifv));
        labels_accepted_fv.insert(player.clone(), label(trailing, state.accepted_fv));
        labels_accepted_ifv.insert(player.clone(), label(trailing, *accepted_ifv));
    }

    let fv_track = TrackMetrics::from_matrix(confusion_matrix(&labels_accepted_fv, &labels_current)?);
    let ifv_track = TrackMetrics::from_matrix(confusion_matrix(&labels_accepted_ifv, &labels_current)?);

    let emission = WindowEmission {
        end_day,
        fv: state.accepted_fv,
        std_dev: std_dev_around(state.accepted_fv, &record.ifv),
        players: state.accepted_ifv.len(),
        fv_track,
        ifv_track,
    };

    if mode == WalkMode::Redefine {
        if fv_track.cdcr >= tolerance {
            state.accepted_fv = record.fv;
        }
        if ifv_track.cdcr >= tolerance {
            state.accepted_ifv = record.ifv.clone();
        }
    }

    Ok((state, Some(emission)))
}

/// Per-track means across all windows of one walk.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrackAverages {
    pub true_positives: f64,
    pub false_positives: f64,
    pub true_negatives: f64,
    pub false_negatives: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub cdcr: f64,
}

/// Means of every emitted metric across one window size's walk.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WalkAverages {
    pub fv: f64,
    pub std_dev: f64,
    pub fv_track: TrackAverages,
    pub ifv_track: TrackAverages,
}

#[derive(Debug, Default, Clone, Copy)]
struct TrackAccumulator {
    true_positives: RunningMean,
    false_positives: RunningMean,
    true_negatives: RunningMean,
    false_negatives: RunningMean,
    precision: RunningMean,
    recall: RunningMean,
    f1_score: RunningMean,
    cdcr: RunningMean,
}

impl TrackAccumulator {
    fn add(&mut self, track: &TrackMetrics) {
        self.true_positives.push(f64::from(track.matrix.true_positives));
        self.false_positives.push(f64::from(track.matrix.false_positives));
        self.true_negatives.push(f64::from(track.matrix.true_negatives));
        self.false_negatives.push(f64::from(track.matrix.false_negatives));
        self.precision.push(track.precision);
        self.recall.push(track.recall);
        self.f1_score.push(track.f1_score);
        self.cdcr.push(track.cdcr);
    }

    fn finish(&self) -> Option<TrackAverages> {
        Some(TrackAverages {
            true_positives: self.true_positives.mean()?,
            false_positives: self.false_positives.mean()?,
            true_negatives: self.true_negatives.mean()?,
            false_negatives: self.false_negatives.mean()?,
            precision: self.precision.mean()?,
            recall: self.recall.mean()?,
            f1_score: self.f1_score.mean()?,
            cdcr: self.cdcr.mean()?,
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WalkAccumulator {
    fv: RunningMean,
    std_dev: RunningMean,
    fv_track: TrackAccumulator,
    ifv_track: TrackAccumulator,
}

impl WalkAccumulator {
    fn add(&mut self, emission: &WindowEmission) {
        self.fv.push(emission.fv);
        self.std_dev.push(emission.std_dev);
        self.fv_track.add(&emission.fv_track);
        self.ifv_track.add(&emission.ifv_track);
    }

    fn finish(&self) -> Option<WalkAverages> {
        Some(WalkAverages {
            fv: self.fv.mean()?,
            std_dev: self.std_dev.mean()?,
            fv_track: self.fv_track.finish()?,
            ifv_track: self.ifv_track.finish()?,
        })
    }
}

/// Everything one window size's walk produced.
#[derive(Debug, Clone, Serialize)]
pub struct WalkResult {
    pub window_size: usize,
    pub mode: WalkMode,
    pub emissions: Vec<WindowEmission>,
    /// `None` when the window never fit inside the history.
    pub averages: Option<WalkAverages>,
}

/// Walk one window size across the full history.
pub fn walk_window(
    records: &WindowRecords,
    window_size: usize,
    mode: WalkMode,
    tolerance: f64,
) -> Result<WalkResult, ChurnError> {
    let end = records.days();
    let mut state = WalkState::new();
    let mut emissions = Vec::new();
    let mut accumulator = WalkAccumulator::default();

    let mut start = 0;
    while start + window_size <= end {
        let end_day = start + window_size;
        let record = match records.get(end_day) {
            Some(r) => r,
            None => break,
        };
        let (next_state, emission) = step(state, record, end_day, mode, tolerance)?;
        state = next_state;
        if let Some(emission) = emission {
            accumulator.add(&emission);
            emissions.push(emission);
        }
        start += 1;
    }

    let averages = accumulator.finish();
    if averages.is_none() {
        warn!(
            "No data for window size {}: {} days of history produced no comparable windows.",
            window_size, end
        );
    }

    Ok(WalkResult {
        window_size,
        mode,
        emissions,
        averages,
    })
}

/// Run one walk per window size. Walks own their state and the records are
/// read-only, so they proceed in parallel.
pub fn run_experiment(
    records: &WindowRecords,
    window_sizes: &[usize],
    mode: WalkMode,
    tolerance: f64,
) -> Result<Vec<WalkResult>, ChurnError> {
    info!(
        "Walking {} window sizes over {} days in {:?} mode.",
        window_sizes.len(),
        records.days(),
        mode
    );
    window_sizes
        .par_iter()
        .map(|&window_size| walk_window(records, window_size, mode, tolerance))
        .collect()
}
