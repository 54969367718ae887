//! Labels
//!
//! Binary churn labeling of players against a threshold. The same strict
//! comparison serves the shared FV threshold and the per-player IFV ones.
use crate::errors::ChurnError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The churn label of a player for one (threshold, trailing absence) pair.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Churner,
    NonChurner,
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Churner => write!(f, "Churner"),
            Label::NonChurner => write!(f, "Non-Churner"),
        }
    }
}

/// A player churns when the trailing absence strictly exceeds the threshold.
/// Equality means the player is still within their usual return behavior.
pub fn label(trailing_absence: u32, threshold: f64) -> Label {
    if f64::from(trailing_absence) > threshold {
        Label::Churner
    } else {
        Label::NonChurner
    }
}

/// Label every player against the shared FV threshold.
pub fn label_players_fv(fv: f64, last_absence: &HashMap<String, u32>) -> HashMap<String, Label> {
    last_absence
        .iter()
        .map(|(player, trailing)| (player.clone(), label(*trailing, fv)))
        .collect()
}

/// Label every player against their own IFV threshold. Every player with a
/// threshold must also have a trailing absence.
pub fn label_players_ifv(
    ifv: &HashMap<String, f64>,
    last_absence: &HashMap<String, u32>,
) -> Result<HashMap<String, Label>, ChurnError> {
    let mut labels = HashMap::with_capacity(ifv.len());
    for (player, threshold) in ifv {
        let trailing = last_absence
            .get(player)
            .ok_or_else(|| ChurnError::InconsistentRecords(player.clone()))?;
        labels.insert(player.clone(), label(*trailing, *threshold));
    }
    Ok(labels)
}
