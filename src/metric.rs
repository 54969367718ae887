//! Metrics
//!
//! Agreement scoring between two churn labelings, the CDCR drift metric
//! derived from it, and the spread statistic reported next to the FV.
use crate::errors::ChurnError;
use crate::labels::Label;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Confusion counts between two labelings of the same player set, with
/// `Churner` as the positive class.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positives: u32,
    pub false_positives: u32,
    pub true_negatives: u32,
    pub false_negatives: u32,
}

impl ConfusionMatrix {
    /// Total number of players tallied.
    pub fn total(&self) -> u32 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// `TP / (TP + FP)`, 0 when there are no positive predictions.
    pub fn precision(&self) -> f64 {
        if self.true_positives == 0 && self.false_positives == 0 {
            return 0.0;
        }
        f64::from(self.true_positives) / f64::from(self.true_positives + self.false_positives)
    }

    /// `TP / (TP + FN)`, 0 when there are no positives in the truth labels.
    pub fn recall(&self) -> f64 {
        if self.true_positives == 0 && self.false_negatives == 0 {
            return 0.0;
        }
        f64::from(self.true_positives) / f64::from(self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall, 0 when both are 0.
    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision == 0.0 && recall == 0.0 {
            return 0.0;
        }
        2.0 * (precision * recall) / (precision + recall)
    }
}

/// Tally the confusion counts of `test_labels` against `true_labels`.
///
/// Iterates the keys of `test_labels`; a key absent from `true_labels` is a
/// data-consistency error, never a silent skip.
pub fn confusion_matrix(
    test_labels: &HashMap<String, Label>,
    true_labels: &HashMap<String, Label>,
) -> Result<ConfusionMatrix, ChurnError> {
    let mut matrix = ConfusionMatrix::default();
    for (player, test_label) in test_labels {
        let true_label = true_labels
            .get(player)
            .ok_or_else(|| ChurnError::InconsistentRecords(player.clone()))?;
        if test_label == true_label {
            if *true_label == Label::Churner {
                matrix.true_positives += 1;
            } else {
                matrix.true_negatives += 1;
            }
        } else if *true_label == Label::Churner {
            matrix.false_negatives += 1;
        } else {
            matrix.false_positives += 1;
        }
    }
    Ok(matrix)
}

/// Concept Definition Change Rate. Low values mean the two labelings agree
/// and the churn definition is stable.
pub fn cdcr(f1_score: f64) -> f64 {
    1.0 - f1_score
}

/// Sample standard deviation of the per-player values around `center`,
/// typically the current IFVs around the accepted FV. 0 when fewer than two
/// players are present.
pub fn std_dev_around(center: f64, values: &HashMap<String, f64>) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let sum: f64 = values.values().map(|value| (value - center).powi(2)).sum();
    (sum / (n - 1) as f64).sqrt()
}

/// Online mean over a stream of observations, so no per-window observation
/// ever needs to be retained.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// The mean of everything pushed so far, `None` before the first push.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::precision_round;

    fn labels(pairs: &[(&str, Label)]) -> HashMap<String, Label> {
        pairs.iter().map(|(p, l)| (p.to_string(), *l)).collect()
    }

    #[test]
    fn test_confusion_tally() {
        use Label::*;
        let test = labels(&[("a", Churner), ("b", Churner), ("c", NonChurner), ("d", NonChurner)]);
        let truth = labels(&[("a", Churner), ("b", NonChurner), ("c", Churner), ("d", NonChurner)]);
        let matrix = confusion_matrix(&test, &truth).unwrap();
        assert_eq!(matrix.true_positives, 1);
        assert_eq!(matrix.false_positives, 1);
        assert_eq!(matrix.false_negatives, 1);
        assert_eq!(matrix.true_negatives, 1);
        assert_eq!(matrix.total(), 4);
        assert_eq!(matrix.precision(), 0.5);
        assert_eq!(matrix.recall(), 0.5);
        assert_eq!(matrix.f1_score(), 0.5);
    }

    #[test]
    fn test_zero_denominators_are_defined() {
        use Label::*;
        // All negatives everywhere: no positive predictions, no positive truth.
        let test = labels(&[("a", NonChurner), ("b", NonChurner)]);
        let truth = labels(&[("a", NonChurner), ("b", NonChurner)]);
        let matrix = confusion_matrix(&test, &truth).unwrap();
        assert_eq!(matrix.precision(), 0.0);
        assert_eq!(matrix.recall(), 0.0);
        assert_eq!(matrix.f1_score(), 0.0);
        assert_eq!(cdcr(matrix.f1_score()), 1.0);
    }

    #[test]
    fn test_f1_invariant_under_mapping_swap() {
        use Label::*;
        let first = labels(&[("a", Churner), ("b", NonChurner), ("c", Churner), ("d", Churner)]);
        let second = labels(&[("a", Churner), ("b", Churner), ("c", NonChurner), ("d", Churner)]);
        let forward = confusion_matrix(&first, &second).unwrap();
        let backward = confusion_matrix(&second, &first).unwrap();
        // Disagreements trade FP for FN, but TP/TN and F1 hold.
        assert_eq!(forward.true_positives, backward.true_positives);
        assert_eq!(forward.true_negatives, backward.true_negatives);
        assert_eq!(forward.false_positives, backward.false_negatives);
        assert_eq!(forward.f1_score(), backward.f1_score());
    }

    #[test]
    fn test_cdcr_zero_on_agreement_with_positives() {
        use Label::*;
        let both = labels(&[("a", Churner), ("b", NonChurner)]);
        let matrix = confusion_matrix(&both, &both).unwrap();
        assert_eq!(cdcr(matrix.f1_score()), 0.0);
    }

    #[test]
    fn test_cdcr_bounds() {
        use Label::*;
        let test = labels(&[("a", Churner), ("b", Churner)]);
        let truth = labels(&[("a", NonChurner), ("b", NonChurner)]);
        let matrix = confusion_matrix(&test, &truth).unwrap();
        let value = cdcr(matrix.f1_score());
        assert!((0.0..=1.0).contains(&value));
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        use Label::*;
        let test = labels(&[("a", Churner), ("b", Churner)]);
        let truth = labels(&[("a", Churner)]);
        let result = confusion_matrix(&test, &truth);
        assert!(matches!(result, Err(ChurnError::InconsistentRecords(p)) if p == "b"));
    }

    #[test]
    fn test_std_dev_around() {
        let mut values = HashMap::new();
        values.insert("p1".to_string(), 2.0);
        values.insert("p2".to_string(), 1.0);
        let result = std_dev_around(1.5, &values);
        assert_eq!(precision_round(result, 6), 0.707107);

        let mut single = HashMap::new();
        single.insert("p1".to_string(), 4.0);
        assert_eq!(std_dev_around(1.5, &single), 0.0);
    }

    #[test]
    fn test_running_mean() {
        let mut mean = RunningMean::default();
        assert!(mean.mean().is_none());
        mean.push(1.0);
        mean.push(2.0);
        mean.push(6.0);
        assert_eq!(mean.count(), 3);
        assert_eq!(mean.mean(), Some(3.0));
    }
}
