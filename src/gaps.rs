//! Gap Statistics
//!
//! The atomic statistic of the crate: how long a player tends to stay away
//! before coming back, and how long the still-open absence at the end of the
//! observed period has lasted.
use crate::data::DaySymbol;

/// Absence statistics for a single player over one observed period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapStats {
    /// Arithmetic mean of the lengths of absence runs that were followed by a
    /// return. 0 when the player never returned from an absence.
    pub closed_run_average: f64,
    /// Length of the absence run still open at the end of the period.
    /// 0 when the period ends on an active day.
    pub trailing_absence: u32,
}

/// Scan one player's history and compute its [`GapStats`].
///
/// Leading `Pre` symbols are skipped. Every maximal run of `Absent` symbols
/// closed by an `Active` day contributes its length to the average; a run
/// still open at the end of the history is the trailing absence and is kept
/// out of the average.
pub fn gap_stats(history: &[DaySymbol]) -> GapStats {
    let start = history
        .iter()
        .take_while(|symbol| **symbol == DaySymbol::Pre)
        .count();

    let mut absence = 0u32;
    let mut sum = 0u64;
    let mut count = 0u32;
    for symbol in &history[start..] {
        match symbol {
            DaySymbol::Absent => absence += 1,
            DaySymbol::Active => {
                if absence > 0 {
                    sum += u64::from(absence);
                    count += 1;
                    absence = 0;
                }
            }
            // Pre never appears after the first active day.
            DaySymbol::Pre => {}
        }
    }

    let closed_run_average = if count > 0 {
        sum as f64 / f64::from(count)
    } else {
        0.0
    };
    GapStats {
        closed_run_average,
        trailing_absence: absence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DaySymbol::{Absent, Active, Pre};

    #[test]
    fn test_open_run_never_enters_average() {
        let history = vec![Pre, Pre, Active, Absent, Absent];
        let stats = gap_stats(&history);
        assert_eq!(stats.closed_run_average, 0.0);
        assert_eq!(stats.trailing_absence, 2);
    }

    #[test]
    fn test_closed_run_averaging() {
        let history = vec![Pre, Active, Absent, Absent, Active, Absent, Active];
        let stats = gap_stats(&history);
        // Runs of length 2 and 1, both closed by a return.
        assert_eq!(stats.closed_run_average, 1.5);
        assert_eq!(stats.trailing_absence, 0);
    }

    #[test]
    fn test_single_closed_run() {
        let history = vec![Pre, Active, Absent, Absent, Active];
        let stats = gap_stats(&history);
        assert_eq!(stats.closed_run_average, 2.0);
        assert_eq!(stats.trailing_absence, 0);
    }

    #[test]
    fn test_all_pre() {
        let history = vec![Pre, Pre, Pre];
        let stats = gap_stats(&history);
        assert_eq!(stats.closed_run_average, 0.0);
        assert_eq!(stats.trailing_absence, 0);
    }

    #[test]
    fn test_ends_active_no_absence() {
        let history = vec![Active, Active, Active];
        let stats = gap_stats(&history);
        assert_eq!(stats.closed_run_average, 0.0);
        assert_eq!(stats.trailing_absence, 0);
    }

    #[test]
    fn test_closed_and_trailing() {
        let history = vec![Active, Absent, Active, Absent, Absent, Absent];
        let stats = gap_stats(&history);
        assert_eq!(stats.closed_run_average, 1.0);
        assert_eq!(stats.trailing_absence, 3);
    }

    #[test]
    fn test_determinism() {
        let history = vec![Pre, Active, Absent, Active, Absent, Absent];
        let first = gap_stats(&history);
        let second = gap_stats(&history);
        assert_eq!(first, second);
    }
}
