//! Reports
//!
//! Writes the per-window-size FV/IFV logs and the averages log as
//! `;`-delimited text. Numbers stay `f64` all the way through the engine;
//! the optional decimal-comma transform for spreadsheet consumers lives
//! here and nowhere else.
use crate::engine::{TrackAverages, TrackMetrics, WalkMode, WalkResult, WindowEmission};
use crate::errors::ChurnError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Decimal separator used when rendering numbers.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberFormat {
    /// Plain `f64` rendering with a decimal point.
    #[default]
    Point,
    /// Decimal comma, for spreadsheet locales that expect `1,5`.
    Comma,
}

impl NumberFormat {
    fn render(&self, value: f64) -> String {
        let rendered = value.to_string();
        match self {
            NumberFormat::Point => rendered,
            NumberFormat::Comma => rendered.replace('.', ","),
        }
    }
}

/// Writes the logs of one experiment run into a directory.
pub struct Reporter {
    dir: PathBuf,
    dataset: String,
    format: NumberFormat,
}

impl Reporter {
    pub fn new<P: AsRef<Path>>(dir: P, dataset: &str, format: NumberFormat) -> Self {
        Reporter {
            dir: dir.as_ref().to_path_buf(),
            dataset: dataset.to_string(),
            format,
        }
    }

    fn suffix(mode: WalkMode) -> &'static str {
        match mode {
            WalkMode::Baseline => "",
            WalkMode::Redefine => "_Redef",
        }
    }

    fn write(&self, file_name: String, contents: String) -> Result<(), ChurnError> {
        fs::create_dir_all(&self.dir).map_err(|e| ChurnError::UnableToWrite(e.to_string()))?;
        match fs::write(self.dir.join(file_name), contents) {
            Err(e) => Err(ChurnError::UnableToWrite(e.to_string())),
            Ok(_) => Ok(()),
        }
    }

    fn fv_row(&self, emission: &WindowEmission) -> String {
        let track = &emission.fv_track;
        format!(
            "{};{};{};{};{};{};{};{};{};{};{}\n",
            self.format.render(emission.fv),
            self.format.render(emission.std_dev),
            emission.players,
            track.matrix.true_positives,
            track.matrix.false_positives,
            track.matrix.true_negatives,
            track.matrix.false_negatives,
            self.format.render(track.precision),
            self.format.render(track.recall),
            self.format.render(track.f1_score),
            self.format.render(track.cdcr),
        )
    }

    fn ifv_row(&self, players: usize, track: &TrackMetrics) -> String {
        format!(
            "{};{};{};{};{};{};{};{};{}\n",
            players,
            track.matrix.true_positives,
            track.matrix.false_positives,
            track.matrix.true_negatives,
            track.matrix.false_negatives,
            self.format.render(track.precision),
            self.format.render(track.recall),
            self.format.render(track.f1_score),
            self.format.render(track.cdcr),
        )
    }

    fn track_averages(&self, averages: &TrackAverages) -> String {
        format!(
            "{};{};{};{};{};{};{};{}",
            self.format.render(averages.true_positives),
            self.format.render(averages.false_positives),
            self.format.render(averages.true_negatives),
            self.format.render(averages.false_negatives),
            self.format.render(averages.precision),
            self.format.render(averages.recall),
            self.format.render(averages.f1_score),
            self.format.render(averages.cdcr),
        )
    }

    /// Write the per-window FV and IFV logs for one window size.
    pub fn write_window_logs(&self, result: &WalkResult) -> Result<(), ChurnError> {
        let suffix = Self::suffix(result.mode);

        let mut fv_log =
            String::from("FV;Standard Deviation;Number of Players;TP;FP;TN;FN;Precision;Recall;F1-Score;CDCR\n");
        let mut ifv_log = String::from("Number of Players;TP;FP;TN;FN;Precision;Recall;F1-Score;CDCR\n");
        for emission in &result.emissions {
            fv_log.push_str(&self.fv_row(emission));
            ifv_log.push_str(&self.ifv_row(emission.players, &emission.ifv_track));
        }

        self.write(
            format!("log_{}_FV_{}{}.csv", self.dataset, result.window_size, suffix),
            fv_log,
        )?;
        self.write(
            format!("log_{}_IFV_{}{}.csv", self.dataset, result.window_size, suffix),
            ifv_log,
        )
    }

    /// Write the averages log across all window sizes of one run. Window
    /// sizes that produced no windows are reported in the log output and
    /// skipped.
    pub fn write_average_log(&self, results: &[WalkResult]) -> Result<(), ChurnError> {
        let suffix = results.first().map(|r| Self::suffix(r.mode)).unwrap_or("");
        let mut log = String::from(
            "Approach;Window Size;FV Average;Standard Deviation Average;TP Average;FP Average;TN Average;\
             FN Average;Precision Average;Recall Average;F1-Score Average;CDCR Average\n",
        );

        for result in results {
            match &result.averages {
                Some(averages) => log.push_str(&format!(
                    "FV;{};{};{};{}\n",
                    result.window_size,
                    self.format.render(averages.fv),
                    self.format.render(averages.std_dev),
                    self.track_averages(&averages.fv_track),
                )),
                None => warn!(
                    "No data for window size {}, leaving it out of the averages log.",
                    result.window_size
                ),
            }
        }
        for result in results {
            if let Some(averages) = &result.averages {
                log.push_str(&format!(
                    "IFV;{};None;None;{}\n",
                    result.window_size,
                    self.track_averages(&averages.ifv_track),
                ));
            }
        }

        self.write(format!("log_{}_Average{}.csv", self.dataset, suffix), log)
    }

    /// Write every log of one experiment run.
    pub fn write_experiment(&self, results: &[WalkResult]) -> Result<(), ChurnError> {
        for result in results {
            self.write_window_logs(result)?;
        }
        self.write_average_log(results)
    }
}
