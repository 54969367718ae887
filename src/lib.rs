// Modules
pub mod constants;
pub mod data;
pub mod engine;
pub mod errors;
pub mod gaps;
pub mod labels;
pub mod metric;
pub mod report;
pub mod threshold;
pub mod utils;

// Individual classes, and functions
pub use data::{DaySymbol, PlayerHistories};
pub use engine::{run_experiment, step, walk_window, WalkMode, WalkResult, WalkState};
pub use errors::ChurnError;
pub use labels::Label;
pub use report::{NumberFormat, Reporter};
pub use threshold::{WindowRecord, WindowRecords};
