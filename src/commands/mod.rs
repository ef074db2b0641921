//! Command implementations

pub mod evaluate;
pub mod play;
pub mod simulate;

pub use evaluate::{EvaluationResult, evaluate_words};
pub use play::{PlayMode, PlaySummary, run_play};
pub use simulate::{SimulationConfig, SimulationResult, run_simulation};
