//! Built-in detection strategies.

mod burst;
mod commit_message;
mod error_handling;
mod file_dispersion;
mod naming;
mod structural;
mod template;

pub use burst::BurstPatternStrategy;
pub use commit_message::CommitMessageStrategy;
pub use error_handling::ErrorHandlingPatternStrategy;
pub use file_dispersion::FileDispersionStrategy;
pub use naming::NamingPatternStrategy;
pub use structural::StructuralConsistencyStrategy;
pub use template::TemplatePatternStrategy;

use super::DetectionStrategy;

/// Commits-per-hour parameter for the default burst strategy.
pub const DEFAULT_MAX_COMMITS_PER_HOUR: u32 = 10;

/// The seven built-in strategies in evaluation order.
pub fn default_strategies() -> Vec<Box<dyn DetectionStrategy>> {
    vec![
        Box::new(CommitMessageStrategy::new()),
        Box::new(NamingPatternStrategy::new()),
        Box::new(StructuralConsistencyStrategy::new()),
        Box::new(BurstPatternStrategy::new(DEFAULT_MAX_COMMITS_PER_HOUR)),
        Box::new(ErrorHandlingPatternStrategy::new()),
        Box::new(TemplatePatternStrategy::new()),
        Box::new(FileDispersionStrategy::new()),
    ]
}
