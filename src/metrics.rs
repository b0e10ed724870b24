//! Numeric helpers shared by the strategies and the report.

pub mod stats;
pub mod velocity;

use thiserror::Error;

pub use stats::RepositoryStats;
pub use velocity::{velocity, VelocityMetrics};

/// Metric computation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// Elapsed time was zero or negative.
    #[error("invalid time delta: {seconds}s (must be positive)")]
    InvalidTimeDelta {
        /// The rejected delta, in whole seconds
        seconds: i64,
    },
}
