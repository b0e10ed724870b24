//! Multi-strategy detection of automated or AI-generated commits.
//!
//! Each [`DetectionStrategy`] is a stateless heuristic over one
//! [`CommitPair`](crate::git::CommitPair) and the repository-wide
//! [`RepositoryStats`](crate::metrics::RepositoryStats). The
//! [`DetectionEngine`] runs every registered strategy and folds the results
//! into a [`Verdict`].

pub mod engine;
pub mod strategies;
pub(crate) mod text;
pub mod thresholds;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::git::CommitPair;
use crate::metrics::RepositoryStats;

pub use engine::{
    AnyTriggered, DetectionEngine, MinimumScore, TriggeredStrategy, Verdict, VerdictPolicy,
};
pub use thresholds::Thresholds;

/// Outcome of one strategy on one commit pair.
///
/// The reason is empty exactly when nothing was detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyResult {
    detected: bool,
    reason: String,
}

impl StrategyResult {
    /// A negative result.
    pub fn clear() -> Self {
        Self::default()
    }

    /// A positive result with an explanation.
    pub fn detected(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug_assert!(!reason.is_empty(), "a detection needs a reason");
        Self {
            detected: true,
            reason,
        }
    }

    /// Whether the strategy fired.
    pub fn is_detected(&self) -> bool {
        self.detected
    }

    /// Human-readable explanation; empty when not detected.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for StrategyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detected {
            write!(f, "detected: {}", self.reason)
        } else {
            write!(f, "not detected")
        }
    }
}

/// A single detection heuristic.
///
/// Implementations must be pure: no I/O, no interior mutation and the same
/// result for the same inputs. The engine relies on this to evaluate pairs
/// concurrently without locking.
pub trait DetectionStrategy: Send + Sync {
    /// Stable identifier reported in verdicts.
    fn name(&self) -> &'static str;

    /// Evaluates one commit pair.
    fn detect(&self, pair: &CommitPair, repo_stats: &RepositoryStats) -> StrategyResult;
}
