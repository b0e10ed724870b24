//! Suspiciously tidy addition/deletion ratios.

use crate::detector::text::is_near_integer;
use crate::detector::{DetectionStrategy, StrategyResult};
use crate::git::CommitPair;
use crate::metrics::RepositoryStats;

const MIN_LINES: u64 = 100;
const BALANCED_RANGE: std::ops::RangeInclusive<f64> = 0.9..=1.1;
const INTEGER_TOLERANCE: f64 = 0.05;

/// Flags large rewrites whose additions and deletions are balanced or an
/// exact multiple of each other.
#[derive(Debug, Clone)]
pub struct StructuralConsistencyStrategy {
    enabled: bool,
}

impl StructuralConsistencyStrategy {
    /// Creates an enabled strategy.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Creates a strategy that never fires.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for StructuralConsistencyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionStrategy for StructuralConsistencyStrategy {
    fn name(&self) -> &'static str {
        "structural_consistency_analysis"
    }

    fn detect(&self, pair: &CommitPair, _repo_stats: &RepositoryStats) -> StrategyResult {
        if !self.enabled {
            return StrategyResult::clear();
        }

        let stats = pair.stats;
        if stats.additions <= MIN_LINES || stats.deletions <= MIN_LINES {
            return StrategyResult::clear();
        }

        let ratio = stats.additions as f64 / stats.deletions as f64;
        if BALANCED_RANGE.contains(&ratio) {
            return StrategyResult::detected(format!(
                "Balanced addition/deletion ratio {ratio:.2} typical of automated refactoring"
            ));
        }

        if is_near_integer(ratio, INTEGER_TOLERANCE) || is_near_integer(1.0 / ratio, INTEGER_TOLERANCE)
        {
            return StrategyResult::detected(format!(
                "Addition/deletion ratio {ratio:.2} is a near-exact multiple, typical of template generation"
            ));
        }

        StrategyResult::clear()
    }
}
