//! Substantial commits landing minutes after the previous one.

use chrono::TimeDelta;

use crate::detector::{DetectionStrategy, StrategyResult};
use crate::git::CommitPair;
use crate::metrics::RepositoryStats;

const BURST_WINDOW_SECONDS: i64 = 300;
const MIN_ADDITIONS: u64 = 50;

/// Flags substantial changes committed within five minutes of the parent.
#[derive(Debug, Clone)]
pub struct BurstPatternStrategy {
    // Only gates the strategy for now; a per-hour window needs history beyond one pair.
    max_commits_per_hour: u32,
    enabled: bool,
}

impl BurstPatternStrategy {
    /// Creates an enabled strategy; a zero rate disables it.
    pub fn new(max_commits_per_hour: u32) -> Self {
        Self {
            max_commits_per_hour,
            enabled: true,
        }
    }

    /// Creates a strategy that never fires.
    pub fn disabled() -> Self {
        Self {
            max_commits_per_hour: 0,
            enabled: false,
        }
    }
}

impl DetectionStrategy for BurstPatternStrategy {
    fn name(&self) -> &'static str {
        "burst_pattern_analysis"
    }

    fn detect(&self, pair: &CommitPair, _repo_stats: &RepositoryStats) -> StrategyResult {
        if !self.enabled || self.max_commits_per_hour == 0 {
            return StrategyResult::clear();
        }

        if pair.time_delta < TimeDelta::seconds(BURST_WINDOW_SECONDS)
            && pair.stats.additions > MIN_ADDITIONS
        {
            let seconds = pair.time_delta.num_milliseconds() as f64 / 1000.0;
            return StrategyResult::detected(format!(
                "Rapid commit: {seconds:.1}s after the previous commit with {} additions",
                pair.stats.additions
            ));
        }

        StrategyResult::clear()
    }
}
