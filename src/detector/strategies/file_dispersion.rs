//! Bulk creation of uniformly sized files.

use crate::detector::{DetectionStrategy, StrategyResult};
use crate::git::CommitPair;
use crate::metrics::RepositoryStats;

const MIN_FILES: u64 = 10;
const MIN_ADDITIONS: u64 = 1000;
const MIN_AVERAGE: f64 = 50.0;
const MAX_AVERAGE: f64 = 200.0;
const MIN_CONSISTENCY: f64 = 0.8;

/// Flags wide commits whose average lines per file is a near-integer.
#[derive(Debug, Clone)]
pub struct FileDispersionStrategy {
    enabled: bool,
}

impl FileDispersionStrategy {
    /// Creates an enabled strategy.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Creates a strategy that never fires.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for FileDispersionStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionStrategy for FileDispersionStrategy {
    fn name(&self) -> &'static str {
        "file_dispersion_analysis"
    }

    fn detect(&self, pair: &CommitPair, _repo_stats: &RepositoryStats) -> StrategyResult {
        if !self.enabled {
            return StrategyResult::clear();
        }

        let stats = pair.stats;
        if stats.files_changed <= MIN_FILES || stats.additions <= MIN_ADDITIONS {
            return StrategyResult::clear();
        }

        let average = stats.additions as f64 / stats.files_changed as f64;
        if average > MIN_AVERAGE && average < MAX_AVERAGE {
            let consistency = 1.0 - average.fract();
            if consistency > MIN_CONSISTENCY {
                return StrategyResult::detected(format!(
                    "{} files with uniform size (~{average:.0} lines each), typical of generated files",
                    stats.files_changed
                ));
            }
        }

        StrategyResult::clear()
    }
}
