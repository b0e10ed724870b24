//! Repository-wide counters passed alongside every commit pair.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::velocity;
use crate::git::CommitPair;

/// Aggregate counters over the analysed history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryStats {
    /// Number of commit pairs analysed
    pub total_commits: u64,
    /// Sum of additions across all pairs
    pub total_additions: u64,
    /// Sum of deletions across all pairs
    pub total_deletions: u64,
    /// Sum of files changed across all pairs
    pub total_files_changed: u64,
    /// Mean additions per pair
    pub average_additions: f64,
    /// Mean additions per minute over pairs with a positive time delta
    pub average_additions_per_minute: f64,
    /// Seconds between the oldest previous commit and the newest current commit
    pub time_span_seconds: i64,
}

impl RepositoryStats {
    /// Accumulates counters over `pairs`.
    pub fn from_pairs(pairs: &[CommitPair]) -> Self {
        let mut stats = Self {
            total_commits: pairs.len() as u64,
            ..Self::default()
        };

        let mut rate_sum = 0.0;
        let mut rate_count = 0_u32;
        for pair in pairs {
            stats.total_additions += pair.stats.additions;
            stats.total_deletions += pair.stats.deletions;
            stats.total_files_changed += pair.stats.files_changed;

            if let Ok(rate) = velocity(pair.stats.additions, pair.time_delta) {
                rate_sum += rate;
                rate_count += 1;
            }
        }

        if !pairs.is_empty() {
            stats.average_additions = stats.total_additions as f64 / pairs.len() as f64;
        }
        if rate_count > 0 {
            stats.average_additions_per_minute = rate_sum / f64::from(rate_count);
        }

        let earliest = pairs.iter().map(|p| p.previous.timestamp).min();
        let latest = pairs.iter().map(|p| p.current.timestamp).max();
        if let (Some(earliest), Some(latest)) = (earliest, latest) {
            stats.time_span_seconds = latest
                .signed_duration_since(earliest)
                .max(TimeDelta::zero())
                .num_seconds();
        }

        stats
    }
}
