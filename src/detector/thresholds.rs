//! Tunable numeric thresholds.

use serde::{Deserialize, Serialize};

/// Numeric configuration shared by the detection strategies.
///
/// Several fields are not read by the built-in strategies; they are part of
/// the configuration surface for size and velocity based rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Additions in one commit considered suspicious
    pub suspicious_additions: u64,
    /// Deletions in one commit considered suspicious
    pub suspicious_deletions: u64,
    /// Additions per minute considered suspicious
    pub max_additions_per_min: f64,
    /// Deletions per minute considered suspicious
    pub max_deletions_per_min: f64,
    /// Minimum gap before a velocity is trusted
    pub min_time_delta_seconds: u64,
    /// Files in one commit considered suspicious
    pub max_files_per_commit: u64,
    /// Additions over total changed lines considered suspicious, in [0, 1]
    pub max_addition_ratio: f64,
    /// Deletions over total changed lines considered suspicious, in [0, 1]
    pub min_deletion_ratio: f64,
    /// Minimum changed lines before ratio rules apply
    pub min_commit_size_ratio: u64,
    /// Enables the more expensive precision checks
    pub enable_precision_analysis: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            suspicious_additions: 500,
            suspicious_deletions: 1000,
            max_additions_per_min: 100.0,
            max_deletions_per_min: 500.0,
            min_time_delta_seconds: 60,
            max_files_per_commit: 50,
            max_addition_ratio: 0.95,
            min_deletion_ratio: 0.95,
            min_commit_size_ratio: 100,
            enable_precision_analysis: true,
        }
    }
}

impl Thresholds {
    /// Checks range invariants, returning a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("max_addition_ratio", self.max_addition_ratio),
            ("min_deletion_ratio", self.min_deletion_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be between 0 and 1, got {value}"));
            }
        }

        for (name, value) in [
            ("max_additions_per_min", self.max_additions_per_min),
            ("max_deletions_per_min", self.max_deletions_per_min),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }

        Ok(())
    }
}
