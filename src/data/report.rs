//! Analysis report types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detector::Verdict;
use crate::git::{CommitPair, DiffStats};
use crate::metrics::{velocity, RepositoryStats};

/// Complete analysis of a repository's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Repository path as displayed to the user
    pub repository: String,
    /// Repository-wide counters
    pub stats: RepositoryStats,
    /// One entry per commit pair, oldest first
    pub commits: Vec<CommitReport>,
    /// Summary statistics
    pub summary: ReportSummary,
}

/// Result for a single commit pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitReport {
    /// Commit hash (short form)
    pub hash: String,
    /// Parent hash (short form)
    pub previous: String,
    /// Commit author
    pub author: String,
    /// First line of the commit message
    pub message: String,
    /// Change statistics
    pub stats: DiffStats,
    /// Seconds since the parent commit
    pub time_delta_seconds: i64,
    /// Additions per minute; absent when the delta is not positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additions_per_minute: Option<f64>,
    /// Deletions per minute; absent when the delta is not positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletions_per_minute: Option<f64>,
    /// Engine verdict
    pub verdict: Verdict,
    /// Model assessment when AI review ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_assessment: Option<String>,
}

impl CommitReport {
    /// Builds the report entry for one evaluated pair.
    pub fn new(pair: &CommitPair, verdict: Verdict) -> Self {
        Self {
            hash: pair.current.short_hash().to_string(),
            previous: pair.previous.short_hash().to_string(),
            author: pair.current.author.clone(),
            message: pair.current.summary().to_string(),
            stats: pair.stats,
            time_delta_seconds: pair.time_delta.num_seconds(),
            additions_per_minute: velocity(pair.stats.additions, pair.time_delta).ok(),
            deletions_per_minute: velocity(pair.stats.deletions, pair.time_delta).ok(),
            verdict,
            ai_assessment: None,
        }
    }
}

/// How often one strategy fired across the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyCount {
    /// Strategy identifier
    pub name: String,
    /// Pairs on which it fired
    pub triggered: usize,
}

/// Summary statistics for a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Pairs evaluated
    pub total_commits: usize,
    /// Pairs flagged
    pub flagged_commits: usize,
    /// Flagged fraction
    pub flagged_ratio: f64,
    /// Per-strategy trigger counts in registration order
    pub strategies: Vec<StrategyCount>,
}

impl ReportSummary {
    /// Creates a summary; `strategy_names` fixes the row order.
    pub fn from_results(results: &[CommitReport], strategy_names: &[&str]) -> Self {
        let total_commits = results.len();
        let flagged_commits = results.iter().filter(|r| r.verdict.flagged).count();
        let flagged_ratio = if total_commits == 0 {
            0.0
        } else {
            flagged_commits as f64 / total_commits as f64
        };

        let strategies = strategy_names
            .iter()
            .map(|name| StrategyCount {
                name: (*name).to_string(),
                triggered: results
                    .iter()
                    .filter(|r| r.verdict.triggered_names().any(|t| t == *name))
                    .count(),
            })
            .collect();

        Self {
            total_commits,
            flagged_commits,
            flagged_ratio,
            strategies,
        }
    }
}

impl AnalysisReport {
    /// Creates a report, computing the summary.
    pub fn new(
        repository: String,
        stats: RepositoryStats,
        commits: Vec<CommitReport>,
        strategy_names: &[&str],
    ) -> Self {
        let summary = ReportSummary::from_results(&commits, strategy_names);
        Self {
            repository,
            stats,
            commits,
            summary,
        }
    }

    /// Drops unflagged commits from the listing; the summary is unchanged.
    pub fn retain_flagged(&mut self) {
        self.commits.retain(|c| c.verdict.flagged);
    }
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            other => Err(format!("unknown output format '{other}' (expected text, json or yaml)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}
