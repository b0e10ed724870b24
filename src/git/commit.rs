//! Commit and commit-pair value types consumed by the detection engine.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

/// A single commit as read from history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full SHA-1 hash of the commit
    pub hash: String,
    /// Commit author name and email address
    pub author: String,
    /// Full commit message
    pub message: String,
    /// Author timestamp with the author's timezone
    pub timestamp: DateTime<FixedOffset>,
}

impl Commit {
    /// Builds a [`Commit`] from a `git2` commit object.
    pub fn from_git_commit(commit: &git2::Commit<'_>) -> Result<Self> {
        let signature = commit.author();
        let author = format!(
            "{} <{}>",
            signature.name().unwrap_or("Unknown"),
            signature.email().unwrap_or("unknown@example.com")
        );

        let when = signature.when();
        let offset = FixedOffset::east_opt(when.offset_minutes() * 60)
            .or_else(|| FixedOffset::east_opt(0))
            .context("Invalid commit timezone offset")?;
        let timestamp = DateTime::from_timestamp(when.seconds(), 0)
            .context("Invalid commit timestamp")?
            .with_timezone(&offset);

        Ok(Self {
            hash: commit.id().to_string(),
            author,
            message: commit.message().unwrap_or("").to_string(),
            timestamp,
        })
    }

    /// Returns the abbreviated hash.
    pub fn short_hash(&self) -> &str {
        let len = crate::git::SHORT_HASH_LEN;
        if self.hash.len() > len {
            &self.hash[..len]
        } else {
            &self.hash
        }
    }

    /// Returns the first line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

/// Line and file counts for one commit's change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Lines added
    pub additions: u64,
    /// Lines removed
    pub deletions: u64,
    /// Files touched
    pub files_changed: u64,
}

impl DiffStats {
    /// Total number of changed lines.
    pub fn lines_changed(&self) -> u64 {
        self.additions + self.deletions
    }
}

/// The transition between two successive commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPair {
    /// The parent commit
    pub previous: Commit,
    /// The commit under evaluation
    pub current: Commit,
    /// Change statistics between the two
    pub stats: DiffStats,
    /// Elapsed time from `previous` to `current`; negative under clock skew
    pub time_delta: TimeDelta,
    /// Unified diff text, empty when it was not collected
    pub diff_content: String,
}

impl CommitPair {
    /// Creates a pair, deriving the time delta from the two timestamps.
    pub fn new(previous: Commit, current: Commit, stats: DiffStats, diff_content: String) -> Self {
        let time_delta = current.timestamp.signed_duration_since(previous.timestamp);
        Self {
            previous,
            current,
            stats,
            time_delta,
            diff_content,
        }
    }

    /// Whether diff content is available for content-based heuristics.
    pub fn has_diff(&self) -> bool {
        !self.diff_content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_at(hash: &str, rfc3339: &str) -> Commit {
        Commit {
            hash: hash.to_string(),
            author: "Dev <dev@example.com>".to_string(),
            message: "Tune cache eviction\n\nLonger body".to_string(),
            timestamp: DateTime::parse_from_rfc3339(rfc3339).unwrap(),
        }
    }

    #[test]
    fn pair_time_delta_from_timestamps() {
        let pair = CommitPair::new(
            commit_at("a", "2024-01-01T10:00:00+00:00"),
            commit_at("b", "2024-01-01T10:07:30+00:00"),
            DiffStats::default(),
            String::new(),
        );
        assert_eq!(pair.time_delta.num_seconds(), 450);
        assert!(!pair.has_diff());
    }

    #[test]
    fn pair_time_delta_across_timezones() {
        let pair = CommitPair::new(
            commit_at("a", "2024-01-01T10:00:00+00:00"),
            commit_at("b", "2024-01-01T12:01:00+02:00"),
            DiffStats::default(),
            String::new(),
        );
        assert_eq!(pair.time_delta.num_seconds(), 60);
    }

    #[test]
    fn summary_is_first_line() {
        let commit = commit_at("abc", "2024-01-01T10:00:00+00:00");
        assert_eq!(commit.summary(), "Tune cache eviction");
    }

    #[test]
    fn short_hash_truncates() {
        let commit = commit_at(
            "0123456789abcdef0123456789abcdef01234567",
            "2024-01-01T10:00:00+00:00",
        );
        assert_eq!(commit.short_hash(), "01234567");
        assert_eq!(commit_at("abc", "2024-01-01T10:00:00+00:00").short_hash(), "abc");
    }
}
