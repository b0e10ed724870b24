//! GitHub push event payload.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::git::{Commit, CommitPair, DiffStats};

/// Subset of the GitHub `push` event used for scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Pushed ref, e.g. `refs/heads/main`
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    /// Head before the push
    #[serde(default)]
    pub before: String,
    /// Head after the push
    #[serde(default)]
    pub after: String,
    /// Target repository
    #[serde(default)]
    pub repository: PushRepository,
    /// Pushed commits, oldest first
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

/// Repository section of a push event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRepository {
    /// `owner/name`
    #[serde(default)]
    pub full_name: String,
}

/// One commit in a push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushCommit {
    /// Commit SHA
    pub id: String,
    /// Full commit message
    #[serde(default)]
    pub message: String,
    /// Commit timestamp
    pub timestamp: DateTime<FixedOffset>,
    /// Commit author
    #[serde(default)]
    pub author: PushAuthor,
    /// Paths added
    #[serde(default)]
    pub added: Vec<String>,
    /// Paths removed
    #[serde(default)]
    pub removed: Vec<String>,
    /// Paths modified
    #[serde(default)]
    pub modified: Vec<String>,
}

/// Author section of a pushed commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushAuthor {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
}

impl PushCommit {
    fn to_commit(&self) -> Commit {
        let author = if self.author.email.is_empty() {
            self.author.name.clone()
        } else {
            format!("{} <{}>", self.author.name, self.author.email)
        };
        Commit {
            hash: self.id.clone(),
            author,
            message: self.message.clone(),
            timestamp: self.timestamp,
        }
    }

    fn files_touched(&self) -> u64 {
        (self.added.len() + self.removed.len() + self.modified.len()) as u64
    }
}

impl PushEvent {
    /// Branch name without the `refs/heads/` prefix.
    pub fn branch(&self) -> &str {
        self.git_ref
            .strip_prefix("refs/heads/")
            .unwrap_or(&self.git_ref)
    }

    /// Pairs each pushed commit with the one before it.
    ///
    /// The payload carries no line counts or diffs, so pairs only hold
    /// file counts. The first commit has no timestamped parent and yields
    /// no pair.
    pub fn commit_pairs(&self) -> Vec<CommitPair> {
        self.commits
            .windows(2)
            .map(|w| {
                let stats = DiffStats {
                    additions: 0,
                    deletions: 0,
                    files_changed: w[1].files_touched(),
                };
                CommitPair::new(w[0].to_commit(), w[1].to_commit(), stats, String::new())
            })
            .collect()
    }
}
