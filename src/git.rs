//! Git history access and the commit data model.

pub mod commit;
pub mod repository;

pub use commit::{Commit, CommitPair, DiffStats};
pub use repository::{build_exclude_set, GitRepository, HistoryOptions};

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;
