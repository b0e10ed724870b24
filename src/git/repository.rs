//! Git repository operations

use std::path::Path;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use git2::{Repository, Sort};
use tracing::debug;

use crate::git::{Commit, CommitPair, DiffStats};

/// Git repository wrapper
pub struct GitRepository {
    repo: Repository,
}

/// Controls which commit pairs are produced and how much is read for each.
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// `A..B`, a single revision, or `None` for everything reachable from HEAD
    pub range: Option<String>,
    /// Keep only the most recent N pairs
    pub max_count: Option<usize>,
    /// Collect unified diff text for content heuristics
    pub include_diff: bool,
    /// Paths skipped when computing stats and diff text
    pub exclude: GlobSet,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            range: None,
            max_count: None,
            include_diff: true,
            exclude: GlobSet::empty(),
        }
    }
}

/// Compiles exclude patterns into a matcher.
///
/// `*` crosses directory separators so `*.min.js` matches nested files.
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .with_context(|| format!("Invalid exclude pattern: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to compile exclude patterns")
}

fn is_excluded(exclude: &GlobSet, path: &Path) -> bool {
    exclude.is_match(path) || path.file_name().is_some_and(|name| exclude.is_match(name))
}

impl GitRepository {
    /// Open repository at current directory
    pub fn open() -> Result<Self> {
        let repo = Repository::open(".").context("Not in a git repository")?;

        Ok(Self { repo })
    }

    /// Open repository at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path)
            .with_context(|| format!("Failed to open git repository at {}", path.display()))?;

        Ok(Self { repo })
    }

    /// Get workdir path, falling back to the git dir for bare repositories
    pub fn display_path(&self) -> String {
        self.repo
            .workdir()
            .unwrap_or_else(|| self.repo.path())
            .display()
            .to_string()
    }

    /// Produces one [`CommitPair`] per parent/child transition, oldest first.
    ///
    /// Follows first parents only; merge and root commits are skipped.
    pub fn commit_pairs(&self, options: &HistoryOptions) -> Result<Vec<CommitPair>> {
        let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
        walker
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .context("Failed to set revwalk sorting")?;

        match options.range.as_deref() {
            Some(range) if range.contains("..") => {
                let (start_spec, end_spec) = range
                    .split_once("..")
                    .context("Invalid range format")?;
                if start_spec.is_empty() || end_spec.is_empty() || end_spec.contains("..") {
                    anyhow::bail!("Invalid range format: {range}");
                }

                let start = self.resolve_commit(start_spec)?;
                let end = self.resolve_commit(end_spec)?;
                walker.push(end.id()).context("Failed to push end commit")?;
                walker.hide(start.id()).context("Failed to hide start commit")?;
            }
            Some(revision) => {
                let commit = self.resolve_commit(revision)?;
                if commit.parent_count() == 0 {
                    anyhow::bail!("Commit {revision} has no parent to compare against");
                }
                let parent = commit.parent(0).context("Failed to get parent commit")?;
                return Ok(vec![self.build_pair(&parent, &commit, options)?]);
            }
            None => {
                walker.push_head().context("Failed to push HEAD")?;
            }
        }
        walker
            .simplify_first_parent()
            .context("Failed to restrict walk to first parents")?;

        let mut pairs = Vec::new();
        for oid in walker {
            if options.max_count.is_some_and(|max| pairs.len() >= max) {
                break;
            }

            let oid = oid.context("Failed to get commit OID from walker")?;
            let commit = self
                .repo
                .find_commit(oid)
                .context("Failed to find commit")?;

            match commit.parent_count() {
                0 => continue,
                1 => {}
                _ => {
                    debug!(commit = %oid, "Skipping merge commit");
                    continue;
                }
            }

            let parent = commit.parent(0).context("Failed to get parent commit")?;
            pairs.push(self.build_pair(&parent, &commit, options)?);
        }

        // Reverse to get chronological order (oldest first)
        pairs.reverse();
        debug!(count = pairs.len(), "Collected commit pairs");
        Ok(pairs)
    }

    fn resolve_commit(&self, spec: &str) -> Result<git2::Commit<'_>> {
        self.repo
            .revparse_single(spec)
            .with_context(|| format!("Failed to parse commit: {spec}"))?
            .peel_to_commit()
            .with_context(|| format!("Failed to peel {spec} to a commit"))
    }

    fn build_pair(
        &self,
        parent: &git2::Commit<'_>,
        commit: &git2::Commit<'_>,
        options: &HistoryOptions,
    ) -> Result<CommitPair> {
        let parent_tree = parent.tree().context("Failed to get parent tree")?;
        let commit_tree = commit.tree().context("Failed to get commit tree")?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)
            .context("Failed to create diff")?;

        let mut stats = DiffStats::default();
        let mut diff_content = String::new();

        for idx in 0..diff.deltas().len() {
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };
            let path = delta.new_file().path().or_else(|| delta.old_file().path());
            if let Some(path) = path {
                if is_excluded(&options.exclude, path) {
                    debug!(path = %path.display(), "Excluding file from analysis");
                    continue;
                }
            }

            stats.files_changed += 1;
            let Some(mut patch) =
                git2::Patch::from_diff(&diff, idx).context("Failed to build patch")?
            else {
                continue;
            };

            let (_, additions, deletions) =
                patch.line_stats().context("Failed to count patch lines")?;
            stats.additions += additions as u64;
            stats.deletions += deletions as u64;

            if options.include_diff {
                let buf = patch.to_buf().context("Failed to format patch")?;
                diff_content.push_str(&String::from_utf8_lossy(&buf));
            }
        }

        Ok(CommitPair::new(
            Commit::from_git_commit(parent)?,
            Commit::from_git_commit(commit)?,
            stats,
            diff_content,
        ))
    }
}
