use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use cadence::config::Config;
use cadence::detector::DetectionEngine;
use cadence::git::{build_exclude_set, GitRepository, HistoryOptions};
use cadence::metrics::RepositoryStats;
use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

/// 2024-05-01T09:00:00Z
const BASE_TIME: i64 = 1_714_554_000;

/// Temporary repository whose commits carry controlled timestamps.
struct TestRepo {
    _temp_dir: TempDir,
    repo_path: PathBuf,
    repo: Repository,
    commits: Vec<Oid>,
}

impl TestRepo {
    fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let repo_path = temp_dir.path().to_path_buf();
        let repo = Repository::init(&repo_path)?;

        Ok(Self {
            _temp_dir: temp_dir,
            repo_path,
            repo,
            commits: Vec::new(),
        })
    }

    /// Writes `files` and commits them `offset_secs` after [`BASE_TIME`].
    fn commit(&mut self, message: &str, files: &[(&str, String)], offset_secs: i64) -> Result<Oid> {
        let mut index = self.repo.index()?;
        for (name, content) in files {
            let path = self.repo_path.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            index.add_path(Path::new(name))?;
        }
        index.write()?;

        let signature = Signature::new(
            "Test User",
            "test@example.com",
            &Time::new(BASE_TIME + offset_secs, 0),
        )?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let parent = match self.commits.last() {
            Some(id) => Some(self.repo.find_commit(*id)?),
            None => None,
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let id = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        self.commits.push(id);
        Ok(id)
    }

    fn open(&self) -> Result<GitRepository> {
        GitRepository::open_at(&self.repo_path)
    }
}

fn lines(prefix: &str, count: usize) -> String {
    (0..count).map(|i| format!("let {prefix}_{i} = {i};\n")).collect()
}

/// Root, a steady change, a 200-line burst one minute later, then a small fix
/// two hours after that.
fn history() -> Result<TestRepo> {
    let mut repo = TestRepo::new()?;
    repo.commit("Initial import", &[("src/lib.rs", "// ring buffer\n".to_string())], 0)?;
    repo.commit(
        "Add ring buffer skeleton types",
        &[("src/ring.rs", "pub struct Ring {\n    slots: Vec<u8>,\n}\n".to_string())],
        3600,
    )?;
    repo.commit("Expand counters", &[("src/counters.rs", lines("counter", 200))], 3660)?;
    repo.commit(
        "Fix off-by-one in ring buffer wraparound",
        &[(
            "src/wrap.rs",
            "fn wrap(pos: usize, len: usize) -> usize {\n    (pos + 1) % len\n}\n".to_string(),
        )],
        3660 + 7200,
    )?;
    Ok(repo)
}

#[test]
fn commit_pairs_are_oldest_first_with_deltas() -> Result<()> {
    let test_repo = history()?;
    let pairs = test_repo.open()?.commit_pairs(&HistoryOptions::default())?;

    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs[0].previous.hash, test_repo.commits[0].to_string());
    assert_eq!(pairs[2].current.hash, test_repo.commits[3].to_string());

    let deltas: Vec<i64> = pairs.iter().map(|p| p.time_delta.num_seconds()).collect();
    assert_eq!(deltas, vec![3600, 60, 7200]);

    assert_eq!(pairs[1].stats.additions, 200);
    assert_eq!(pairs[1].stats.deletions, 0);
    assert_eq!(pairs[1].stats.files_changed, 1);
    assert!(pairs[1].diff_content.contains("+let counter_199 = 199;"));
    assert_eq!(pairs[1].current.author, "Test User <test@example.com>");
    Ok(())
}

#[test]
fn ranges_revisions_and_limits() -> Result<()> {
    let test_repo = history()?;
    let repo = test_repo.open()?;
    let c1 = test_repo.commits[1].to_string();

    let ranged = repo.commit_pairs(&HistoryOptions {
        range: Some(format!("{c1}..HEAD")),
        ..HistoryOptions::default()
    })?;
    assert_eq!(ranged.len(), 2);
    assert_eq!(ranged[0].previous.hash, c1);

    let single = repo.commit_pairs(&HistoryOptions {
        range: Some("HEAD~1".to_string()),
        ..HistoryOptions::default()
    })?;
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].current.hash, test_repo.commits[2].to_string());

    let limited = repo.commit_pairs(&HistoryOptions {
        max_count: Some(1),
        ..HistoryOptions::default()
    })?;
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].current.hash, test_repo.commits[3].to_string());

    let root = test_repo.commits[0].to_string();
    assert!(repo
        .commit_pairs(&HistoryOptions {
            range: Some(root),
            ..HistoryOptions::default()
        })
        .is_err());
    assert!(repo
        .commit_pairs(&HistoryOptions {
            range: Some("..HEAD".to_string()),
            ..HistoryOptions::default()
        })
        .is_err());
    Ok(())
}

#[test]
fn default_excludes_skip_lockfiles() -> Result<()> {
    let mut test_repo = TestRepo::new()?;
    test_repo.commit("Initial import", &[("README.md", "# demo\n".to_string())], 0)?;
    test_repo.commit(
        "Pin dependencies",
        &[
            ("package-lock.json", lines("lock", 120)),
            ("web/vendor/app.min.js", lines("min", 40)),
            ("src/index.js", "export {};\n".to_string()),
        ],
        600,
    )?;

    let repo = test_repo.open()?;
    let options = HistoryOptions {
        exclude: build_exclude_set(&Config::default().exclude_files)?,
        ..HistoryOptions::default()
    };
    let pairs = repo.commit_pairs(&options)?;
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].stats.files_changed, 1);
    assert_eq!(pairs[0].stats.additions, 1);
    assert!(!pairs[0].diff_content.contains("package-lock"));

    let unfiltered = repo.commit_pairs(&HistoryOptions::default())?;
    assert_eq!(unfiltered[0].stats.files_changed, 3);
    assert_eq!(unfiltered[0].stats.additions, 161);
    Ok(())
}

#[test]
fn diff_collection_can_be_disabled() -> Result<()> {
    let test_repo = history()?;
    let pairs = test_repo.open()?.commit_pairs(&HistoryOptions {
        include_diff: false,
        ..HistoryOptions::default()
    })?;
    assert!(pairs.iter().all(|p| !p.has_diff()));
    assert_eq!(pairs[1].stats.additions, 200);
    Ok(())
}

#[test]
fn engine_flags_the_burst_only() -> Result<()> {
    let test_repo = history()?;
    let pairs = test_repo.open()?.commit_pairs(&HistoryOptions::default())?;
    let stats = RepositoryStats::from_pairs(&pairs);
    assert_eq!(stats.total_commits, 3);
    assert_eq!(stats.time_span_seconds, 3660 + 7200);

    let engine = DetectionEngine::with_default_strategies();
    let verdicts = engine.evaluate_many(&pairs, &stats);
    assert_eq!(verdicts.len(), 3);

    let burst = &verdicts[1];
    assert!(burst.flagged);
    assert!(burst.triggered_names().any(|n| n == "burst_pattern_analysis"));
    assert_eq!(burst.total_strategies, 7);

    let fix = &verdicts[2];
    assert!(!fix.flagged, "unexpected triggers: {:?}", fix.triggered);
    assert!(fix.score.abs() < f64::EPSILON);

    // Same input, same verdicts.
    assert_eq!(engine.evaluate_many(&pairs, &stats), verdicts);
    Ok(())
}
