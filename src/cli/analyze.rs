//! `cadence analyze`: scores a repository's history.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use super::formatting::render_report;
use crate::ai::AiReviewer;
use crate::config::Config;
use crate::data::{AnalysisReport, CommitReport, OutputFormat};
use crate::detector::DetectionEngine;
use crate::git::{build_exclude_set, CommitPair, GitRepository, HistoryOptions};
use crate::metrics::RepositoryStats;

/// Concurrent AI review requests.
const AI_CONCURRENCY: usize = 4;

/// Analyze command options.
#[derive(Parser)]
pub struct AnalyzeCommand {
    /// Repository to analyze (defaults to the current directory).
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Commit range (e.g., main..feature, v1.0..HEAD) or a single revision.
    #[arg(long, value_name = "RANGE")]
    pub range: Option<String>,

    /// Configuration file.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format: text, json or yaml.
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Lists only flagged commits (the summary still covers all of them).
    #[arg(long)]
    pub flagged_only: bool,

    /// Analyzes only the most recent N commits.
    #[arg(long, short = 'n', value_name = "N")]
    pub limit: Option<usize>,

    /// Skips diff collection; content strategies then fall back to messages.
    #[arg(long)]
    pub no_diff: bool,

    /// Asks the configured model to assess flagged commits.
    #[arg(long)]
    pub ai: bool,
}

impl AnalyzeCommand {
    /// Executes the analyze command.
    pub fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        let repo = match &self.path {
            Some(path) => GitRepository::open_at(path),
            None => GitRepository::open(),
        }
        .context("Failed to open git repository. Make sure you're in a git repository.")?;

        let options = HistoryOptions {
            range: self.range.clone(),
            max_count: self.limit,
            include_diff: !self.no_diff,
            exclude: build_exclude_set(&config.exclude_files)?,
        };
        let pairs = repo.commit_pairs(&options)?;
        info!(pairs = pairs.len(), "Collected commit pairs");

        let engine = DetectionEngine::with_default_strategies();
        let mut report = analyze_pairs(repo.display_path(), &engine, &pairs);

        if self.ai {
            self.review_with_ai(&config, &pairs, &mut report)?;
        }

        if self.flagged_only {
            report.retain_flagged();
        }

        let rendered = render_report(&report, self.format)?;
        print!("{rendered}");
        if !rendered.ends_with('\n') {
            println!();
        }
        Ok(())
    }

    fn review_with_ai(
        &self,
        config: &Config,
        pairs: &[CommitPair],
        report: &mut AnalysisReport,
    ) -> Result<()> {
        if !config.ai.enabled {
            warn!("--ai given but ai.enabled is false; skipping AI review");
            eprintln!("warning: AI review is disabled in configuration (ai.enabled: false)");
            return Ok(());
        }
        let reviewer = AiReviewer::from_config(&config.ai)?;

        let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
        let assessments = rt.block_on(review_flagged(&reviewer, pairs, report));
        for (index, assessment) in assessments {
            report.commits[index].ai_assessment = Some(assessment);
        }
        Ok(())
    }
}

/// Evaluates every pair and assembles the report.
pub(crate) fn analyze_pairs(
    repository: String,
    engine: &DetectionEngine,
    pairs: &[CommitPair],
) -> AnalysisReport {
    let stats = RepositoryStats::from_pairs(pairs);
    let verdicts = engine.evaluate_many(pairs, &stats);
    let commits = pairs
        .iter()
        .zip(verdicts)
        .map(|(pair, verdict)| CommitReport::new(pair, verdict))
        .collect();
    AnalysisReport::new(repository, stats, commits, &engine.strategy_names())
}

/// Reviews flagged commits concurrently; failures are reported and skipped.
async fn review_flagged(
    reviewer: &AiReviewer,
    pairs: &[CommitPair],
    report: &AnalysisReport,
) -> Vec<(usize, String)> {
    let semaphore = Arc::new(tokio::sync::Semaphore::new(AI_CONCURRENCY));

    let futs: Vec<_> = report
        .commits
        .iter()
        .zip(pairs)
        .enumerate()
        .filter(|(_, (commit, _))| commit.verdict.flagged)
        .map(|(index, (commit, pair))| {
            let sem = Arc::clone(&semaphore);
            async move {
                let _permit = sem
                    .acquire()
                    .await
                    .map_err(|e| anyhow::anyhow!("semaphore closed: {e}"))?;
                let assessment = reviewer.review(pair, &commit.verdict).await?;
                Ok::<_, anyhow::Error>((index, assessment))
            }
        })
        .collect();

    let total = futs.len();
    info!(commits = total, model = reviewer.model(), "Requesting AI reviews");

    futures::future::join_all(futs)
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(item) => Some(item),
            Err(e) => {
                eprintln!("warning: AI review failed: {e:#}");
                None
            }
        })
        .collect()
}
