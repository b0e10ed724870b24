//! Scores pushed commits with the detection engine.

use tracing::info;

use super::{CommitVerdict, JobProcessor, PushEvent, WebhookError};
use crate::detector::DetectionEngine;
use crate::metrics::RepositoryStats;

/// [`JobProcessor`] backed by a [`DetectionEngine`].
#[derive(Debug, Default)]
pub struct DetectionJobProcessor {
    engine: DetectionEngine,
}

impl DetectionJobProcessor {
    /// Wraps an engine.
    pub fn new(engine: DetectionEngine) -> Self {
        Self { engine }
    }
}

impl JobProcessor for DetectionJobProcessor {
    fn process(&self, event: &PushEvent) -> Result<Vec<CommitVerdict>, WebhookError> {
        let pairs = event.commit_pairs();
        let stats = RepositoryStats::from_pairs(&pairs);
        let verdicts = self.engine.evaluate_many(&pairs, &stats);

        let results: Vec<CommitVerdict> = pairs
            .iter()
            .zip(verdicts)
            .map(|(pair, verdict)| CommitVerdict {
                hash: pair.current.hash.clone(),
                message: pair.current.summary().to_string(),
                verdict,
            })
            .collect();

        info!(
            repository = %event.repository.full_name,
            commits = results.len(),
            flagged = results.iter().filter(|r| r.verdict.flagged).count(),
            "Scored push"
        );
        Ok(results)
    }
}
