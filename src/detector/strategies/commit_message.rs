//! Generic or assistant-style commit message phrasing.

use crate::detector::text::count_occurrences;
use crate::detector::{DetectionStrategy, StrategyResult};
use crate::git::CommitPair;
use crate::metrics::RepositoryStats;

const AI_PHRASES: [&str; 12] = [
    "implement",
    "add functionality",
    "update code",
    "refactor code",
    "improve implementation",
    "enhance functionality",
    "optimize performance",
    "fix issues",
    "improve code quality",
    "add new features",
    "update implementation",
    "add support for",
];

const GENERIC_PHRASES: [&str; 10] = [
    "initial commit",
    "update readme",
    "update dependencies",
    "minor fixes",
    "code cleanup",
    "bug fixes",
    "improvements",
    "updates",
    "changes",
    "modifications",
];

/// Above this many words a message mentioning implementation is "verbose".
const VERBOSE_WORD_COUNT: usize = 8;

/// Flags messages built from stock phrases.
#[derive(Debug, Clone)]
pub struct CommitMessageStrategy {
    enabled: bool,
}

impl CommitMessageStrategy {
    /// Creates an enabled strategy.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Creates a strategy that never fires.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for CommitMessageStrategy {
    fn default() -> Self {
        Self::new()
    }
}

fn phrase_hits(message: &str, phrases: &[&str]) -> usize {
    phrases
        .iter()
        .filter(|phrase| count_occurrences(message, phrase) > 0)
        .count()
}

impl DetectionStrategy for CommitMessageStrategy {
    fn name(&self) -> &'static str {
        "commit_message_analysis"
    }

    fn detect(&self, pair: &CommitPair, _repo_stats: &RepositoryStats) -> StrategyResult {
        if !self.enabled {
            return StrategyResult::clear();
        }

        let message = pair.current.message.to_lowercase();
        let ai_score = phrase_hits(&message, &AI_PHRASES);
        let generic_score = phrase_hits(&message, &GENERIC_PHRASES);

        if ai_score >= 2 || generic_score >= 1 {
            return StrategyResult::detected(format!(
                "Commit message uses stock phrasing (assistant-style phrases: {ai_score}, generic phrases: {generic_score})"
            ));
        }

        let word_count = message.split_whitespace().count();
        if word_count > VERBOSE_WORD_COUNT
            && (message.contains("implement") || message.contains("functionality"))
        {
            return StrategyResult::detected(format!(
                "Verbose yet generic commit message ({word_count} words built around implementation wording)"
            ));
        }

        StrategyResult::clear()
    }
}
