//! Error-handling density in added code.

use crate::detector::text::{added_lines, count_occurrences};
use crate::detector::{DetectionStrategy, StrategyResult};
use crate::git::CommitPair;
use crate::metrics::RepositoryStats;

const ERROR_KEYWORDS: [&str; 11] = [
    "try",
    "catch",
    "except",
    "throw",
    "throws",
    "error",
    "exception",
    "handle",
    "if err != nil",
    ".catch(",
    "rescue",
];

const MESSAGE_KEYWORDS: [&str; 5] = ["error", "exception", "try", "catch", "handle"];

const MIN_ADDITIONS_FOR_CONTENT: u64 = 50;
const MIN_ADDED_LINES: usize = 20;
const LINES_PER_EXPECTED_CHECK: usize = 30;
const INSUFFICIENT_MIN_ADDITIONS: u64 = 100;
const EXCESSIVE_LINES_PER_CHECK: usize = 5;
const MESSAGE_ONLY_MIN_ADDITIONS: u64 = 300;

/// Flags large additions with too little, or implausibly much, error handling.
#[derive(Debug, Clone)]
pub struct ErrorHandlingPatternStrategy {
    enabled: bool,
}

impl ErrorHandlingPatternStrategy {
    /// Creates an enabled strategy.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Creates a strategy that never fires.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    fn analyze_code(diff: &str, additions: u64) -> StrategyResult {
        let lines = added_lines(diff);
        if lines.len() < MIN_ADDED_LINES {
            return StrategyResult::clear();
        }

        let code = lines.join("\n").to_lowercase();
        let observed: usize = ERROR_KEYWORDS
            .iter()
            .map(|keyword| count_occurrences(&code, keyword))
            .sum();
        let expected = lines.len() / LINES_PER_EXPECTED_CHECK;

        if additions > INSUFFICIENT_MIN_ADDITIONS && observed < expected {
            return StrategyResult::detected(format!(
                "Insufficient error handling: {observed} patterns in {additions} added lines (expected ~{expected})"
            ));
        }

        if observed > lines.len() / EXCESSIVE_LINES_PER_CHECK {
            return StrategyResult::detected(format!(
                "Excessive error handling: {observed} patterns in {} added lines, possible overcompensation",
                lines.len()
            ));
        }

        StrategyResult::clear()
    }
}

impl Default for ErrorHandlingPatternStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionStrategy for ErrorHandlingPatternStrategy {
    fn name(&self) -> &'static str {
        "error_handling_analysis"
    }

    fn detect(&self, pair: &CommitPair, _repo_stats: &RepositoryStats) -> StrategyResult {
        if !self.enabled {
            return StrategyResult::clear();
        }

        let additions = pair.stats.additions;
        if pair.has_diff() && additions > MIN_ADDITIONS_FOR_CONTENT {
            return Self::analyze_code(&pair.diff_content, additions);
        }

        if additions > MESSAGE_ONLY_MIN_ADDITIONS {
            let message = pair.current.message.to_lowercase();
            let mentions_errors = MESSAGE_KEYWORDS.iter().any(|k| message.contains(k));
            if !mentions_errors {
                return StrategyResult::detected(format!(
                    "Large addition ({additions} lines) with no mention of error handling"
                ));
            }
        }

        StrategyResult::clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::strategies::test_support::{diff_adding, pair};

    fn detect(message: &str, additions: u64, diff: &str) -> StrategyResult {
        ErrorHandlingPatternStrategy::new()
            .detect(&pair(message, additions, 0, diff), &RepositoryStats::default())
    }

    fn plain_lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("let width_{i} = base * {i};")).collect()
    }

    #[test]
    fn insufficient_handling_flagged() {
        let lines = plain_lines(40);
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let result = detect("Add layout math", 120, &diff_adding(&refs));
        assert!(result.is_detected());
        assert!(result.reason().contains("expected ~1"));
    }

    #[test]
    fn adequate_handling_not_flagged() {
        let mut lines = plain_lines(38);
        lines.push("if err != nil {".to_string());
        lines.push("}".to_string());
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        // `if err != nil` also contains `err` but not `error`: one pattern
        assert!(!detect("Add layout math", 120, &diff_adding(&refs)).is_detected());
    }

    #[test]
    fn excessive_handling_flagged() {
        let lines: Vec<String> = (0..20)
            .map(|i| format!("try {{ step_{i}() }} catch (e) {{ handle(e) }}"))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let result = detect("Wrap steps", 60, &diff_adding(&refs));
        assert!(result.is_detected());
        assert!(result.reason().contains("Excessive"));
    }

    #[test]
    fn short_diff_not_analyzed() {
        let lines = plain_lines(10);
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        assert!(!detect("Add layout math", 400, &diff_adding(&refs)).is_detected());
    }

    #[test]
    fn message_fallback_for_large_additions() {
        assert!(detect("Add rendering pipeline", 301, "").is_detected());
        assert!(!detect("Add rendering pipeline with error reporting", 301, "").is_detected());
        assert!(!detect("Add rendering pipeline", 300, "").is_detected());
    }
}
