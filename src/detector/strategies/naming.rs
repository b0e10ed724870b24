//! Generic identifiers and over-regular naming in added code.

use crate::detector::text::{added_lines, count_occurrences, is_perfect_camel_case};
use crate::detector::{DetectionStrategy, StrategyResult};
use crate::git::CommitPair;
use crate::metrics::RepositoryStats;

const GENERIC_IDENTIFIERS: [&str; 13] = [
    "var1", "var2", "temp", "data", "result", "value", "item", "element", "obj", "instance",
    "helper", "utility", "manager",
];

const GENERIC_NOUNS: [&str; 17] = [
    "variable",
    "function",
    "method",
    "class",
    "object",
    "instance",
    "data",
    "result",
    "value",
    "item",
    "element",
    "component",
    "helper",
    "utility",
    "manager",
    "handler",
    "service",
];

/// Flags added code dominated by placeholder names and uniform style.
#[derive(Debug, Clone)]
pub struct NamingPatternStrategy {
    enabled: bool,
}

impl NamingPatternStrategy {
    /// Creates an enabled strategy.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Creates a strategy that never fires.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    fn analyze_code(diff: &str) -> StrategyResult {
        let lines = added_lines(diff);
        if lines.is_empty() {
            return StrategyResult::clear();
        }

        let code = lines.join("\n");
        let lower = code.to_lowercase();
        let mut suspicious = 0;

        suspicious += GENERIC_IDENTIFIERS
            .iter()
            .filter(|name| lower.contains(*name))
            .count();

        let todo = count_occurrences(&lower, "todo");
        let fixme = count_occurrences(&lower, "fixme");
        if todo > 2 || fixme > 1 {
            suspicious += 1;
        }

        let words: Vec<&str> = code.split_whitespace().collect();
        let camel = words
            .iter()
            .filter(|word| word.len() > 4 && is_perfect_camel_case(word))
            .count();
        if words.len() > 10 && camel as f64 / words.len() as f64 > 0.3 {
            suspicious += 1;
        }

        // Case-sensitive match.
        if code.contains("catch") || code.contains("except") {
            let handlers = count_occurrences(&code, "catch")
                + count_occurrences(&code, "except")
                + count_occurrences(&code, "try");
            if handlers > lines.len() / 20 {
                suspicious += 1;
            }
        }

        if suspicious >= 2 {
            return StrategyResult::detected(format!(
                "Added code shows {suspicious} naming red flags (generic identifiers, TODO markers, uniform camelCase, dense try/catch)"
            ));
        }

        StrategyResult::clear()
    }

    fn analyze_message(message: &str) -> StrategyResult {
        let message = message.to_lowercase();
        let nouns = GENERIC_NOUNS
            .iter()
            .filter(|noun| message.contains(*noun))
            .count();

        if nouns >= 2 {
            return StrategyResult::detected(format!(
                "Commit message names {nouns} generic code nouns, suggesting generic identifiers"
            ));
        }

        StrategyResult::clear()
    }
}

impl Default for NamingPatternStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionStrategy for NamingPatternStrategy {
    fn name(&self) -> &'static str {
        "naming_pattern_analysis"
    }

    fn detect(&self, pair: &CommitPair, _repo_stats: &RepositoryStats) -> StrategyResult {
        if !self.enabled {
            return StrategyResult::clear();
        }

        if pair.has_diff() {
            Self::analyze_code(&pair.diff_content)
        } else {
            Self::analyze_message(&pair.current.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::strategies::test_support::{diff_adding, pair};

    fn detect(message: &str, diff: &str) -> StrategyResult {
        NamingPatternStrategy::new().detect(&pair(message, 10, 0, diff), &RepositoryStats::default())
    }

    #[test]
    fn generic_names_and_todos_flagged() {
        let diff = diff_adding(&[
            "var1 := 1",
            "temp := 2",
            " data := 3",
            "// todo: one",
            "// todo: two",
            "// todo: three",
        ]);
        let result = detect("Wire up parser", &diff);
        assert!(result.is_detected());
    }

    #[test]
    fn each_identifier_counts_once() {
        // `temp` repeated many times is still one point; nothing else fires.
        let diff = diff_adding(&["temp", "temp", "temp", "temp"]);
        assert!(!detect("Wire up parser", &diff).is_detected());
    }

    #[test]
    fn clean_code_not_flagged() {
        let diff = diff_adding(&[
            "fn parse_header(buf: &[u8]) -> Option<Header> {",
            "    let magic = buf.get(..4)?;",
            "    Header::from_magic(magic)",
            "}",
        ]);
        assert!(!detect("Parse container header", &diff).is_detected());
    }

    #[test]
    fn diff_without_added_lines_not_flagged() {
        let diff = "--- a/x\n+++ b/x\n@@ -1 +0,0 @@\n-gone\n";
        assert!(!detect("Remove helper manager data", diff).is_detected());
    }

    /// `temp` scores one point; the tokens after it are whitespace-separated.
    fn with_generic_name(tokens: &[&str]) -> String {
        let line = format!("temp {}", tokens.join(" "));
        diff_adding(&[&line])
    }

    #[test]
    fn uniform_camel_case_adds_a_point() {
        // 11 tokens, 4 camelCase (36%).
        let diff = with_generic_name(&[
            "=", "loadConfig", "|", "parseArgs", "|", "readInput", "|", "sendFrame", "|", "one",
        ]);
        assert!(detect("Wire up parser", &diff).is_detected());

        // Same tokens without the generic name: a single point.
        let diff = diff_adding(&["= loadConfig | parseArgs | readInput | sendFrame | one two"]);
        assert!(!detect("Wire up parser", &diff).is_detected());
    }

    #[test]
    fn camel_case_needs_more_than_ten_tokens() {
        let diff = with_generic_name(&[
            "=", "loadConfig", "|", "parseArgs", "|", "readInput", "|", "sendFrame", "|",
        ]);
        assert!(!detect("Wire up parser", &diff).is_detected());
    }

    #[test]
    fn camel_case_needs_thirty_percent() {
        // 11 tokens, 3 camelCase (27%).
        let diff = with_generic_name(&[
            "=", "loadConfig", "|", "parseArgs", "|", "readInput", "|", "frame", "|", "one",
        ]);
        assert!(!detect("Wire up parser", &diff).is_detected());
    }

    /// `temp` plus `blocks` try/catch pairs, padded to `total` lines.
    fn handler_code(blocks: usize, total: usize) -> String {
        let mut lines = vec!["temp = 0;"];
        for _ in 0..blocks {
            lines.push("try { step(); }");
            lines.push("catch (e) { log(e); }");
        }
        while lines.len() < total {
            lines.push("x += 1;");
        }
        diff_adding(&lines)
    }

    #[test]
    fn dense_error_handling_adds_a_point() {
        // 40 lines allow two handler keywords; four exceed it.
        assert!(detect("Wire up parser", &handler_code(2, 40)).is_detected());
        assert!(!detect("Wire up parser", &handler_code(1, 40)).is_detected());
        // Sparse relative to size.
        assert!(!detect("Wire up parser", &handler_code(2, 80)).is_detected());
    }

    #[test]
    fn try_without_catch_or_except_adds_nothing() {
        let mut lines = vec!["temp = 0;"];
        lines.extend(["try { step(); }"; 5]);
        assert!(!detect("Wire up parser", &diff_adding(&lines)).is_detected());
    }

    #[test]
    fn message_fallback_counts_generic_nouns() {
        assert!(detect("Add helper function for data", "").is_detected());
        assert!(!detect("Add helper for parsing", "").is_detected());
    }
}
