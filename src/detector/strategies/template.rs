//! Scaffold-like structure in added code.

use std::collections::HashMap;

use crate::detector::text::added_lines;
use crate::detector::{DetectionStrategy, StrategyResult};
use crate::git::CommitPair;
use crate::metrics::RepositoryStats;

const TEMPLATE_COMMENTS: [&str; 10] = [
    "todo",
    "fixme",
    "placeholder",
    "implement",
    "add code here",
    "your code here",
    "example",
    "sample",
    "template",
    "boilerplate",
];

const BOILERPLATE_KEYWORDS: [&str; 8] = [
    "boilerplate",
    "template",
    "skeleton",
    "scaffold",
    "stub",
    "placeholder",
    "todo",
    "fixme",
];

const MIN_ADDITIONS_FOR_CONTENT: u64 = 50;
const MIN_ADDED_LINES: usize = 10;
const MESSAGE_ONLY_MIN_ADDITIONS: u64 = 100;
const TAB_WIDTH: usize = 4;

/// Flags added code that reads like generated scaffolding.
#[derive(Debug, Clone)]
pub struct TemplatePatternStrategy {
    enabled: bool,
}

impl TemplatePatternStrategy {
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
        if lines.len() < MIN_ADDED_LINES {
            return StrategyResult::clear();
        }

        let lower = lines.join("\n").to_lowercase();

        // One point per distinct phrase.
        let mut suspicious = TEMPLATE_COMMENTS
            .iter()
            .filter(|phrase| lower.contains(*phrase))
            .count();

        if similar_adjacent_pairs(&lines) > lines.len() / 8 {
            suspicious += 1;
        }

        if has_uniform_indentation(&lines) {
            suspicious += 1;
        }

        let import_lines = lines
            .iter()
            .filter(|line| line.to_lowercase().contains("import"))
            .count();
        if import_lines > 5 && lines.len() < import_lines * 10 {
            suspicious += 1;
        }

        if suspicious >= 2 {
            return StrategyResult::detected(format!(
                "Generated-code structure: {suspicious} template indicators (template comments, repetition, uniform indentation, import-heavy)"
            ));
        }

        StrategyResult::clear()
    }
}

/// Adjacent lines of equal word count (> 3) differing in at most two positions.
fn similar_adjacent_pairs(lines: &[&str]) -> usize {
    lines
        .windows(2)
        .filter(|window| {
            let (first, second) = (window[0].trim(), window[1].trim());
            if first.len() <= 10 || second.len() <= 10 {
                return false;
            }

            let first: Vec<&str> = first.split_whitespace().collect();
            let second: Vec<&str> = second.split_whitespace().collect();
            if first.len() != second.len() || first.len() <= 3 {
                return false;
            }

            let differences = first.iter().zip(&second).filter(|(a, b)| a != b).count();
            differences <= 2
        })
        .count()
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .map_while(|c| match c {
            ' ' => Some(1),
            '\t' => Some(TAB_WIDTH),
            _ => None,
        })
        .sum()
}

/// More than 90% of lines sit on indentation levels that each hold over 10%.
fn has_uniform_indentation(lines: &[&str]) -> bool {
    let total = lines.len();
    if total <= 20 {
        return false;
    }

    let mut levels: HashMap<usize, usize> = HashMap::new();
    for line in lines.iter().filter(|line| !line.trim().is_empty()) {
        *levels.entry(indent_width(line)).or_default() += 1;
    }

    let covered: usize = levels.values().filter(|&&count| count > total / 10).sum();
    covered as f64 / total as f64 > 0.9
}

impl Default for TemplatePatternStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionStrategy for TemplatePatternStrategy {
    fn name(&self) -> &'static str {
        "template_pattern_analysis"
    }

    fn detect(&self, pair: &CommitPair, _repo_stats: &RepositoryStats) -> StrategyResult {
        if !self.enabled {
            return StrategyResult::clear();
        }

        if pair.has_diff() && pair.stats.additions > MIN_ADDITIONS_FOR_CONTENT {
            let result = Self::analyze_code(&pair.diff_content);
            if result.is_detected() {
                return result;
            }
        }

        let message = pair.current.message.to_lowercase();
        let mentions_boilerplate = BOILERPLATE_KEYWORDS.iter().any(|k| message.contains(k));
        if mentions_boilerplate && pair.stats.additions > MESSAGE_ONLY_MIN_ADDITIONS {
            return StrategyResult::detected(format!(
                "Large commit ({} additions) described as boilerplate or scaffolding",
                pair.stats.additions
            ));
        }

        StrategyResult::clear()
    }
}
