//! Runs the registered strategies and aggregates their results.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::strategies::default_strategies;
use super::DetectionStrategy;
use crate::git::CommitPair;
use crate::metrics::RepositoryStats;

/// A strategy that fired, with its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredStrategy {
    /// Strategy identifier
    pub name: String,
    /// Why it fired
    pub reason: String,
}

/// Aggregated outcome for one commit pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the pair should be surfaced for review
    pub flagged: bool,
    /// Strategies that fired, in registration order
    pub triggered: Vec<TriggeredStrategy>,
    /// Fraction of strategies that fired
    pub score: f64,
    /// Number of strategies evaluated
    pub total_strategies: usize,
}

impl Verdict {
    /// Names of the strategies that fired.
    pub fn triggered_names(&self) -> impl Iterator<Item = &str> {
        self.triggered.iter().map(|t| t.name.as_str())
    }
}

/// Decides whether a set of strategy results flags a commit.
pub trait VerdictPolicy: Send + Sync {
    /// Short identifier for logging.
    fn name(&self) -> &'static str;

    /// Whether `triggered` positives out of `total` strategies flag the pair.
    fn is_flagged(&self, triggered: usize, total: usize) -> bool;
}

/// Flags when any strategy fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyTriggered;

impl VerdictPolicy for AnyTriggered {
    fn name(&self) -> &'static str {
        "any"
    }

    fn is_flagged(&self, triggered: usize, _total: usize) -> bool {
        triggered > 0
    }
}

/// Flags when at least one strategy fires and the score reaches a minimum.
#[derive(Debug, Clone, Copy)]
pub struct MinimumScore(pub f64);

impl VerdictPolicy for MinimumScore {
    fn name(&self) -> &'static str {
        "minimum_score"
    }

    fn is_flagged(&self, triggered: usize, total: usize) -> bool {
        triggered > 0 && score(triggered, total) >= self.0
    }
}

fn score(triggered: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        triggered as f64 / total as f64
    }
}

/// Ordered set of strategies plus an aggregation policy.
pub struct DetectionEngine {
    strategies: Vec<Box<dyn DetectionStrategy>>,
    policy: Box<dyn VerdictPolicy>,
}

impl DetectionEngine {
    /// Creates an engine with no strategies and the [`AnyTriggered`] policy.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            policy: Box::new(AnyTriggered),
        }
    }

    /// Creates an engine with the seven built-in strategies.
    pub fn with_default_strategies() -> Self {
        let mut engine = Self::new();
        for strategy in default_strategies() {
            engine.register(strategy);
        }
        engine
    }

    /// Appends a strategy; registration order is evaluation order.
    pub fn register(&mut self, strategy: Box<dyn DetectionStrategy>) -> &mut Self {
        self.strategies.push(strategy);
        self
    }

    /// Replaces the aggregation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: impl VerdictPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Registered strategy names in evaluation order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether no strategies are registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Runs every strategy once against `pair`.
    pub fn evaluate(&self, pair: &CommitPair, repo_stats: &RepositoryStats) -> Verdict {
        let triggered: Vec<TriggeredStrategy> = self
            .strategies
            .iter()
            .filter_map(|strategy| {
                let result = strategy.detect(pair, repo_stats);
                result.is_detected().then(|| TriggeredStrategy {
                    name: strategy.name().to_string(),
                    reason: result.reason().to_string(),
                })
            })
            .collect();

        let total = self.strategies.len();
        let flagged = self.policy.is_flagged(triggered.len(), total);
        debug!(
            commit = %pair.current.short_hash(),
            triggered = triggered.len(),
            total,
            flagged,
            policy = self.policy.name(),
            "Evaluated commit pair"
        );

        Verdict {
            flagged,
            score: score(triggered.len(), total),
            triggered,
            total_strategies: total,
        }
    }

    /// Evaluates many pairs on the rayon pool.
    ///
    /// Output order matches `pairs`.
    pub fn evaluate_many(&self, pairs: &[CommitPair], repo_stats: &RepositoryStats) -> Vec<Verdict> {
        pairs
            .par_iter()
            .map(|pair| self.evaluate(pair, repo_stats))
            .collect()
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::with_default_strategies()
    }
}

impl fmt::Debug for DetectionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionEngine")
            .field("strategies", &self.strategy_names())
            .field("policy", &self.policy.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::strategies::test_support::{pair, pair_with_delta};
    use crate::detector::StrategyResult;
    use chrono::TimeDelta;

    struct Fixed {
        name: &'static str,
        fire: bool,
    }

    impl DetectionStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn detect(&self, _pair: &CommitPair, _stats: &RepositoryStats) -> StrategyResult {
            if self.fire {
                StrategyResult::detected(format!("{} fired", self.name))
            } else {
                StrategyResult::clear()
            }
        }
    }

    fn fixed(name: &'static str, fire: bool) -> Box<dyn DetectionStrategy> {
        Box::new(Fixed { name, fire })
    }

    #[test]
    fn two_of_seven_defaults_triggered() {
        // Balanced 150/150 rewrite 100 seconds after its parent: structural + burst.
        let pair = pair_with_delta(
            "Tweak parser lookahead",
            150,
            150,
            3,
            "",
            TimeDelta::seconds(100),
        );
        let engine = DetectionEngine::with_default_strategies();
        let verdict = engine.evaluate(&pair, &RepositoryStats::default());

        assert!(verdict.flagged);
        assert_eq!(verdict.total_strategies, 7);
        assert!((verdict.score - 2.0 / 7.0).abs() < 1e-12);
        assert_eq!(
            verdict.triggered_names().collect::<Vec<_>>(),
            vec!["structural_consistency_analysis", "burst_pattern_analysis"]
        );
    }

    #[test]
    fn quiet_commit_not_flagged() {
        let engine = DetectionEngine::with_default_strategies();
        let verdict = engine.evaluate(
            &pair("Fix off-by-one in ring buffer", 3, 1, ""),
            &RepositoryStats::default(),
        );
        assert!(!verdict.flagged);
        assert!(verdict.triggered.is_empty());
        assert!(verdict.score.abs() < f64::EPSILON);
    }

    #[test]
    fn reasons_follow_registration_order() {
        let mut engine = DetectionEngine::new();
        engine
            .register(fixed("c", true))
            .register(fixed("a", false))
            .register(fixed("b", true));

        let verdict = engine.evaluate(&pair("x", 1, 1, ""), &RepositoryStats::default());
        assert_eq!(verdict.triggered_names().collect::<Vec<_>>(), vec!["c", "b"]);
        assert_eq!(verdict.triggered[0].reason, "c fired");
    }

    #[test]
    fn duplicate_names_are_kept() {
        let mut engine = DetectionEngine::new();
        engine.register(fixed("dup", true)).register(fixed("dup", true));
        let verdict = engine.evaluate(&pair("x", 1, 1, ""), &RepositoryStats::default());
        assert_eq!(verdict.triggered.len(), 2);
        assert!((verdict.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_engine_scores_zero() {
        let engine = DetectionEngine::new();
        assert!(engine.is_empty());
        let verdict = engine.evaluate(&pair("x", 1, 1, ""), &RepositoryStats::default());
        assert!(!verdict.flagged);
        assert!(verdict.score.abs() < f64::EPSILON);
    }

    #[test]
    fn minimum_score_policy() {
        let mut engine = DetectionEngine::new().with_policy(MinimumScore(0.5));
        engine
            .register(fixed("a", true))
            .register(fixed("b", false))
            .register(fixed("c", false));
        let verdict = engine.evaluate(&pair("x", 1, 1, ""), &RepositoryStats::default());
        assert!(!verdict.flagged);
        assert_eq!(verdict.triggered.len(), 1);

        engine.register(fixed("d", true));
        let verdict = engine.evaluate(&pair("x", 1, 1, ""), &RepositoryStats::default());
        assert!(verdict.flagged);
    }

    #[test]
    fn evaluate_many_preserves_order() {
        let engine = DetectionEngine::with_default_strategies();
        let pairs: Vec<CommitPair> = (0..40)
            .map(|i| {
                if i % 3 == 0 {
                    pair("Minor fixes", 1, 1, "")
                } else {
                    pair("Tighten bounds check", 1, 1, "")
                }
            })
            .collect();

        let verdicts = engine.evaluate_many(&pairs, &RepositoryStats::default());
        assert_eq!(verdicts.len(), 40);
        for (i, verdict) in verdicts.iter().enumerate() {
            assert_eq!(verdict.flagged, i % 3 == 0, "pair {i}");
        }
    }

    #[test]
    fn debug_lists_strategies() {
        let rendered = format!("{:?}", DetectionEngine::default());
        assert!(rendered.contains("commit_message_analysis"));
        assert!(rendered.contains("any"));
    }

    mod prop {
        use super::*;
        use crate::detector::strategies::test_support::pair_with_delta;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn evaluation_is_deterministic(
                message in "[a-zA-Z ]{0,60}",
                diff_lines in proptest::collection::vec("[a-zA-Z_(){};= ]{0,40}", 0..40),
                additions in 0_u64..3000,
                deletions in 0_u64..3000,
                files in 0_u64..40,
                seconds in -600_i64..7200,
            ) {
                let diff: String = diff_lines.iter().map(|l| format!("+{l}\n")).collect();
                let pair = pair_with_delta(&message, additions, deletions, files, &diff, TimeDelta::seconds(seconds));
                let snapshot = pair.clone();
                let stats = RepositoryStats::default();
                let engine = DetectionEngine::with_default_strategies();

                let first = engine.evaluate(&pair, &stats);
                let second = engine.evaluate(&pair, &stats);
                prop_assert_eq!(&first, &second);
                prop_assert_eq!(&pair, &snapshot);
                prop_assert_eq!(first.flagged, !first.triggered.is_empty());
                for triggered in &first.triggered {
                    prop_assert!(!triggered.reason.is_empty());
                }
            }
        }
    }
}
