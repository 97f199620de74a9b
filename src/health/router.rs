use std::collections::HashSet;

use regex::Regex;

use super::{
    aggregate::LevelAggregate,
    evaluator::evaluate,
    rule::{MetricTarget, Rule},
    snapshot::MetricSnapshot,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouteStats {
    pub evaluated: usize,
    pub skipped: usize,
}

/// Resolves rules against a snapshot, evaluating each metric at most once
/// per cycle.
#[derive(Debug, Default)]
pub struct MetricRouter {
    evaluated: HashSet<String>,
}

impl MetricRouter {
    pub fn reset(&mut self) {
        self.evaluated.clear();
    }

    pub fn route(
        &mut self,
        rules: &[Rule],
        snapshot: &MetricSnapshot,
        aggregate: &mut LevelAggregate,
    ) -> RouteStats {
        let mut stats = RouteStats::default();

        for rule in rules {
            let targets = match &rule.target {
                MetricTarget::Pattern(pattern) => match_metrics(pattern, snapshot),
                MetricTarget::Exact(name) => vec![name.as_str()],
            };

            for metric in targets {
                if self.evaluated.contains(metric) {
                    log::debug!(
                        "metric_already_evaluated check={} metric={}",
                        rule.name,
                        metric
                    );
                    continue;
                }

                match evaluate(rule, metric, snapshot.get(metric)) {
                    Ok(result) => {
                        self.evaluated.insert(metric.to_string());
                        aggregate.record(result);
                        stats.evaluated += 1;
                    }
                    Err(error) => {
                        log::error!(
                            "evaluation_skipped check={} operator={} metric={} error={}",
                            rule.name,
                            rule.operator,
                            metric,
                            error
                        );
                        stats.skipped += 1;
                    }
                }
            }
        }

        stats
    }

    #[cfg(test)]
    pub(crate) fn was_evaluated(&self, metric: &str) -> bool {
        self.evaluated.contains(metric)
    }
}

/// Snapshot metric names containing a match for `pattern`, sorted.
pub fn match_metrics<'a>(pattern: &Regex, snapshot: &'a MetricSnapshot) -> Vec<&'a str> {
    let mut names: Vec<&str> = snapshot
        .names()
        .filter(|name| pattern.is_match(name))
        .collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::{MetricRouter, match_metrics};
    use crate::health::{
        aggregate::LevelAggregate,
        level::WarningLevel,
        rule::{CompareOp, MetricTarget, Rule},
        snapshot::MetricSnapshot,
    };

    fn rule(name: &str, target: MetricTarget, crit: f64, warn: f64) -> Rule {
        Rule {
            name: name.to_string(),
            target,
            operator: CompareOp::GreaterThan,
            crit_threshold: crit,
            warn_threshold: warn,
            crit_message: format!("{name} crit"),
            warn_message: format!("{name} warn"),
            ok_message: format!("{name} ok"),
            level_if_not_found: WarningLevel::Unknown,
            message_if_not_found: "metric not collected".to_string(),
        }
    }

    fn pattern(raw: &str) -> MetricTarget {
        MetricTarget::Pattern(Regex::new(raw).expect("valid test pattern"))
    }

    fn test_snapshot() -> MetricSnapshot {
        [
            ("database1.testMetrics", 1.0),
            ("database2.testMetrics", 2.0),
            ("testMetrics.submetric1", 4.0),
            ("metricshouldntmatch", 7.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn pattern_matches_anywhere_in_name() {
        let snapshot = test_snapshot();
        let regex = Regex::new("testMetrics").expect("valid pattern");
        assert_eq!(
            match_metrics(&regex, &snapshot),
            vec![
                "database1.testMetrics",
                "database2.testMetrics",
                "testMetrics.submetric1"
            ]
        );
    }

    #[test]
    fn pattern_without_matches_is_empty() {
        let snapshot = test_snapshot();
        let regex = Regex::new("tableSizes").expect("valid pattern");
        assert!(match_metrics(&regex, &snapshot).is_empty());

        let mut router = MetricRouter::default();
        let mut aggregate = LevelAggregate::default();
        let stats = router.route(
            &[rule("tables", pattern("tableSizes"), 1.0, 0.0)],
            &snapshot,
            &mut aggregate,
        );
        assert_eq!(stats.evaluated, 0);
        assert!(aggregate.is_empty());
    }

    #[test]
    fn earlier_rule_keeps_its_result() {
        let snapshot = test_snapshot();
        let rules = vec![
            rule("first", pattern("^database1"), 0.5, 0.0),
            rule("second", pattern("testMetrics"), 100.0, 50.0),
        ];

        let mut router = MetricRouter::default();
        let mut aggregate = LevelAggregate::default();
        let stats = router.route(&rules, &snapshot, &mut aggregate);

        assert_eq!(stats.evaluated, 3);
        let crit = aggregate.bucket(WarningLevel::Crit).expect("crit bucket");
        assert_eq!(crit["database1.testMetrics"], "database1.testMetrics=1.000000 first crit");

        let ok = aggregate.bucket(WarningLevel::Ok).expect("ok bucket");
        assert!(!ok.contains_key("database1.testMetrics"));
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn exact_rule_for_missing_metric_uses_not_found_policy() {
        let snapshot = test_snapshot();
        let rules = vec![rule("slave", MetricTarget::Exact("Seconds_Behind_Master".into()), 1.0, 0.0)];

        let mut router = MetricRouter::default();
        let mut aggregate = LevelAggregate::default();
        router.route(&rules, &snapshot, &mut aggregate);

        let unknown = aggregate.bucket(WarningLevel::Unknown).expect("unknown bucket");
        assert_eq!(
            unknown["Seconds_Behind_Master"],
            "Seconds_Behind_Master=NaN metric not collected"
        );
        assert!(router.was_evaluated("Seconds_Behind_Master"));
    }

    #[test]
    fn exact_rule_after_pattern_is_skipped() {
        let snapshot = test_snapshot();
        let rules = vec![
            rule("pattern", pattern("testMetrics"), 100.0, 50.0),
            rule("exact", MetricTarget::Exact("database2.testMetrics".into()), 0.0, 0.0),
        ];

        let mut router = MetricRouter::default();
        let mut aggregate = LevelAggregate::default();
        let stats = router.route(&rules, &snapshot, &mut aggregate);

        assert_eq!(stats.evaluated, 3);
        assert_eq!(aggregate.count(WarningLevel::Crit), 0);
    }

    #[test]
    fn reset_allows_reevaluation() {
        let snapshot = test_snapshot();
        let rules = vec![rule("all", pattern("testMetrics"), 100.0, 50.0)];

        let mut router = MetricRouter::default();
        let mut aggregate = LevelAggregate::default();
        assert_eq!(router.route(&rules, &snapshot, &mut aggregate).evaluated, 3);
        assert_eq!(router.route(&rules, &snapshot, &mut aggregate).evaluated, 0);

        router.reset();
        aggregate.reset();
        assert_eq!(router.route(&rules, &snapshot, &mut aggregate).evaluated, 3);
    }

    #[test]
    fn evaluation_error_skips_only_that_metric() {
        let snapshot = test_snapshot();
        let rules = vec![
            rule("broken", MetricTarget::Exact("metricshouldntmatch".into()), f64::INFINITY, 0.0),
            rule("fine", pattern("^database"), 100.0, 50.0),
        ];

        let mut router = MetricRouter::default();
        let mut aggregate = LevelAggregate::default();
        let stats = router.route(&rules, &snapshot, &mut aggregate);

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.evaluated, 2);
        assert!(!router.was_evaluated("metricshouldntmatch"));
    }
}
