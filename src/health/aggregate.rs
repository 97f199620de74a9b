use std::collections::BTreeMap;

use super::{evaluator::EvaluatedResult, level::WarningLevel};

/// Per-level buckets of formatted messages for one check cycle.
///
/// Each bucket maps metric name to `"<value label> <message>"`.
#[derive(Debug, Default)]
pub struct LevelAggregate {
    buckets: BTreeMap<WarningLevel, BTreeMap<String, String>>,
}

impl LevelAggregate {
    /// Files `result` under its level. A second result for the same
    /// (level, metric) pair replaces the first.
    pub fn record(&mut self, result: EvaluatedResult) {
        let message = if result.message.is_empty() {
            result.value_label
        } else {
            format!("{} {}", result.value_label, result.message)
        };

        self.buckets
            .entry(result.level)
            .or_default()
            .insert(result.metric_name, message);
    }

    pub fn reset(&mut self) {
        self.buckets.clear();
    }

    pub fn bucket(&self, level: WarningLevel) -> Option<&BTreeMap<String, String>> {
        self.buckets.get(&level)
    }

    pub fn count(&self, level: WarningLevel) -> usize {
        self.bucket(level).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(BTreeMap::is_empty)
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, level: WarningLevel, metric: &str, message: &str) {
        self.buckets
            .entry(level)
            .or_default()
            .insert(metric.to_string(), message.to_string());
    }
}
