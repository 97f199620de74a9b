use std::collections::HashMap;

use serde::Deserialize;

/// One entry of the metrics JSON export.
///
/// Gauges and counters carry `value`; stats timers only carry percentiles
/// and so never make it into a snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricRecord {
    #[serde(default, rename = "type", alias = "Type")]
    pub kind: Option<String>,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Read-only metric readings for one check cycle.
#[derive(Debug, Clone, Default)]
pub struct MetricSnapshot {
    values: HashMap<String, f64>,
}

impl MetricSnapshot {
    pub fn from_records(records: impl IntoIterator<Item = MetricRecord>) -> Self {
        let mut values = HashMap::new();
        for record in records {
            match record.value {
                Some(value) => {
                    values.insert(record.name, value);
                }
                None => log::debug!(
                    "snapshot_record_skipped name={} type={} reason=no_value",
                    record.name,
                    record.kind.as_deref().unwrap_or("unknown")
                ),
            }
        }
        Self { values }
    }

    /// Value of `name`, or `None` when it was not collected.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().filter(|value| !value.is_nan())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for MetricSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}
