use thiserror::Error;

use super::{level::WarningLevel, rule::Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedResult {
    pub metric_name: String,
    pub level: WarningLevel,
    /// `<metric>=<value>` with six fractional digits, `NaN` when absent.
    pub value_label: String,
    pub message: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("check {check} has a non-finite {field} threshold")]
    NonFiniteThreshold { check: String, field: &'static str },
}

pub fn value_label(metric_name: &str, value: Option<f64>) -> String {
    format!("{}={:.6}", metric_name, value.unwrap_or(f64::NAN))
}

/// Classifies one metric reading against `rule`.
///
/// Crit is tested before warn and the first satisfied comparison wins.
/// An absent reading skips the comparisons and takes the not-found policy.
pub fn evaluate(
    rule: &Rule,
    metric_name: &str,
    value: Option<f64>,
) -> Result<EvaluatedResult, EvaluationError> {
    let value = value.filter(|value| !value.is_nan());
    let value_label = value_label(metric_name, value);

    let Some(value) = value else {
        return Ok(EvaluatedResult {
            metric_name: metric_name.to_string(),
            level: rule.level_if_not_found,
            value_label,
            message: rule.message_if_not_found.clone(),
        });
    };

    for (field, threshold) in [("crit", rule.crit_threshold), ("warn", rule.warn_threshold)] {
        if !threshold.is_finite() {
            return Err(EvaluationError::NonFiniteThreshold {
                check: rule.name.clone(),
                field,
            });
        }
    }

    let (level, message) = if rule.operator.check(value, rule.crit_threshold) {
        (WarningLevel::Crit, &rule.crit_message)
    } else if rule.operator.check(value, rule.warn_threshold) {
        (WarningLevel::Warn, &rule.warn_message)
    } else {
        (WarningLevel::Ok, &rule.ok_message)
    };

    Ok(EvaluatedResult {
        metric_name: metric_name.to_string(),
        level,
        value_label,
        message: message.clone(),
    })
}
