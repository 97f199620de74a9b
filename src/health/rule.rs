use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::config::{Config, ConfigError, RawCheck, RawThreshold};

use super::level::WarningLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Equal,
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            ">=" => Ok(Self::GreaterEqual),
            "<=" => Ok(Self::LessEqual),
            "==" => Ok(Self::Equal),
            other => Err(format!("unknown check operator: {other:?}")),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::Equal => "==",
        };
        f.write_str(symbol)
    }
}

impl CompareOp {
    pub fn check(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
            Self::GreaterEqual => value >= threshold,
            Self::LessEqual => value <= threshold,
            Self::Equal => value == threshold,
        }
    }
}

/// What a rule is checked against.
#[derive(Debug, Clone)]
pub enum MetricTarget {
    Exact(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
pub struct Rule {
    /// Declaration name of the `[checks.<name>]` table.
    pub name: String,
    pub target: MetricTarget,
    pub operator: CompareOp,
    pub crit_threshold: f64,
    pub warn_threshold: f64,
    pub crit_message: String,
    pub warn_message: String,
    pub ok_message: String,
    pub level_if_not_found: WarningLevel,
    pub message_if_not_found: String,
}

impl Rule {
    pub fn compile(name: &str, raw: RawCheck) -> Result<Self, ConfigError> {
        let operator = raw
            .check
            .parse::<CompareOp>()
            .map_err(|reason| ConfigError::check(name, reason))?;
        let crit_threshold = parse_threshold(name, "crit-threshold", &raw.crit_threshold)?;
        let warn_threshold = parse_threshold(name, "warn-threshold", &raw.warn_threshold)?;

        // Pattern mode wins when both keys are present.
        let target = match (raw.metric_type, raw.metric_name) {
            (Some(pattern), _) => {
                let regex = Regex::new(&pattern).map_err(|error| {
                    ConfigError::check(name, format!("invalid metric-type pattern: {error}"))
                })?;
                MetricTarget::Pattern(regex)
            }
            (None, Some(metric)) if !metric.trim().is_empty() => MetricTarget::Exact(metric),
            _ => {
                return Err(ConfigError::check(
                    name,
                    "one of metric-name or metric-type is required",
                ));
            }
        };

        let level_if_not_found = match raw.level_if_not_found.as_deref() {
            None => WarningLevel::Warn,
            Some(raw_level) => WarningLevel::parse(raw_level).unwrap_or_else(|| {
                log::warn!(
                    "check_level_defaulted check={} operator={} level_if_not_found={:?} fallback=WARN",
                    name,
                    operator,
                    raw_level
                );
                WarningLevel::Warn
            }),
        };

        Ok(Self {
            name: name.to_string(),
            target,
            operator,
            crit_threshold,
            warn_threshold,
            crit_message: raw.crit_message,
            warn_message: raw.warn_message,
            ok_message: raw.ok_message,
            level_if_not_found,
            message_if_not_found: raw.message_if_not_found,
        })
    }
}

fn parse_threshold(check: &str, field: &str, raw: &RawThreshold) -> Result<f64, ConfigError> {
    let value = match raw {
        RawThreshold::Integer(value) => *value as f64,
        RawThreshold::Float(value) => *value,
        RawThreshold::Text(text) => text.trim().parse::<f64>().map_err(|_| {
            ConfigError::check(check, format!("{field} is not a number: {text:?}"))
        })?,
    };

    if !value.is_finite() {
        return Err(ConfigError::check(check, format!("{field} must be finite")));
    }
    Ok(value)
}

/// Declares which aggregated metric names belong to a service.
#[derive(Debug, Clone)]
pub struct ServiceRoute {
    pub service_name: String,
    pub metric_pattern: Regex,
}

/// The compiled rules and service routes of one configuration load.
///
/// Immutable once built; a reload builds a new set and swaps it in whole.
#[derive(Debug, Clone, Default)]
pub struct CheckSet {
    pub rules: Vec<Rule>,
    pub routes: Vec<ServiceRoute>,
}

impl CheckSet {
    /// Compiles every check and route, keeping declaration order.
    ///
    /// Entries that fail are left out and returned alongside the set.
    pub fn from_config(config: &Config) -> (Self, Vec<ConfigError>) {
        let mut rejected = Vec::new();
        let mut rules = Vec::with_capacity(config.checks.len());

        for (name, value) in &config.checks {
            let compiled = value
                .clone()
                .try_into::<RawCheck>()
                .map_err(|error| ConfigError::check(name, error.to_string()))
                .and_then(|raw| Rule::compile(name, raw));

            match compiled {
                Ok(rule) => rules.push(rule),
                Err(error) => rejected.push(error),
            }
        }

        let mut routes = Vec::with_capacity(config.services.len());
        for (service_name, value) in &config.services {
            let Some(pattern) = value.as_str() else {
                rejected.push(ConfigError::service(service_name, "pattern must be a string"));
                continue;
            };

            match Regex::new(pattern) {
                Ok(metric_pattern) => routes.push(ServiceRoute {
                    service_name: service_name.clone(),
                    metric_pattern,
                }),
                Err(error) => rejected.push(ConfigError::service(
                    service_name,
                    format!("invalid pattern: {error}"),
                )),
            }
        }

        (Self { rules, routes }, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::{CheckSet, CompareOp, MetricTarget};
    use crate::config::{ConfigError, parse_config};
    use crate::health::level::WarningLevel;

    #[test]
    fn parses_all_operators() {
        assert_eq!(">".parse::<CompareOp>(), Ok(CompareOp::GreaterThan));
        assert_eq!(" <= ".parse::<CompareOp>(), Ok(CompareOp::LessEqual));
        assert_eq!("==".parse::<CompareOp>(), Ok(CompareOp::Equal));
        assert!("=>".parse::<CompareOp>().is_err());
    }

    #[test]
    fn operator_displays_as_configured_symbol() {
        for symbol in [">", "<", ">=", "<=", "=="] {
            let operator: CompareOp = symbol.parse().expect("known operator");
            assert_eq!(operator.to_string(), symbol);
        }
    }

    #[test]
    fn bad_check_is_rejected_without_dropping_the_rest() {
        let config = parse_config(
            r#"
[checks.first]
metric-name = "Seconds_Behind_Master"
check = ">"
crit-threshold = 300
warn-threshold = 60

[checks.broken_operator]
metric-name = "Threads_running"
check = "=>"
crit-threshold = 1
warn-threshold = 2

[checks.broken_threshold]
metric-name = "Threads_connected"
check = ">"
crit-threshold = "lots"
warn-threshold = 2

[checks.last]
metric-type = "ActiveLongRunQueries"
check = ">="
crit-threshold = "10.5"
warn-threshold = 5
level-if-not-found = "unknown"
"#,
        )
        .expect("config should parse");

        let (set, rejected) = CheckSet::from_config(&config);

        let names: Vec<&str> = set.rules.iter().map(|rule| rule.name.as_str()).collect();
        assert_eq!(names, vec!["first", "last"]);
        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().all(|error| matches!(error, ConfigError::Check { .. })));
        assert!(rejected[0].to_string().contains("broken_operator"));
        assert!(rejected[1].to_string().contains("broken_threshold"));

        let last = &set.rules[1];
        assert!((last.crit_threshold - 10.5).abs() < f64::EPSILON);
        assert_eq!(last.level_if_not_found, WarningLevel::Unknown);
        assert!(matches!(last.target, MetricTarget::Pattern(_)));
    }

    #[test]
    fn not_found_policy_defaults() {
        let config = parse_config(
            r#"
[checks.defaults]
metric-name = "Uptime"
check = "<"
crit-threshold = 60
warn-threshold = 600

[checks.garbage_level]
metric-name = "Uptime_since_flush"
check = "<"
crit-threshold = 60
warn-threshold = 600
level-if-not-found = "sometimes"
"#,
        )
        .expect("config should parse");

        let (set, rejected) = CheckSet::from_config(&config);
        assert!(rejected.is_empty());
        for rule in &set.rules {
            assert_eq!(rule.level_if_not_found, WarningLevel::Warn);
            assert_eq!(rule.message_if_not_found, "metric not collected");
        }
    }

    #[test]
    fn pattern_wins_over_exact_name() {
        let config = parse_config(
            r#"
[checks.both]
metric-name = "exact"
metric-type = "^table_.*"
check = ">"
crit-threshold = 2
warn-threshold = 1
"#,
        )
        .expect("config should parse");

        let (set, _) = CheckSet::from_config(&config);
        match &set.rules[0].target {
            MetricTarget::Pattern(regex) => assert_eq!(regex.as_str(), "^table_.*"),
            MetricTarget::Exact(name) => panic!("expected pattern target, got exact {name}"),
        }
    }

    #[test]
    fn check_without_target_is_rejected() {
        let config = parse_config(
            r#"
[checks.orphan]
check = ">"
crit-threshold = 2
warn-threshold = 1
"#,
        )
        .expect("config should parse");

        let (set, rejected) = CheckSet::from_config(&config);
        assert!(set.rules.is_empty());
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn invalid_service_pattern_is_rejected_alone() {
        let config = parse_config(
            r#"
[services]
"mysql.ok" = "^ok"
"mysql.bad" = "(unclosed"
"mysql.number" = 5
"#,
        )
        .expect("config should parse");

        let (set, rejected) = CheckSet::from_config(&config);
        assert_eq!(set.routes.len(), 1);
        assert_eq!(set.routes[0].service_name, "mysql.ok");
        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().all(|error| matches!(error, ConfigError::Service { .. })));
    }
}
