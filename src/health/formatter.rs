use super::{aggregate::LevelAggregate, level::WarningLevel, rule::ServiceRoute};

const ENTRY_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReport {
    pub service_name: String,
    pub level: WarningLevel,
    pub message: String,
}

/// Builds the report for one service from the cycle's buckets.
///
/// Buckets are scanned most severe first and the first bucket holding any
/// metric matched by the route decides both the level and the message, so
/// one CRIT entry hides every WARN and OK entry of the same service. A
/// route matching nothing reports OK with an empty message.
pub fn format_service(aggregate: &LevelAggregate, route: &ServiceRoute) -> ServiceReport {
    for level in WarningLevel::PRECEDENCE {
        let Some(bucket) = aggregate.bucket(level) else {
            continue;
        };

        let matched: Vec<&str> = bucket
            .iter()
            .filter(|(metric, _)| route.metric_pattern.is_match(metric))
            .map(|(_, message)| message.as_str())
            .collect();

        if !matched.is_empty() {
            return ServiceReport {
                service_name: route.service_name.clone(),
                level,
                message: matched.join(ENTRY_SEPARATOR),
            };
        }
    }

    ServiceReport {
        service_name: route.service_name.clone(),
        level: WarningLevel::Ok,
        message: String::new(),
    }
}
