use chrono::{DateTime, Utc};
use tokio::time::{Duration, timeout};

use super::{
    aggregate::LevelAggregate,
    emitter::{PassiveCheck, PassiveCheckEmitter},
    formatter::{ServiceReport, format_service},
    level::WarningLevel,
    provider::{CollectionError, SnapshotSource},
    router::MetricRouter,
    rule::CheckSet,
};

#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub hostname: String,
    pub snapshot_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub snapshot_size: usize,
    pub evaluated: usize,
    pub skipped: usize,
    pub services: Vec<ServiceReport>,
    pub emit_failures: usize,
}

impl CycleReport {
    pub fn services_at(&self, level: WarningLevel) -> usize {
        self.services
            .iter()
            .filter(|service| service.level == level)
            .count()
    }
}

/// Owns the cycle-scoped state: the level buckets and the set of metrics
/// already evaluated. Both are cleared at the start of every cycle.
#[derive(Debug, Default)]
pub struct CheckEngine {
    aggregate: LevelAggregate,
    router: MetricRouter,
}

impl CheckEngine {
    pub fn aggregate(&self) -> &LevelAggregate {
        &self.aggregate
    }

    fn reset(&mut self) {
        self.aggregate.reset();
        self.router.reset();
    }

    /// Runs one check cycle: snapshot, evaluate, format, emit.
    ///
    /// A snapshot failure aborts the cycle before anything is evaluated or
    /// emitted. Failures local to one metric or one service are logged and
    /// the cycle carries on.
    pub async fn run_cycle<S, E>(
        &mut self,
        checks: &CheckSet,
        settings: &CycleSettings,
        source: &mut S,
        emitter: &mut E,
    ) -> Result<CycleReport, CollectionError>
    where
        S: SnapshotSource,
        E: PassiveCheckEmitter,
    {
        self.reset();
        let started_at = Utc::now();

        let snapshot = timeout(settings.snapshot_timeout, source.fetch_snapshot())
            .await
            .map_err(|_| CollectionError::Timeout {
                timeout_secs: settings.snapshot_timeout.as_secs(),
            })??;

        if snapshot.is_empty() {
            log::warn!("snapshot_empty rules={}", checks.rules.len());
        }

        let stats = self
            .router
            .route(&checks.rules, &snapshot, &mut self.aggregate);

        let mut services = Vec::with_capacity(checks.routes.len());
        let mut emit_failures = 0;
        for route in &checks.routes {
            let report = format_service(&self.aggregate, route);
            let check = PassiveCheck {
                hostname: settings.hostname.clone(),
                service_name: report.service_name.clone(),
                level: report.level,
                message: report.message.clone(),
            };

            if let Err(error) = emitter.emit(&check).await {
                emit_failures += 1;
                log::error!(
                    "passive_check_failed service={} level={} error={}",
                    check.service_name,
                    check.level,
                    error
                );
            }
            services.push(report);
        }

        Ok(CycleReport {
            started_at,
            snapshot_size: snapshot.len(),
            evaluated: stats.evaluated,
            skipped: stats.skipped,
            services,
            emit_failures,
        })
    }
}
