use tokio::time::Duration;

use crate::app_context::AppContext;
use crate::health::{
    ActiveEmitter, CheckEngine, CycleReport, CycleSettings, HttpSnapshotSource,
    PassiveCheckEmitter, SnapshotSource, WarningLevel,
};

use super::scheduler::Scheduler;

pub(super) fn start_check_job(
    app_context: AppContext,
    mut source: HttpSnapshotSource,
    mut emitter: ActiveEmitter,
) {
    tokio::spawn(async move {
        let mut engine = CheckEngine::default();

        loop {
            let runtime_config = app_context.runtime_config.read().await.clone();
            let mut scheduler =
                Scheduler::new(Duration::from_secs(runtime_config.check_interval_secs));
            log::info!(
                "check_loop_started interval_secs={} snapshot_timeout_secs={}",
                scheduler.period().as_secs(),
                runtime_config.snapshot_timeout_secs
            );

            loop {
                tokio::select! {
                    _ = scheduler.tick() => {}
                    _ = app_context.runtime_update_notify.notified() => {
                        log::info!(
                            "check_interval_change_applied previous_interval_secs={}",
                            runtime_config.check_interval_secs
                        );
                        break;
                    }
                }

                run_check_once(&app_context, &mut engine, &mut source, &mut emitter).await;
            }
        }
    });
}

/// Runs one cycle against the current rule set and logs its outcome.
///
/// Returns `None` when the snapshot could not be collected.
pub(crate) async fn run_check_once<S, E>(
    app_context: &AppContext,
    engine: &mut CheckEngine,
    source: &mut S,
    emitter: &mut E,
) -> Option<CycleReport>
where
    S: SnapshotSource,
    E: PassiveCheckEmitter,
{
    let checks = app_context.current_checks().await;
    let runtime_config = app_context.runtime_config.read().await.clone();
    let settings = CycleSettings {
        hostname: app_context.hostname.clone(),
        snapshot_timeout: Duration::from_secs(runtime_config.snapshot_timeout_secs),
    };

    match engine.run_cycle(&checks, &settings, source, emitter).await {
        Ok(report) => {
            tracing::info!(
                target: "health",
                module = "health",
                started_at = %report.started_at.to_rfc3339(),
                snapshot_size = report.snapshot_size,
                evaluated = report.evaluated,
                skipped = report.skipped,
                crit_metrics = engine.aggregate().count(WarningLevel::Crit),
                warn_metrics = engine.aggregate().count(WarningLevel::Warn),
                services = report.services.len(),
                crit_services = report.services_at(WarningLevel::Crit),
                warn_services = report.services_at(WarningLevel::Warn),
                unknown_services = report.services_at(WarningLevel::Unknown),
                emit_failures = report.emit_failures,
                "check_cycle_completed"
            );
            Some(report)
        }
        Err(error) => {
            log::warn!("check_cycle_aborted reason=collection_failed error={}", error);
            None
        }
    }
}
