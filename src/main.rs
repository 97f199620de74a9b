mod app_context;
mod cli;
mod config;
mod health;
mod jobs;

use clap::Parser;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::app_context::AppContext;
use crate::cli::Cli;
use crate::health::{
    ActiveEmitter, CheckEngine, CheckSet, CycleReport, HttpSnapshotSource, LevelAggregate,
    WarningLevel,
};
use crate::jobs::{run_check_once, start_background_jobs};

fn init_json_logging() {
    if let Err(error) = tracing_log::LogTracer::init() {
        eprintln!(
            "logging bridge initialization failed (continuing with existing logger): {}",
            error
        );
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .finish();

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("global logger initialization failed: {}", error);
    }
}

fn print_cycle(aggregate: &LevelAggregate, report: &CycleReport) {
    if aggregate.is_empty() {
        println!("no metrics evaluated");
    }
    for level in WarningLevel::PRECEDENCE {
        if let Some(bucket) = aggregate.bucket(level) {
            for entry in bucket.values() {
                println!("{:<7} {}", level, entry);
            }
        }
    }
    println!();
    for service in &report.services {
        println!("{} {} {}", service.service_name, service.level, service.message);
    }
}

// Main
#[tokio::main]
async fn main() {
    init_json_logging();

    let cli = Cli::parse();
    let overrides = cli.overrides();
    let config = match overrides.load(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            log::error!("Configuration error: {}", error);
            return;
        }
    };

    let (checks, rejected) = CheckSet::from_config(&config);
    for error in &rejected {
        log::warn!("config_entry_rejected source=startup error={}", error);
    }
    if checks.rules.is_empty() {
        log::warn!("no_checks_configured path={}", cli.config.display());
    }

    let source = match HttpSnapshotSource::new(
        &config.hostport,
        &config.metrics_path,
        Duration::from_secs(config.snapshot_timeout_secs),
    ) {
        Ok(source) => source,
        Err(error) => {
            log::error!("snapshot client initialization failed: {}", error);
            return;
        }
    };
    let emitter = ActiveEmitter::from_config(&config.nsca);

    let nsca_enabled = config.nsca.enabled;
    let rules = checks.rules.len();
    let services = checks.routes.len();
    let app_context = AppContext::new(
        config,
        checks,
        cli.config.to_string_lossy().to_string(),
        overrides,
    );

    log::info!(
        "health_check_starting url={} rules={} services={} nsca_enabled={} hostname={}",
        source.url(),
        rules,
        services,
        nsca_enabled,
        app_context.hostname
    );

    if cli.once {
        let mut engine = CheckEngine::default();
        let mut source = source;
        let mut emitter = emitter;
        if let Some(report) =
            run_check_once(&app_context, &mut engine, &mut source, &mut emitter).await
        {
            print_cycle(engine.aggregate(), &report);
        }
        return;
    }

    start_background_jobs(app_context, source, emitter);

    if let Err(error) = tokio::signal::ctrl_c().await {
        log::error!("shutdown signal listener failed: {}", error);
    }
    log::info!("health_check_stopping");
}
