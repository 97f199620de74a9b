use std::path::Path;

use notify::{Config as NotifyConfig, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::app_context::AppContext;
use crate::config::RuntimeConfig;
use crate::health::CheckSet;

#[derive(Debug, Clone)]
pub(crate) struct ReloadSummary {
    pub(crate) rules: usize,
    pub(crate) services: usize,
    pub(crate) rejected: usize,
    pub(crate) runtime_config: RuntimeConfig,
}

/// Reloads the config file and swaps in the new rule set.
///
/// An unreadable or invalid file leaves the running set untouched, and so
/// does a file with no usable checks while checks are active. Entries
/// rejected individually are logged and the rest of the file still applies.
async fn apply_reload_from_path(
    app_context: &AppContext,
    config_path: &str,
) -> Result<ReloadSummary, String> {
    let new_config = app_context
        .overrides
        .load(config_path)
        .map_err(|error| error.to_string())?;
    let (checks, rejected) = CheckSet::from_config(&new_config);
    for error in &rejected {
        log::warn!("config_entry_rejected source=hot_reload error={}", error);
    }

    // An editor truncating the file before writing it fires a change event
    // for the empty file.
    let current_rules = app_context.current_checks().await.rules.len();
    if checks.rules.is_empty() && current_rules > 0 {
        return Err(format!(
            "reload yields no checks, keeping the {} active checks",
            current_rules
        ));
    }

    let summary = ReloadSummary {
        rules: checks.rules.len(),
        services: checks.routes.len(),
        rejected: rejected.len(),
        runtime_config: RuntimeConfig::from_config(&new_config),
    };
    app_context
        .replace_checks(checks, summary.runtime_config.clone())
        .await;
    Ok(summary)
}

pub(super) fn start_config_hot_reload_job(app_context: AppContext) {
    tokio::spawn(async move {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let config_path = app_context.config_path.clone();
        let mut watcher = match RecommendedWatcher::new(
            move |result| {
                let _ = tx.send(result);
            },
            NotifyConfig::default(),
        ) {
            Ok(watcher) => watcher,
            Err(error) => {
                log::warn!("config hot-reload disabled: watcher init failed: {}", error);
                return;
            }
        };

        if let Err(error) =
            watcher.watch(Path::new(config_path.as_str()), RecursiveMode::NonRecursive)
        {
            log::warn!(
                "config hot-reload disabled: failed to watch {}: {}",
                config_path,
                error
            );
            return;
        }

        while let Some(event_result) = rx.recv().await {
            let event = match event_result {
                Ok(event) => event,
                Err(error) => {
                    log::warn!("config hot-reload event error: {}", error);
                    continue;
                }
            };

            let should_reload = matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
            );
            if !should_reload {
                continue;
            }

            match apply_reload_from_path(&app_context, config_path.as_str()).await {
                Ok(summary) => {
                    log::info!(
                        "config_hot_reload_applied rules={} services={} rejected={} check_interval_secs={} snapshot_timeout_secs={}",
                        summary.rules,
                        summary.services,
                        summary.rejected,
                        summary.runtime_config.check_interval_secs,
                        summary.runtime_config.snapshot_timeout_secs,
                    );
                }
                Err(error) => {
                    log::warn!("config hot-reload ignored invalid config: {}", error);
                }
            }
        }
    });
}
