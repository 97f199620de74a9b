use std::sync::Arc;

use tokio::sync::{Notify, RwLock};

use crate::{
    cli::ConfigOverrides,
    config::{Config, RuntimeConfig},
    health::CheckSet,
};

#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub config_path: String,
    /// Host name sent with every passive check, resolved once at startup.
    pub hostname: String,
    pub overrides: ConfigOverrides,
    /// Current rule set. A cycle clones the inner `Arc` once and keeps it,
    /// so a reload only ever takes effect at the next cycle.
    pub checks: Arc<RwLock<Arc<CheckSet>>>,
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    pub runtime_update_notify: Arc<Notify>,
}

impl AppContext {
    pub fn new(
        config: Config,
        checks: CheckSet,
        config_path: impl Into<String>,
        overrides: ConfigOverrides,
    ) -> Self {
        let runtime_config = RuntimeConfig::from_config(&config);
        let hostname = config.resolved_hostname();
        Self {
            config,
            hostname,
            config_path: config_path.into(),
            overrides,
            checks: Arc::new(RwLock::new(Arc::new(checks))),
            runtime_config: Arc::new(RwLock::new(runtime_config)),
            runtime_update_notify: Arc::new(Notify::new()),
        }
    }

    pub async fn current_checks(&self) -> Arc<CheckSet> {
        self.checks.read().await.clone()
    }

    pub async fn replace_checks(&self, checks: CheckSet, runtime_config: RuntimeConfig) {
        *self.checks.write().await = Arc::new(checks);

        let interval_changed = {
            let mut current = self.runtime_config.write().await;
            let changed = current.check_interval_secs != runtime_config.check_interval_secs;
            *current = runtime_config;
            changed
        };

        if interval_changed {
            self.runtime_update_notify.notify_one();
        }
    }
}
