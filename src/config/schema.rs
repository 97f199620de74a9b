use serde::Deserialize;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_hostport")]
    pub hostport: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default = "default_check_interval_secs", alias = "step")]
    pub check_interval_secs: u64,
    #[serde(default = "default_snapshot_timeout_secs")]
    pub snapshot_timeout_secs: u64,
    #[serde(default)]
    pub nsca: Nsca,
    /// One table per check, in declaration order. Compiled into rules
    /// entry by entry so a single bad check cannot reject the file.
    #[serde(default)]
    pub checks: toml::Table,
    /// `service-name = "metric-regex"` pairs.
    #[serde(default = "default_services")]
    pub services: toml::Table,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub check_interval_secs: u64,
    pub snapshot_timeout_secs: u64,
}

impl RuntimeConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            check_interval_secs: config.check_interval_secs,
            snapshot_timeout_secs: config.snapshot_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Nsca {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_nsca_server")]
    pub server: String,
    #[serde(default = "default_nsca_binary_path")]
    pub binary_path: String,
    #[serde(default = "default_nsca_config_path")]
    pub config_path: String,
    #[serde(default = "default_nsca_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_nsca_unknown_code")]
    pub unknown_code: u8,
}

/// Raw form of one `[checks.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawCheck {
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default, alias = "metric-pattern")]
    pub metric_type: Option<String>,
    pub check: String,
    pub crit_threshold: RawThreshold,
    pub warn_threshold: RawThreshold,
    #[serde(default)]
    pub crit_message: String,
    #[serde(default)]
    pub warn_message: String,
    #[serde(default)]
    pub ok_message: String,
    #[serde(default)]
    pub level_if_not_found: Option<String>,
    #[serde(default = "default_message_if_not_found")]
    pub message_if_not_found: String,
}

/// Thresholds may be written as TOML numbers or as numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawThreshold {
    Integer(i64),
    Float(f64),
    Text(String),
}
