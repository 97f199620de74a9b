use thiserror::Error;

use super::schema::Config;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Validation(String),
    #[error("check {name} rejected: {reason}")]
    Check { name: String, reason: String },
    #[error("service {name} rejected: {reason}")]
    Service { name: String, reason: String },
}

impl ConfigError {
    pub(crate) fn check(name: &str, reason: impl Into<String>) -> Self {
        Self::Check {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn service(name: &str, reason: impl Into<String>) -> Self {
        Self::Service {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hostport.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hostport must not be empty".to_string(),
            ));
        }
        if !self.metrics_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "metrics_path must start with '/'".to_string(),
            ));
        }
        if self.check_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "check_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.snapshot_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "snapshot_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(hostname) = &self.hostname
            && hostname.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "hostname must not be empty when set".to_string(),
            ));
        }
        if self.nsca.enabled && self.nsca.server.trim().is_empty() {
            return Err(ConfigError::Validation(
                "nsca.server must not be empty when nsca.enabled is true".to_string(),
            ));
        }
        if self.nsca.enabled && self.nsca.binary_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "nsca.binary_path must not be empty when nsca.enabled is true".to_string(),
            ));
        }
        if self.nsca.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "nsca.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.nsca.unknown_code > 3 {
            return Err(ConfigError::Validation(
                "nsca.unknown_code must be between 0 and 3".to_string(),
            ));
        }
        Ok(())
    }

    /// Host name reported with every passive check.
    pub fn resolved_hostname(&self) -> String {
        if let Some(hostname) = &self.hostname {
            return hostname.trim().to_string();
        }

        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "localhost".to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::io::parse_config;

    #[test]
    fn defaults_fill_an_empty_file() {
        let config = parse_config("").expect("empty config should parse");
        config.validate().expect("defaults should validate");

        assert_eq!(config.hostport, "localhost:12345");
        assert_eq!(config.metrics_path, "/api/v1/metrics.json");
        assert_eq!(config.check_interval_secs, 2);
        assert!(!config.nsca.enabled);
        assert_eq!(config.nsca.unknown_code, 3);
        assert!(config.checks.is_empty());
        assert_eq!(config.services.len(), 4);
        assert!(config.services.contains_key("mysql.slave"));
    }

    #[test]
    fn rejects_zero_interval() {
        let config = parse_config("check_interval_secs = 0").expect("config should parse");
        let error = config.validate().expect_err("zero interval should be rejected");
        assert!(error.to_string().contains("check_interval_secs"));
    }

    #[test]
    fn rejects_out_of_range_unknown_code() {
        let config = parse_config("[nsca]\nunknown_code = 7").expect("config should parse");
        let error = config.validate().expect_err("unknown code above 3 should be rejected");
        assert!(error.to_string().contains("nsca.unknown_code"));
    }

    #[test]
    fn configured_hostname_wins() {
        let config = parse_config("hostname = \" db-01 \"").expect("config should parse");
        assert_eq!(config.resolved_hostname(), "db-01");
    }

    #[test]
    fn explicit_services_replace_builtin_routes() {
        let config = parse_config("[services]\n\"pg.replication\" = \"^replication\"\n")
            .expect("config should parse");
        assert_eq!(config.services.len(), 1);
        assert!(config.services.contains_key("pg.replication"));
    }
}
