use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{Config, ConfigError, load_config};

/// Threshold checks over a metrics export, submitted as Nagios passive checks
#[derive(Debug, Parser)]
#[clap(name = "health-check", version, about)]
pub struct Cli {
    /// Configuration file with checks and service routes
    #[clap(short = 'c', long = "conf", env = "HEALTH_CHECK_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// host:port of the metrics export, overrides `hostport`
    #[clap(long)]
    pub hostport: Option<String>,

    /// Seconds between check cycles, overrides `check_interval_secs`
    #[clap(long)]
    pub step: Option<u64>,

    /// Submit through send_nsca to this Nagios server
    #[clap(long)]
    pub nagios_server: Option<String>,

    /// Run a single cycle, print the results and exit
    #[clap(long)]
    pub once: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            hostport: self.hostport.clone(),
            step: self.step,
            nagios_server: self.nagios_server.clone(),
        }
    }
}

/// Command-line values that win over the config file, reapplied on reload.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub hostport: Option<String>,
    pub step: Option<u64>,
    pub nagios_server: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(hostport) = &self.hostport {
            config.hostport = hostport.clone();
        }
        if let Some(step) = self.step {
            config.check_interval_secs = step;
        }
        if let Some(server) = &self.nagios_server {
            config.nsca.server = server.clone();
            config.nsca.enabled = true;
        }
    }

    /// Loads `path`, applies the overrides and validates the result.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let mut config = load_config(path)?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}
