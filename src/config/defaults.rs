use super::schema::Nsca;

pub(super) fn default_hostport() -> String {
    "localhost:12345".to_string()
}

pub(super) fn default_metrics_path() -> String {
    "/api/v1/metrics.json".to_string()
}

pub(super) fn default_check_interval_secs() -> u64 {
    2
}

pub(super) fn default_snapshot_timeout_secs() -> u64 {
    5
}

pub(super) fn default_nsca_server() -> String {
    "system-nagios-internal".to_string()
}

pub(super) fn default_nsca_binary_path() -> String {
    "/usr/sbin/send_nsca".to_string()
}

pub(super) fn default_nsca_config_path() -> String {
    "/etc/nagios/send_nsca.cfg".to_string()
}

pub(super) fn default_nsca_timeout_secs() -> u64 {
    10
}

pub(super) fn default_nsca_unknown_code() -> u8 {
    3
}

pub(super) fn default_message_if_not_found() -> String {
    "metric not collected".to_string()
}

/// MySQL service routes used when the config has no `[services]` table.
pub(super) fn default_services() -> toml::Table {
    let mut services = toml::Table::new();
    for (service, pattern) in [
        ("mysql.slave", "^Slave.+$"),
        ("mysql.com", "^.*Com.+$"),
        ("mysql.sessions", "^(conn_max_pct|sess.+|loadavg.+)$"),
        (
            "mysql.long",
            "^.*(ActiveLongRunQueries|Oldest_query_s|innodb_history_link_list).*$",
        ),
    ] {
        services.insert(service.to_string(), toml::Value::String(pattern.to_string()));
    }
    services
}

impl Default for Nsca {
    fn default() -> Self {
        Self {
            enabled: false,
            server: default_nsca_server(),
            binary_path: default_nsca_binary_path(),
            config_path: default_nsca_config_path(),
            timeout_secs: default_nsca_timeout_secs(),
            unknown_code: default_nsca_unknown_code(),
        }
    }
}
