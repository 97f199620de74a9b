use std::process::Stdio;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

use crate::config::Nsca;

use super::level::WarningLevel;

/// send_nsca drops plugin output beyond this many bytes.
const MAX_PLUGIN_OUTPUT_BYTES: usize = 511;

/// One passive check result for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassiveCheck {
    pub hostname: String,
    pub service_name: String,
    pub level: WarningLevel,
    pub message: String,
}

impl PassiveCheck {
    /// `host<TAB>service<TAB>code<TAB>output` as read by send_nsca.
    pub fn to_nsca_line(&self, unknown_code: u8) -> String {
        let output = sanitize_plugin_output(&self.message);
        format!(
            "{}\t{}\t{}\t{}\n",
            self.hostname,
            self.service_name,
            self.level.nagios_code(unknown_code),
            truncate_to_char_boundary(&output, MAX_PLUGIN_OUTPUT_BYTES)
        )
    }
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },
    #[error("failed to write check to {binary}: {source}")]
    Write {
        binary: String,
        source: std::io::Error,
    },
    #[error("{binary} timed out after {timeout_secs}s")]
    Timeout { binary: String, timeout_secs: u64 },
    #[error("{binary} exited with status {status}: {stderr}")]
    Failed {
        binary: String,
        status: i32,
        stderr: String,
    },
}

/// Hands finished service results to the monitoring system.
pub trait PassiveCheckEmitter {
    async fn emit(&mut self, check: &PassiveCheck) -> Result<(), EmitError>;
}

/// Submits checks by piping them through the `send_nsca` client.
pub struct SendNscaEmitter {
    binary_path: String,
    server: String,
    config_path: String,
    timeout_secs: u64,
    unknown_code: u8,
}

impl SendNscaEmitter {
    pub fn from_config(nsca: &Nsca) -> Self {
        Self {
            binary_path: nsca.binary_path.clone(),
            server: nsca.server.clone(),
            config_path: nsca.config_path.clone(),
            timeout_secs: nsca.timeout_secs,
            unknown_code: nsca.unknown_code,
        }
    }

    async fn submit(&self, line: &str) -> Result<(), EmitError> {
        let mut child = Command::new(&self.binary_path)
            .args(["-H", self.server.as_str(), "-c", self.config_path.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EmitError::Spawn {
                binary: self.binary_path.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(line.as_bytes())
                .await
                .map_err(|source| EmitError::Write {
                    binary: self.binary_path.clone(),
                    source,
                })?;
            // dropping stdin closes the pipe so send_nsca sees EOF
        }

        let output = child.wait_with_output().await.map_err(|source| EmitError::Write {
            binary: self.binary_path.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(EmitError::Failed {
                binary: self.binary_path.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

impl PassiveCheckEmitter for SendNscaEmitter {
    async fn emit(&mut self, check: &PassiveCheck) -> Result<(), EmitError> {
        let line = check.to_nsca_line(self.unknown_code);
        timeout(Duration::from_secs(self.timeout_secs), self.submit(&line))
            .await
            .map_err(|_| EmitError::Timeout {
                binary: self.binary_path.clone(),
                timeout_secs: self.timeout_secs,
            })?
    }
}

/// Writes checks to the log instead of submitting them.
pub struct LogEmitter {
    unknown_code: u8,
}

impl LogEmitter {
    pub fn new(unknown_code: u8) -> Self {
        Self { unknown_code }
    }
}

impl PassiveCheckEmitter for LogEmitter {
    async fn emit(&mut self, check: &PassiveCheck) -> Result<(), EmitError> {
        log::info!(
            "passive_check host={} service={} level={} code={} message={:?}",
            check.hostname,
            check.service_name,
            check.level,
            check.level.nagios_code(self.unknown_code),
            check.message
        );
        Ok(())
    }
}

pub enum ActiveEmitter {
    Nsca(SendNscaEmitter),
    Log(LogEmitter),
}

impl ActiveEmitter {
    pub fn from_config(nsca: &Nsca) -> Self {
        if nsca.enabled {
            Self::Nsca(SendNscaEmitter::from_config(nsca))
        } else {
            Self::Log(LogEmitter::new(nsca.unknown_code))
        }
    }
}

impl PassiveCheckEmitter for ActiveEmitter {
    async fn emit(&mut self, check: &PassiveCheck) -> Result<(), EmitError> {
        match self {
            ActiveEmitter::Nsca(emitter) => emitter.emit(check).await,
            ActiveEmitter::Log(emitter) => emitter.emit(check).await,
        }
    }
}

fn sanitize_plugin_output(message: &str) -> String {
    message
        .chars()
        .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> &str {
    if input.len() <= max_bytes {
        return input;
    }

    let mut end = max_bytes;
    while !input.is_char_boundary(end) {
        end -= 1;
    }

    &input[..end]
}

#[cfg(test)]
pub(crate) struct MockEmitter {
    pub(crate) sent: Vec<PassiveCheck>,
    pub(crate) fail_services: Vec<String>,
}

#[cfg(test)]
impl MockEmitter {
    pub(crate) fn new() -> Self {
        Self {
            sent: Vec::new(),
            fail_services: Vec::new(),
        }
    }
}

#[cfg(test)]
impl PassiveCheckEmitter for MockEmitter {
    async fn emit(&mut self, check: &PassiveCheck) -> Result<(), EmitError> {
        if self.fail_services.contains(&check.service_name) {
            return Err(EmitError::Failed {
                binary: "mock".to_string(),
                status: 2,
                stderr: "rejected".to_string(),
            });
        }
        self.sent.push(check.clone());
        Ok(())
    }
}
