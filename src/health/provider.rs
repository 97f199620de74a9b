use std::time::Duration;

use thiserror::Error;

use super::snapshot::{MetricRecord, MetricSnapshot};

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("metrics request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("metrics endpoint {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("metrics payload from {url} could not be decoded: {source}")]
    Decode { url: String, source: reqwest::Error },
    #[error("metrics collection timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[cfg(test)]
    #[error("mock snapshots exhausted")]
    MockExhausted,
}

/// Produces one metric snapshot per check cycle.
pub trait SnapshotSource {
    async fn fetch_snapshot(&mut self) -> Result<MetricSnapshot, CollectionError>;
}

/// Reads the JSON metrics export of a running inspector.
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(hostport: &str, metrics_path: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("http://{}{}", hostport, metrics_path),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_snapshot(&mut self) -> Result<MetricSnapshot, CollectionError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| CollectionError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectionError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let records = response
            .json::<Vec<MetricRecord>>()
            .await
            .map_err(|source| CollectionError::Decode {
                url: self.url.clone(),
                source,
            })?;

        Ok(MetricSnapshot::from_records(records))
    }
}

#[cfg(test)]
pub(crate) struct MockSnapshotSource {
    sequence: Vec<Option<MetricSnapshot>>,
}

#[cfg(test)]
impl MockSnapshotSource {
    /// `None` entries simulate a failed collection.
    pub(crate) fn new(sequence: Vec<Option<MetricSnapshot>>) -> Self {
        Self { sequence }
    }
}

#[cfg(test)]
impl SnapshotSource for MockSnapshotSource {
    async fn fetch_snapshot(&mut self) -> Result<MetricSnapshot, CollectionError> {
        if self.sequence.is_empty() {
            return Err(CollectionError::MockExhausted);
        }

        self.sequence.remove(0).ok_or(CollectionError::MockExhausted)
    }
}
