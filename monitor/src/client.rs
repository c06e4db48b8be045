use crate::types::StatusSnapshot;
use futures::future::BoxFuture;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const STATUS_PATH: &str = "/api/trading/status";

/// Why a status fetch produced no snapshot. Only used for diagnostics;
/// callers of [`StatusSource::fetch_status`] see a single `Unavailable`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("backend returned {0}")]
    Protocol(StatusCode),
    #[error("malformed status payload: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Outcome of one poll attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Snapshot(StatusSnapshot),
    Unavailable,
}

/// Anything the dashboard can poll for a status snapshot.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch_status(&self) -> BoxFuture<'_, Fetched>;
}

/// HTTP client for the trading backend status endpoint
pub struct StatusClient {
    url: String,
    client: reqwest::Client,
}

impl StatusClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            url: format!("{}{}", base_url.trim_end_matches('/'), STATUS_PATH),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("HTTP client"),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Single request, no retry. Classifies the failure.
    pub async fn try_fetch(&self) -> Result<StatusSnapshot, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Protocol(status));
        }

        // Body read failures are transport errors; only bad JSON is Decode
        let body = resp.bytes().await.map_err(FetchError::Transport)?;
        let snapshot: StatusSnapshot = serde_json::from_slice(&body).map_err(FetchError::Decode)?;

        debug!(
            "Status: login={} equity={:.2} progress={:.2}%/{:.2}% connected={} mock={}",
            snapshot.account.login,
            snapshot.account.equity,
            snapshot.progress.daily_profit_pct,
            snapshot.progress.target_pct,
            snapshot.connected,
            snapshot.mock_mode,
        );
        Ok(snapshot)
    }
}

impl StatusSource for StatusClient {
    fn fetch_status(&self) -> BoxFuture<'_, Fetched> {
        Box::pin(async move {
            match self.try_fetch().await {
                Ok(snapshot) => Fetched::Snapshot(snapshot),
                Err(e) => {
                    warn!("Error fetching status from {}: {e}", self.url);
                    Fetched::Unavailable
                }
            }
        })
    }
}
