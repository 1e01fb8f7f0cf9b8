/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::release
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Fetch version metadata from a FlexGet daemon and the newest
    published release from the package index, and classify the
    running build against it.

  Security / Safety Notes:
    Performs read-only HTTP(S) GET requests. No credentials are
    transmitted.

  Dependencies:
    reqwest for HTTP, serde for response parsing, urlencoding
    for the package path segment.

  Operational Scope:
    Backs the `getVersion` capability wired by the binary; the
    store and view never call it directly.

  Revision History:
    2025-11-12 COD  Adapted retrying HTTP client for version fetches.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Retry with exponential backoff on non-success statuses
    - Structured response parsing with explicit error paths
    - Configurable timeouts
============================================================*/

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::sleep;
use urlencoding::encode;

use crate::config::{ReleaseConfig, ServerConfig};
use crate::error::{FlexverError, Result};
use crate::store::{Action, VersionPayload};

const SERVER_VERSION_PATH: &str = "/api/server/version/";

/// Client for the daemon version endpoint and the release index.
#[derive(Clone)]
pub struct ReleaseClient {
    client: reqwest::Client,
    server_url: Option<String>,
    release_url: String,
    max_retries: usize,
    release_timeout: Duration,
}

impl ReleaseClient {
    /// Construct a new client from configuration.
    pub fn new(server: &ServerConfig, release: &ReleaseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(server.timeout))
            .user_agent(concat!("FlexVer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| FlexverError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            server_url: server
                .base_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_string()),
            release_url: format!(
                "{}/{}/json",
                release.pypi_url.trim_end_matches('/'),
                encode(&release.package)
            ),
            max_retries: server.max_retries.max(1),
            release_timeout: Duration::from_secs(release.timeout),
        })
    }

    /// Whether a daemon endpoint is configured.
    pub fn has_server(&self) -> bool {
        self.server_url.is_some()
    }

    pub fn server_version_url(&self) -> Option<String> {
        self.server_url
            .as_ref()
            .map(|base| format!("{base}{SERVER_VERSION_PATH}"))
    }

    pub fn release_url(&self) -> &str {
        &self.release_url
    }

    /// Query the daemon and wrap its answer in a `GET_VERSION` action.
    pub async fn fetch_server_version(&self) -> Result<Action> {
        let url = self
            .server_version_url()
            .ok_or_else(|| FlexverError::Config("No FlexGet server configured".into()))?;
        let payload: VersionPayload = self.get_json(&url, None).await?;
        Ok(Action::VersionReceived(payload))
    }

    /// Newest version published on the package index.
    pub async fn fetch_latest_release(&self) -> Result<String> {
        let page: PypiPage = self
            .get_json(self.release_url(), Some(self.release_timeout))
            .await?;
        let version = page.info.version.trim().to_string();
        if version.is_empty() {
            return Err(FlexverError::Serialization(format!(
                "Release index {} returned an empty version",
                self.release_url
            )));
        }
        Ok(version)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            let mut request = self.client.get(url);
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }
            let response = request
                .send()
                .await
                .map_err(|err| FlexverError::Network(format!("Request to {url} failed: {err}")))?;

            if response.status() == StatusCode::OK {
                return response.json::<T>().await.map_err(|err| {
                    FlexverError::Serialization(format!("Failed to decode response from {url}: {err}"))
                });
            }

            attempt += 1;
            if attempt >= self.max_retries {
                return Err(FlexverError::Network(format!(
                    "Request {url} failed with status {} after {attempt} attempts",
                    response.status()
                )));
            }
            sleep(backoff_delay(attempt)).await;
        }
    }
}

#[derive(Debug, Deserialize)]
struct PypiPage {
    info: PypiInfo,
}

#[derive(Debug, Deserialize)]
struct PypiInfo {
    #[serde(default)]
    version: String,
}

fn backoff_delay(attempt: usize) -> Duration {
    let exponent = (attempt as u32).min(8);
    Duration::from_millis(200_u64.saturating_mul(1_u64 << exponent))
}

/// Outcome of comparing the running build with the newest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseStatus {
    UpToDate,
    Behind(String),
    Unknown,
}

/// Classify `current` against `latest` by exact string match.
pub fn check_release(current: &str, latest: Option<&str>) -> ReleaseStatus {
    match latest.map(str::trim).filter(|latest| !latest.is_empty()) {
        None => ReleaseStatus::Unknown,
        Some(latest) if latest == current.trim() => ReleaseStatus::UpToDate,
        Some(latest) => ReleaseStatus::Behind(latest.to_string()),
    }
}

/// Operator-facing message for a [`ReleaseStatus`].
pub struct ReleaseReport<'a> {
    pub status: &'a ReleaseStatus,
    pub release_page: &'a str,
}

impl fmt::Display for ReleaseReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            ReleaseStatus::UpToDate => write!(f, "You are on the latest release."),
            ReleaseStatus::Behind(latest) => write!(f, "Latest release: {latest}"),
            ReleaseStatus::Unknown => write!(
                f,
                "Error getting latest version number from {}",
                self.release_page
            ),
        }
    }
}
