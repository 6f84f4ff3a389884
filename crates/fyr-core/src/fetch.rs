//! Authenticated retrieval of the remote beacon list.
//!
//! The client performs exactly one GET per call: no retries, no caching, no
//! stale-data fallback. Retry policy belongs to whoever drives the cycle
//! (currently: nobody; each cycle is independent).

use std::sync::Arc;

use async_trait::async_trait;

use crate::beacon::{parse_beacon_list, Beacon};
use crate::error::{FyrError, Result};

/// Path of the account-scoped beacon list endpoint, relative to the API base.
pub const BEACONS_ENDPOINT_PATH: &str = "/fyr/api/beacons.json";

/// A raw HTTP response as seen by the fetch client.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Minimal HTTP transport the fetch client runs on. Hosts that cannot use
/// the built-in [`ReqwestTransport`] supply their own.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one GET with a bearer token. A non-success status is a
    /// normal response here, not an error; only connection-level failures
    /// map to [`FyrError::Network`].
    async fn get(&self, url: &str, bearer_token: &str) -> Result<HttpResponse>;
}

/// Fetches and validates the authoritative beacon list.
#[derive(Clone)]
pub struct BeaconClient {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl BeaconClient {
    /// Creates a client for the given API base URL (scheme + host, no
    /// trailing path).
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, api_base_url: &str) -> Self {
        Self {
            transport,
            endpoint: format!(
                "{}{BEACONS_ENDPOINT_PATH}",
                api_base_url.trim_end_matches('/')
            ),
        }
    }

    /// Performs one authenticated GET and returns the validated beacon
    /// list, possibly empty.
    ///
    /// The caller is responsible for withholding this call when no API key
    /// is present.
    ///
    /// # Errors
    ///
    /// [`FyrError::Transport`] on a non-success status,
    /// [`FyrError::Network`] when no response was produced at all, and
    /// [`FyrError::DataShape`] when the body fails schema validation. None
    /// of these may be papered over with stale data.
    pub async fn fetch_beacons(&self, api_key: &str) -> Result<Vec<Beacon>> {
        let response = self.transport.get(&self.endpoint, api_key).await?;

        if !response.is_success() {
            return Err(FyrError::Transport {
                status: response.status,
            });
        }

        parse_beacon_list(&response.body)
    }

    /// The fully resolved endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// [`HttpTransport`] backed by `reqwest`.
#[cfg(feature = "http")]
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl ReqwestTransport {
    /// Creates a transport with a default `reqwest` client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, bearer_token: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|err| FyrError::Network(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| FyrError::Network(err.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
