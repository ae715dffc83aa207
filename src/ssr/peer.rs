use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::COOKIE;
use serde_json::value::RawValue;

use super::error::PeerError;
use super::{Error, Result};
use crate::error::ResultLogExt;

/// Cookie the peer bot reads the admin session from.
pub const SESSION_COOKIE: &str = "admin_session";
pub const MEMBERS_ENDPOINT: &str = "/api/hololive/members";
pub const SETTINGS_ENDPOINT: &str = "/api/hololive/settings";
/// Client-side bound for a single peer request.
pub const PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches opaque JSON blobs from the peer bot service on behalf of a user.
#[derive(Debug, Clone)]
pub struct PeerClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl PeerClient {
    /// Creates a client for the bot at `base_url`. Without a base URL every fetch
    /// yields no data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HttpClient`] if the HTTP client cannot be built.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_timeout(base_url, PEER_TIMEOUT)
    }

    pub fn with_timeout(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::HttpClient)?;
        Ok(Self {
            http,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_owned()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// GETs `endpoint`, forwarding `token` as the session cookie.
    ///
    /// Any failure (missing base URL, transport error, non-200 status, unreadable or
    /// non-JSON body) yields `None`. No retries.
    pub async fn fetch(&self, endpoint: &str, token: Option<&str>) -> Option<Box<RawValue>> {
        let Some(base_url) = self.base_url.as_deref() else {
            log::trace!("No peer bot configured, skipping `{endpoint}`");
            return None;
        };
        let url = format!("{base_url}{endpoint}");
        self.try_fetch(url, token)
            .await
            .ok_log(log::Level::Debug, "Peer fetch yielded no data")
    }

    async fn try_fetch(
        &self,
        url: String,
        token: Option<&str>,
    ) -> std::result::Result<Box<RawValue>, PeerError> {
        let mut request = self.http.get(&url);
        if let Some(token) = token.filter(|token| !token.is_empty()) {
            request = request.header(COOKIE, format!("{SESSION_COOKIE}={token}"));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => return Err(PeerError::Transport { url, source }),
        };
        let status = response.status();
        if status != StatusCode::OK {
            return Err(PeerError::Status { url, status });
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(source) => return Err(PeerError::Body { url, source }),
        };

        RawValue::from_string(body).map_err(|source| PeerError::InvalidJson { url, source })
    }
}
