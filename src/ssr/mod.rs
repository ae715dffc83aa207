//! Server-side prefetch and injection of hydration data into the SPA shell.
//!
//! For an authenticated request whose path matches a prefetch rule, the [`Pipeline`]
//! fetches the implied data (peer bot endpoints, container state) concurrently under a
//! shared deadline, keeps whatever succeeded, and splices it into the cached shell as an
//! inline script. Enrichment is best effort: any failure falls back to the plain shell.
mod cache;
mod error;
mod inject;
mod payload;
mod peer;
mod plan;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::value::RawValue;
use tokio::time::Instant;

use crate::docker::{Collector, ContainerRuntime, DockerRuntime};
use crate::error::ResultLogExt;

pub use cache::{EMBEDDED_SHELL, HtmlCache};
pub use error::{Error, PeerError, Result};
pub use inject::{
    GLOBAL_PROPERTY, SPLICE_MARKER, escape_for_script, hydration_script, inject_payload, splice,
};
pub use payload::{DockerStatus, SsrPayload};
pub use peer::{MEMBERS_ENDPOINT, PEER_TIMEOUT, PeerClient, SESSION_COOKIE, SETTINGS_ENDPOINT};
pub use plan::{Fetch, PrefetchPlan};

/// Budget for all fetches of one request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

type Slot = Option<Box<RawValue>>;

pub struct Pipeline<R = DockerRuntime> {
    cache: HtmlCache,
    collector: Option<Arc<Collector<R>>>,
    peer: PeerClient,
    request_timeout: Duration,
}

impl<R: ContainerRuntime> Pipeline<R> {
    pub fn new(collector: Option<Arc<Collector<R>>>, peer: PeerClient) -> Self {
        Self {
            cache: HtmlCache::new(),
            collector,
            peer,
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Overrides [`REQUEST_TIMEOUT`].
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn has_cache(&self) -> bool {
        self.cache.has_cache()
    }

    pub fn get_cache(&self) -> Option<Bytes> {
        self.cache.get()
    }

    pub fn load_cache_from_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        self.cache.load_from_disk(path)
    }

    pub fn load_cache_from_bytes(&self, document: impl Into<Bytes>) {
        self.cache.load_from_bytes(document)
    }

    /// Renders the shell for `path`.
    ///
    /// Returns `None` when no shell is loaded; the caller should then serve the raw
    /// static file. Unauthenticated requests and paths without a prefetch rule get the
    /// cached shell without any upstream call. Otherwise the shell carries whatever data
    /// could be fetched, or is returned unchanged if nothing could.
    ///
    /// Dropping the returned future aborts every in-flight fetch.
    pub async fn inject_for_path(
        &self,
        path: &str,
        is_authenticated: bool,
        token: Option<&str>,
    ) -> Option<Bytes> {
        let document = self.cache.get()?;
        if !is_authenticated {
            return Some(document);
        }

        let plan = PrefetchPlan::resolve(path);
        if plan.is_empty() {
            log::trace!("No prefetch rule for `{path}`");
            return Some(document);
        }

        let deadline = Instant::now() + self.request_timeout;
        let payload = self.collect(plan, token, deadline).await;
        if payload.is_empty() {
            log::debug!("Prefetch for `{path}` yielded no data");
            return Some(document);
        }

        match inject_payload(&document, &payload) {
            Ok(Some(rendered)) => Some(Bytes::from(rendered)),
            Ok(None) => {
                log::debug!("HTML shell has no splice point, serving it unchanged");
                Some(document)
            }
            Err(err) => {
                log::warn!("Failed to inject SSR payload for `{path}`: {err}");
                Some(document)
            }
        }
    }

    async fn collect(
        &self,
        plan: PrefetchPlan,
        token: Option<&str>,
        deadline: Instant,
    ) -> SsrPayload {
        let members = async {
            if !plan.includes(Fetch::Members) {
                return None;
            }
            within(deadline, "members", self.peer.fetch(MEMBERS_ENDPOINT, token)).await
        };
        let settings = async {
            if !plan.includes(Fetch::Settings) {
                return None;
            }
            within(deadline, "settings", self.peer.fetch(SETTINGS_ENDPOINT, token)).await
        };
        let docker = async {
            if !plan.includes(Fetch::Docker) {
                return (None, None);
            }
            self.fetch_docker(deadline).await
        };

        let (members, settings, (docker, containers)) = tokio::join!(members, settings, docker);
        SsrPayload {
            docker,
            containers,
            members,
            settings,
        }
    }

    /// Fetches availability and, only when available, the container list.
    async fn fetch_docker(&self, deadline: Instant) -> (Slot, Slot) {
        let Some(collector) = self.collector.as_deref() else {
            return (None, None);
        };

        let available = within(deadline, "docker availability", async {
            Some(collector.available().await)
        })
        .await
        .unwrap_or(false);
        if !available {
            log::debug!("Container runtime unavailable, omitting docker slots");
            return (None, None);
        }
        let docker = serde_json::value::to_raw_value(&DockerStatus { available: true })
            .ok_log(log::Level::Warn, "Failed to serialize docker status");

        let containers = within(deadline, "containers", async {
            collector
                .list_containers()
                .await
                .ok_log(log::Level::Warn, "Failed to list containers for prefetch")
        })
        .await
        .and_then(|containers| {
            serde_json::value::to_raw_value(&containers)
                .ok_log(log::Level::Warn, "Failed to serialize containers")
        });

        (docker, containers)
    }
}

/// Runs `fut` until `deadline`; running out of time counts as no data.
async fn within<T>(
    deadline: Instant,
    slot: &str,
    fut: impl Future<Output = Option<T>>,
) -> Option<T> {
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(value) => value,
        Err(_) => {
            log::debug!("Prefetch of `{slot}` exceeded the request budget");
            None
        }
    }
}
