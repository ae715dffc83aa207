//! Container state collection against the container runtime API.
//!
//! The [`Collector`] answers three kinds of questions for the console:
//!
//! - Is the runtime reachable at all ([`Collector::available`])?
//! - Which platform containers exist right now ([`Collector::list_containers`])?
//! - Start, stop or restart one of them, or follow its logs.
//!
//! Every enumeration builds a fresh snapshot; nothing is cached between calls.
mod error;
mod filter;
mod models;
mod runtime;
#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use futures::StreamExt;

pub use error::{Error, Operation, Result};
pub use filter::FilterConfig;
pub use models::{ContainerState, ManagedContainer, NO_HEALTH};
pub use runtime::{
    ContainerRuntime, DockerRuntime, LogLine, LogStream, LogStreamOptions, RuntimeContainer,
};

/// Upper bound for a liveness ping.
pub const PING_TIMEOUT: Duration = Duration::from_secs(2);
/// Upper bound for listing all containers.
pub const LIST_TIMEOUT: Duration = Duration::from_secs(10);
/// Grace period requested from the runtime before it kills a stopping container.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(30);
/// Number of backlog lines sent before following a log stream.
pub const LOG_BACKLOG_LINES: usize = 100;
/// How long opening a log stream waits for the runtime's first answer.
pub const LOG_OPEN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub struct Collector<R = DockerRuntime> {
    runtime: R,
    filters: FilterConfig,
}

impl Collector<DockerRuntime> {
    /// Creates a collector for the local Docker daemon.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the Docker client cannot be configured.
    pub fn connect_local(filters: FilterConfig) -> Result<Self> {
        let runtime = DockerRuntime::connect_with_local_defaults().map_err(Error::Connect)?;
        Ok(Self::new(runtime, filters))
    }
}

impl<R: ContainerRuntime> Collector<R> {
    pub fn new(runtime: R, filters: FilterConfig) -> Self {
        Self { runtime, filters }
    }

    /// Pings the runtime. A failed or timed out ping means "unavailable", never an error.
    pub async fn available(&self) -> bool {
        match tokio::time::timeout(PING_TIMEOUT, self.runtime.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                log::debug!("Container runtime ping failed: {err}");
                false
            }
            Err(_) => {
                log::debug!("Container runtime ping timed out after {PING_TIMEOUT:?}");
                false
            }
        }
    }

    /// Lists all containers and keeps the managed ones, sorted by name.
    ///
    /// # Errors
    ///
    /// - [`Error::List`] if the runtime rejects the request.
    /// - [`Error::ListTimeout`] if the runtime does not answer within [`LIST_TIMEOUT`].
    pub async fn list_containers(&self) -> Result<Vec<ManagedContainer>> {
        let containers = tokio::time::timeout(LIST_TIMEOUT, self.runtime.list_all())
            .await
            .map_err(|_| Error::ListTimeout(LIST_TIMEOUT))?
            .map_err(Error::List)?;
        log::trace!("Runtime reported {} containers", containers.len());

        Ok(self.filters.classify(containers))
    }

    pub async fn start(&self, name: &str) -> Result<()> {
        log::info!("Starting container `{name}`");
        let result = self.runtime.start(name).await;
        finish(Operation::Start, name, result)
    }

    pub async fn stop(&self, name: &str) -> Result<()> {
        log::info!("Stopping container `{name}` (grace period {STOP_GRACE_PERIOD:?})");
        let result = self.runtime.stop(name, STOP_GRACE_PERIOD).await;
        finish(Operation::Stop, name, result)
    }

    pub async fn restart(&self, name: &str) -> Result<()> {
        log::info!("Restarting container `{name}` (grace period {STOP_GRACE_PERIOD:?})");
        let result = self.runtime.restart(name, STOP_GRACE_PERIOD).await;
        finish(Operation::Restart, name, result)
    }

    /// Follows stdout and stderr of a container, starting with the last
    /// [`LOG_BACKLOG_LINES`] lines.
    ///
    /// Waits up to [`LOG_OPEN_TIMEOUT`] for the first item so that a rejected request
    /// (e.g. an unknown container) surfaces here instead of inside the stream. A
    /// container that stays silent past that bound still yields an open stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Logs`] if the runtime rejects the request right away.
    pub async fn log_stream(&self, name: &str) -> Result<LogStream> {
        log::debug!("Opening log stream for container `{name}`");
        let mut stream = self.runtime.logs(
            name,
            LogStreamOptions {
                follow: true,
                timestamps: true,
                tail: LOG_BACKLOG_LINES,
            },
        );

        let first = tokio::time::timeout(LOG_OPEN_TIMEOUT, stream.next()).await;
        match first {
            Ok(Some(Ok(first))) => Ok(futures::stream::once(futures::future::ready(Ok(first)))
                .chain(stream)
                .boxed()),
            Ok(Some(Err(source))) => {
                log::warn!("Failed to open logs of container `{name}`: {source}");
                Err(Error::Logs {
                    name: name.to_owned(),
                    source,
                })
            }
            Ok(None) => Ok(futures::stream::empty().boxed()),
            Err(_) => Ok(stream),
        }
    }
}

fn finish(
    operation: Operation,
    name: &str,
    result: std::result::Result<(), bollard::errors::Error>,
) -> Result<()> {
    match result {
        Ok(()) => {
            log::info!("Container `{name}`: {operation} succeeded");
            Ok(())
        }
        Err(source) => {
            log::error!("Container `{name}`: {operation} failed: {source}");
            Err(Error::Lifecycle {
                operation,
                name: name.to_owned(),
                source,
            })
        }
    }
}
