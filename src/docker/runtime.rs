use std::pin::Pin;
use std::time::Duration;

use bollard::Docker;
use bollard::container::{
    ListContainersOptions, LogOutput, LogsOptions, RestartContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::models::ContainerSummary;
use futures::{Stream, StreamExt};

/// A container as reported by the runtime, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeContainer {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    pub state: String,
    pub status: String,
    /// Unix timestamp in seconds, `0` when unknown.
    pub created: i64,
}

impl From<ContainerSummary> for RuntimeContainer {
    fn from(value: ContainerSummary) -> Self {
        Self {
            id: value.id.unwrap_or_default(),
            names: value.names.unwrap_or_default(),
            image: value.image.unwrap_or_default(),
            state: value.state.map(|state| state.to_string()).unwrap_or_default(),
            status: value.status.unwrap_or_default(),
            created: value.created.unwrap_or_default(),
        }
    }
}

/// One chunk of container output. Stdout and stderr are interleaved in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub message: String,
}

impl From<LogOutput> for LogLine {
    fn from(value: LogOutput) -> Self {
        let message = match value {
            LogOutput::StdOut { message }
            | LogOutput::StdErr { message }
            | LogOutput::StdIn { message }
            | LogOutput::Console { message } => message,
        };
        Self {
            message: String::from_utf8_lossy(&message).into_owned(),
        }
    }
}

/// A live log stream. Dropping it closes the underlying connection.
pub type LogStream = Pin<Box<dyn Stream<Item = Result<LogLine, bollard::errors::Error>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStreamOptions {
    pub follow: bool,
    pub timestamps: bool,
    pub tail: usize,
}

/// The subset of the container runtime API the collector consumes.
pub trait ContainerRuntime: Send + Sync + 'static {
    fn ping(&self) -> impl Future<Output = Result<(), bollard::errors::Error>> + Send;

    /// Lists every container, including stopped ones.
    fn list_all(
        &self,
    ) -> impl Future<Output = Result<Vec<RuntimeContainer>, bollard::errors::Error>> + Send;

    fn start(&self, name: &str) -> impl Future<Output = Result<(), bollard::errors::Error>> + Send;

    fn stop(
        &self,
        name: &str,
        grace: Duration,
    ) -> impl Future<Output = Result<(), bollard::errors::Error>> + Send;

    fn restart(
        &self,
        name: &str,
        grace: Duration,
    ) -> impl Future<Output = Result<(), bollard::errors::Error>> + Send;

    fn logs(&self, name: &str, options: LogStreamOptions) -> LogStream;
}

/// [`ContainerRuntime`] backed by the Docker Engine API.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connects using `DOCKER_HOST` or the platform's default socket.
    ///
    /// No request is issued here; an unreachable daemon only shows up on the first call.
    pub fn connect_with_local_defaults() -> Result<Self, bollard::errors::Error> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

impl ContainerRuntime for DockerRuntime {
    async fn ping(&self) -> Result<(), bollard::errors::Error> {
        self.docker.ping().await.map(|_| ())
    }

    async fn list_all(&self) -> Result<Vec<RuntimeContainer>, bollard::errors::Error> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;
        Ok(containers.into_iter().map(RuntimeContainer::from).collect())
    }

    async fn start(&self, name: &str) -> Result<(), bollard::errors::Error> {
        self.docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await
    }

    async fn stop(&self, name: &str, grace: Duration) -> Result<(), bollard::errors::Error> {
        let options = StopContainerOptions {
            t: grace.as_secs() as i64,
        };
        self.docker.stop_container(name, Some(options)).await
    }

    async fn restart(&self, name: &str, grace: Duration) -> Result<(), bollard::errors::Error> {
        let options = RestartContainerOptions {
            t: grace.as_secs() as isize,
        };
        self.docker.restart_container(name, Some(options)).await
    }

    fn logs(&self, name: &str, options: LogStreamOptions) -> LogStream {
        let options = LogsOptions::<String> {
            follow: options.follow,
            stdout: true,
            stderr: true,
            timestamps: options.timestamps,
            tail: options.tail.to_string(),
            ..Default::default()
        };
        self.docker
            .logs(name, Some(options))
            .map(|item| item.map(LogLine::from))
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_container_from_summary() {
        let summary = ContainerSummary {
            id: Some("0123456789abcdef0123".to_owned()),
            names: Some(vec!["/hololive-bot".to_owned()]),
            image: Some("ghcr.io/hololive/hololive-bot:latest".to_owned()),
            status: Some("Up 3 hours (healthy)".to_owned()),
            created: Some(1_700_000_000),
            ..Default::default()
        };

        let container = RuntimeContainer::from(summary);
        assert_eq!(container.id, "0123456789abcdef0123");
        assert_eq!(container.names, vec!["/hololive-bot".to_owned()]);
        assert_eq!(container.status, "Up 3 hours (healthy)");
        assert_eq!(container.created, 1_700_000_000);
        assert_eq!(container.state, "");
    }

    #[test]
    fn test_runtime_container_from_empty_summary() {
        let container = RuntimeContainer::from(ContainerSummary::default());
        assert_eq!(container, RuntimeContainer::default());
    }

    #[test]
    fn test_log_line_from_output() {
        let line = LogLine::from(LogOutput::StdErr {
            message: bytes::Bytes::from_static(b"2024-01-01T00:00:00Z boom\n"),
        });
        assert_eq!(line.message, "2024-01-01T00:00:00Z boom\n");
    }
}
