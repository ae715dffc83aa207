use std::fmt;
use std::time::Duration;

/// Lifecycle mutations the collector can request from the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    Stop,
    Restart,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Restart => "restart",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to container runtime: {0}")]
    Connect(#[source] bollard::errors::Error),
    #[error("failed to list containers: {0}")]
    List(#[source] bollard::errors::Error),
    #[error("listing containers timed out after {0:?}")]
    ListTimeout(Duration),
    #[error("failed to {operation} container `{name}`: {source}")]
    Lifecycle {
        operation: Operation,
        name: String,
        #[source]
        source: bollard::errors::Error,
    },
    #[error("failed to open logs of container `{name}`: {source}")]
    Logs {
        name: String,
        #[source]
        source: bollard::errors::Error,
    },
}

impl Error {
    /// The status code the runtime answered with, if it rejected the request.
    pub fn runtime_status(&self) -> Option<u16> {
        let source = match self {
            Error::Connect(source) | Error::List(source) => source,
            Error::Lifecycle { source, .. } | Error::Logs { source, .. } => source,
            Error::ListTimeout(_) => return None,
        };
        match source {
            bollard::errors::Error::DockerResponseServerError { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
