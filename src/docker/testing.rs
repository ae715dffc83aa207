use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;

use super::runtime::{ContainerRuntime, LogLine, LogStream, LogStreamOptions};
use super::RuntimeContainer;

pub(crate) fn runtime_error(status_code: u16, message: &str) -> bollard::errors::Error {
    bollard::errors::Error::DockerResponseServerError {
        status_code,
        message: message.to_owned(),
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Calls {
    pub pings: usize,
    pub lists: usize,
    /// Lists that ran to completion, delay included.
    pub lists_completed: usize,
    pub mutations: Vec<(String, String, Option<Duration>)>,
    pub log_requests: Vec<(String, LogStreamOptions)>,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.pings + self.lists + self.mutations.len() + self.log_requests.len()
    }
}

/// In-memory runtime that records every call it receives.
#[derive(Debug, Default, Clone)]
pub(crate) struct FakeRuntime {
    containers: Vec<RuntimeContainer>,
    unavailable: bool,
    failing_list: bool,
    failing_mutations: Option<(u16, String)>,
    ping_delay: Option<Duration>,
    list_delay: Option<Duration>,
    log_lines: Vec<String>,
    failing_logs: Option<(u16, String)>,
    silent_logs: bool,
    calls: Arc<Mutex<Calls>>,
}

impl FakeRuntime {
    pub fn with_containers<'a>(
        containers: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    ) -> Self {
        let containers = containers
            .into_iter()
            .enumerate()
            .map(|(idx, (name, state, status))| RuntimeContainer {
                id: format!("{idx:064x}"),
                names: vec![format!("/{name}")],
                image: format!("{name}:latest"),
                state: state.to_owned(),
                status: status.to_owned(),
                created: 1_700_000_000,
            })
            .collect();
        Self {
            containers,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn with_failing_list(mut self) -> Self {
        self.failing_list = true;
        self
    }

    pub fn with_failing_mutations(mut self, err: bollard::errors::Error) -> Self {
        self.failing_mutations = Some((500, err.to_string()));
        self
    }

    pub fn with_ping_delay(mut self, delay: Duration) -> Self {
        self.ping_delay = Some(delay);
        self
    }

    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn with_log_lines<'a>(mut self, lines: impl IntoIterator<Item = &'a str>) -> Self {
        self.log_lines = lines.into_iter().map(str::to_owned).collect();
        self
    }

    pub fn with_failing_logs(mut self, err: bollard::errors::Error) -> Self {
        self.failing_logs = Some(match err {
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => (status_code, message),
            other => (500, other.to_string()),
        });
        self
    }

    /// Log streams stay open without ever producing output.
    pub fn with_silent_logs(mut self) -> Self {
        self.silent_logs = true;
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    fn record_mutation(&self, operation: &str, name: &str, grace: Option<Duration>) {
        self.calls
            .lock()
            .unwrap()
            .mutations
            .push((operation.to_owned(), name.to_owned(), grace));
    }

    fn mutation_result(&self) -> Result<(), bollard::errors::Error> {
        match &self.failing_mutations {
            Some((status, message)) => Err(runtime_error(*status, message)),
            None => Ok(()),
        }
    }
}

impl ContainerRuntime for FakeRuntime {
    async fn ping(&self) -> Result<(), bollard::errors::Error> {
        self.calls.lock().unwrap().pings += 1;
        if let Some(delay) = self.ping_delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable {
            return Err(runtime_error(503, "daemon unavailable"));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<RuntimeContainer>, bollard::errors::Error> {
        self.calls.lock().unwrap().lists += 1;
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().lists_completed += 1;
        if self.failing_list {
            return Err(runtime_error(500, "list failed"));
        }
        Ok(self.containers.clone())
    }

    async fn start(&self, name: &str) -> Result<(), bollard::errors::Error> {
        self.record_mutation("start", name, None);
        self.mutation_result()
    }

    async fn stop(&self, name: &str, grace: Duration) -> Result<(), bollard::errors::Error> {
        self.record_mutation("stop", name, Some(grace));
        self.mutation_result()
    }

    async fn restart(&self, name: &str, grace: Duration) -> Result<(), bollard::errors::Error> {
        self.record_mutation("restart", name, Some(grace));
        self.mutation_result()
    }

    fn logs(&self, name: &str, options: LogStreamOptions) -> LogStream {
        self.calls
            .lock()
            .unwrap()
            .log_requests
            .push((name.to_owned(), options));
        if let Some((status, message)) = &self.failing_logs {
            return futures::stream::iter([Err(runtime_error(*status, message))]).boxed();
        }
        if self.silent_logs {
            return futures::stream::pending().boxed();
        }
        let lines: Vec<Result<LogLine, bollard::errors::Error>> = self
            .log_lines
            .iter()
            .map(|message| {
                Ok(LogLine {
                    message: message.clone(),
                })
            })
            .collect();
        futures::stream::iter(lines).boxed()
    }
}
