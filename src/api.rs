use std::path::PathBuf;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use bytes::Bytes;
use futures::StreamExt;
use tokio::net::ToSocketAddrs;

use crate::docker::{Collector, ContainerRuntime, DockerRuntime};
use crate::fsutil;
use crate::ssr::{DockerStatus, Pipeline};

mod auth;
mod models;

pub use auth::{Authenticated, Authenticator, Session, StaticTokenAuthenticator};
pub use models::{ContainerAction, ErrorBody};

/// File served as the SPA shell from the web directory.
pub const INDEX_FILE: &str = "index.html";

pub struct AppState<R = DockerRuntime> {
    pipeline: Arc<Pipeline<R>>,
    collector: Option<Arc<Collector<R>>>,
    authenticator: Arc<dyn Authenticator>,
    web_dir: Option<PathBuf>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            collector: self.collector.clone(),
            authenticator: Arc::clone(&self.authenticator),
            web_dir: self.web_dir.clone(),
        }
    }
}

impl<R: ContainerRuntime> AppState<R> {
    pub fn new(
        pipeline: Arc<Pipeline<R>>,
        collector: Option<Arc<Collector<R>>>,
        authenticator: Arc<dyn Authenticator>,
        web_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            pipeline,
            collector,
            authenticator,
            web_dir,
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

fn runtime_not_configured() -> Response {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "container runtime not configured",
    )
}

fn html(document: Bytes) -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/html; charset=utf-8")],
        document,
    )
        .into_response()
}

async fn docker_status<R: ContainerRuntime>(
    _: Authenticated,
    State(state): State<AppState<R>>,
) -> Response {
    let available = match &state.collector {
        Some(collector) => collector.available().await,
        None => false,
    };
    Json(DockerStatus { available }).into_response()
}

async fn list_containers<R: ContainerRuntime>(
    _: Authenticated,
    State(state): State<AppState<R>>,
) -> Response {
    let Some(collector) = &state.collector else {
        return runtime_not_configured();
    };
    match collector.list_containers().await {
        Ok(containers) => Json(containers).into_response(),
        Err(err) => {
            log::error!("Failed to list containers: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to list containers")
        }
    }
}

async fn container_action<R: ContainerRuntime>(
    _: Authenticated,
    State(state): State<AppState<R>>,
    Path((name, action)): Path<(String, ContainerAction)>,
) -> Response {
    let Some(collector) = &state.collector else {
        return runtime_not_configured();
    };
    let result = match action {
        ContainerAction::Start => collector.start(&name).await,
        ContainerAction::Stop => collector.stop(&name).await,
        ContainerAction::Restart => collector.restart(&name).await,
    };
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

async fn container_logs<R: ContainerRuntime>(
    _: Authenticated,
    State(state): State<AppState<R>>,
    Path(name): Path<String>,
) -> Response {
    let Some(collector) = &state.collector else {
        return runtime_not_configured();
    };
    let stream = match collector.log_stream(&name).await {
        Ok(stream) => stream,
        Err(err) => {
            let status = match err.runtime_status() {
                Some(404) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            return error_response(status, err.to_string());
        }
    };
    let stream = stream.map(|line| line.map(|line| line.message));
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response()
}

async fn reload_shell<R: ContainerRuntime>(
    _: Authenticated,
    State(state): State<AppState<R>>,
) -> Response {
    let Some(web_dir) = &state.web_dir else {
        return error_response(
            StatusCode::CONFLICT,
            "shell is embedded; reload requires a web directory",
        );
    };
    match state.pipeline.load_cache_from_disk(web_dir.join(INDEX_FILE)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            log::error!("Failed to reload HTML shell: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to reload shell")
        }
    }
}

/// Serves the SPA shell for every non-API path, with prefetched data when possible.
async fn serve_shell<R: ContainerRuntime>(
    State(state): State<AppState<R>>,
    session: Session,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    if let Some(document) = state
        .pipeline
        .inject_for_path(uri.path(), session.authenticated, session.token.as_deref())
        .await
    {
        return html(document);
    }

    let Some(web_dir) = &state.web_dir else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match fsutil::read_file_async(web_dir.join(INDEX_FILE)).await {
        Ok(document) => html(Bytes::from(document)),
        Err(err) => {
            log::warn!("No HTML shell available: {}", err);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

pub fn router<R: ContainerRuntime>(state: AppState<R>) -> axum::Router {
    axum::Router::new()
        .route("/api/docker/status", get(docker_status::<R>))
        .route("/api/docker/containers", get(list_containers::<R>))
        .route(
            "/api/docker/containers/{name}/logs",
            get(container_logs::<R>),
        )
        .route(
            "/api/docker/containers/{name}/{action}",
            post(container_action::<R>),
        )
        .route("/api/ssr/reload", post(reload_shell::<R>))
        .fallback(serve_shell::<R>)
        .with_state(state)
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub fn new<R: ContainerRuntime>(state: AppState<R>) -> Self {
        Self {
            router: router(state),
        }
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router.into_make_service()).await
    }
}
