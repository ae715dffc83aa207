use crate::fsutil;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to build peer HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to load HTML shell: {0}")]
    LoadCache(#[from] fsutil::FileReadError),
    #[error("failed to serialize SSR payload: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a peer fetch produced no data. Never surfaced past the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("request to `{url}` failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to `{url}` returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read body from `{url}`: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("body from `{url}` is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
