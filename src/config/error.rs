/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid listen address `{value}` in `{key}`: {source}")]
    ListenAddr {
        key: &'static str,
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid boolean `{value}` in `{key}` (expected 1, 0, true or false)")]
    Bool { key: &'static str, value: String },
    #[error("invalid peer bot URL `{value}` in `{key}` (expected http:// or https://)")]
    PeerUrl { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
