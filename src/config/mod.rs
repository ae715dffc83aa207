//! Runtime configuration read from environment variables.
mod error;

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::docker::FilterConfig;

pub use error::{Error, Result};

pub const LISTEN_ADDR: &str = "ADMIN_LISTEN_ADDR";
pub const WEB_DIR: &str = "ADMIN_WEB_DIR";
pub const PEER_BOT_URL: &str = "HOLOLIVE_BOT_URL";
pub const SESSION_TOKENS: &str = "ADMIN_SESSION_TOKENS";
pub const DOCKER_DISABLED: &str = "ADMIN_DOCKER_DISABLED";
pub const MANAGED_FILTERS: &str = "ADMIN_MANAGED_FILTERS";
pub const EXCLUDED_FILTERS: &str = "ADMIN_EXCLUDED_FILTERS";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Development mode: serve and reload the shell from this directory.
    pub web_dir: Option<PathBuf>,
    pub peer_bot_url: Option<String>,
    pub session_tokens: Vec<String>,
    pub docker_enabled: bool,
    /// Set but empty filter variables configure an empty list.
    pub filters: FilterConfig,
}

// Session tokens are credentials; only their count is printed.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("web_dir", &self.web_dir)
            .field("peer_bot_url", &self.peer_bot_url)
            .field("session_tokens", &self.session_tokens.len())
            .field("docker_enabled", &self.docker_enabled)
            .field("filters", &self.filters)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] naming the variable whose value is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset, except for
    /// the filter lists.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let listen_addr = get(LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .map_err(|source| Error::ListenAddr {
                key: LISTEN_ADDR,
                value: listen_addr.clone(),
                source,
            })?;

        let peer_bot_url = match get(PEER_BOT_URL) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => Some(url),
            Some(url) => {
                return Err(Error::PeerUrl {
                    key: PEER_BOT_URL,
                    value: url,
                });
            }
            None => None,
        };

        let docker_enabled = match get(DOCKER_DISABLED) {
            Some(value) => !parse_bool(DOCKER_DISABLED, &value)?,
            None => true,
        };

        let defaults = FilterConfig::default();
        let filters = FilterConfig {
            managed_substrings: lookup(MANAGED_FILTERS)
                .map(|value| split_list(&value))
                .unwrap_or(defaults.managed_substrings),
            excluded_substrings: lookup(EXCLUDED_FILTERS)
                .map(|value| split_list(&value))
                .unwrap_or(defaults.excluded_substrings),
        };

        Ok(Self {
            listen_addr,
            web_dir: get(WEB_DIR).map(PathBuf::from),
            peer_bot_url,
            session_tokens: get(SESSION_TOKENS)
                .map(|value| split_list(&value))
                .unwrap_or_default(),
            docker_enabled,
            filters,
        })
    }
}

/// Splits a comma-separated list, dropping empty entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(Error::Bool {
            key,
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.web_dir, None);
        assert_eq!(config.peer_bot_url, None);
        assert!(config.session_tokens.is_empty());
        assert!(config.docker_enabled);
        assert_eq!(config.filters, FilterConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            (LISTEN_ADDR, "127.0.0.1:8080"),
            (WEB_DIR, "/srv/admin/dist"),
            (PEER_BOT_URL, "http://hololive-bot:8080"),
            (SESSION_TOKENS, "a, b,,c"),
            (DOCKER_DISABLED, "TRUE"),
            (MANAGED_FILTERS, "hololive,valkey"),
            (EXCLUDED_FILTERS, " -init "),
        ])
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.web_dir, Some(PathBuf::from("/srv/admin/dist")));
        assert_eq!(
            config.peer_bot_url.as_deref(),
            Some("http://hololive-bot:8080")
        );
        assert_eq!(config.session_tokens, vec!["a", "b", "c"]);
        assert!(!config.docker_enabled);
        assert_eq!(config.filters, FilterConfig::new(["hololive", "valkey"], ["-init"]));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config(&[(PEER_BOT_URL, "  "), (WEB_DIR, "")]).unwrap();
        assert_eq!(config.peer_bot_url, None);
        assert_eq!(config.web_dir, None);
    }

    #[test]
    fn test_explicit_empty_filter_list() {
        let config = config(&[(EXCLUDED_FILTERS, "")]).unwrap();
        assert!(config.filters.excluded_substrings.is_empty());
        assert_eq!(
            config.filters.managed_substrings,
            FilterConfig::default().managed_substrings
        );
    }

    #[test]
    fn test_debug_redacts_session_tokens() {
        let config = config(&[(SESSION_TOKENS, "s3cret-token,other-token")]).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cret-token"), "{printed}");
        assert!(!printed.contains("other-token"), "{printed}");
        assert!(printed.contains("session_tokens: 2"), "{printed}");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[(LISTEN_ADDR, "not-an-addr")]),
            Err(Error::ListenAddr { .. })
        ));
        assert!(matches!(
            config(&[(DOCKER_DISABLED, "maybe")]),
            Err(Error::Bool { .. })
        ));
        assert!(matches!(
            config(&[(PEER_BOT_URL, "hololive-bot:8080")]),
            Err(Error::PeerUrl { .. })
        ));
    }
}
