use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Health token used when the status carries none.
pub const NO_HEALTH: &str = "none";

/// Length of the truncated container id exposed to clients.
const SHORT_ID_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    /// Anything the runtime reports that is not one of the states above.
    Unknown,
}

impl FromStr for ContainerState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        })
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Removing => "removing",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Unknown => "unknown",
        })
    }
}

/// Point-in-time view of one container the console manages.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedContainer {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    pub status: String,
    pub health: String,
    pub managed: bool,
    pub paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

/// Truncates a runtime id to its short form.
pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Strips the leading `/` the runtime prepends to container names.
pub fn display_name(raw: &str) -> &str {
    raw.strip_prefix('/').unwrap_or(raw)
}

/// Extracts the health token from a status like `Up 3 hours (healthy)`.
///
/// Only running containers carry a health token. The first `(` and the first `)` are
/// used; if either is missing, or `)` comes first, the result is [`NO_HEALTH`].
pub fn parse_health(state: ContainerState, status: &str) -> String {
    if state != ContainerState::Running {
        return NO_HEALTH.to_owned();
    }

    match (status.find('('), status.find(')')) {
        (Some(open), Some(close)) if open < close && close - open > 1 => {
            status[open + 1..close].to_owned()
        }
        _ => NO_HEALTH.to_owned(),
    }
}

/// Converts a unix timestamp into `startedAt`, treating zero as absent.
pub fn started_at(created: i64) -> Option<DateTime<Utc>> {
    if created == 0 {
        return None;
    }
    DateTime::from_timestamp(created, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_health_running() {
        assert_eq!(
            parse_health(ContainerState::Running, "Up 3 hours (healthy)"),
            "healthy"
        );
        assert_eq!(
            parse_health(ContainerState::Running, "Up 5 seconds (health: starting)"),
            "health: starting"
        );
    }

    #[test]
    fn test_parse_health_uses_first_pair() {
        assert_eq!(
            parse_health(ContainerState::Running, "Up (unhealthy) (extra)"),
            "unhealthy"
        );
    }

    #[test]
    fn test_parse_health_malformed() {
        for status in [
            "Up 3 hours",
            "Up 3 hours (healthy",
            "Up 3 hours healthy)",
            "Up ) 3 hours (",
            "Up ()",
            "",
        ] {
            assert_eq!(
                parse_health(ContainerState::Running, status),
                NO_HEALTH,
                "status: {status:?}"
            );
        }
    }

    #[test]
    fn test_parse_health_not_running() {
        for state in [
            ContainerState::Created,
            ContainerState::Paused,
            ContainerState::Restarting,
            ContainerState::Removing,
            ContainerState::Exited,
            ContainerState::Dead,
            ContainerState::Unknown,
        ] {
            assert_eq!(parse_health(state, "Up 3 hours (healthy)"), NO_HEALTH);
        }
    }

    #[test]
    fn test_container_state_from_str() {
        assert_eq!(
            "running".parse::<ContainerState>().unwrap(),
            ContainerState::Running
        );
        assert_eq!(
            "paused".parse::<ContainerState>().unwrap(),
            ContainerState::Paused
        );
        assert_eq!(
            "Running".parse::<ContainerState>().unwrap(),
            ContainerState::Unknown
        );
    }

    #[test]
    fn test_short_id_and_display_name() {
        assert_eq!(short_id("0123456789abcdef"), "0123456789ab");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(display_name("/valkey-1"), "valkey-1");
        assert_eq!(display_name("valkey-1"), "valkey-1");
    }

    #[test]
    fn test_started_at_zero_is_absent() {
        assert_eq!(started_at(0), None);
        let ts = started_at(1_700_000_000).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_managed_container_serialization_omits_zero_start() {
        let container = ManagedContainer {
            id: "0123456789ab".to_owned(),
            name: "hololive-bot".to_owned(),
            image: "hololive-bot:latest".to_owned(),
            state: ContainerState::Running,
            status: "Up 1 minute (healthy)".to_owned(),
            health: "healthy".to_owned(),
            managed: true,
            paused: false,
            started_at: None,
        };

        let value = serde_json::to_value(&container).unwrap();
        assert_eq!(value["state"], "running");
        assert_eq!(value["health"], "healthy");
        assert!(value.get("startedAt").is_none());
    }
}
