use super::models::{self, ContainerState, ManagedContainer};
use super::runtime::RuntimeContainer;

/// Name substrings that mark a container as part of the bot platform.
const DEFAULT_MANAGED: &[&str] = &[
    "hololive",
    "valkey",
    "postgres",
    "prometheus",
    "grafana",
    "jaeger",
    "admin",
];

/// Name substrings that are never shown, even when they match a managed substring.
const DEFAULT_EXCLUDED: &[&str] = &["-init", "buildx"];

/// Classification policy applied to every enumerated container.
///
/// All entries are plain, case-sensitive substring matches against the container name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub managed_substrings: Vec<String>,
    pub excluded_substrings: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            managed_substrings: DEFAULT_MANAGED.iter().map(|s| (*s).to_owned()).collect(),
            excluded_substrings: DEFAULT_EXCLUDED.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl FilterConfig {
    pub fn new(
        managed_substrings: impl IntoIterator<Item = impl Into<String>>,
        excluded_substrings: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            managed_substrings: managed_substrings.into_iter().map(Into::into).collect(),
            excluded_substrings: excluded_substrings.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_substrings
            .iter()
            .any(|pattern| name.contains(pattern.as_str()))
    }

    pub fn is_managed(&self, name: &str) -> bool {
        self.managed_substrings
            .iter()
            .any(|pattern| name.contains(pattern.as_str()))
    }

    /// Applies the exclusion pass, then the inclusion pass, and projects the survivors.
    ///
    /// The result is sorted by name, independent of the order the runtime reported.
    pub fn classify(
        &self,
        containers: impl IntoIterator<Item = RuntimeContainer>,
    ) -> Vec<ManagedContainer> {
        let mut out: Vec<ManagedContainer> = containers
            .into_iter()
            .filter_map(|container| self.classify_one(container))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn classify_one(&self, container: RuntimeContainer) -> Option<ManagedContainer> {
        let name = container
            .names
            .first()
            .map(|raw| models::display_name(raw))
            .unwrap_or_default();

        if self.is_excluded(name) {
            log::trace!("Excluding container `{name}`");
            return None;
        }
        if !self.is_managed(name) {
            return None;
        }

        let state = container
            .state
            .parse::<ContainerState>()
            .unwrap_or(ContainerState::Unknown);
        Some(ManagedContainer {
            id: models::short_id(&container.id).to_owned(),
            name: name.to_owned(),
            image: container.image,
            state,
            health: models::parse_health(state, &container.status),
            status: container.status,
            managed: true,
            paused: state == ContainerState::Paused,
            started_at: models::started_at(container.created),
        })
    }
}
