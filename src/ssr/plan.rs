/// One data source a page may need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Members,
    Settings,
    /// Collector availability, and the container list when available.
    Docker,
}

struct PrefetchRule {
    prefix: &'static str,
    fetches: &'static [Fetch],
}

const RULES: &[PrefetchRule] = &[
    PrefetchRule {
        prefix: "/dashboard/members",
        fetches: &[Fetch::Members],
    },
    PrefetchRule {
        prefix: "/dashboard/settings",
        fetches: &[Fetch::Settings, Fetch::Docker],
    },
];

/// The fetches a request path implies. Rules are independent; every matching rule
/// contributes its fetches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchPlan {
    members: bool,
    settings: bool,
    docker: bool,
}

impl PrefetchPlan {
    pub fn resolve(path: &str) -> Self {
        let mut plan = Self::default();
        for rule in RULES.iter().filter(|rule| path.starts_with(rule.prefix)) {
            for fetch in rule.fetches {
                plan.add(*fetch);
            }
        }
        plan
    }

    pub fn add(&mut self, fetch: Fetch) {
        match fetch {
            Fetch::Members => self.members = true,
            Fetch::Settings => self.settings = true,
            Fetch::Docker => self.docker = true,
        }
    }

    pub fn includes(&self, fetch: Fetch) -> bool {
        match fetch {
            Fetch::Members => self.members,
            Fetch::Settings => self.settings,
            Fetch::Docker => self.docker,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.members || self.settings || self.docker)
    }
}
