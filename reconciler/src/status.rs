use std::fmt;

/// Why the configurator cannot serve its purpose yet.
///
/// Variants are listed in the order they are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocker {
    /// `access_rules` is set but is not valid JSON.
    MalformedAccessRules,
    /// `access_rules` is not set.
    MissingAccessRules,
    /// `root_url` or `rule` is missing, malformed or cannot be rendered.
    InvalidRouteConfig,
    /// Nothing is related on the ingress-per-unit endpoint.
    RelationNotFound,
    /// The ingress-per-unit relation exists but data is still missing.
    RelationNotReady,
    /// Routes could not be rendered or handed to the requesters.
    PublishFailed,
}

impl Blocker {
    pub const fn message(&self) -> &'static str {
        match self {
            Blocker::MalformedAccessRules => {
                "Invalid json in access_rules; fix the access_rules config, see logs"
            }
            Blocker::MissingAccessRules => {
                "Missing access_rules; set the access_rules config to a JSON access rule"
            }
            Blocker::InvalidRouteConfig => {
                "Invalid or missing route config; set root_url (and optionally rule), see logs"
            }
            Blocker::RelationNotFound => "Awaiting relation via ingress-per-unit",
            Blocker::RelationNotReady => "ingress-per-unit relation not ready",
            Blocker::PublishFailed => "Failed to publish routes to requesters, see logs",
        }
    }

    /// Short label used when tagging metrics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Blocker::MalformedAccessRules => "malformed_access_rules",
            Blocker::MissingAccessRules => "missing_access_rules",
            Blocker::InvalidRouteConfig => "invalid_route_config",
            Blocker::RelationNotFound => "relation_not_found",
            Blocker::RelationNotReady => "relation_not_ready",
            Blocker::PublishFailed => "publish_failed",
        }
    }

    /// Relation blockers resolve on their own once the remote side catches up.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Blocker::RelationNotFound | Blocker::RelationNotReady)
    }
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The operator-visible status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Maintenance(String),
    Blocked(Blocker),
    Active,
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Status::Maintenance(_) => "maintenance",
            Status::Blocked(_) => "blocked",
            Status::Active => "active",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Status::Maintenance(message) => message,
            Status::Blocked(blocker) => blocker.message(),
            Status::Active => "",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => f.write_str(self.name()),
            _ => write!(f, "{}: {}", self.name(), self.message()),
        }
    }
}

/// Where status updates go, typically the host's status field.
pub trait StatusSink {
    fn set_status(&mut self, status: Status);
}

/// Keeps every status in order, which is what tests usually want.
impl StatusSink for Vec<Status> {
    fn set_status(&mut self, status: Status) {
        self.push(status);
    }
}
