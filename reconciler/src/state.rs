use crate::status::Blocker;

/// Which validation left the configuration marked invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidConfig {
    AccessRules,
    RouteConfig,
}

impl InvalidConfig {
    pub const fn blocker(&self) -> Blocker {
        match self {
            InvalidConfig::AccessRules => Blocker::MalformedAccessRules,
            InvalidConfig::RouteConfig => Blocker::InvalidRouteConfig,
        }
    }
}

/// State that survives between reconciliation passes.
///
/// The invalid-config flag is set when a config check fails and only cleared
/// when that same check passes on a later pass. While it is set, passes that
/// do not re-validate the config report the stored blocker unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileState {
    invalid_config: Option<InvalidConfig>,
}

impl ReconcileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalid_config(&self) -> Option<InvalidConfig> {
        self.invalid_config
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid_config.is_some()
    }

    pub(crate) fn mark_invalid(&mut self, cause: InvalidConfig) {
        self.invalid_config = Some(cause);
    }

    /// Clears the flag if `cause` is what set it.
    pub(crate) fn mark_valid(&mut self, cause: InvalidConfig) {
        if self.invalid_config == Some(cause) {
            self.invalid_config = None;
        }
    }
}
