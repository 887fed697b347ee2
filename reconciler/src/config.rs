use route_config::RouteTemplate;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum AccessRulesError {
    #[error("failed to decode access_rules json: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Options supplied by the host. Every key is optional; missing keys are
/// reported through the reconciliation status rather than at load time.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Oathkeeper access rules. Only checked for well-formed JSON.
    #[serde(default)]
    pub access_rules: Option<String>,
    /// Advertised url for the requesters; may contain template placeholders.
    #[serde(default)]
    pub root_url: Option<String>,
    /// Traefik rule; derived from `root_url` when not set.
    #[serde(default)]
    pub rule: Option<String>,
}

impl Config {
    /// Builds the config from the host's key/value view. Unknown keys are ignored.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Config {
            access_rules: map.get("access_rules").cloned(),
            root_url: map.get("root_url").cloned(),
            rule: map.get("rule").cloned(),
        }
    }

    pub fn access_rules_configured(&self) -> bool {
        self.access_rules
            .as_deref()
            .is_some_and(|rules| !rules.trim().is_empty())
    }

    /// Checks that configured access rules are well-formed JSON.
    ///
    /// Unset or blank access rules pass; `access_rules_configured` reports those.
    pub fn validate_access_rules(&self) -> Result<(), AccessRulesError> {
        match self.access_rules.as_deref() {
            Some(rules) if !rules.trim().is_empty() => {
                serde_json::from_str::<serde_json::Value>(rules)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn route_template(&self) -> RouteTemplate {
        RouteTemplate::new(
            self.root_url.clone().unwrap_or_default(),
            self.rule.clone(),
        )
    }
}
