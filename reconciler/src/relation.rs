//! The ingress-per-unit relation, as seen by the reconciler.
//!
//! The relation transport belongs to the host. The reconciler only needs to
//! enumerate relation instances and their requesters, read the data each
//! requester shared, and publish back the url it will be reachable at.

use route_config::TemplateContext;
use serde::Deserialize;
use std::fmt;

/// Name of the endpoint requesters relate to.
pub const INGRESS_ENDPOINT: &str = "ingress-per-unit";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct RelationId(pub u32);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{INGRESS_ENDPOINT}:{}", self.0)
    }
}

/// A remote unit asking to be exposed, identified by its unit name (`app/N`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Requester(pub String);

impl Requester {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Requester(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data a requester shares once it is ready.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RequesterData {
    /// Model the requesting unit lives in.
    pub model: String,
    /// Unit name, e.g. `remote/0`.
    pub name: String,
}

impl RequesterData {
    /// Template variables for this requester.
    ///
    /// `app_name` is the part of the unit name before the `/`, and `unit_name`
    /// is the unit name with `/` replaced by `-`.
    pub fn template_context(&self) -> Result<TemplateContext, RelationError> {
        let Some((app_name, _)) = self.name.split_once('/') else {
            return Err(RelationError::MalformedUnitName(self.name.clone()));
        };
        if app_name.is_empty() {
            return Err(RelationError::MalformedUnitName(self.name.clone()));
        }

        Ok(TemplateContext::new(
            self.model.clone(),
            self.name.replace('/', "-"),
            app_name,
        ))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RelationError {
    #[error("relation {0} does not exist")]
    UnknownRelation(RelationId),

    #[error("requester {requester} on {relation} has not provided its data")]
    MissingData {
        relation: RelationId,
        requester: Requester,
    },

    #[error("unit name {0:?} is not of the form <app>/<number>")]
    MalformedUnitName(String),

    #[error("failed to publish url to {requester}: {reason}")]
    Publish { requester: Requester, reason: String },
}

/// The provider side of the ingress-per-unit relation.
pub trait IngressProvider {
    /// All relation instances on the ingress endpoint, in any order.
    fn relations(&self) -> Vec<RelationId>;

    /// Whether enough data has been exchanged on `relation` to proceed.
    fn is_ready(&self, relation: RelationId) -> bool;

    /// Remote units on `relation`.
    fn requesters(&self, relation: RelationId) -> Vec<Requester>;

    fn is_requester_ready(&self, relation: RelationId, requester: &Requester) -> bool;

    fn requester_data(
        &self,
        relation: RelationId,
        requester: &Requester,
    ) -> Result<RequesterData, RelationError>;

    /// Tells `requester` the url it is reachable at. Publishing the same url
    /// again must be harmless.
    fn publish_url(
        &mut self,
        relation: RelationId,
        requester: &Requester,
        url: &str,
    ) -> Result<(), RelationError>;

    /// The single relation instance the reconciler works with.
    ///
    /// Only one instance is expected. When there are several, the one with the
    /// lowest id is used and the others are ignored.
    fn canonical_relation(&self) -> Option<RelationId> {
        let relations = self.relations();
        if relations.len() > 1 {
            tracing::warn!(
                endpoint = INGRESS_ENDPOINT,
                count = relations.len(),
                "more than one relation; using the lowest relation id"
            );
        }
        let relation = relations.into_iter().min();
        if relation.is_none() {
            tracing::info!(endpoint = INGRESS_ENDPOINT, "no relations yet");
        }
        relation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_context() {
        let data = RequesterData {
            model: "testing".into(),
            name: "remote/0".into(),
        };
        assert_eq!(
            data.template_context().unwrap(),
            TemplateContext::new("testing", "remote-0", "remote")
        );
    }

    #[test]
    fn test_malformed_unit_name() {
        for name in ["remote", "", "/0"] {
            let data = RequesterData {
                model: "testing".into(),
                name: name.into(),
            };
            assert_eq!(
                data.template_context(),
                Err(RelationError::MalformedUnitName(name.into()))
            );
        }
    }

    #[test]
    fn test_ordering() {
        assert!(RelationId(2) < RelationId(10));
        assert!(Requester::new("remote/0") < Requester::new("remote/1"));
        assert_eq!(RelationId(3).to_string(), "ingress-per-unit:3");
    }
}
