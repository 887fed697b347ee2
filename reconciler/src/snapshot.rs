//! In-memory ingress relation.
//!
//! `RelationSnapshot` holds a fixed view of the relation (loaded from YAML or
//! built up in code) and records every url published to it. A relation is
//! ready once it has at least one unit and every unit has shared its data.

use crate::relation::{IngressProvider, RelationError, RelationId, Requester, RequesterData};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UnitState {
    pub name: Requester,
    #[serde(default)]
    pub data: Option<RequesterData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RelationState {
    pub id: RelationId,
    #[serde(default)]
    pub units: Vec<UnitState>,
}

impl RelationState {
    fn unit(&self, requester: &Requester) -> Option<&UnitState> {
        self.units.iter().find(|unit| &unit.name == requester)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedUrl {
    pub relation: RelationId,
    pub requester: Requester,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RelationSnapshot {
    relations: Vec<RelationState>,
    #[serde(skip)]
    published: Vec<PublishedUrl>,
}

impl RelationSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_relation(&mut self, relation: RelationId) {
        if self.relation(relation).is_none() {
            self.relations.push(RelationState {
                id: relation,
                units: Vec::new(),
            });
        }
    }

    pub fn remove_relation(&mut self, relation: RelationId) {
        self.relations.retain(|state| state.id != relation);
    }

    /// Adds a unit that has not shared any data yet.
    pub fn add_unit(&mut self, relation: RelationId, requester: Requester) {
        self.add_relation(relation);
        if let Some(state) = self.relation_mut(relation)
            && state.unit(&requester).is_none()
        {
            state.units.push(UnitState {
                name: requester,
                data: None,
            });
        }
    }

    /// Sets the data shared by a unit, adding the unit if needed.
    pub fn update_unit_data(
        &mut self,
        relation: RelationId,
        requester: Requester,
        data: RequesterData,
    ) {
        self.add_unit(relation, requester.clone());
        if let Some(unit) = self
            .relation_mut(relation)
            .and_then(|state| state.units.iter_mut().find(|unit| unit.name == requester))
        {
            unit.data = Some(data);
        }
    }

    /// Every publication so far, oldest first.
    pub fn published(&self) -> &[PublishedUrl] {
        &self.published
    }

    /// The most recent url published to `requester`.
    pub fn published_url(&self, relation: RelationId, requester: &Requester) -> Option<&str> {
        self.published
            .iter()
            .rev()
            .find(|p| p.relation == relation && &p.requester == requester)
            .map(|p| p.url.as_str())
    }

    fn relation(&self, relation: RelationId) -> Option<&RelationState> {
        self.relations.iter().find(|state| state.id == relation)
    }

    fn relation_mut(&mut self, relation: RelationId) -> Option<&mut RelationState> {
        self.relations.iter_mut().find(|state| state.id == relation)
    }
}

impl IngressProvider for RelationSnapshot {
    fn relations(&self) -> Vec<RelationId> {
        self.relations.iter().map(|state| state.id).collect()
    }

    fn is_ready(&self, relation: RelationId) -> bool {
        self.relation(relation).is_some_and(|state| {
            !state.units.is_empty() && state.units.iter().all(|unit| unit.data.is_some())
        })
    }

    fn requesters(&self, relation: RelationId) -> Vec<Requester> {
        self.relation(relation)
            .map(|state| state.units.iter().map(|unit| unit.name.clone()).collect())
            .unwrap_or_default()
    }

    fn is_requester_ready(&self, relation: RelationId, requester: &Requester) -> bool {
        self.relation(relation)
            .and_then(|state| state.unit(requester))
            .is_some_and(|unit| unit.data.is_some())
    }

    fn requester_data(
        &self,
        relation: RelationId,
        requester: &Requester,
    ) -> Result<RequesterData, RelationError> {
        let state = self
            .relation(relation)
            .ok_or(RelationError::UnknownRelation(relation))?;
        state
            .unit(requester)
            .and_then(|unit| unit.data.clone())
            .ok_or_else(|| RelationError::MissingData {
                relation,
                requester: requester.clone(),
            })
    }

    fn publish_url(
        &mut self,
        relation: RelationId,
        requester: &Requester,
        url: &str,
    ) -> Result<(), RelationError> {
        if self.relation(relation).is_none() {
            return Err(RelationError::UnknownRelation(relation));
        }
        self.published.push(PublishedUrl {
            relation,
            requester: requester.clone(),
            url: url.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot() {
        let yaml = r#"
- id: 3
  units:
    - name: remote/0
      data:
        model: testing
        name: remote/0
        host: foo
        port: "42"
    - name: remote/1
- id: 1
"#;
        let snapshot: RelationSnapshot = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(snapshot.relations(), [RelationId(3), RelationId(1)]);
        assert_eq!(snapshot.canonical_relation(), Some(RelationId(1)));

        let relation = RelationId(3);
        assert_eq!(
            snapshot.requesters(relation),
            [Requester::new("remote/0"), Requester::new("remote/1")]
        );
        assert!(snapshot.is_requester_ready(relation, &Requester::new("remote/0")));
        assert!(!snapshot.is_requester_ready(relation, &Requester::new("remote/1")));
        assert!(!snapshot.is_ready(relation));
        assert!(!snapshot.is_ready(RelationId(1)));
    }

    #[test]
    fn test_readiness() {
        let relation = RelationId(0);
        let requester = Requester::new("remote/0");
        let mut snapshot = RelationSnapshot::new();
        assert_eq!(snapshot.canonical_relation(), None);

        snapshot.add_unit(relation, requester.clone());
        assert_eq!(snapshot.canonical_relation(), Some(relation));
        assert!(!snapshot.is_ready(relation));
        assert_eq!(
            snapshot.requester_data(relation, &requester),
            Err(RelationError::MissingData {
                relation,
                requester: requester.clone()
            })
        );

        let data = RequesterData {
            model: "testing".into(),
            name: "remote/0".into(),
        };
        snapshot.update_unit_data(relation, requester.clone(), data.clone());
        assert!(snapshot.is_ready(relation));
        assert_eq!(snapshot.requester_data(relation, &requester), Ok(data));

        snapshot.remove_relation(relation);
        assert_eq!(snapshot.canonical_relation(), None);
    }

    #[test]
    fn test_publish() {
        let relation = RelationId(0);
        let requester = Requester::new("remote/0");
        let mut snapshot = RelationSnapshot::new();

        assert_eq!(
            snapshot.publish_url(relation, &requester, "http://foo.bar"),
            Err(RelationError::UnknownRelation(relation))
        );

        snapshot.add_unit(relation, requester.clone());
        snapshot.publish_url(relation, &requester, "http://foo.bar/a").unwrap();
        snapshot.publish_url(relation, &requester, "http://foo.bar/b").unwrap();
        assert_eq!(snapshot.published().len(), 2);
        assert_eq!(
            snapshot.published_url(relation, &requester),
            Some("http://foo.bar/b")
        );
    }
}
