use crate::reconciler::Reconciler;
use crate::relation::{RelationId, Requester, RequesterData};
use crate::snapshot::RelationSnapshot;
use crate::status::Status;
use crate::Config;

pub const MODEL_NAME: &str = "testing";
pub const REMOTE_UNIT_NAME: &str = "remote/0";
pub const SAMPLE_URL: &str = "http://foo.bar/{{model_name}}-{{unit_name}}";
pub const SAMPLE_RULE: &str = "Host(`foo.bar`) && PathPrefix(`/{{model_name}}-{{unit_name}}`)";
pub const IPU_RELATION: RelationId = RelationId(0);
pub const ACCESS_RULES_CONFIG: &str = r#"
{
    "id": "some-id",
    "version": "v0.1",
    "match": {
        "url": "http://test-app/some-route/<.*>",
        "methods": ["GET", "POST"]
    },
    "authenticators": [{"handler": "noop"}],
    "authorizer": {"handler": "allow"},
    "mutators": [{"handler": "noop"}],
    "errors": [{"handler": "json"}]
}
"#;

pub type TestReconciler = Reconciler<RelationSnapshot, Vec<Status>>;

pub fn reconciler() -> TestReconciler {
    Reconciler::new(RelationSnapshot::new(), Vec::new())
}

pub fn config(access_rules: Option<&str>, root_url: Option<&str>, rule: Option<&str>) -> Config {
    Config {
        access_rules: access_rules.map(Into::into),
        root_url: root_url.map(Into::into),
        rule: rule.map(Into::into),
    }
}

pub fn valid_config() -> Config {
    config(Some(ACCESS_RULES_CONFIG), Some(SAMPLE_URL), None)
}

pub fn requester_data(unit_name: &str) -> RequesterData {
    RequesterData {
        model: MODEL_NAME.into(),
        name: unit_name.into(),
    }
}

/// Relates `unit_name` without sharing any data yet.
pub fn mock_ipu_relation(snapshot: &mut RelationSnapshot, unit_name: &str) {
    snapshot.add_unit(IPU_RELATION, Requester::new(unit_name));
}

/// Relates `unit_name` and shares its data.
pub fn mock_ready_unit(snapshot: &mut RelationSnapshot, unit_name: &str) {
    snapshot.update_unit_data(
        IPU_RELATION,
        Requester::new(unit_name),
        requester_data(unit_name),
    );
}
