//! Merging of per-requester routes into one Traefik dynamic configuration.
//!
//! Each `RouteDescriptor` contributes exactly one router and one service:
//!
//! ```text
//! http:
//!   routers:
//!     juju-<id>-router:  { rule, service: juju-<id>-service, entryPoints: [web], middlewares: [oathkeeper] }
//!   services:
//!     juju-<id>-service: { loadBalancer: { servers: [ { url: <root_url> } ] } }
//! ```
//!
//! Maps keep insertion order so the serialized output follows the order of
//! the descriptors and is reproducible.

use crate::model::RouteDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const NAME_PREFIX: &str = "juju";
const ENTRY_POINT: &str = "web";
const MIDDLEWARE: &str = "oathkeeper";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub http: HttpConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub routers: IndexMap<String, Router>,
    pub services: IndexMap<String, Service>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    pub rule: String,
    pub service: String,
    pub entry_points: Vec<String>,
    pub middlewares: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub load_balancer: LoadBalancer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub servers: Vec<Server>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// The router and service generated for a single route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub router_name: String,
    pub router: Router,
    pub service_name: String,
    pub service: Service,
}

impl From<&RouteDescriptor> for RouteEntry {
    fn from(descriptor: &RouteDescriptor) -> Self {
        let router_name = format!("{NAME_PREFIX}-{}-router", descriptor.id);
        let service_name = format!("{NAME_PREFIX}-{}-service", descriptor.id);

        RouteEntry {
            router: Router {
                rule: descriptor.rule.clone(),
                service: service_name.clone(),
                entry_points: vec![ENTRY_POINT.to_string()],
                middlewares: vec![MIDDLEWARE.to_string()],
            },
            router_name,
            service: Service {
                load_balancer: LoadBalancer {
                    servers: vec![Server {
                        url: descriptor.root_url.clone(),
                    }],
                },
            },
            service_name,
        }
    }
}

impl ProxyConfig {
    pub fn routers(&self) -> &IndexMap<String, Router> {
        &self.http.routers
    }

    pub fn services(&self) -> &IndexMap<String, Service> {
        &self.http.services
    }

    pub fn is_empty(&self) -> bool {
        self.http.routers.is_empty() && self.http.services.is_empty()
    }

    fn insert(&mut self, entry: RouteEntry) {
        self.http.routers.insert(entry.router_name, entry.router);
        self.http.services.insert(entry.service_name, entry.service);
    }
}

/// Combines the routes of all requesters.
///
/// Descriptor ids are expected to be unique; callers reject duplicates before merging.
pub fn merge(descriptors: &[RouteDescriptor]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    for descriptor in descriptors {
        config.insert(RouteEntry::from(descriptor));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(id: &str, host: &str) -> RouteDescriptor {
        RouteDescriptor {
            root_url: format!("http://{host}/{id}"),
            rule: format!("Host(`{host}`)"),
            id: id.into(),
        }
    }

    #[test]
    fn test_empty_merge() {
        let config = merge(&[]);
        assert!(config.is_empty());
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"http": {"routers": {}, "services": {}}})
        );
    }

    #[test]
    fn test_merge_shape() {
        let config = merge(&[descriptor("remote-0-testing", "foo.bar")]);

        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "http": {
                    "routers": {
                        "juju-remote-0-testing-router": {
                            "rule": "Host(`foo.bar`)",
                            "service": "juju-remote-0-testing-service",
                            "entryPoints": ["web"],
                            "middlewares": ["oathkeeper"],
                        }
                    },
                    "services": {
                        "juju-remote-0-testing-service": {
                            "loadBalancer": {"servers": [{"url": "http://foo.bar/remote-0-testing"}]}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_merge_multiple() {
        let descriptors = [
            descriptor("remote-0-testing", "foo.bar"),
            descriptor("remote-1-testing", "foo.bar"),
            descriptor("other-0-prod", "other.bar"),
        ];
        let config = merge(&descriptors);

        assert_eq!(config.routers().len(), 3);
        assert_eq!(config.services().len(), 3);
        let names: Vec<_> = config.routers().keys().cloned().collect();
        assert_eq!(
            names,
            [
                "juju-remote-0-testing-router",
                "juju-remote-1-testing-router",
                "juju-other-0-prod-router",
            ]
        );
        for router in config.routers().values() {
            assert!(config.services().contains_key(&router.service));
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let descriptors = [
            descriptor("remote-0-testing", "foo.bar"),
            descriptor("remote-1-testing", "foo.bar"),
        ];
        assert_eq!(merge(&descriptors), merge(&descriptors));

        let yaml = serde_yaml::to_string(&merge(&descriptors)).unwrap();
        assert_eq!(yaml, serde_yaml::to_string(&merge(&descriptors)).unwrap());
        let parsed: ProxyConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, merge(&descriptors));
    }
}
