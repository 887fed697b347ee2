//! Status reconciliation.
//!
//! Every event runs one synchronous pass. A pass checks, in order:
//!
//! ```text
//! access_rules well-formed JSON   -> Blocked(MalformedAccessRules)  [sticky]
//! access_rules set                -> Blocked(MissingAccessRules)
//! route template valid            -> Blocked(InvalidRouteConfig)    [sticky]
//! ingress relation exists         -> Blocked(RelationNotFound)
//! ingress relation ready          -> Blocked(RelationNotReady)
//!                                 -> Active
//! ```
//!
//! The first failing check decides the status. Sticky failures are remembered
//! in `ReconcileState`; `UpdateStatus` passes do not re-run the checks and keep
//! reporting them until a config or relation event re-validates the config.
//! Revalidating passes check the route template even when `access_rules` is
//! missing, so the route flag always reflects the current template.
//!
//! When a config or relation pass ends `Active`, the route template is rendered
//! for every ready requester, each requester is told its url, and the merged
//! proxy configuration is returned to the caller. If that fails the status
//! becomes `Blocked(PublishFailed)`.

use crate::config::Config;
use crate::metrics_defs::{
    RECONCILE_ACTIVE, RECONCILE_BLOCKED, RECONCILE_DEFERRED, RECONCILE_PASS, ROUTE_COUNT,
    ROUTE_PUBLISHED,
};
use crate::relation::{IngressProvider, RelationError, RelationId, Requester};
use crate::state::{InvalidConfig, ReconcileState};
use crate::status::{Blocker, Status, StatusSink};
use route_config::{ProxyConfig, RenderError, RouteDescriptor, merge};
use shared::{counter, gauge};
use std::collections::HashMap;

const CONFIGURING: &str = "Configuring the route config";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The host config changed. Carries the new config.
    ConfigChanged(Config),
    /// A requester shared or changed its relation data.
    RelationChanged,
    /// Periodic status refresh.
    UpdateStatus,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ConfigChanged(_) => "config_changed",
            Event::RelationChanged => "relation_changed",
            Event::UpdateStatus => "update_status",
        }
    }

    // Status refreshes neither re-validate the config nor publish routes.
    fn revalidates(&self) -> bool {
        !matches!(self, Event::UpdateStatus)
    }
}

/// Outcome of one reconciliation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    pub status: Status,
    /// Proxy configuration generated by this pass, if routes were published.
    pub proxy_config: Option<ProxyConfig>,
    /// The event could not be handled yet and should be delivered again later.
    pub deferred: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ReconcileError {
    #[error("failed to render the route config for {requester}: {source}")]
    Render {
        requester: Requester,
        #[source]
        source: RenderError,
    },

    #[error("{first} and {second} both resolve to route id {id:?}")]
    DuplicateRouteId {
        id: String,
        first: Requester,
        second: Requester,
    },

    #[error("relation error: {0}")]
    Relation(#[from] RelationError),
}

pub struct Reconciler<I, S> {
    config: Config,
    ingress: I,
    status: S,
}

impl<I, S> Reconciler<I, S>
where
    I: IngressProvider,
    S: StatusSink,
{
    /// Starts with an empty config; deliver `Event::ConfigChanged` to set one.
    pub fn new(ingress: I, status: S) -> Self {
        Reconciler {
            config: Config::default(),
            ingress,
            status,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ingress(&self) -> &I {
        &self.ingress
    }

    pub fn ingress_mut(&mut self) -> &mut I {
        &mut self.ingress
    }

    pub fn status_sink(&self) -> &S {
        &self.status
    }

    pub fn into_parts(self) -> (I, S) {
        (self.ingress, self.status)
    }

    /// Runs one reconciliation pass for `event`.
    ///
    /// Config problems and missing relations end up in the returned status.
    /// Errors are reserved for inconsistencies found while publishing: a
    /// template that passed validation but fails to render, requesters that
    /// collide on a route id, or a failed publication. The status is set to
    /// `Blocked(PublishFailed)` before such an error is returned.
    pub fn reconcile(
        &mut self,
        event: Event,
        state: &mut ReconcileState,
    ) -> Result<Reconciliation, ReconcileError> {
        counter!(RECONCILE_PASS, "event" => event.name()).increment(1);

        let revalidate = event.revalidates();
        let defer_when_blocked = matches!(event, Event::RelationChanged);
        if let Event::ConfigChanged(config) = event {
            self.config = config;
            self.status.set_status(Status::Maintenance(CONFIGURING.into()));
        }

        let checked = if !revalidate && let Some(cause) = state.invalid_config() {
            tracing::info!(?cause, "config is marked invalid; waiting for a config change");
            Err(self.sticky_blocker(cause))
        } else {
            self.check(state)
        };

        let reconciliation = match checked {
            Err(blocker) => {
                counter!(RECONCILE_BLOCKED, "reason" => blocker.as_str()).increment(1);
                if defer_when_blocked {
                    tracing::info!(%blocker, "not ready; deferring the event");
                    counter!(RECONCILE_DEFERRED).increment(1);
                }
                Reconciliation {
                    status: Status::Blocked(blocker),
                    proxy_config: None,
                    deferred: defer_when_blocked,
                }
            }
            Ok(relation) => {
                let proxy_config = if revalidate {
                    match self.publish_routes(relation) {
                        Ok(proxy_config) => Some(proxy_config),
                        Err(e) => {
                            let blocker = Blocker::PublishFailed;
                            tracing::error!(error = %e, "failed to publish routes");
                            counter!(RECONCILE_BLOCKED, "reason" => blocker.as_str()).increment(1);
                            self.status.set_status(Status::Blocked(blocker));
                            return Err(e);
                        }
                    }
                } else {
                    None
                };
                counter!(RECONCILE_ACTIVE).increment(1);
                Reconciliation {
                    status: Status::Active,
                    proxy_config,
                    deferred: false,
                }
            }
        };

        self.status.set_status(reconciliation.status.clone());
        Ok(reconciliation)
    }

    /// The blocker to report for a sticky flag without re-validating.
    ///
    /// The route template is only flagged while it is invalid, but a missing
    /// `access_rules` still takes precedence over it.
    fn sticky_blocker(&self, cause: InvalidConfig) -> Blocker {
        match cause {
            InvalidConfig::RouteConfig if !self.config.access_rules_configured() => {
                Blocker::MissingAccessRules
            }
            _ => cause.blocker(),
        }
    }

    /// Runs the checks in order, updating the invalid-config flag on the way.
    fn check(&self, state: &mut ReconcileState) -> Result<RelationId, Blocker> {
        let result = self.check_inner(state);
        if let Err(blocker) = result {
            if blocker.is_transient() {
                tracing::info!(%blocker, "blocked");
            } else {
                tracing::warn!(%blocker, "blocked");
            }
        }
        result
    }

    fn check_inner(&self, state: &mut ReconcileState) -> Result<RelationId, Blocker> {
        if let Err(e) = self.config.validate_access_rules() {
            tracing::error!(error = %e, "invalid json configuration");
            state.mark_invalid(InvalidConfig::AccessRules);
            return Err(Blocker::MalformedAccessRules);
        }
        state.mark_valid(InvalidConfig::AccessRules);

        // The route flag is maintained even when access_rules is missing.
        let route_valid = self.config.route_template().is_valid();
        if route_valid {
            state.mark_valid(InvalidConfig::RouteConfig);
        } else {
            state.mark_invalid(InvalidConfig::RouteConfig);
        }

        if !self.config.access_rules_configured() {
            return Err(Blocker::MissingAccessRules);
        }
        if !route_valid {
            return Err(Blocker::InvalidRouteConfig);
        }

        let relation = self
            .ingress
            .canonical_relation()
            .ok_or(Blocker::RelationNotFound)?;
        if !self.ingress.is_ready(relation) {
            return Err(Blocker::RelationNotReady);
        }

        tracing::info!(%relation, "route config and relations are ready");
        Ok(relation)
    }

    /// Renders the routes of all ready requesters, publishes their urls and
    /// merges the routes.
    ///
    /// Requesters whose data is unusable are skipped. Nothing is published
    /// unless every remaining requester renders to a distinct route.
    fn publish_routes(&mut self, relation: RelationId) -> Result<ProxyConfig, ReconcileError> {
        let template = self.config.route_template();

        let mut requesters = self.ingress.requesters(relation);
        requesters.sort();
        requesters.dedup();

        let mut routes: Vec<(Requester, RouteDescriptor)> = Vec::new();
        let mut owners: HashMap<String, Requester> = HashMap::new();
        for requester in requesters {
            if !self.ingress.is_requester_ready(relation, &requester) {
                tracing::debug!(%requester, "requester not ready; skipping");
                continue;
            }

            let ctx = match self
                .ingress
                .requester_data(relation, &requester)
                .and_then(|data| data.template_context())
            {
                Ok(ctx) => ctx,
                Err(e) => {
                    tracing::error!(%requester, error = %e, "unusable requester data; skipping");
                    continue;
                }
            };
            let descriptor =
                template
                    .render(&ctx)
                    .map_err(|source| ReconcileError::Render {
                        requester: requester.clone(),
                        source,
                    })?;

            if let Some(first) = owners.insert(descriptor.id.clone(), requester.clone()) {
                return Err(ReconcileError::DuplicateRouteId {
                    id: descriptor.id,
                    first,
                    second: requester,
                });
            }
            routes.push((requester, descriptor));
        }

        for (requester, descriptor) in &routes {
            tracing::info!(%requester, url = %descriptor.root_url, "publishing url");
            self.ingress
                .publish_url(relation, requester, &descriptor.root_url)?;
            counter!(ROUTE_PUBLISHED).increment(1);
        }

        let descriptors: Vec<RouteDescriptor> =
            routes.into_iter().map(|(_, descriptor)| descriptor).collect();
        let proxy_config = merge(&descriptors);
        gauge!(ROUTE_COUNT).set(descriptors.len() as f64);
        tracing::info!(
            routers = ?proxy_config.routers().keys().collect::<Vec<_>>(),
            "generated proxy config"
        );

        Ok(proxy_config)
    }
}
