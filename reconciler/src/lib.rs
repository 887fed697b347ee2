//! Reconciles operator config and ingress relation data into a Traefik
//! proxy configuration and an operator-visible status.

pub mod config;
pub mod metrics_defs;
pub mod reconciler;
pub mod relation;
pub mod snapshot;
pub mod state;
pub mod status;

#[cfg(test)]
mod testutils;

pub use config::{AccessRulesError, Config};
pub use reconciler::{Event, ReconcileError, Reconciler, Reconciliation};
pub use relation::{IngressProvider, RelationError, RelationId, Requester, RequesterData};
pub use snapshot::RelationSnapshot;
pub use state::{InvalidConfig, ReconcileState};
pub use status::{Blocker, Status, StatusSink};
