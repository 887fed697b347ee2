//! Metrics definitions for the reconciler.

use shared::metrics_defs::{MetricDef, MetricType};

pub const RECONCILE_PASS: MetricDef = MetricDef {
    name: "reconcile.pass",
    metric_type: MetricType::Counter,
    description: "Number of reconciliation passes, tagged by event",
};

pub const RECONCILE_BLOCKED: MetricDef = MetricDef {
    name: "reconcile.blocked",
    metric_type: MetricType::Counter,
    description: "Number of passes that ended blocked, tagged by reason",
};

pub const RECONCILE_ACTIVE: MetricDef = MetricDef {
    name: "reconcile.active",
    metric_type: MetricType::Counter,
    description: "Number of passes that ended active",
};

pub const RECONCILE_DEFERRED: MetricDef = MetricDef {
    name: "reconcile.deferred",
    metric_type: MetricType::Counter,
    description: "Number of relation events deferred for a later pass",
};

pub const ROUTE_PUBLISHED: MetricDef = MetricDef {
    name: "route.published",
    metric_type: MetricType::Counter,
    description: "Number of urls published to requesters",
};

pub const ROUTE_COUNT: MetricDef = MetricDef {
    name: "route.count",
    metric_type: MetricType::Gauge,
    description: "Number of routes in the last generated proxy configuration",
};

pub const ALL_METRICS: &[MetricDef] = &[
    RECONCILE_PASS,
    RECONCILE_BLOCKED,
    RECONCILE_ACTIVE,
    RECONCILE_DEFERRED,
    ROUTE_PUBLISHED,
    ROUTE_COUNT,
];
