//! Templated route configuration for a Traefik reverse proxy.
//!
//! Operators configure a `root_url` and an optional `rule`, both of which may
//! reference `{{ model_name }}`, `{{ unit_name }}` and `{{ app_name }}`. This
//! crate validates those templates, renders them per requester and merges the
//! results into a single proxy configuration.

pub mod errors;
pub mod merger;
pub mod model;
pub mod rule;
pub mod template;

pub use errors::RenderError;
pub use merger::{ProxyConfig, RouteEntry, merge};
pub use model::{FieldError, RouteDescriptor, RouteTemplate, ValidationError};
pub use rule::derive_rule;
pub use template::{TemplateContext, render};
