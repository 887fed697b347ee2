//! Route templates and the descriptors rendered from them.
//!
//! A `RouteTemplate` comes straight from operator configuration and may
//! contain placeholders. It is checked once with `validate` (or `is_valid`),
//! then rendered per requester into a `RouteDescriptor`.

use crate::errors::RenderError;
use crate::rule::derive_rule;
use crate::template::{self, TemplateContext};
use thiserror::Error;

const ROOT_URL: &str = "root_url";
const RULE: &str = "rule";

/// Route configuration as supplied by the operator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTemplate {
    pub root_url: String,
    /// Traefik rule. Derived from the rendered `root_url` when absent or empty.
    pub rule: Option<String>,
}

/// Route configuration rendered for a single requester.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub root_url: String,
    pub rule: String,
    /// Easily recognizable identifier for the proxy router and service.
    pub id: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("`{field}` not configured; set it with `config {field}=<{}>`", .field.to_uppercase())]
    Missing { field: &'static str },

    #[error("`{field}` {value:?} starts or ends with whitespace; it should be {trimmed:?}")]
    SurroundingWhitespace {
        field: &'static str,
        value: String,
        trimmed: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("failed to render the route config with dummy values: {0}")]
    Render(#[from] RenderError),

    #[error("invalid route config: {}", join_fields(.0))]
    Fields(Vec<FieldError>),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl RouteTemplate {
    pub fn new<U: Into<String>>(root_url: U, rule: Option<String>) -> Self {
        RouteTemplate {
            root_url: root_url.into(),
            rule,
        }
    }

    /// The configured rule, if any. An empty string counts as not configured.
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref().filter(|rule| !rule.is_empty())
    }

    /// Checks that the template can be rendered and that every configured field is usable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.root_url.is_empty() {
            // Rendering with dummy values must succeed for any real requester to succeed.
            self.render(&TemplateContext::new("foo", "bar", "baz"))?;
        }

        let mut errors = Vec::new();
        if let Some(rule) = self.rule() {
            errors.extend(check_field(RULE, rule));
        }
        errors.extend(check_field(ROOT_URL, &self.root_url));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Fields(errors))
        }
    }

    /// Like `validate`, but logs the problems instead of returning them.
    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(ValidationError::Render(e)) => {
                tracing::info!("failed to render the route config with dummy values");
                tracing::error!(error = %e, "invalid route config");
                false
            }
            Err(ValidationError::Fields(errors)) => {
                for e in errors {
                    tracing::error!(error = %e, "invalid route config");
                }
                false
            }
        }
    }

    /// Fills in the placeholders for one requester.
    pub fn render(&self, ctx: &TemplateContext) -> Result<RouteDescriptor, RenderError> {
        let root_url = template::render(&self.root_url, ctx)?;
        let rule = match self.rule() {
            Some(rule) => template::render(rule, ctx)?,
            None => derive_rule(&root_url)?,
        };

        let id = format!("{}-{}", ctx.unit_name.replace('/', "-"), ctx.model_name);

        Ok(RouteDescriptor { root_url, rule, id })
    }
}

fn check_field(field: &'static str, value: &str) -> Option<FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(FieldError::Missing { field });
    }

    if trimmed != value {
        return Some(FieldError::SurroundingWhitespace {
            field,
            value: value.to_string(),
            trimmed: trimmed.to_string(),
        });
    }

    None
}
