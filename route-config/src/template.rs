//! Strict `{{ variable }}` substitution for route templates.
//!
//! Only three variables exist: `model_name`, `unit_name` and `app_name`. Text
//! outside of `{{ ... }}` is copied verbatim, so Traefik rules such as
//! ``Host(`{{app_name}}.example.com`)`` render as expected.
//!
//! Rendering fails closed: a placeholder naming any other variable is an
//! error, never left in the output or replaced with an empty string.

use crate::errors::RenderError;

/// Names of the variables a template may reference.
pub const VARIABLES: [&str; 3] = ["model_name", "unit_name", "app_name"];

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Values substituted into a route template for one requester.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateContext {
    pub model_name: String,
    pub unit_name: String,
    pub app_name: String,
}

impl TemplateContext {
    pub fn new<M, U, A>(model_name: M, unit_name: U, app_name: A) -> Self
    where
        M: Into<String>,
        U: Into<String>,
        A: Into<String>,
    {
        TemplateContext {
            model_name: model_name.into(),
            unit_name: unit_name.into(),
            app_name: app_name.into(),
        }
    }

    /// Returns the value bound to `key`, or None if the variable is not supported.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "model_name" => Some(&self.model_name),
            "unit_name" => Some(&self.unit_name),
            "app_name" => Some(&self.app_name),
            _ => None,
        }
    }
}

/// Renders `template` against `ctx`.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String, RenderError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        rendered.push_str(&rest[..start]);

        let inner = &rest[start + OPEN.len()..];
        let end = inner
            .find(CLOSE)
            .ok_or_else(|| malformed(template, "unclosed placeholder"))?;

        let key = inner[..end].trim();
        if !is_identifier(key) {
            return Err(malformed(
                template,
                "placeholders must contain a single variable name",
            ));
        }

        let value = ctx.get(key).ok_or_else(|| RenderError::UndefinedVariable {
            template: template.to_string(),
            key: key.to_string(),
        })?;
        rendered.push_str(value);

        rest = &inner[end + CLOSE.len()..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn malformed(template: &str, reason: &'static str) -> RenderError {
    RenderError::MalformedTemplate {
        template: template.to_string(),
        reason,
    }
}
