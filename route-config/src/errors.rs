use thiserror::Error;

/// Errors raised while turning a route template into a concrete route.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The template references a variable that is not provided.
    ///
    /// Fix the template so it only uses `model_name`, `unit_name` and `app_name`.
    #[error(
        "unable to render the template {template:?}: {key:?} unknown; \
         supported variables are `model_name`, `unit_name` and `app_name`"
    )]
    UndefinedVariable { template: String, key: String },

    /// A placeholder is not closed or does not contain a plain variable name.
    #[error("malformed template {template:?}: {reason}")]
    MalformedTemplate {
        template: String,
        reason: &'static str,
    },

    /// No host-match rule can be derived from the url.
    ///
    /// Set the rule explicitly, or fix the url.
    #[error("unable to derive a rule from {url:?}; ensure that the url is valid")]
    RuleDerivation { url: String },
}
