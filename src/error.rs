use thiserror::Error;

/// Errors that abort a whole extraction run.
///
/// `Extractor::extract` never surfaces these; they are reported to the diagnostics
/// sink and turned into an empty result. `Extractor::try_extract` returns them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Workflow node at index {index} is not a JSON object")]
    MalformedWorkflowNode { index: usize },
}

/// Errors that can occur while parsing or rendering a format template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unbalanced brace at position {position}")]
    UnbalancedBrace { position: usize },

    #[error("Empty placeholder at position {position}")]
    EmptyField { position: usize },

    #[error("Unsupported format spec '{spec}' for field '{field}'")]
    UnsupportedSpec { field: String, spec: String },

    #[error("Field '{0}' is not available")]
    MissingField(String),

    #[error("Value '{value}' of field '{field}' cannot be formatted with spec '{spec}'")]
    IncompatibleValue {
        field: String,
        spec: String,
        value: String,
    },
}

/// Errors that can occur when loading a user-supplied rule catalog.
#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("Failed to parse catalog JSON: {0}")]
    JsonParseError(String),

    #[error("Failed to read catalog file: {0}")]
    Io(String),

    #[error("Template '{template}' of field '{field}' is invalid: {source}")]
    InvalidTemplate {
        field: String,
        template: String,
        source: TemplateError,
    },

    #[error("Rule {location} is invalid: {reason}")]
    InvalidRule { location: String, reason: String },
}
