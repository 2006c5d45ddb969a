//! Error types for form loading, evaluation and submission

use thiserror::Error;

/// Top-level error surfaced to a form host
#[derive(Debug, Error)]
pub enum FormError {
    /// Remote call failed or returned an unusable body
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Required answers are missing; the answers are left untouched
    #[error("Validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    /// The schema is structurally unusable
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Draft or preference storage failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// No form with that id was loaded
    #[error("Form not found: {0}")]
    FormNotFound(String),

    /// An operation needs a selected form
    #[error("No form selected")]
    NoFormSelected,
}

/// Errors talking to the insurance API or an option endpoint
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport level failure
    #[error("Request failed: {0}")]
    Request(String),

    /// Non-2xx response
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Body could not be decoded
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Structural problems detected when a form is selected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Duplicate field id '{0}'")]
    DuplicateId(String),

    #[error("Field '{field}' refers to itself through '{attribute}'")]
    SelfReference { field: String, attribute: &'static str },

    #[error("Field '{field}' depends on unknown field '{depends_on}'")]
    UnknownDependency { field: String, depends_on: String },

    #[error("Field '{field}' is nested deeper than {limit} levels")]
    TooDeep { field: String, limit: usize },
}

/// Errors from draft and preference stores
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
