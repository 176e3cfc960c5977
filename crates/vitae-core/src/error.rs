//! Error types for vitae operations.
//!
//! Plain lookups return `Option`/empty collections; absence is an
//! expected outcome, not an error. These types cover the cases that
//! must be surfaced: invalid input, missing referents that matter, and
//! storage failures.

use std::error::Error;
use std::fmt;

/// Result type for vitae operations.
pub type Result<T> = std::result::Result<T, VitaeError>;

/// Errors that can occur during vitae operations.
#[derive(Debug, Clone)]
pub enum VitaeError {
    /// Invalid input (empty label, missing endpoint, out-of-range value).
    Validation(ValidationError),
    /// A referenced record is absent where absence must be surfaced.
    NotFound(NotFoundError),
    /// Underlying persistence failure.
    Storage(String),
    /// Serialization errors.
    Serialization(String),
    /// I/O errors (wrapped).
    Io(String),
}

impl fmt::Display for VitaeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VitaeError::Validation(e) => write!(f, "Validation error: {}", e),
            VitaeError::NotFound(e) => write!(f, "Not found: {}", e),
            VitaeError::Storage(msg) => write!(f, "Storage error: {}", msg),
            VitaeError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            VitaeError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for VitaeError {}

impl From<std::io::Error> for VitaeError {
    fn from(e: std::io::Error) -> Self {
        VitaeError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for VitaeError {
    fn from(e: serde_json::Error) -> Self {
        VitaeError::Serialization(e.to_string())
    }
}

/// Invalid input data.
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Entity label is empty or whitespace-only.
    EmptyLabel,
    /// A required field is missing.
    MissingField(String),
    /// Edge endpoint does not reference an existing entity.
    MissingEndpoint { relation: String, entity: String },
    /// Numeric field outside its allowed range.
    OutOfRange { field: String, value: f64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyLabel => write!(f, "entity label must not be empty"),
            ValidationError::MissingField(field) => write!(f, "missing required field: {}", field),
            ValidationError::MissingEndpoint { relation, entity } => {
                write!(f, "relation {} references missing entity {}", relation, entity)
            }
            ValidationError::OutOfRange { field, value } => {
                write!(f, "{} out of range: {} (must be 0.0-1.0)", field, value)
            }
        }
    }
}

/// Missing referents that must be surfaced.
#[derive(Debug, Clone)]
pub enum NotFoundError {
    Entity(String),
    Relation(String),
    FeedbackRecord(String),
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundError::Entity(id) => write!(f, "entity {}", id),
            NotFoundError::Relation(id) => write!(f, "relation {}", id),
            NotFoundError::FeedbackRecord(id) => write!(f, "feedback record {}", id),
        }
    }
}

// Convenience constructors
impl VitaeError {
    pub fn empty_label() -> Self {
        VitaeError::Validation(ValidationError::EmptyLabel)
    }

    pub fn missing_endpoint(relation: impl Into<String>, entity: impl Into<String>) -> Self {
        VitaeError::Validation(ValidationError::MissingEndpoint {
            relation: relation.into(),
            entity: entity.into(),
        })
    }

    pub fn entity_not_found(id: impl Into<String>) -> Self {
        VitaeError::NotFound(NotFoundError::Entity(id.into()))
    }

    pub fn relation_not_found(id: impl Into<String>) -> Self {
        VitaeError::NotFound(NotFoundError::Relation(id.into()))
    }

    pub fn record_not_found(id: impl Into<String>) -> Self {
        VitaeError::NotFound(NotFoundError::FeedbackRecord(id.into()))
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        VitaeError::Storage(msg.into())
    }
}
