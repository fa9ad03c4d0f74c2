//! Engine error types
//!
//! Build errors are raised before any backend call and are never retried.
//! Backend errors come from the document store and surface either as a hard
//! failure (single queries) or as an error event (batched queries).

use cellbase_common::CommonError;
use thiserror::Error;

use crate::models::EntityKind;

/// Result alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// A query could not be turned into a backend request
#[derive(Error, Debug)]
pub enum QueryBuildError {
    #[error("Unknown field '{field}' for entity '{entity}'")]
    UnknownField { entity: EntityKind, field: String },

    #[error("Operation '{operation}' on entity '{entity}' requires a facet field")]
    MissingFacet {
        entity: EntityKind,
        operation: &'static str,
    },

    #[error("groupBy requires at least one field")]
    EmptyGroupBy,

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Operation '{operation}' is not supported for entity '{entity}'")]
    Unsupported { entity: EntityKind, operation: String },

    #[error(transparent)]
    Malformed(#[from] CommonError),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl QueryBuildError {
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(entity: EntityKind, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            entity,
            operation: operation.into(),
        }
    }

    /// The offending field, when the error concerns one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownField { field, .. } | Self::InvalidValue { field, .. } => Some(field),
            Self::InvalidParameter { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Failure reported by a document backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend I/O error: {0}")]
    Io(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to decode document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unknown collection '{0}'")]
    UnknownCollection(String),

    #[error("Not supported by this backend: {0}")]
    Unsupported(String),
}

impl BackendError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }
}

/// Any failure of an engine operation
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Build(#[from] QueryBuildError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl EngineError {
    pub fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }

    /// Stable machine-readable code used in events and HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::Build(_) => "VALIDATION_ERROR",
            Self::Backend(_) => "BACKEND_ERROR",
        }
    }
}

impl From<CommonError> for EngineError {
    fn from(err: CommonError) -> Self {
        Self::Build(QueryBuildError::Malformed(err))
    }
}
