//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for parsing genomic values
pub type Result<T> = std::result::Result<T, CommonError>;

/// Raised when a textual genomic value is malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Invalid region '{input}': {reason}")]
    InvalidRegion { input: String, reason: String },

    #[error("Invalid variant '{input}': {reason}")]
    InvalidVariant { input: String, reason: String },

    #[error("Invalid list '{input}': {reason}")]
    InvalidLogicalList { input: String, reason: String },
}

impl CommonError {
    pub fn invalid_region(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRegion {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_variant(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVariant {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_list(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLogicalList {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
