//! Layered error definitions
//!
//! Categorized by source: config / storage / construction

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Storage Errors =====
    /// Storage layer rejected a write
    #[error("storage error for '{tag}': {message}")]
    Storage { tag: String, message: String },

    /// Unique constraint violated on write
    #[error("unique constraint violated for '{tag}': {field} = {value}")]
    UniqueViolation {
        tag: String,
        field: String,
        value: String,
    },

    /// Row to update does not exist
    #[error("record not found: {tag} #{id}")]
    NotFound { tag: String, id: u64 },

    // ===== Construction Errors =====
    /// Variant schema could not build or mutate an instance
    #[error("cannot construct '{tag}': {message}")]
    Construction { tag: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create storage error
    pub fn storage(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Create construction error
    pub fn construction(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            tag: tag.into(),
            message: message.into(),
        }
    }
}
