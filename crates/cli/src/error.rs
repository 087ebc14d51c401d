//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// File not found
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// Manifest could not be turned into a dispatcher
    #[error("Dispatcher configuration failed: {message}")]
    Configuration { message: String },

    /// Input file is not valid JSON
    #[error("Failed to parse input: {message}")]
    InputParse { message: String },

    /// Input did not pass validation
    #[error("Input validation failed: {invalid} of {total} record(s) rejected")]
    InvalidInput { invalid: usize, total: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn input_parse(message: impl Into<String>) -> Self {
        Self::InputParse {
            message: message.into(),
        }
    }
}
