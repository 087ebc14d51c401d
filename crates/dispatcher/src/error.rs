//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Attribute name of the variant registry in configuration messages
pub const REGISTRY_ATTRIBUTE: &str = "variant_registry";

/// Attribute name of the discriminator field name in configuration messages
pub const FIELD_NAME_ATTRIBUTE: &str = "discriminator_field_name";

/// Programmer errors detected while constructing a dispatcher
///
/// Never caused by end-user data and never retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required declaration is absent
    #[error("`{dispatcher}` is missing a `{dispatcher}.{attribute}` attribute")]
    MissingAttribute {
        dispatcher: String,
        attribute: &'static str,
    },

    /// The registry was declared without any variant
    #[error("`{dispatcher}.{attribute}` must not be empty")]
    EmptyRegistry {
        dispatcher: String,
        attribute: &'static str,
    },

    /// The discriminator field name was declared with a non-string value
    #[error("`{dispatcher}.{attribute}` must be a string")]
    NotAString {
        dispatcher: String,
        attribute: &'static str,
    },

    /// The discriminator field name was declared as an empty string
    #[error("`{dispatcher}.{attribute}` must be a non-empty string")]
    EmptyFieldName {
        dispatcher: String,
        attribute: &'static str,
    },

    /// Two registry entries share a variant or a tag
    #[error("variant '{tag}' is registered more than once")]
    DuplicateVariant { tag: String },
}

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Construction-time configuration error
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Instance of a variant the registry does not know
    #[error("variant '{tag}' is not registered with `{dispatcher}`")]
    UnregisteredVariant { dispatcher: String, tag: String },

    /// Positional targets do not line up with the batch
    #[error("batch has {expected} records but {actual} targets were supplied")]
    TargetCountMismatch { expected: usize, actual: usize },

    /// Storage or construction error (from contract)
    #[error("storage error: {0}")]
    Contract(#[from] ContractError),
}

impl DispatcherError {
    /// Create an unregistered variant error
    pub fn unregistered(dispatcher: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::UnregisteredVariant {
            dispatcher: dispatcher.into(),
            tag: tag.into(),
        }
    }
}
