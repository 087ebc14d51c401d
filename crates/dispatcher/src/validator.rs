//! Construction-time declaration checks
//!
//! Rules:
//! - the variant registry must be declared
//! - the variant registry must not be empty
//! - the discriminator field name, if declared, must be a non-empty string
//!
//! Returns the first error encountered. Runs once per dispatcher construction.

use contracts::TypedModel;
use serde_json::Value;

use crate::discriminator::DEFAULT_DISCRIMINATOR_FIELD;
use crate::error::{ConfigurationError, FIELD_NAME_ATTRIBUTE, REGISTRY_ATTRIBUTE};
use crate::registry::VariantRegistry;

/// Check a dispatcher declaration
///
/// Returns the registry and the resolved discriminator field name.
pub fn validate_declaration<M: TypedModel>(
    dispatcher: &str,
    registry: Option<VariantRegistry<M>>,
    field_name: Option<Value>,
) -> Result<(VariantRegistry<M>, String), ConfigurationError> {
    let registry = validate_registry(dispatcher, registry)?;
    let field_name = validate_field_name(dispatcher, field_name)?;
    Ok((registry, field_name))
}

fn validate_registry<M: TypedModel>(
    dispatcher: &str,
    registry: Option<VariantRegistry<M>>,
) -> Result<VariantRegistry<M>, ConfigurationError> {
    let registry = registry.ok_or_else(|| ConfigurationError::MissingAttribute {
        dispatcher: dispatcher.to_string(),
        attribute: REGISTRY_ATTRIBUTE,
    })?;

    if registry.is_empty() {
        return Err(ConfigurationError::EmptyRegistry {
            dispatcher: dispatcher.to_string(),
            attribute: REGISTRY_ATTRIBUTE,
        });
    }

    Ok(registry)
}

fn validate_field_name(
    dispatcher: &str,
    field_name: Option<Value>,
) -> Result<String, ConfigurationError> {
    match field_name {
        None => Ok(DEFAULT_DISCRIMINATOR_FIELD.to_string()),
        Some(Value::String(name)) if name.is_empty() => Err(ConfigurationError::EmptyFieldName {
            dispatcher: dispatcher.to_string(),
            attribute: FIELD_NAME_ATTRIBUTE,
        }),
        Some(Value::String(name)) => Ok(name),
        Some(_) => Err(ConfigurationError::NotAString {
            dispatcher: dispatcher.to_string(),
            attribute: FIELD_NAME_ATTRIBUTE,
        }),
    }
}
