//! Discriminator - conventions around the tag field
//!
//! Reads the tag from incoming records, computes it for outgoing instances,
//! and checks incoming values against the registry.

use std::fmt;

use contracts::{ErrorSet, TypedModel, VariantTag, WireRecord};
use serde_json::Value;

use crate::registry::VariantRegistry;

/// Field name used when a dispatcher does not declare one
pub const DEFAULT_DISCRIMINATOR_FIELD: &str = "type";

/// Message for a tag the registry does not know
pub const INVALID_CHOICE: &str = "invalid choice";

/// Message for a create request without a tag
pub const REQUIRED: &str = "required";

/// Message for an update whose tag names another variant than the target
pub const VARIANT_CHANGE: &str = "cannot change the variant of an existing record";

/// Tag field name bound to a frozen registry
pub struct Discriminator<M: TypedModel> {
    field_name: String,
    registry: VariantRegistry<M>,
}

impl<M: TypedModel> Discriminator<M> {
    pub fn new(field_name: impl Into<String>, registry: VariantRegistry<M>) -> Self {
        Self {
            field_name: field_name.into(),
            registry,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn registry(&self) -> &VariantRegistry<M> {
        &self.registry
    }

    /// Tag of an instance's concrete variant
    pub fn tag_of(&self, instance: &M) -> VariantTag {
        M::natural_key(&instance.kind())
    }

    /// Variant registered under `tag`
    pub fn variant_of(&self, tag: &str) -> Option<&M::Kind> {
        self.registry.kind_of(tag)
    }

    /// Raw discriminator value; `None` when the key is absent
    pub fn read<'a>(&self, record: &'a WireRecord) -> Option<&'a Value> {
        record.get(&self.field_name)
    }

    /// Resolve the variant named by `record`
    ///
    /// `Ok(None)` when the field is absent. A present value that is not a
    /// string or not a registered tag is an invalid choice.
    pub fn resolve(&self, record: &WireRecord) -> Result<Option<M::Kind>, ErrorSet> {
        let Some(value) = self.read(record) else {
            return Ok(None);
        };

        value
            .as_str()
            .and_then(|tag| self.variant_of(tag))
            .cloned()
            .map(Some)
            .ok_or_else(|| self.error(INVALID_CHOICE))
    }

    /// Error set holding `message` under the discriminator field
    pub fn error(&self, message: &str) -> ErrorSet {
        ErrorSet::single(&self.field_name, message)
    }
}

impl<M: TypedModel> Clone for Discriminator<M> {
    fn clone(&self) -> Self {
        Self {
            field_name: self.field_name.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<M: TypedModel> fmt::Debug for Discriminator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discriminator")
            .field("field_name", &self.field_name)
            .field("variants", &self.registry.len())
            .finish()
    }
}
