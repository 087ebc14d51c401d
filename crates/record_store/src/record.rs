//! Record - runtime-described variant instance

use contracts::{TypedModel, VariantTag, WireRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored or not-yet-stored instance of a manifest-declared variant
///
/// The variant handle is the tag itself, so `Kind = VariantTag`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identity assigned by the store; `None` until inserted
    pub id: Option<u64>,
    pub tag: VariantTag,
    pub fields: WireRecord,
}

impl Record {
    /// Create an unsaved record
    pub fn new(tag: impl Into<VariantTag>, fields: WireRecord) -> Self {
        Self {
            id: None,
            tag: tag.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

impl TypedModel for Record {
    type Kind = VariantTag;

    fn kind(&self) -> VariantTag {
        self.tag.clone()
    }

    fn natural_key(kind: &VariantTag) -> VariantTag {
        kind.clone()
    }
}
