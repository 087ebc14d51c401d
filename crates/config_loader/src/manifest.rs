//! Dispatcher manifest - declarative description of a variant family

use contracts::WireRecord;
use record_store::{FieldDecl, FieldKind, FieldRule};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Top-level manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DispatcherManifest {
    /// Dispatcher name, used in configuration errors and metrics
    #[validate(length(min = 1, message = "dispatcher name cannot be empty"))]
    pub name: String,

    /// Discriminator field name; kept raw so non-string values reach the
    /// declaration check unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator_field: Option<Value>,

    /// Shared context handed to every variant schema
    #[serde(default, skip_serializing_if = "WireRecord::is_empty")]
    pub context: WireRecord,

    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<VariantManifest>,
}

impl DispatcherManifest {
    /// Discriminator name as a string, if declared as one
    pub fn discriminator_name(&self) -> Option<&str> {
        self.discriminator_field.as_ref().and_then(Value::as_str)
    }

    /// Every field declared unique by any variant, without duplicates
    pub fn unique_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for field in self.variants.iter().flat_map(|v| &v.fields) {
            if field.unique && !fields.contains(&field.name) {
                fields.push(field.name.clone());
            }
        }
        fields
    }
}

/// One variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VariantManifest {
    #[validate(length(min = 1, message = "variant tag cannot be empty"))]
    pub tag: String,

    #[serde(default)]
    #[validate(nested)]
    pub fields: Vec<FieldManifest>,
}

impl VariantManifest {
    pub fn decls(&self) -> Vec<FieldDecl> {
        self.fields.iter().map(FieldManifest::to_decl).collect()
    }
}

/// One declared field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FieldManifest {
    #[validate(length(min = 1, message = "field name cannot be empty"))]
    pub name: String,

    pub kind: FieldKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldManifest {
    pub fn rule(&self) -> FieldRule {
        let nullable = self.nullable;
        match self.kind {
            FieldKind::Char => FieldRule::Char {
                max_length: self.max_length,
                nullable,
            },
            FieldKind::Slug => FieldRule::Slug {
                max_length: self.max_length,
                nullable,
            },
            FieldKind::Integer => FieldRule::Integer {
                min: self.min,
                max: self.max,
                nullable,
            },
            FieldKind::Boolean => FieldRule::Boolean { nullable },
        }
    }

    pub fn to_decl(&self) -> FieldDecl {
        FieldDecl {
            name: self.name.clone(),
            rule: self.rule(),
            required: self.required,
            unique: self.unique,
        }
    }
}
