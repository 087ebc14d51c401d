//! Field rules - scalar coercion and checks
//!
//! Messages follow the wording REST clients already expect
//! (`"This field is required."`, ...).

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_NULL: &str = "This field may not be null.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_STRING: &str = "Not a valid string.";
pub const MSG_SLUG: &str =
    "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.";
pub const MSG_INTEGER: &str = "A valid integer is required.";
pub const MSG_BOOLEAN: &str = "Must be a valid boolean.";

/// Field kind as written in a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Char,
    Slug,
    Integer,
    Boolean,
}

/// Coercion and constraints of one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    Char {
        max_length: Option<usize>,
        nullable: bool,
    },
    Slug {
        max_length: Option<usize>,
        nullable: bool,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
        nullable: bool,
    },
    Boolean {
        nullable: bool,
    },
}

impl FieldRule {
    pub fn char(max_length: usize) -> Self {
        Self::Char {
            max_length: Some(max_length),
            nullable: false,
        }
    }

    pub fn slug(max_length: usize) -> Self {
        Self::Slug {
            max_length: Some(max_length),
            nullable: false,
        }
    }

    pub fn integer() -> Self {
        Self::Integer {
            min: None,
            max: None,
            nullable: false,
        }
    }

    pub fn boolean() -> Self {
        Self::Boolean { nullable: false }
    }

    /// Same rule, accepting `null`
    pub fn nullable(self) -> Self {
        match self {
            Self::Char { max_length, .. } => Self::Char {
                max_length,
                nullable: true,
            },
            Self::Slug { max_length, .. } => Self::Slug {
                max_length,
                nullable: true,
            },
            Self::Integer { min, max, .. } => Self::Integer {
                min,
                max,
                nullable: true,
            },
            Self::Boolean { .. } => Self::Boolean { nullable: true },
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Char { nullable, .. }
            | Self::Slug { nullable, .. }
            | Self::Integer { nullable, .. }
            | Self::Boolean { nullable } => *nullable,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Char { .. } => FieldKind::Char,
            Self::Slug { .. } => FieldKind::Slug,
            Self::Integer { .. } => FieldKind::Integer,
            Self::Boolean { .. } => FieldKind::Boolean,
        }
    }

    /// Value stored when the field is omitted on create
    pub fn default_value(&self) -> Value {
        if self.is_nullable() {
            return Value::Null;
        }
        match self {
            Self::Char { .. } | Self::Slug { .. } => Value::String(String::new()),
            Self::Integer { .. } => Value::from(0),
            Self::Boolean { .. } => Value::Bool(false),
        }
    }

    /// Coerce `value` into its stored form
    ///
    /// # Errors
    /// The first failing check's message.
    pub fn clean(&self, value: &Value) -> Result<Value, String> {
        if value.is_null() {
            return if self.is_nullable() {
                Ok(Value::Null)
            } else {
                Err(MSG_NULL.to_string())
            };
        }

        match self {
            Self::Char { max_length, .. } => clean_string(value, *max_length).map(Value::String),
            Self::Slug { max_length, .. } => {
                let s = clean_string(value, *max_length)?;
                if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                    Ok(Value::String(s))
                } else {
                    Err(MSG_SLUG.to_string())
                }
            }
            Self::Integer { min, max, .. } => {
                let n = as_integer(value).ok_or_else(|| MSG_INTEGER.to_string())?;
                if let Some(min) = min.filter(|min| n < *min) {
                    return Err(format!(
                        "Ensure this value is greater than or equal to {min}."
                    ));
                }
                if let Some(max) = max.filter(|max| n > *max) {
                    return Err(format!("Ensure this value is less than or equal to {max}."));
                }
                Ok(Value::from(n))
            }
            Self::Boolean { .. } => as_boolean(value)
                .map(Value::Bool)
                .ok_or_else(|| MSG_BOOLEAN.to_string()),
        }
    }
}

fn clean_string(value: &Value, max_length: Option<usize>) -> Result<String, String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(MSG_STRING.to_string()),
    };

    if s.is_empty() {
        return Err(MSG_BLANK.to_string());
    }
    if let Some(max) = max_length {
        if s.chars().count() > max {
            return Err(format!(
                "Ensure this field has no more than {max} characters."
            ));
        }
    }
    Ok(s)
}

/// 2^63，i64 可表示范围的上界 (不含)
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(f))
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "true" | "True" | "1" => Some(true),
            "false" | "False" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A declared field of a variant
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub rule: FieldRule,
    /// Must be present on create; `None` means "required unless nullable"
    pub required: Option<bool>,
    /// Value must be unique across the store
    pub unique: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, rule: FieldRule) -> Self {
        Self {
            name: name.into(),
            rule,
            required: None,
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(!self.rule.is_nullable())
    }
}
