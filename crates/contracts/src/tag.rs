//! VariantTag - 变体的规范标签 (判别字段的值)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Canonical tag of a concrete variant, e.g. `"blog.blogone"`.
///
/// Built once per registry entry and cloned into every validated record.
/// Comparison is exact and case-sensitive; hashing matches `str` so tag
/// indexes can be queried with a plain `&str`.
///
/// ```
/// use contracts::VariantTag;
///
/// let tag = VariantTag::from("blog.blogone");
/// assert_eq!(tag.as_str(), "blog.blogone");
/// ```
#[derive(Clone)]
pub struct VariantTag(Arc<str>);

impl VariantTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for VariantTag {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VariantTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariantTag {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for VariantTag {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&VariantTag> for serde_json::Value {
    fn from(tag: &VariantTag) -> Self {
        serde_json::Value::String(tag.as_str().to_string())
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariantTag({:?})", self.0)
    }
}

impl PartialEq for VariantTag {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for VariantTag {}

impl PartialEq<str> for VariantTag {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for VariantTag {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl Hash for VariantTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for VariantTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for VariantTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}
