//! Typed model contracts
//!
//! A typed model is a closed family of record variants (usually a Rust enum).
//! The model reports which variant an instance is and the canonical tag of
//! each variant; everything else about storage stays behind `ModelStore`.

use serde_json::Value;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::{VariantTag, WireRecord};

/// A closed set of record variants sharing a base shape
///
/// `Kind` is the variant handle used as registry key. It is usually a
/// fieldless enum mirroring the model enum.
pub trait TypedModel: Send + Sync + 'static {
    /// Variant handle
    type Kind: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Variant of this instance
    fn kind(&self) -> Self::Kind;

    /// Canonical tag for a variant, e.g. `"blog.blogone"`
    ///
    /// Must be injective over the registered variants.
    fn natural_key(kind: &Self::Kind) -> VariantTag;
}

/// Read access to values already held by storage
///
/// Lets a variant schema report a unique-field collision while validating,
/// before anything is written.
pub trait UniqueLookup: Send + Sync {
    /// True if a stored row other than `exclude` holds `value` in `field`
    fn is_taken(&self, field: &str, value: &Value, exclude: Option<u64>) -> bool;
}

/// Auxiliary request-scoped data handed unchanged to every variant schema
///
/// Cloning shares the same allocation, so every schema bound to a dispatcher
/// sees the exact same context.
#[derive(Clone, Default)]
pub struct SharedContext {
    values: Arc<WireRecord>,
    unique_lookup: Option<Arc<dyn UniqueLookup>>,
}

impl SharedContext {
    pub fn new(values: WireRecord) -> Self {
        Self {
            values: Arc::new(values),
            unique_lookup: None,
        }
    }

    /// Context with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach the storage view used for unique-field checks
    pub fn with_unique_lookup(mut self, lookup: Arc<dyn UniqueLookup>) -> Self {
        self.unique_lookup = Some(lookup);
        self
    }

    pub fn unique_lookup(&self) -> Option<&dyn UniqueLookup> {
        self.unique_lookup.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &WireRecord {
        &self.values
    }

    /// True if both handles share the same allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values) && self.same_lookup(other)
    }

    fn same_lookup(&self, other: &Self) -> bool {
        match (&self.unique_lookup, &other.unique_lookup) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for SharedContext {
    fn eq(&self, other: &Self) -> bool {
        self.same_lookup(other) && self.values == other.values
    }
}

impl fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedContext")
            .field("values", &*self.values)
            .field("unique_lookup", &self.unique_lookup.is_some())
            .finish()
    }
}

impl From<WireRecord> for SharedContext {
    fn from(values: WireRecord) -> Self {
        Self::new(values)
    }
}
