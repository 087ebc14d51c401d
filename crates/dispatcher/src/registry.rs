//! Variant registry
//!
//! A builder collects variant entries, `build()` checks the kind <-> tag
//! bijection and freezes them into an immutable, cheaply shared index.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use contracts::{
    ErrorSet, ObjectValidator, SchemaFactory, SharedContext, TypedModel, VariantSchema,
    VariantTag, WireRecord,
};

use crate::error::ConfigurationError;

/// One registered variant
pub struct VariantEntry<M: TypedModel> {
    kind: M::Kind,
    tag: VariantTag,
    factory: SchemaFactory<M>,
    object_validator: Option<ObjectValidator<M>>,
}

impl<M: TypedModel> VariantEntry<M> {
    pub fn kind(&self) -> &M::Kind {
        &self.kind
    }

    pub fn tag(&self) -> &VariantTag {
        &self.tag
    }

    pub fn has_object_validator(&self) -> bool {
        self.object_validator.is_some()
    }

    /// Create a schema instance bound to `context`
    pub fn instantiate(&self, context: SharedContext) -> Box<dyn VariantSchema<M>> {
        (self.factory)(context)
    }

    /// Run the object-level hook, if any
    pub fn validate_object(
        &self,
        data: &WireRecord,
        target: Option<&M>,
        context: &SharedContext,
    ) -> Result<(), ErrorSet> {
        match &self.object_validator {
            Some(validator) => validator(data, target, context),
            None => Ok(()),
        }
    }
}

impl<M: TypedModel> fmt::Debug for VariantEntry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantEntry")
            .field("kind", &self.kind)
            .field("tag", &self.tag)
            .field("object_validator", &self.object_validator.is_some())
            .finish()
    }
}

// ============================================================================
// VariantRegistryBuilder - for constructing registries
// ============================================================================

/// Builder for constructing a [`VariantRegistry`].
///
/// # Example
/// ```ignore
/// let registry = VariantRegistryBuilder::new()
///     .register(BlogKind::One, |ctx| Box::new(BlogOneSchema::new(ctx)))
///     .register(BlogKind::Two, |ctx| Box::new(BlogTwoSchema::new(ctx)))
///     .build()?;
/// ```
pub struct VariantRegistryBuilder<M: TypedModel> {
    entries: Vec<VariantEntry<M>>,
}

impl<M: TypedModel> VariantRegistryBuilder<M> {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a variant schema.
    pub fn register<F>(mut self, kind: M::Kind, factory: F) -> Self
    where
        F: Fn(SharedContext) -> Box<dyn VariantSchema<M>> + Send + Sync + 'static,
    {
        self.push(kind, Arc::new(factory), None);
        self
    }

    /// Register a variant schema with an object-level validation hook.
    pub fn register_with_validator<F, V>(mut self, kind: M::Kind, factory: F, validator: V) -> Self
    where
        F: Fn(SharedContext) -> Box<dyn VariantSchema<M>> + Send + Sync + 'static,
        V: Fn(&WireRecord, Option<&M>, &SharedContext) -> Result<(), ErrorSet>
            + Send
            + Sync
            + 'static,
    {
        self.push(kind, Arc::new(factory), Some(Arc::new(validator)));
        self
    }

    /// Register an already shared factory (mutable version).
    pub fn push(
        &mut self,
        kind: M::Kind,
        factory: SchemaFactory<M>,
        object_validator: Option<ObjectValidator<M>>,
    ) {
        let tag = M::natural_key(&kind);
        self.entries.push(VariantEntry {
            kind,
            tag,
            factory,
            object_validator,
        });
    }

    /// Number of entries registered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the entries into an immutable registry.
    ///
    /// # Errors
    /// `DuplicateVariant` if two entries share a kind or a tag.
    pub fn build(self) -> Result<VariantRegistry<M>, ConfigurationError> {
        let mut by_kind = HashMap::with_capacity(self.entries.len());
        let mut by_tag = HashMap::with_capacity(self.entries.len());

        for (idx, entry) in self.entries.iter().enumerate() {
            if by_kind.insert(entry.kind.clone(), idx).is_some()
                || by_tag.insert(entry.tag.clone(), idx).is_some()
            {
                return Err(ConfigurationError::DuplicateVariant {
                    tag: entry.tag.to_string(),
                });
            }
        }

        Ok(VariantRegistry {
            inner: Arc::new(RegistryInner {
                entries: self.entries,
                by_kind,
                by_tag,
            }),
        })
    }
}

impl<M: TypedModel> Default for VariantRegistryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// VariantRegistry - frozen bidirectional index
// ============================================================================

struct RegistryInner<M: TypedModel> {
    entries: Vec<VariantEntry<M>>,
    by_kind: HashMap<M::Kind, usize>,
    by_tag: HashMap<VariantTag, usize>,
}

/// Immutable mapping between variant kinds, tags and schema factories.
///
/// Cloning shares the same index, so one registry can back any number of
/// dispatchers across threads.
pub struct VariantRegistry<M: TypedModel> {
    inner: Arc<RegistryInner<M>>,
}

impl<M: TypedModel> VariantRegistry<M> {
    /// Start building a registry.
    pub fn builder() -> VariantRegistryBuilder<M> {
        VariantRegistryBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &VariantEntry<M>> {
        self.inner.entries.iter()
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &VariantTag> {
        self.iter().map(VariantEntry::tag)
    }

    /// Entry of a variant kind.
    pub fn entry(&self, kind: &M::Kind) -> Option<&VariantEntry<M>> {
        self.inner
            .by_kind
            .get(kind)
            .map(|&idx| &self.inner.entries[idx])
    }

    /// Variant kind for a tag (exact, case-sensitive).
    pub fn kind_of(&self, tag: &str) -> Option<&M::Kind> {
        self.inner
            .by_tag
            .get(tag)
            .map(|&idx| &self.inner.entries[idx].kind)
    }

    /// Tag of a registered variant kind.
    pub fn tag_of(&self, kind: &M::Kind) -> Option<&VariantTag> {
        self.entry(kind).map(VariantEntry::tag)
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.inner.by_tag.contains_key(tag)
    }

    /// True if both handles share the same index.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<M: TypedModel> Clone for VariantRegistry<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: TypedModel> fmt::Debug for VariantRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
