//! TypedDispatcher - single record read/write paths

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use contracts::{ErrorSet, ModelStore, SharedContext, TypedModel, VariantSchema, VariantTag, WireRecord};

use crate::batch::BatchDispatcher;
use crate::discriminator::{Discriminator, INVALID_CHOICE, REQUIRED, VARIANT_CHANGE};
use crate::error::{ConfigurationError, DispatcherError};
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::registry::VariantRegistry;
use crate::validator;

/// Output of a successful validation, ready to be saved
///
/// Carries the resolved variant and the cleaned fields (without the
/// discriminator). Nothing has been constructed or persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord<K> {
    kind: K,
    tag: VariantTag,
    data: WireRecord,
}

impl<K> ValidatedRecord<K> {
    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn tag(&self) -> &VariantTag {
        &self.tag
    }

    /// Cleaned field data
    pub fn data(&self) -> &WireRecord {
        &self.data
    }

    pub fn into_data(self) -> WireRecord {
        self.data
    }

    /// Cleaned data with the discriminator re-attached under `field_name`
    pub fn to_wire(&self, field_name: &str) -> WireRecord {
        let mut record = self.data.clone();
        record.insert(field_name.to_string(), Value::from(&self.tag));
        record
    }
}

/// Builder for creating a [`TypedDispatcher`]
///
/// Declarations are checked once in [`DispatcherBuilder::build`].
pub struct DispatcherBuilder<M: TypedModel> {
    name: String,
    registry: Option<VariantRegistry<M>>,
    field_name: Option<Value>,
    context: SharedContext,
}

impl<M: TypedModel> DispatcherBuilder<M> {
    /// Create a new builder for a dispatcher type name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: None,
            field_name: None,
            context: SharedContext::empty(),
        }
    }

    /// Declare the variant registry
    pub fn registry(mut self, registry: VariantRegistry<M>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Declare the discriminator field name
    pub fn discriminator_field(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(Value::String(name.into()));
        self
    }

    /// Declare the discriminator field name from an unchecked value
    ///
    /// Used when the declaration comes from a configuration file.
    pub fn discriminator_field_value(mut self, value: Value) -> Self {
        self.field_name = Some(value);
        self
    }

    /// Shared context handed to every variant schema
    pub fn context(mut self, context: SharedContext) -> Self {
        self.context = context;
        self
    }

    /// Check the declaration and bind one schema per variant
    #[instrument(name = "dispatcher_builder_build", skip(self), fields(dispatcher = %self.name))]
    pub fn build(self) -> Result<TypedDispatcher<M>, ConfigurationError> {
        let (registry, field_name) =
            validator::validate_declaration(&self.name, self.registry, self.field_name)?;

        let schemas: HashMap<M::Kind, Box<dyn VariantSchema<M>>> = registry
            .iter()
            .map(|entry| (entry.kind().clone(), entry.instantiate(self.context.clone())))
            .collect();

        debug!(
            variants = registry.len(),
            field_name = %field_name,
            "Dispatcher constructed"
        );

        Ok(TypedDispatcher {
            name: self.name,
            discriminator: Discriminator::new(field_name, registry),
            schemas,
            context: self.context,
            metrics: Arc::new(DispatchMetrics::new()),
        })
    }
}

/// Dispatches records of a typed model to the schema of their variant
///
/// Holds only frozen state: the registry, the discriminator, one schema per
/// variant bound to the shared context. Construct one per logical request.
pub struct TypedDispatcher<M: TypedModel> {
    name: String,
    discriminator: Discriminator<M>,
    schemas: HashMap<M::Kind, Box<dyn VariantSchema<M>>>,
    context: SharedContext,
    metrics: Arc<DispatchMetrics>,
}

impl<M: TypedModel> TypedDispatcher<M> {
    /// Start building a dispatcher
    pub fn builder(name: impl Into<String>) -> DispatcherBuilder<M> {
        DispatcherBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured discriminator field name
    pub fn field_name(&self) -> &str {
        self.discriminator.field_name()
    }

    pub fn discriminator(&self) -> &Discriminator<M> {
        &self.discriminator
    }

    pub fn registry(&self) -> &VariantRegistry<M> {
        self.discriminator.registry()
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Schema bound to a variant
    pub fn schema(&self, kind: &M::Kind) -> Option<&dyn VariantSchema<M>> {
        self.schemas.get(kind).map(|schema| schema.as_ref())
    }

    /// Every bound schema with its variant, in registration order
    pub fn schemas(&self) -> impl Iterator<Item = (&M::Kind, &dyn VariantSchema<M>)> {
        self.registry().iter().filter_map(|entry| {
            self.schema(entry.kind())
                .map(|schema| (entry.kind(), schema))
        })
    }

    /// Batch view over this dispatcher
    pub fn batch(&self) -> BatchDispatcher<'_, M> {
        BatchDispatcher::new(self)
    }

    // ===== Read path =====

    /// Represent an instance as a wire record carrying its tag
    pub fn represent(&self, instance: &M) -> Result<WireRecord, DispatcherError> {
        let tag = self.discriminator.tag_of(instance);
        let schema = self
            .discriminator
            .variant_of(&tag)
            .and_then(|kind| self.schema(kind))
            .ok_or_else(|| DispatcherError::unregistered(&self.name, tag.as_str()))?;

        let mut record = schema.represent(instance);
        record.insert(self.field_name().to_string(), Value::from(&tag));

        self.metrics.inc_represented_count();
        observability::record_represented(&self.name, &tag);
        Ok(record)
    }

    // ===== Write path =====

    /// Validate a wire record for create (`target` absent) or update
    ///
    /// Side-effect free: no instance is constructed or persisted.
    ///
    /// # Errors
    /// An [`ErrorSet`] keyed by the discriminator field for tag problems, or by
    /// the variant's own field names for delegated errors.
    pub fn validate(
        &self,
        data: &WireRecord,
        target: Option<&M>,
        partial: bool,
    ) -> Result<ValidatedRecord<M::Kind>, ErrorSet> {
        let result = self.validate_record(data, target, partial);

        match &result {
            Ok(validated) => {
                self.metrics.inc_validated_count();
                observability::record_validation(&self.name, Some(validated.tag().as_str()), true);
                debug!(
                    dispatcher = %self.name,
                    variant = %validated.tag(),
                    partial,
                    update = target.is_some(),
                    "Record validated"
                );
            }
            Err(errors) => {
                self.metrics.inc_rejected_count();
                observability::record_validation(&self.name, None, false);
                debug!(
                    dispatcher = %self.name,
                    fields = ?errors.fields().collect::<Vec<_>>(),
                    "Record rejected"
                );
            }
        }

        result
    }

    fn validate_record(
        &self,
        data: &WireRecord,
        target: Option<&M>,
        partial: bool,
    ) -> Result<ValidatedRecord<M::Kind>, ErrorSet> {
        let kind = self.resolve_variant(data, target)?;

        let (Some(entry), Some(schema)) = (self.registry().entry(&kind), self.schema(&kind)) else {
            return Err(self.discriminator.error(INVALID_CHOICE));
        };

        let mut fields = data.clone();
        fields.remove(self.field_name());

        // 对象级校验只在字段全部通过后执行
        let cleaned = schema.validate(&fields, target, partial)?;
        entry.validate_object(&cleaned, target, &self.context)?;

        Ok(ValidatedRecord {
            kind,
            tag: entry.tag().clone(),
            data: cleaned,
        })
    }

    /// Pick the variant whose rules apply
    ///
    /// An explicit tag wins; on update without a tag the target's own variant
    /// is used; a create without a tag is rejected.
    fn resolve_variant(&self, data: &WireRecord, target: Option<&M>) -> Result<M::Kind, ErrorSet> {
        match (self.discriminator.resolve(data)?, target) {
            (Some(kind), Some(target)) if target.kind() != kind => {
                Err(self.discriminator.error(VARIANT_CHANGE))
            }
            (Some(kind), _) => Ok(kind),
            (None, Some(target)) => {
                let tag = self.discriminator.tag_of(target);
                self.discriminator
                    .variant_of(&tag)
                    .cloned()
                    .ok_or_else(|| self.discriminator.error(INVALID_CHOICE))
            }
            (None, None) => Err(self.discriminator.error(REQUIRED)),
        }
    }

    /// Construct or mutate an instance from validated data and persist it
    ///
    /// Without `target` a new instance is built and inserted; with `target`
    /// the validated fields are applied to it and it is updated in place.
    /// Not idempotent.
    ///
    /// `target` is consumed. When the store rejects the update the mutated
    /// instance is dropped and only the stored row keeps the last persisted
    /// state; reload it from the store before retrying.
    ///
    /// # Errors
    /// Construction and storage failures propagate unchanged.
    #[instrument(
        name = "dispatcher_save",
        skip(self, store, validated, target),
        fields(dispatcher = %self.name, variant = %validated.tag(), update = target.is_some())
    )]
    pub async fn save<S: ModelStore<M>>(
        &self,
        store: &S,
        validated: ValidatedRecord<M::Kind>,
        target: Option<M>,
    ) -> Result<M, DispatcherError> {
        let tag = validated.tag().clone();
        let schema = self
            .schema(validated.kind())
            .ok_or_else(|| DispatcherError::unregistered(&self.name, tag.as_str()))?;

        let result = match target {
            None => match schema.build(validated.into_data()) {
                Ok(instance) => store.insert(instance).await,
                Err(e) => Err(e),
            },
            Some(mut target) => match schema.apply(validated.into_data(), &mut target) {
                Ok(()) => store.update(&target).await.map(|()| target),
                Err(e) => Err(e),
            },
        };

        match result {
            Ok(instance) => {
                self.metrics.inc_saved_count();
                observability::record_save(&self.name, &tag, true);
                debug!("Record saved");
                Ok(instance)
            }
            Err(e) => {
                self.metrics.inc_save_failure_count();
                observability::record_save(&self.name, &tag, false);
                warn!(error = %e, "Save failed");
                Err(e.into())
            }
        }
    }
}

impl<M: TypedModel> fmt::Debug for TypedDispatcher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedDispatcher")
            .field("name", &self.name)
            .field("discriminator", &self.discriminator)
            .field("context", &self.context)
            .finish()
    }
}
