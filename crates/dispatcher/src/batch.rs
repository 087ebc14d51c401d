//! BatchDispatcher - ordered, heterogeneous batches
//!
//! Every position is handled by the single-record paths of the owning
//! [`TypedDispatcher`]; results keep the input order.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, error, info, instrument};

use contracts::{
    json_type_name, unique_message, wire_record_from_value, ErrorSet, ModelStore, TypedModel,
    WireRecord, NON_FIELD_ERRORS,
};

use crate::dispatcher::{TypedDispatcher, ValidatedRecord};
use crate::error::DispatcherError;

/// Per-position outcome of a batch validation
#[derive(Debug, Clone, PartialEq)]
pub struct BatchValidation<K> {
    results: Vec<Result<ValidatedRecord<K>, ErrorSet>>,
}

impl<K> BatchValidation<K> {
    /// True only when every position validated
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(Result::is_ok)
    }

    /// One error set per position, empty where the position is valid
    pub fn errors(&self) -> Vec<ErrorSet> {
        self.results
            .iter()
            .map(|result| match result {
                Ok(_) => ErrorSet::new(),
                Err(errors) => errors.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn invalid_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }

    pub fn results(&self) -> &[Result<ValidatedRecord<K>, ErrorSet>] {
        &self.results
    }

    pub fn into_results(self) -> Vec<Result<ValidatedRecord<K>, ErrorSet>> {
        self.results
    }

    /// All validated records, or the positional errors if any position failed
    pub fn into_validated(self) -> Result<Vec<ValidatedRecord<K>>, Vec<ErrorSet>> {
        if self.is_valid() {
            Ok(self.results.into_iter().flatten().collect())
        } else {
            Err(self.errors())
        }
    }
}

/// Batch view borrowed from a [`TypedDispatcher`]
pub struct BatchDispatcher<'d, M: TypedModel> {
    dispatcher: &'d TypedDispatcher<M>,
}

impl<'d, M: TypedModel> BatchDispatcher<'d, M> {
    pub fn new(dispatcher: &'d TypedDispatcher<M>) -> Self {
        Self { dispatcher }
    }

    /// Represent every instance, order preserved
    pub fn represent_many(&self, instances: &[M]) -> Result<Vec<WireRecord>, DispatcherError> {
        instances
            .iter()
            .map(|instance| self.dispatcher.represent(instance))
            .collect()
    }

    /// Validate each record independently
    ///
    /// `targets`, when given, pair with `records` by position.
    ///
    /// # Errors
    /// [`DispatcherError::TargetCountMismatch`] if the lengths differ. Data
    /// errors are reported per position in the returned [`BatchValidation`].
    pub fn validate_many(
        &self,
        records: &[WireRecord],
        targets: Option<&[M]>,
        partial: bool,
    ) -> Result<BatchValidation<M::Kind>, DispatcherError> {
        if let Some(targets) = targets {
            if targets.len() != records.len() {
                return Err(DispatcherError::TargetCountMismatch {
                    expected: records.len(),
                    actual: targets.len(),
                });
            }
        }

        let mut results: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let target = targets.map(|targets| &targets[i]);
                self.dispatcher.validate(record, target, partial)
            })
            .collect();
        self.reject_repeated_unique(&mut results);

        let validation = BatchValidation { results };
        let invalid = validation.invalid_count();
        observability::record_batch(self.dispatcher.name(), validation.len(), invalid);
        info!(
            dispatcher = %self.dispatcher.name(),
            size = validation.len(),
            invalid,
            "Batch validated"
        );

        Ok(validation)
    }

    /// Validate a raw JSON payload that should be a list of records
    ///
    /// # Errors
    /// A single error set when the payload is not a list, or when `targets`
    /// does not match its length. Non-object elements fail at their position.
    pub fn validate_value(
        &self,
        payload: Value,
        targets: Option<&[M]>,
        partial: bool,
    ) -> Result<BatchValidation<M::Kind>, ErrorSet> {
        let Value::Array(items) = payload else {
            return Err(ErrorSet::single(
                NON_FIELD_ERRORS,
                format!(
                    "expected a list of items but got type \"{}\"",
                    json_type_name(&payload)
                ),
            ));
        };

        if let Some(targets) = targets {
            if targets.len() != items.len() {
                return Err(ErrorSet::single(
                    NON_FIELD_ERRORS,
                    format!("expected {} items but got {}", targets.len(), items.len()),
                ));
            }
        }

        let mut results = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let target = targets.map(|targets| &targets[i]);
            results.push(
                wire_record_from_value(item)
                    .and_then(|record| self.dispatcher.validate(&record, target, partial)),
            );
        }

        self.reject_repeated_unique(&mut results);

        let validation = BatchValidation { results };
        observability::record_batch(
            self.dispatcher.name(),
            validation.len(),
            validation.invalid_count(),
        );
        Ok(validation)
    }

    /// A unique value repeated inside the batch fails every later position
    /// that carries it
    fn reject_repeated_unique(&self, results: &mut [Result<ValidatedRecord<M::Kind>, ErrorSet>]) {
        let mut seen = HashSet::new();

        for (i, result) in results.iter_mut().enumerate() {
            let Ok(validated) = result else {
                continue;
            };
            let Some(schema) = self.dispatcher.schema(validated.kind()) else {
                continue;
            };

            let mut errors = ErrorSet::new();
            for field in schema.unique_fields() {
                let Some(value) = validated.data().get(field).filter(|v| !v.is_null()) else {
                    continue;
                };
                if !seen.insert((field.to_string(), value.to_string())) {
                    errors.add(field, unique_message(field));
                }
            }

            if !errors.is_empty() {
                debug!(dispatcher = %self.dispatcher.name(), index = i, "Unique value repeated in batch");
                *result = Err(errors);
            }
        }
    }

    /// Save every validated record in order
    ///
    /// Stops at the first failing position and returns its error; records
    /// saved before it stay persisted.
    #[instrument(
        name = "batch_save_many",
        skip(self, store, validated, targets),
        fields(dispatcher = %self.dispatcher.name(), size = validated.len())
    )]
    pub async fn save_many<S: ModelStore<M>>(
        &self,
        store: &S,
        validated: Vec<ValidatedRecord<M::Kind>>,
        targets: Option<Vec<M>>,
    ) -> Result<Vec<M>, DispatcherError> {
        let size = validated.len();
        let targets: Vec<Option<M>> = match targets {
            Some(targets) if targets.len() != size => {
                return Err(DispatcherError::TargetCountMismatch {
                    expected: size,
                    actual: targets.len(),
                });
            }
            Some(targets) => targets.into_iter().map(Some).collect(),
            None => std::iter::repeat_with(|| None).take(size).collect(),
        };

        let mut saved = Vec::with_capacity(size);
        for (index, (record, target)) in validated.into_iter().zip(targets).enumerate() {
            match self.dispatcher.save(store, record, target).await {
                Ok(instance) => saved.push(instance),
                Err(e) => {
                    error!(index, error = %e, "Batch save aborted");
                    return Err(e);
                }
            }
        }

        info!(saved = saved.len(), "Batch saved");
        Ok(saved)
    }
}
