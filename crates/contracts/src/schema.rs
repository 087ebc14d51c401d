//! VariantSchema trait - per-variant field logic
//!
//! Field coercion and representation are owned by each variant's schema; the
//! dispatcher only decides which schema applies.

use std::sync::Arc;

use crate::{ContractError, ErrorSet, SharedContext, TypedModel, WireRecord};

/// Field validation and representation for one concrete variant
///
/// Instances are created per dispatcher through a [`SchemaFactory`], bound to
/// that dispatcher's [`SharedContext`].
pub trait VariantSchema<M: TypedModel>: Send + Sync {
    /// Schema name (used for logging)
    fn name(&self) -> &str;

    /// Declared field names, excluding the discriminator
    fn fields(&self) -> &[String];

    /// Context this schema was bound to
    fn context(&self) -> &SharedContext;

    /// Validate incoming fields
    ///
    /// `data` never contains the discriminator field. With `partial` set,
    /// absent fields are not required. Undeclared fields are ignored.
    ///
    /// # Errors
    /// Returns per-field messages; never constructs or mutates an instance.
    fn validate(
        &self,
        data: &WireRecord,
        target: Option<&M>,
        partial: bool,
    ) -> Result<WireRecord, ErrorSet>;

    /// Fields whose values must not repeat across stored records
    ///
    /// Batch validation also rejects a repeated value between positions.
    fn unique_fields(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Represent every declared field of `instance`
    fn represent(&self, instance: &M) -> WireRecord;

    /// Construct a new, not yet persisted instance from validated data
    fn build(&self, data: WireRecord) -> Result<M, ContractError>;

    /// Apply validated data to an existing instance
    ///
    /// Only fields present in `data` are changed.
    fn apply(&self, data: WireRecord, target: &mut M) -> Result<(), ContractError>;
}

/// Creates a schema instance bound to a shared context
pub type SchemaFactory<M> = Arc<dyn Fn(SharedContext) -> Box<dyn VariantSchema<M>> + Send + Sync>;

/// Object-level validation hook run after field validation succeeded
///
/// Receives the cleaned field data (without the discriminator), the instance
/// being updated if any, and the dispatcher's shared context. On a partial
/// update, fields absent from the data keep their value on the target.
pub type ObjectValidator<M> =
    Arc<dyn Fn(&WireRecord, Option<&M>, &SharedContext) -> Result<(), ErrorSet> + Send + Sync>;
