//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the dispatcher.
//! Business crates depend on this crate only, reverse dependencies are prohibited.
//!
//! ## Data Model
//! - `WireRecord`: flat field map exchanged with callers
//! - `ErrorSet`: per-record validation errors keyed by field name
//! - `TypedModel`: closed family of variants reporting their canonical tag
//! - `VariantSchema` / `ModelStore`: external collaborators behind traits

mod error;
mod model;
mod record;
mod schema;
mod store;
mod tag;

pub use error::*;
pub use model::{SharedContext, TypedModel, UniqueLookup};
pub use record::*;
pub use schema::{ObjectValidator, SchemaFactory, VariantSchema};
pub use store::ModelStore;
pub use tag::VariantTag;
