//! # Record Store
//!
//! Dynamic records and in-memory typed storage.
//!
//! Responsibilities:
//! - `Record`: a variant instance whose fields are described at runtime
//! - `MemoryStore`: single-table storage with unique checks and failure injection
//! - `RuleSchema`: rule-driven `VariantSchema` for manifest-declared variants

pub mod record;
pub mod rules;
pub mod schema;
pub mod store;

pub use contracts::{ModelStore, TypedModel, UniqueLookup, VariantTag, WireRecord};
pub use record::Record;
pub use rules::{FieldDecl, FieldKind, FieldRule};
pub use schema::RuleSchema;
pub use store::{MemoryStore, StoreConfig};
