//! ModelStore trait - persistence side of the typed storage collaborator
//!
//! The dispatcher never persists on its own; it hands constructed or mutated
//! instances to a store.

use std::future::Future;

use crate::{ContractError, TypedModel};

/// Typed storage trait
///
/// Abstracts persistence so that real databases and the in-memory store share
/// one interface. Calls are not idempotent: inserting twice creates two rows.
pub trait ModelStore<M: TypedModel>: Send + Sync {
    /// Persist a new instance
    ///
    /// # Returns
    /// The stored instance (e.g. with its assigned identity)
    fn insert(&self, instance: M) -> impl Future<Output = Result<M, ContractError>> + Send;

    /// Persist changes of an existing instance
    fn update(&self, instance: &M) -> impl Future<Output = Result<(), ContractError>> + Send;
}
