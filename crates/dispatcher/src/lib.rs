//! # Dispatcher
//!
//! 多态记录分发模块。
//!
//! 负责：
//! - 按判别字段 (tag) 选择变体 schema
//! - 单条记录的序列化、校验与保存
//! - 有序、异构的批量处理

pub mod batch;
pub mod discriminator;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchDispatcher, BatchValidation};
pub use contracts::{ErrorSet, TypedModel, VariantSchema, VariantTag, WireRecord};
pub use discriminator::{
    Discriminator, DEFAULT_DISCRIMINATOR_FIELD, INVALID_CHOICE, REQUIRED, VARIANT_CHANGE,
};
pub use dispatcher::{DispatcherBuilder, TypedDispatcher, ValidatedRecord};
pub use error::{ConfigurationError, DispatcherError};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use registry::{VariantEntry, VariantRegistry, VariantRegistryBuilder};
pub use validator::validate_declaration;
