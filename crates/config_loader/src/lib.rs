//! # Config Loader
//!
//! Dispatcher manifest loading module.
//!
//! Responsibilities:
//! - Parse TOML/JSON dispatcher manifests
//! - Validate manifest legality
//! - Build a `VariantRegistry<Record>` of rule-driven schemas
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let manifest = ConfigLoader::load_from_path(Path::new("blog.toml")).unwrap();
//! let dispatcher = ConfigLoader::build_dispatcher(&manifest).unwrap();
//! println!("Discriminator: {}", dispatcher.field_name());
//! ```

mod manifest;
mod parser;
mod validator;

pub use manifest::{DispatcherManifest, FieldManifest, VariantManifest};
pub use parser::ConfigFormat;

use std::path::Path;
use std::sync::Arc;

use contracts::{
    ContractError, SchemaFactory, SharedContext, UniqueLookup, VariantSchema, VariantTag,
};
use dispatcher::{ConfigurationError, TypedDispatcher, VariantRegistry};
use record_store::{Record, RuleSchema, StoreConfig};

/// Manifest loader
///
/// Provides static methods to load manifests from files or strings and to
/// turn them into dispatchers.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load manifest from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<DispatcherManifest, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load manifest from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<DispatcherManifest, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize manifest to TOML string
    pub fn to_toml(manifest: &DispatcherManifest) -> Result<String, ContractError> {
        toml::to_string_pretty(manifest)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize manifest to JSON string
    pub fn to_json(manifest: &DispatcherManifest) -> Result<String, ContractError> {
        serde_json::to_string_pretty(manifest)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Build a registry with one `RuleSchema` per declared variant
    ///
    /// # Errors
    /// `DuplicateVariant` if two variants share a tag.
    pub fn build_registry(
        manifest: &DispatcherManifest,
    ) -> Result<VariantRegistry<Record>, ConfigurationError> {
        let mut builder = VariantRegistry::builder();
        for variant in &manifest.variants {
            let tag = VariantTag::from(variant.tag.as_str());
            let decls = variant.decls();
            let factory_tag = tag.clone();
            let factory: SchemaFactory<Record> = Arc::new(
                move |context: SharedContext| -> Box<dyn VariantSchema<Record>> {
                    Box::new(RuleSchema::new(factory_tag.clone(), decls.clone(), context))
                },
            );
            builder.push(tag, factory, None);
        }
        builder.build()
    }

    /// Build a dispatcher from a manifest
    ///
    /// The declaration check runs here, so an empty variant list or a
    /// non-string discriminator field fails with a `ConfigurationError`.
    pub fn build_dispatcher(
        manifest: &DispatcherManifest,
    ) -> Result<TypedDispatcher<Record>, ConfigurationError> {
        Self::build_with_context(manifest, SharedContext::new(manifest.context.clone()))
    }

    /// Build a dispatcher whose unique fields are checked against `lookup`
    /// while validating
    pub fn build_dispatcher_with_lookup(
        manifest: &DispatcherManifest,
        lookup: Arc<dyn UniqueLookup>,
    ) -> Result<TypedDispatcher<Record>, ConfigurationError> {
        let context = SharedContext::new(manifest.context.clone()).with_unique_lookup(lookup);
        Self::build_with_context(manifest, context)
    }

    fn build_with_context(
        manifest: &DispatcherManifest,
        context: SharedContext,
    ) -> Result<TypedDispatcher<Record>, ConfigurationError> {
        let registry = Self::build_registry(manifest)?;
        let mut builder = TypedDispatcher::builder(manifest.name.as_str())
            .registry(registry)
            .context(context);

        if let Some(field) = &manifest.discriminator_field {
            builder = builder.discriminator_field_value(field.clone());
        }
        builder.build()
    }

    /// Store configuration enforcing the manifest's unique fields
    pub fn store_config(manifest: &DispatcherManifest) -> StoreConfig {
        StoreConfig {
            unique_fields: manifest.unique_fields(),
            ..Default::default()
        }
    }
}

impl ConfigLoader {
    /// Infer manifest format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read manifest file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate manifest content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<DispatcherManifest, ContractError> {
        let manifest = parser::parse(content, format)?;
        validator::validate(&manifest)?;
        Ok(manifest)
    }
}
