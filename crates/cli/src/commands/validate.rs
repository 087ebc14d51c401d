//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::{ConfigLoader, DispatcherManifest};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ManifestSummary>,
}

#[derive(Serialize)]
struct ManifestSummary {
    name: String,
    discriminator_field: String,
    variant_count: usize,
    field_count: usize,
    unique_fields: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating manifest");

    let result = validate_manifest(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Manifest validation failed")
    }
}

fn validate_manifest(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    let invalid = |error: String| ValidationResult {
        valid: false,
        config_path: config_path.clone(),
        error: Some(error),
        warnings: None,
        summary: None,
    };

    // Check file exists
    if !args.config.exists() {
        return invalid(format!("File not found: {}", args.config.display()));
    }

    let manifest = match ConfigLoader::load_from_path(&args.config) {
        Ok(manifest) => manifest,
        Err(e) => return invalid(e.to_string()),
    };

    // The declaration check only runs when the dispatcher is built
    let dispatcher = match ConfigLoader::build_dispatcher(&manifest) {
        Ok(dispatcher) => dispatcher,
        Err(e) => return invalid(e.to_string()),
    };

    let warnings = collect_warnings(&manifest);
    ValidationResult {
        valid: true,
        config_path: config_path.clone(),
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ManifestSummary {
            name: manifest.name.clone(),
            discriminator_field: dispatcher.field_name().to_string(),
            variant_count: dispatcher.registry().len(),
            field_count: manifest.variants.iter().map(|v| v.fields.len()).sum(),
            unique_fields: manifest.unique_fields(),
        }),
    }
}

/// Collect manifest warnings (non-fatal issues)
fn collect_warnings(manifest: &DispatcherManifest) -> Vec<String> {
    let mut warnings = Vec::new();

    for variant in &manifest.variants {
        if variant.fields.is_empty() {
            warnings.push(format!("Variant '{}' declares no fields", variant.tag));
        }
    }

    // A field that is unique in one variant but plain in another shares one
    // constraint in the store
    for unique in manifest.unique_fields() {
        let mixed = manifest
            .variants
            .iter()
            .flat_map(|v| &v.fields)
            .any(|f| f.name == unique && !f.unique);
        if mixed {
            warnings.push(format!(
                "Field '{}' is unique in some variants only - uniqueness applies to all",
                unique
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Manifest is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Dispatcher: {}", summary.name);
            println!("  Discriminator: {}", summary.discriminator_field);
            println!("  Variants: {}", summary.variant_count);
            println!("  Fields: {}", summary.field_count);
            if !summary.unique_fields.is_empty() {
                println!("  Unique: {}", summary.unique_fields.join(", "));
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Manifest is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
