//! `info` command implementation.

use anyhow::{Context, Result};
use config_loader::{ConfigLoader, DispatcherManifest};
use contracts::WireRecord;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Manifest info for JSON output
#[derive(Serialize)]
struct ManifestInfo {
    name: String,
    discriminator_field: String,
    #[serde(skip_serializing_if = "WireRecord::is_empty")]
    context: WireRecord,
    variants: Vec<VariantInfo>,
}

#[derive(Serialize)]
struct VariantInfo {
    tag: String,
    field_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldInfo>,
}

#[derive(Serialize)]
struct FieldInfo {
    name: String,
    kind: String,
    required: bool,
    nullable: bool,
    unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_length: Option<usize>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading manifest info");

    if !args.config.exists() {
        return Err(CliError::not_found(args.config.display().to_string()).into());
    }

    let manifest = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load manifest from {}", args.config.display()))?;

    let info = build_manifest_info(&manifest, args);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize manifest info")?;
        println!("{}", json);
    } else {
        print_manifest_info(&info);
    }

    Ok(())
}

fn build_manifest_info(manifest: &DispatcherManifest, args: &InfoArgs) -> ManifestInfo {
    let variants = manifest
        .variants
        .iter()
        .map(|variant| {
            let fields = if args.fields {
                variant
                    .decls()
                    .into_iter()
                    .zip(&variant.fields)
                    .map(|(decl, field)| FieldInfo {
                        kind: format!("{:?}", decl.rule.kind()).to_lowercase(),
                        required: decl.is_required(),
                        nullable: decl.rule.is_nullable(),
                        unique: decl.unique,
                        max_length: field.max_length,
                        name: decl.name,
                    })
                    .collect()
            } else {
                Vec::new()
            };

            VariantInfo {
                tag: variant.tag.clone(),
                field_count: variant.fields.len(),
                fields,
            }
        })
        .collect();

    ManifestInfo {
        name: manifest.name.clone(),
        discriminator_field: match &manifest.discriminator_field {
            Some(value) => value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            None => dispatcher::DEFAULT_DISCRIMINATOR_FIELD.to_string(),
        },
        context: manifest.context.clone(),
        variants,
    }
}

fn print_manifest_info(info: &ManifestInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Dispatcher Manifest                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📋 Dispatcher");
    println!("   ├─ Name: {}", info.name);
    println!("   ├─ Discriminator: {}", info.discriminator_field);
    println!("   └─ Context keys: {}", info.context.len());

    println!("\n🧩 Variants ({})", info.variants.len());
    for (i, variant) in info.variants.iter().enumerate() {
        let is_last = i == info.variants.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {} ({} fields)", prefix, variant.tag, variant.field_count);

        for (j, field) in variant.fields.iter().enumerate() {
            let field_prefix = if j == variant.fields.len() - 1 { "└─" } else { "├─" };
            let mut flags = Vec::new();
            if field.required {
                flags.push("required");
            }
            if field.nullable {
                flags.push("nullable");
            }
            if field.unique {
                flags.push("unique");
            }
            println!(
                "   {}  {} {}: {}{} [{}]",
                child_prefix,
                field_prefix,
                field.name,
                field.kind,
                field
                    .max_length
                    .map(|n| format!("({n})"))
                    .unwrap_or_default(),
                flags.join(", ")
            );
        }
    }
}
