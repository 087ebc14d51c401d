//! `run` command implementation.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{wire_record_from_value, ErrorSet, WireRecord};
use dispatcher::{TypedDispatcher, ValidatedRecord};
use observability::DispatchStatsAggregator;
use record_store::{MemoryStore, Record, VariantTag};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;

/// Run report for JSON output
#[derive(Debug, Serialize)]
struct RunReport {
    valid: bool,
    /// One error set per position (single mode: exactly one)
    errors: Vec<ErrorSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<Vec<WireRecord>>,
}

/// Execute the `run` command
pub async fn run_records(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), input = %args.input.display(), "Loading manifest");

    if !args.config.exists() {
        return Err(CliError::not_found(args.config.display().to_string()).into());
    }

    let manifest = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load manifest from {}", args.config.display()))?;
    let store = Arc::new(MemoryStore::with_config(ConfigLoader::store_config(&manifest)));
    let dispatcher = ConfigLoader::build_dispatcher_with_lookup(&manifest, store.clone())
        .map_err(|e| CliError::configuration(e.to_string()))?;

    let payload = read_input(&args.input)?;
    let mut stats = DispatchStatsAggregator::new();

    let (report, rejected) = process(&dispatcher, &store, payload, args, &mut stats).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize run report")?
    );
    info!("\n{}", stats.summary());

    match rejected {
        0 => Ok(()),
        invalid => Err(CliError::InvalidInput {
            invalid,
            total: report.errors.len(),
        }
        .into()),
    }
}

fn read_input(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(CliError::not_found(path.display().to_string()).into());
    }
    let content = std::fs::read_to_string(path).map_err(CliError::from)?;
    let payload = serde_json::from_str(&content).map_err(|e| CliError::input_parse(e.to_string()))?;
    Ok(payload)
}

/// Validate (and optionally save) the payload; returns the report and the
/// number of rejected positions
async fn process(
    dispatcher: &TypedDispatcher<Record>,
    store: &MemoryStore,
    payload: Value,
    args: &RunArgs,
    stats: &mut DispatchStatsAggregator,
) -> Result<(RunReport, usize)> {
    let results: Vec<Result<ValidatedRecord<VariantTag>, ErrorSet>> = if args.many {
        match dispatcher.batch().validate_value(payload, None, false) {
            Ok(validation) => validation.into_results(),
            // not a list: report it as a single rejected position
            Err(errors) => vec![Err(errors)],
        }
    } else {
        vec![wire_record_from_value(payload)
            .and_then(|record| dispatcher.validate(&record, None, false))]
    };

    stats.record_batch(results.len());
    for result in &results {
        match result {
            Ok(validated) => stats.record_valid(validated.tag()),
            Err(errors) => stats.record_invalid(errors),
        }
    }

    let rejected = results.iter().filter(|r| r.is_err()).count();
    let errors = results
        .iter()
        .map(|r| r.as_ref().err().cloned().unwrap_or_default())
        .collect();

    let saved = if args.save && rejected == 0 {
        let validated: Vec<_> = results.into_iter().flatten().collect();
        let instances = dispatcher
            .batch()
            .save_many(store, validated, None)
            .await
            .context("Failed to save records")?;
        info!(saved = instances.len(), stored = store.count(), "Records saved");
        Some(dispatcher.batch().represent_many(&instances)?)
    } else {
        None
    };

    let report = RunReport {
        valid: rejected == 0,
        errors,
        saved,
    };
    Ok((report, rejected))
}
