//! `ingest` command: submit a product batch read from a file.
//!
//! Same semantics as the HTTP bulk endpoint. With `--dry-run` the batch is
//! planned against the live catalog and reported, but nothing is written.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use prodcat_core::{parse_batch, plan_batch, AppConfig, CatalogLookup, PlanOptions};
use prodcat_db::IngestOptions;

/// Ingest options from config, with an optional command-line chunk size.
pub(crate) fn resolve_options(
    config: &AppConfig,
    chunk_size: Option<usize>,
) -> anyhow::Result<IngestOptions> {
    let mut options = IngestOptions::from_app_config(config);
    if let Some(size) = chunk_size {
        anyhow::ensure!(size > 0, "--chunk-size must be at least 1");
        options.chunk_size = size;
    }
    Ok(options)
}

/// Read, parse and store the batch in `file`, printing the summary as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the body is not a product
/// batch, or any ingestion step fails.
pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    file: &Path,
    options: &IngestOptions,
    dry_run: bool,
) -> anyhow::Result<()> {
    let body = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    tracing::info!(file = %file.display(), bytes = body.len(), "read product batch");

    let records = parse_batch(&body)?;

    if dry_run {
        let plan_options = PlanOptions::at(Utc::now());
        let lookup = CatalogLookup::from_records(&records, plan_options.batch_token);
        let snapshot = prodcat_db::load_catalog_snapshot(pool, &lookup).await?;
        let plan = plan_batch(records, &snapshot, &plan_options);

        println!(
            "dry-run: would store {} of {} products ({} duplicates, {} ids rewritten)",
            plan.kept.len(),
            plan.original_count,
            plan.duplicates_filtered(),
            plan.id_rewrites.len()
        );
        for dropped in &plan.dropped {
            println!("  skip #{} {:?}: {}", dropped.index, dropped.name, dropped.reason);
        }
        for rewrite in &plan.id_rewrites {
            println!(
                "  id #{} {} -> {}",
                rewrite.index, rewrite.requested, rewrite.assigned
            );
        }
        return Ok(());
    }

    let summary = prodcat_db::ingest_batch(pool, records, options).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
