//! Batch ingestion against the live catalog.

use chrono::{DateTime, Utc};
use prodcat_core::{
    normalize_prices, plan_batch, AppConfig, CatalogLookup, IngestError, IngestSummary,
    PlanOptions, ProductRecord, DEFAULT_INSERT_CHUNK_SIZE,
};
use sqlx::PgPool;

use crate::catalog::load_catalog_snapshot;
use crate::writer::replace_then_insert;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Records per multi-row `INSERT`.
    pub chunk_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            chunk_size: config.insert_chunk_size,
        }
    }
}

/// Filters, identifies, prices and stores one batch of products.
///
/// # Errors
///
/// See [`ingest_batch_at`].
pub async fn ingest_batch(
    pool: &PgPool,
    records: Vec<ProductRecord>,
    options: &IngestOptions,
) -> Result<IngestSummary, IngestError> {
    ingest_batch_at(pool, records, options, Utc::now()).await
}

/// [`ingest_batch`] with an explicit clock reading, used for generated
/// identifiers.
///
/// The catalog is read once up front; every decision about the batch is
/// made against that snapshot. A batch with nothing left to store after
/// filtering succeeds without touching the write path.
///
/// # Errors
///
/// Returns [`IngestError::EmptyBatch`] for an empty batch,
/// [`IngestError::InvalidPrice`] for a price the catalog cannot store,
/// [`IngestError::LookupFailure`] if the catalog cannot be read, and the
/// writer's errors otherwise. No error leaves a partial write.
pub async fn ingest_batch_at(
    pool: &PgPool,
    mut records: Vec<ProductRecord>,
    options: &IngestOptions,
    now: DateTime<Utc>,
) -> Result<IngestSummary, IngestError> {
    if records.is_empty() {
        return Err(IngestError::EmptyBatch);
    }
    normalize_prices(&mut records)?;

    let plan_options = PlanOptions::at(now);
    let lookup = CatalogLookup::from_records(&records, plan_options.batch_token);
    let snapshot = load_catalog_snapshot(pool, &lookup).await.map_err(|e| {
        tracing::error!(error = %e, "catalog lookup failed");
        IngestError::LookupFailure(e.to_string())
    })?;

    let plan = plan_batch(records, &snapshot, &plan_options);
    if plan.kept.is_empty() {
        tracing::info!(
            original = plan.original_count,
            duplicates = plan.duplicates_filtered(),
            "nothing to store after filtering"
        );
        return Ok(plan.summary(0));
    }

    let superseded = replace_then_insert(
        pool,
        &plan.kept,
        &plan.supersede_pairs(),
        options.chunk_size,
    )
    .await?;

    let summary = plan.summary(superseded);
    tracing::info!(
        stored = summary.records_stored,
        original = summary.original_count,
        duplicates = summary.duplicates_filtered,
        superseded = summary.records_superseded,
        ids_rewritten = summary.ids_rewritten,
        "stored product batch"
    );
    Ok(summary)
}
