//! Bulk ingestion: parsing, price validation, deduplication, identifier
//! assignment and pricing.
//!
//! Everything here is pure. The storage collaborator answers a
//! [`CatalogLookup`] with a [`CatalogSnapshot`], and [`plan_batch`] folds the
//! batch against that snapshot to decide what gets written.

mod dedup;
mod identifiers;
mod parse;
mod plan;
mod snapshot;
mod validate;

use serde::Serialize;

pub use dedup::{DropReason, DroppedRecord};
pub use identifiers::{IdOrigin, IdRewrite};
pub use parse::{body_preview, parse_batch};
pub use plan::{plan_batch, BatchPlan, BatchSeen, PlanOptions};
pub use snapshot::{escape_like, CatalogLookup, CatalogSnapshot};
pub use validate::normalize_prices;

/// Outcome of a successful batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Records written to the catalog.
    pub records_stored: usize,
    /// Records in the submitted batch.
    pub original_count: usize,
    pub duplicates_filtered: usize,
    /// Persisted rows deleted because a stored record shares their name and URL.
    pub records_superseded: u64,
    /// Records whose identifier was changed to avoid a collision.
    pub ids_rewritten: usize,
}
