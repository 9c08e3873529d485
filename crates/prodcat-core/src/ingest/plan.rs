use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::ingest::dedup::{screen_record, DroppedRecord};
use crate::ingest::identifiers::{assign_identifier, IdOrigin, IdRewrite};
use crate::ingest::snapshot::CatalogSnapshot;
use crate::ingest::IngestSummary;
use crate::pricing::{derived_price, round_price};
use crate::products::ProductRecord;

/// Per-request inputs to planning that do not come from the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Unix seconds used for generated identifiers. Read once per request.
    pub batch_token: i64,
}

impl PlanOptions {
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            batch_token: now.timestamp(),
        }
    }
}

/// Decisions already made earlier in the batch.
///
/// Threaded through the fold in batch order; record `i` is planned against
/// the state left by records `0..i`.
#[derive(Debug, Default)]
pub struct BatchSeen {
    pub ids: HashSet<String>,
    pub pairs: HashSet<(String, String)>,
    pub names: HashSet<String>,
}

/// Result of planning a batch against a catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    /// Records to write, in batch order, with final ids and derived prices.
    pub kept: Vec<ProductRecord>,
    pub dropped: Vec<DroppedRecord>,
    pub id_rewrites: Vec<IdRewrite>,
    pub original_count: usize,
}

impl BatchPlan {
    #[must_use]
    pub fn duplicates_filtered(&self) -> usize {
        self.dropped.len()
    }

    /// (name, source URL) pairs of kept records whose persisted matches must
    /// be deleted before insertion.
    #[must_use]
    pub fn supersede_pairs(&self) -> Vec<(String, String)> {
        self.kept
            .iter()
            .filter_map(ProductRecord::name_url_pair)
            .map(|(name, url)| (name.to_owned(), url.to_owned()))
            .collect()
    }

    #[must_use]
    pub fn summary(&self, records_superseded: u64) -> IngestSummary {
        IngestSummary {
            records_stored: self.kept.len(),
            original_count: self.original_count,
            duplicates_filtered: self.duplicates_filtered(),
            records_superseded,
            ids_rewritten: self.id_rewrites.len(),
        }
    }
}

enum RecordOutcome {
    Kept {
        record: ProductRecord,
        rewrite: Option<IdRewrite>,
    },
    Dropped(DroppedRecord),
}

/// Filters duplicates, assigns identifiers and prices every kept record.
///
/// Per record, in order: catalog URL check, in-batch pair check,
/// identifier assignment, derived price. Dropped records reserve nothing,
/// so they never push a later record's identifier onto a suffix.
#[must_use]
pub fn plan_batch(
    records: Vec<ProductRecord>,
    snapshot: &CatalogSnapshot,
    options: &PlanOptions,
) -> BatchPlan {
    let original_count = records.len();
    let mut plan = BatchPlan {
        kept: Vec::with_capacity(original_count),
        dropped: Vec::new(),
        id_rewrites: Vec::new(),
        original_count,
    };

    let mut seen = BatchSeen::default();
    for (index, record) in records.into_iter().enumerate() {
        match plan_record(&mut seen, index, record, snapshot, options) {
            RecordOutcome::Kept { record, rewrite } => {
                if let Some(rewrite) = rewrite {
                    plan.id_rewrites.push(rewrite);
                }
                plan.kept.push(record);
            }
            RecordOutcome::Dropped(dropped) => plan.dropped.push(dropped),
        }
    }

    tracing::info!(
        original = original_count,
        kept = plan.kept.len(),
        duplicates = plan.dropped.len(),
        ids_rewritten = plan.id_rewrites.len(),
        "planned product batch"
    );
    plan
}

fn plan_record(
    seen: &mut BatchSeen,
    index: usize,
    mut record: ProductRecord,
    snapshot: &CatalogSnapshot,
    options: &PlanOptions,
) -> RecordOutcome {
    if let Some(reason) = screen_record(&record, &mut seen.pairs, &snapshot.active_source_urls) {
        tracing::warn!(
            index,
            name = %record.name,
            source_url = %record.source_url,
            %reason,
            "skipping duplicate product"
        );
        return RecordOutcome::Dropped(DroppedRecord {
            index,
            name: record.name,
            source_url: record.source_url,
            reason,
        });
    }

    let (id, origin) = assign_identifier(
        &record,
        index,
        options.batch_token,
        &mut seen.ids,
        &snapshot.existing_ids,
    );
    let rewrite = (origin == IdOrigin::Supplied && id != record.id).then(|| {
        tracing::warn!(index, requested = %record.id, assigned = %id, "duplicate product id, assigned a new one");
        IdRewrite {
            index,
            requested: record.id.clone(),
            assigned: id.clone(),
        }
    });
    record.id = id;

    if !record.name.is_empty() && !seen.names.insert(record.name.clone()) {
        tracing::warn!(index, name = %record.name, "duplicate product name in batch");
    }

    record.price = round_price(record.price);
    record.derived_price = derived_price(record.price);
    tracing::debug!(
        index,
        id = %record.id,
        price = %record.price,
        derived_price = ?record.derived_price,
        "planned product"
    );

    RecordOutcome::Kept { record, rewrite }
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
