use std::collections::HashSet;

use serde::Serialize;

use crate::products::ProductRecord;
use crate::slug::slug_candidate;

/// Where a record's base identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdOrigin {
    /// Caller-supplied `id`.
    Supplied,
    /// Derived from the display name.
    Slug,
    /// Built from the request timestamp and batch position.
    Generated,
}

/// A caller-supplied identifier that collided and was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRewrite {
    pub index: usize,
    pub requested: String,
    pub assigned: String,
}

/// Base identifier for the record at `index`, before collision resolution.
///
/// A name that slugs to nothing (e.g. `"..."`) falls through to the
/// generated form, so the base is never empty.
pub(crate) fn base_identifier(
    record: &ProductRecord,
    index: usize,
    batch_token: i64,
) -> (String, IdOrigin) {
    if !record.id.is_empty() {
        return (record.id.clone(), IdOrigin::Supplied);
    }
    if !record.name.is_empty() {
        let slug = slug_candidate(&record.name);
        if !slug.is_empty() {
            return (slug, IdOrigin::Slug);
        }
    }
    (generated_identifier(batch_token, index), IdOrigin::Generated)
}

pub(crate) fn generated_identifier(batch_token: i64, index: usize) -> String {
    format!("product-{batch_token}-{index}")
}

/// Returns `base` if free, otherwise the first free `base-1`, `base-2`, ...
///
/// Suffixes always attach to `base`, never to a previously tried candidate.
pub(crate) fn first_free(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_owned();
    }
    let mut n: u64 = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Assigns the final identifier for one record and records it in `seen_ids`.
///
/// An identifier is taken when an earlier record in the batch already holds
/// it or when it exists in the persisted catalog.
pub(crate) fn assign_identifier(
    record: &ProductRecord,
    index: usize,
    batch_token: i64,
    seen_ids: &mut HashSet<String>,
    persisted_ids: &HashSet<String>,
) -> (String, IdOrigin) {
    let (base, origin) = base_identifier(record, index, batch_token);
    let id = first_free(&base, |candidate| {
        seen_ids.contains(candidate) || persisted_ids.contains(candidate)
    });
    seen_ids.insert(id.clone());
    (id, origin)
}
