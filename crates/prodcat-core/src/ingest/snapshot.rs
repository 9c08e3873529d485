use std::collections::{BTreeSet, HashSet};

use crate::ingest::identifiers::base_identifier;
use crate::products::ProductRecord;

/// The catalog questions a batch needs answered before it can be planned.
///
/// Built once per request so the store can answer with a fixed number of
/// batch-scoped queries instead of one lookup per record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogLookup {
    /// Distinct non-empty source URLs in the batch, sorted.
    pub source_urls: Vec<String>,
    /// Distinct base identifiers the batch may assign, sorted. Suffixed forms
    /// (`<base>-<n>`) are covered by [`CatalogLookup::id_like_patterns`].
    pub id_bases: Vec<String>,
}

impl CatalogLookup {
    #[must_use]
    pub fn from_records(records: &[ProductRecord], batch_token: i64) -> Self {
        let source_urls: BTreeSet<String> = records
            .iter()
            .filter(|r| !r.source_url.is_empty())
            .map(|r| r.source_url.clone())
            .collect();

        let id_bases: BTreeSet<String> = records
            .iter()
            .enumerate()
            .map(|(index, r)| base_identifier(r, index, batch_token).0)
            .collect();

        Self {
            source_urls: source_urls.into_iter().collect(),
            id_bases: id_bases.into_iter().collect(),
        }
    }

    /// `LIKE` patterns matching every suffixed form of every base.
    ///
    /// The patterns over-match (`abc-%` also matches `abc-def`); the planner
    /// only ever checks exact membership, so extra ids are harmless.
    #[must_use]
    pub fn id_like_patterns(&self) -> Vec<String> {
        self.id_bases
            .iter()
            .map(|base| format!("{}-%", escape_like(base)))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source_urls.is_empty() && self.id_bases.is_empty()
    }
}

/// Answers to a [`CatalogLookup`], as of the start of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Source URLs held by at least one active catalog record.
    pub active_source_urls: HashSet<String>,
    /// Persisted identifiers equal to a requested base or one of its suffixed forms.
    pub existing_ids: HashSet<String>,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn new(
        active_source_urls: impl IntoIterator<Item = String>,
        existing_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            active_source_urls: active_source_urls.into_iter().collect(),
            existing_ids: existing_ids.into_iter().collect(),
        }
    }
}

/// Escapes `\`, `%` and `_` for use in a Postgres `LIKE` pattern.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, url: &str) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: name.to_string(),
            source_url: url.to_string(),
            ..ProductRecord::default()
        }
    }

    #[test]
    fn lookup_collects_distinct_urls_and_bases() {
        let records = vec![
            record("sku-1", "Shirt", "https://s.example/1"),
            record("", "Üç Gün", "https://s.example/1"),
            record("", "", ""),
            record("", "Üç Gün", "https://s.example/2"),
        ];
        let lookup = CatalogLookup::from_records(&records, 42);

        assert_eq!(
            lookup.source_urls,
            vec!["https://s.example/1", "https://s.example/2"]
        );
        assert_eq!(lookup.id_bases, vec!["product-42-2", "sku-1", "uc-gun"]);
    }

    #[test]
    fn like_patterns_escape_metacharacters() {
        let lookup = CatalogLookup {
            source_urls: vec![],
            id_bases: vec!["50%_off".to_string(), r"a\b".to_string()],
        };
        assert_eq!(
            lookup.id_like_patterns(),
            vec![r"50\%\_off-%".to_string(), r"a\\b-%".to_string()]
        );
    }

    #[test]
    fn empty_batch_gives_empty_lookup() {
        assert!(CatalogLookup::from_records(&[], 0).is_empty());
    }
}
