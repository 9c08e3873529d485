use std::collections::HashSet;

use serde::Serialize;

use crate::products::ProductRecord;

/// Why a record was filtered out of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// An active catalog record already has this `source_url`.
    PersistedSourceUrl,
    /// An earlier record in the same batch has the same name and URL.
    DuplicateInBatch,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::PersistedSourceUrl => write!(f, "source URL already in catalog"),
            DropReason::DuplicateInBatch => write!(f, "duplicate name and URL in batch"),
        }
    }
}

/// A record filtered out of the batch, identified by its batch position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    pub index: usize,
    pub name: String,
    pub source_url: String,
    pub reason: DropReason,
}

/// Decides whether `record` duplicates the catalog or an earlier batch record.
///
/// A kept record with a non-empty (name, URL) pair is added to `seen_pairs`
/// so that later records in the batch see it.
pub(crate) fn screen_record(
    record: &ProductRecord,
    seen_pairs: &mut HashSet<(String, String)>,
    persisted_urls: &HashSet<String>,
) -> Option<DropReason> {
    if !record.source_url.is_empty() && persisted_urls.contains(&record.source_url) {
        return Some(DropReason::PersistedSourceUrl);
    }

    if let Some((name, url)) = record.name_url_pair() {
        let key = (name.to_owned(), url.to_owned());
        if seen_pairs.contains(&key) {
            return Some(DropReason::DuplicateInBatch);
        }
        seen_pairs.insert(key);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, url: &str) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            source_url: url.to_string(),
            ..ProductRecord::default()
        }
    }

    #[test]
    fn drops_record_whose_url_is_in_catalog() {
        let persisted: HashSet<String> = ["https://s.example/p/1".to_string()].into();
        let mut seen = HashSet::new();
        let reason = screen_record(&record("Other Name", "https://s.example/p/1"), &mut seen, &persisted);
        assert_eq!(reason, Some(DropReason::PersistedSourceUrl));
        assert!(seen.is_empty(), "dropped records must not mark their pair");
    }

    #[test]
    fn drops_second_occurrence_of_pair_in_batch() {
        let persisted = HashSet::new();
        let mut seen = HashSet::new();
        assert_eq!(screen_record(&record("A", "u"), &mut seen, &persisted), None);
        assert_eq!(screen_record(&record("B", "u"), &mut seen, &persisted), None);
        assert_eq!(
            screen_record(&record("A", "u"), &mut seen, &persisted),
            Some(DropReason::DuplicateInBatch)
        );
    }

    #[test]
    fn empty_url_skips_all_url_checks() {
        let persisted: HashSet<String> = [String::new()].into();
        let mut seen = HashSet::new();
        assert_eq!(screen_record(&record("A", ""), &mut seen, &persisted), None);
        assert_eq!(screen_record(&record("A", ""), &mut seen, &persisted), None);
        assert!(seen.is_empty());
    }

    #[test]
    fn empty_name_is_not_tracked_as_pair() {
        let persisted = HashSet::new();
        let mut seen = HashSet::new();
        assert_eq!(screen_record(&record("", "u"), &mut seen, &persisted), None);
        assert_eq!(screen_record(&record("", "u"), &mut seen, &persisted), None);
    }

    #[test]
    fn drop_reason_display() {
        assert_eq!(
            DropReason::PersistedSourceUrl.to_string(),
            "source URL already in catalog"
        );
        assert_eq!(
            DropReason::DuplicateInBatch.to_string(),
            "duplicate name and URL in batch"
        );
    }
}
