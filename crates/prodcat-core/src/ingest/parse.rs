use crate::error::IngestError;
use crate::products::ProductRecord;

use super::validate::normalize_prices;

/// Decodes a request body holding either an array of products or a single
/// product object.
///
/// The array form is tried first. When both forms fail, the error carries
/// the single-object decoding error and the raw body as received. Prices
/// come back rounded to cents.
///
/// # Errors
///
/// Returns [`IngestError::InvalidFormat`] if the body is neither form,
/// [`IngestError::EmptyBatch`] if it decodes to zero records, and
/// [`IngestError::InvalidPrice`] if a price cannot be stored.
pub fn parse_batch(body: &[u8]) -> Result<Vec<ProductRecord>, IngestError> {
    let mut records = match serde_json::from_slice::<Vec<ProductRecord>>(body) {
        Ok(records) => {
            tracing::debug!(count = records.len(), "parsed request body as product array");
            records
        }
        Err(array_err) => {
            tracing::debug!(error = %array_err, "array parsing failed, trying single object");
            let single = serde_json::from_slice::<ProductRecord>(body).map_err(|e| {
                IngestError::InvalidFormat {
                    detail: e.to_string(),
                    raw_body: String::from_utf8_lossy(body).into_owned(),
                }
            })?;
            tracing::debug!("parsed request body as single product");
            vec![single]
        }
    };

    if records.is_empty() {
        return Err(IngestError::EmptyBatch);
    }
    normalize_prices(&mut records)?;
    Ok(records)
}

/// Returns at most `max_chars` characters of the body for logging, with a
/// trailing `...` when truncated.
#[must_use]
pub fn body_preview(body: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}
