use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Failure kinds of a single batch submission.
///
/// `InvalidFormat`, `EmptyBatch` and `InvalidPrice` are raised before any
/// storage access.
/// The remaining kinds come from the storage collaborator; the writer runs
/// inside one transaction, so none of them leaves a partial write behind.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid JSON format - must be either a product object or array of products: {detail}")]
    InvalidFormat { detail: String, raw_body: String },

    #[error("no products provided")]
    EmptyBatch,

    #[error("product {index}: {field} {value} is out of range (magnitude must stay below 100000000)")]
    InvalidPrice {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("catalog lookup failed: {0}")]
    LookupFailure(String),

    #[error("failed to delete superseded products: {0}")]
    DeleteFailure(String),

    #[error("failed to insert products chunk [{chunk_start}, {chunk_end}): {message}")]
    InsertFailure {
        chunk_start: usize,
        chunk_end: usize,
        message: String,
    },
}

impl IngestError {
    /// Machine-readable kind, used as the `code` of API error bodies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::InvalidFormat { .. } => "invalid_format",
            IngestError::EmptyBatch => "empty_batch",
            IngestError::InvalidPrice { .. } => "invalid_price",
            IngestError::LookupFailure(_) => "lookup_failure",
            IngestError::DeleteFailure(_) => "delete_failure",
            IngestError::InsertFailure { .. } => "insert_failure",
        }
    }

    /// `true` when the caller sent something unusable, as opposed to a
    /// storage failure on our side.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IngestError::InvalidFormat { .. }
                | IngestError::EmptyBatch
                | IngestError::InvalidPrice { .. }
        )
    }
}
