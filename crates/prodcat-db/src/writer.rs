//! Replace-then-insert write path.
//!
//! A batch is written inside one transaction: rows superseded by the batch
//! are deleted first, then the batch is inserted in bounded multi-row
//! statements. Any failure rolls the whole batch back.

use prodcat_core::{IngestError, ProductRecord};
use serde_json::Value;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

/// Columns bound per inserted row.
pub const INSERT_COLUMNS: usize = 18;

// Postgres caps bind parameters per statement at u16::MAX.
const MAX_BIND_PARAMS: usize = 65_535;

/// Clamps a requested chunk size to what one statement can bind.
#[must_use]
pub fn effective_chunk_size(requested: usize) -> usize {
    requested.clamp(1, MAX_BIND_PARAMS / INSERT_COLUMNS)
}

/// Deletes every persisted row matching one of `supersede_pairs`, then
/// inserts `records` in chunks of `chunk_size`.
///
/// Returns the number of rows deleted. Nothing is committed unless every
/// chunk succeeds.
///
/// # Errors
///
/// Returns [`IngestError::DeleteFailure`] if the transaction cannot start or
/// the delete fails, and [`IngestError::InsertFailure`] naming the half-open
/// record range of the failing chunk otherwise.
pub async fn replace_then_insert(
    pool: &PgPool,
    records: &[ProductRecord],
    supersede_pairs: &[(String, String)],
    chunk_size: usize,
) -> Result<u64, IngestError> {
    let chunk_size = effective_chunk_size(chunk_size);
    if records.len() > chunk_size {
        tracing::debug!(
            records = records.len(),
            chunk_size,
            chunks = records.len().div_ceil(chunk_size),
            "writing batch in chunks"
        );
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "failed to open write transaction");
        IngestError::DeleteFailure(format!("could not begin transaction: {e}"))
    })?;

    let superseded = delete_superseded(&mut tx, supersede_pairs)
        .await
        .map_err(|e| {
            tracing::error!(pairs = supersede_pairs.len(), error = %e, "failed to delete superseded products");
            IngestError::DeleteFailure(e.to_string())
        })?;
    if superseded > 0 {
        tracing::info!(superseded, "deleted superseded products");
    }

    for (chunk_index, chunk) in records.chunks(chunk_size).enumerate() {
        let chunk_start = chunk_index * chunk_size;
        let chunk_end = chunk_start + chunk.len();
        insert_chunk(&mut tx, chunk).await.map_err(|e| {
            tracing::error!(chunk_start, chunk_end, error = %e, "failed to insert products chunk");
            IngestError::InsertFailure {
                chunk_start,
                chunk_end,
                message: e.to_string(),
            }
        })?;
        tracing::debug!(chunk_start, chunk_end, "inserted products chunk");
    }

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "failed to commit product batch");
        IngestError::InsertFailure {
            chunk_start: 0,
            chunk_end: records.len(),
            message: format!("commit failed: {e}"),
        }
    })?;

    Ok(superseded)
}

async fn delete_superseded(
    conn: &mut PgConnection,
    pairs: &[(String, String)],
) -> Result<u64, sqlx::Error> {
    if pairs.is_empty() {
        return Ok(0);
    }
    let (names, urls): (Vec<&str>, Vec<&str>) = pairs
        .iter()
        .map(|(name, url)| (name.as_str(), url.as_str()))
        .unzip();

    let result = sqlx::query(
        "DELETE FROM products p \
         USING UNNEST($1::text[], $2::text[]) AS s(name, source_url) \
         WHERE p.name = s.name AND p.source_url = s.source_url",
    )
    .bind(names)
    .bind(urls)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_chunk(conn: &mut PgConnection, chunk: &[ProductRecord]) -> Result<(), sqlx::Error> {
    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        "INSERT INTO products (id, name, brand, price, currency, derived_price, \
         discounted_price, description, images, sizes, colors, source_url, store, category, \
         processed_at, is_active, stock_status, stock) ",
    );
    builder.push_values(chunk, |mut row, record| {
        row.push_bind(&record.id)
            .push_bind(&record.name)
            .push_bind(&record.brand)
            .push_bind(record.price)
            .push_bind(&record.currency)
            .push_bind(record.derived_price)
            .push_bind(record.discounted_price)
            .push_bind(&record.description)
            .push_bind(json_column(&record.images))
            .push_bind(json_column(&record.sizes))
            .push_bind(json_column(&record.colors))
            .push_bind(&record.source_url)
            .push_bind(&record.store)
            .push_bind(&record.category)
            .push_bind(&record.processed_at)
            .push_bind(record.is_active)
            .push_bind(&record.stock_status)
            .push_bind(json_column(&record.stock));
    });
    builder.build().execute(conn).await?;
    Ok(())
}

/// JSON `null` and absent values are stored as SQL `NULL`.
fn json_column(value: &Value) -> Option<&Value> {
    (!value.is_null()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chunk_size_is_clamped_to_bind_limit() {
        assert_eq!(effective_chunk_size(0), 1);
        assert_eq!(effective_chunk_size(1000), 1000);
        assert_eq!(effective_chunk_size(1_000_000), 65_535 / INSERT_COLUMNS);
        assert!(effective_chunk_size(usize::MAX) * INSERT_COLUMNS <= 65_535);
    }

    #[test]
    fn null_json_maps_to_sql_null() {
        assert_eq!(json_column(&Value::Null), None);
        let sizes = json!(["S", "M"]);
        assert_eq!(json_column(&sizes), Some(&sizes));
    }
}
