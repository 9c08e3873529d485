//! Read-side queries against the `products` table.

use chrono::{DateTime, Utc};
use prodcat_core::{CatalogLookup, CatalogSnapshot, ProductRecord};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

const PRODUCT_COLUMNS: &str = "id, name, brand, price, currency, derived_price, \
     discounted_price, description, images, sizes, colors, source_url, store, category, \
     processed_at, is_active, stock_status, stock, created_at, updated_at";

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: Decimal,
    pub currency: String,
    pub derived_price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub description: String,
    pub images: Option<Value>,
    pub sizes: Option<Value>,
    pub colors: Option<Value>,
    pub source_url: String,
    pub store: String,
    pub category: String,
    pub processed_at: String,
    pub is_active: bool,
    pub stock_status: String,
    pub stock: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            price: row.price,
            currency: row.currency,
            derived_price: row.derived_price,
            discounted_price: row.discounted_price,
            description: row.description,
            images: row.images.unwrap_or(Value::Null),
            sizes: row.sizes.unwrap_or(Value::Null),
            colors: row.colors.unwrap_or(Value::Null),
            source_url: row.source_url,
            store: row.store,
            category: row.category,
            processed_at: row.processed_at,
            is_active: row.is_active,
            stock_status: row.stock_status,
            stock: row.stock.unwrap_or(Value::Null),
        }
    }
}

/// Answers a batch's [`CatalogLookup`] with two set-based queries, whatever
/// the batch size.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn load_catalog_snapshot(
    pool: &PgPool,
    lookup: &CatalogLookup,
) -> Result<CatalogSnapshot, DbError> {
    let active_source_urls = if lookup.source_urls.is_empty() {
        Vec::new()
    } else {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT source_url FROM products \
             WHERE is_active = true AND source_url = ANY($1)",
        )
        .bind(lookup.source_urls.as_slice())
        .fetch_all(pool)
        .await?
    };

    let existing_ids = if lookup.id_bases.is_empty() {
        Vec::new()
    } else {
        sqlx::query_scalar::<_, String>(
            "SELECT id FROM products WHERE id = ANY($1) OR id LIKE ANY($2)",
        )
        .bind(lookup.id_bases.as_slice())
        .bind(lookup.id_like_patterns())
        .fetch_all(pool)
        .await?
    };

    tracing::debug!(
        requested_urls = lookup.source_urls.len(),
        active_urls = active_source_urls.len(),
        requested_ids = lookup.id_bases.len(),
        existing_ids = existing_ids.len(),
        "loaded catalog snapshot"
    );

    Ok(CatalogSnapshot::new(active_source_urls, existing_ids))
}

/// Fetch a single product by identifier.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn get_product_by_id(pool: &PgPool, id: &str) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// The oldest active product carrying `source_url`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn find_active_product_by_source_url(
    pool: &PgPool,
    source_url: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE source_url = $1 AND is_active = true \
         ORDER BY created_at, id LIMIT 1"
    ))
    .bind(source_url)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Number of persisted rows, active or not, with this exact name and URL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn count_products_by_name_and_url(
    pool: &PgPool,
    name: &str,
    source_url: &str,
) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM products WHERE name = $1 AND source_url = $2",
    )
    .bind(name)
    .bind(source_url)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
