use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One product as sent by a store feed, and as persisted in the catalog.
///
/// Every field is optional on the wire. `id` may be empty, in which case an
/// identifier is assigned during ingestion. `derived_price` is never trusted
/// from input; the planner always recomputes it from `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    /// Price in the store's own currency.
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub currency: String,
    /// `price` converted with the tier multiplier; see [`crate::pricing`].
    #[serde(rename = "priceInRubles", alias = "derivedPrice", default)]
    pub derived_price: Option<Decimal>,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Value,
    #[serde(default)]
    pub sizes: Value,
    #[serde(default)]
    pub colors: Value,
    /// Canonical product page on the source store. Empty disables all
    /// URL-based duplicate checks for this record.
    #[serde(rename = "productUrl", alias = "sourceUrl", default)]
    pub source_url: String,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub processed_at: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub stock_status: String,
    #[serde(default)]
    pub stock: Value,
}

fn default_active() -> bool {
    true
}

impl ProductRecord {
    /// Natural dedup key against the live catalog, present only when both
    /// `name` and `source_url` are non-empty.
    #[must_use]
    pub fn name_url_pair(&self) -> Option<(&str, &str)> {
        if self.name.is_empty() || self.source_url.is_empty() {
            None
        } else {
            Some((self.name.as_str(), self.source_url.as_str()))
        }
    }
}

impl Default for ProductRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            brand: String::new(),
            price: Decimal::ZERO,
            currency: String::new(),
            derived_price: None,
            discounted_price: None,
            description: String::new(),
            images: Value::Null,
            sizes: Value::Null,
            colors: Value::Null,
            source_url: String::new(),
            store: String::new(),
            category: String::new(),
            processed_at: String::new(),
            is_active: true,
            stock_status: String::new(),
            stock: Value::Null,
        }
    }
}
