pub mod app_config;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pricing;
pub mod products;
pub mod slug;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, IngestError};
pub use ingest::{
    normalize_prices, parse_batch, plan_batch, BatchPlan, CatalogLookup, CatalogSnapshot,
    DropReason, DroppedRecord, IdRewrite, IngestSummary, PlanOptions,
};
pub use pricing::{derived_price, round_price, storable_price, tier_multiplier, PRICE_LIMIT};
pub use products::ProductRecord;
pub use slug::slug_candidate;

/// Default number of records written per multi-row `INSERT`.
pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 1000;
