pub mod coerce;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod outcome;
pub mod record;

pub use coerce::{coerce_bool, coerce_date, coerce_decimal, coerce_field, coerce_integer, is_blank, Coercion, CoercionOptions};
pub use config::{
    AnalyticsConfig, AppConfig, ImportConfig, IndicatorThresholds, ReconciliationConfig,
    RiskThresholds,
};
pub use config_loader::{ConfigLoader, ConfigStore, FileConfigStore, MemoryConfigStore};
pub use error::CoreError;
pub use outcome::{BetOutcome, BetResult, DailyOutcome, UnknownBetResult};
pub use record::{FieldType, Record, RecordSchema, SchemaField};
