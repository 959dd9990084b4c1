//! Configuration

mod store_config;

pub use store_config::{CacheSettings, DatabaseConfig, StoreConfig};
