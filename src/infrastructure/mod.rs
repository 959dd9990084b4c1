//! Infrastructure layer - adapters for the domain ports

pub mod cache;
pub mod webhook;

pub use cache::{InMemoryCache, InMemoryCacheConfig, RedisCache, RedisCacheConfig};
pub use webhook::{
    InMemoryWebhookTable, PostgresWebhookTable, WebhookDataStore, ALL_IDS_CACHE_KEY,
    ROW_CACHE_NAMESPACE,
};
