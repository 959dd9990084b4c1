//! Webhook persistence adapters and the data store component

mod data_store;
mod in_memory;
mod postgres;

pub use data_store::{WebhookDataStore, ALL_IDS_CACHE_KEY, ROW_CACHE_NAMESPACE};
pub use in_memory::InMemoryWebhookTable;
pub use postgres::PostgresWebhookTable;
