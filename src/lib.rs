//! Webhook persistence layer
//!
//! Translates between an in-memory webhook entity and rows in a dedicated
//! relational table, with:
//! - A two-tier cache (per-row entries plus a single all-ids list entry),
//!   kept coherent by deleting entries whenever the underlying set changes
//! - Store event hook points (created / loaded / updated / deleted) for
//!   external subscribers
//! - Injected ports for the statement executor, the cache and the event
//!   listeners, so each collaborator can be substituted in tests
//!
//! Delivery of webhook payloads, retry scheduling and any HTTP surface live
//! elsewhere; this crate is the data-access layer only.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use self::config::{CacheSettings, DatabaseConfig, StoreConfig};
pub use domain::{
    Cache, CacheExt, DataStoreError, Webhook, WebhookEventListener, WebhookId, WebhookProps,
    WebhookRow, WebhookStatus, WebhookStoreEvent, WebhookTable,
};
pub use infrastructure::{
    InMemoryCache, InMemoryWebhookTable, PostgresWebhookTable, RedisCache, WebhookDataStore,
};
