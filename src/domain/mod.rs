//! Domain layer - entity, ports and error taxonomy

pub mod cache;
pub mod error;
pub mod webhook;

pub use cache::{namespaced_key, Cache, CacheExt};
pub use error::DataStoreError;
pub use webhook::{
    api_version_label, api_version_number, NewWebhookRow, Webhook, WebhookEventListener,
    WebhookId, WebhookProps, WebhookRow, WebhookStatus, WebhookStoreEvent, WebhookTable,
    WebhookUpdate, DEFAULT_API_VERSION, LEGACY_API_VERSION,
};
