//! Webhook domain - entity, row schema, statement port and store events

mod entity;
mod events;
mod row;
mod table;

pub use entity::{
    Webhook, WebhookId, WebhookProps, WebhookStatus, DEFAULT_API_VERSION, LEGACY_API_VERSION,
};
pub use events::{WebhookEventListener, WebhookStoreEvent};
pub use row::{api_version_label, api_version_number, NewWebhookRow, WebhookRow, WebhookUpdate};
pub use table::WebhookTable;

#[cfg(test)]
pub use events::test_support::RecordingListener;
#[cfg(test)]
pub use table::MockWebhookTable;
