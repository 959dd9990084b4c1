//! Store event hook points

use async_trait::async_trait;

use super::entity::{Webhook, WebhookId};

/// Notification emitted by the store after each successful operation.
///
/// Subscribers react to these without the store knowing who they are; the
/// payloads mirror the four hook points of the persistence lifecycle.
#[derive(Debug, Clone)]
pub enum WebhookStoreEvent {
    /// A new row was inserted and the id assigned
    Created { id: WebhookId },
    /// A row was read and the entity hydrated; carries the loaded snapshot
    Loaded { webhook: Webhook },
    /// A row was updated
    Updated { id: WebhookId },
    /// A row was removed; carries the now-detached entity snapshot
    Deleted { id: WebhookId, webhook: Webhook },
}

/// Observer interface for store events. Listeners are registered on the
/// store at construction and invoked in registration order.
#[async_trait]
pub trait WebhookEventListener: Send + Sync {
    async fn on_event(&self, event: &WebhookStoreEvent);
}
