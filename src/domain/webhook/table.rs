//! Statement port for the webhooks table

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::error::DataStoreError;

use super::entity::WebhookId;
use super::row::{NewWebhookRow, WebhookRow, WebhookUpdate};

/// The five parameterized statements the store issues against the webhooks
/// table. Each call is a single atomic statement; there is no partial-failure
/// state and no retry at this layer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WebhookTable: Send + Sync {
    /// Single-row INSERT; returns the store-assigned primary key
    async fn insert(&self, row: &NewWebhookRow) -> Result<WebhookId, DataStoreError>;

    /// Single-row SELECT by primary key
    async fn select(&self, id: WebhookId) -> Result<Option<WebhookRow>, DataStoreError>;

    /// Single-row UPDATE by primary key; returns the matched-row count
    async fn update(&self, id: WebhookId, update: &WebhookUpdate)
        -> Result<u64, DataStoreError>;

    /// Single-row DELETE by primary key; returns the deleted-row count
    async fn delete(&self, id: WebhookId) -> Result<u64, DataStoreError>;

    /// SELECT of the id column across all rows
    async fn select_ids(&self) -> Result<Vec<WebhookId>, DataStoreError>;
}
