//! In-memory webhook table implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::webhook::{NewWebhookRow, WebhookId, WebhookRow, WebhookTable, WebhookUpdate};
use crate::domain::DataStoreError;

/// In-memory implementation of the webhook statement port.
///
/// Assigns ids monotonically the way a serial primary key does. Used as a
/// test double and for embedded setups without a relational store.
#[derive(Debug)]
pub struct InMemoryWebhookTable {
    rows: RwLock<HashMap<i64, WebhookRow>>,
    next_id: AtomicI64,
}

impl InMemoryWebhookTable {
    /// Creates a new empty table
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of rows currently stored
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryWebhookTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookTable for InMemoryWebhookTable {
    async fn insert(&self, row: &NewWebhookRow) -> Result<WebhookId, DataStoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| DataStoreError::storage("Failed to acquire table lock"))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        rows.insert(
            id,
            WebhookRow {
                id,
                status: row.status.clone(),
                name: row.name.clone(),
                user_id: row.user_id,
                delivery_url: row.delivery_url.clone(),
                secret: row.secret.clone(),
                topic: row.topic.clone(),
                date_created: row.date_created,
                date_created_gmt: row.date_created_gmt,
                date_modified: None,
                date_modified_gmt: None,
                api_version: row.api_version,
                failure_count: row.failure_count,
                pending_delivery: row.pending_delivery,
            },
        );

        Ok(WebhookId::new(id))
    }

    async fn select(&self, id: WebhookId) -> Result<Option<WebhookRow>, DataStoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| DataStoreError::storage("Failed to acquire table lock"))?;

        Ok(rows.get(&id.as_i64()).cloned())
    }

    async fn update(
        &self,
        id: WebhookId,
        update: &WebhookUpdate,
    ) -> Result<u64, DataStoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| DataStoreError::storage("Failed to acquire table lock"))?;

        match rows.get_mut(&id.as_i64()) {
            Some(row) => {
                row.status = update.status.clone();
                row.name = update.name.clone();
                row.user_id = update.user_id;
                row.delivery_url = update.delivery_url.clone();
                row.secret = update.secret.clone();
                row.topic = update.topic.clone();
                row.date_modified = Some(update.date_modified);
                row.date_modified_gmt = Some(update.date_modified_gmt);
                row.api_version = update.api_version;
                row.failure_count = update.failure_count;
                row.pending_delivery = update.pending_delivery;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: WebhookId) -> Result<u64, DataStoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| DataStoreError::storage("Failed to acquire table lock"))?;

        Ok(if rows.remove(&id.as_i64()).is_some() { 1 } else { 0 })
    }

    async fn select_ids(&self) -> Result<Vec<WebhookId>, DataStoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| DataStoreError::storage("Failed to acquire table lock"))?;

        let mut ids: Vec<i64> = rows.keys().copied().collect();
        ids.sort_unstable();

        Ok(ids.into_iter().map(WebhookId::new).collect())
    }
}
