//! Webhook data store: translates between the in-memory entity and table
//! rows, maintains the per-row and all-ids caches and emits store events.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info};

use crate::domain::cache::{namespaced_key, Cache, CacheExt};
use crate::domain::webhook::{
    api_version_number, NewWebhookRow, Webhook, WebhookEventListener, WebhookId, WebhookRow,
    WebhookStoreEvent, WebhookTable, WebhookUpdate,
};
use crate::domain::DataStoreError;

/// Cache namespace for single-row entries, addressed as `webhooks:<id>`.
pub const ROW_CACHE_NAMESPACE: &str = "webhooks";

/// Cache key for the list of all webhook ids. Stored with no explicit
/// expiry; invalidated only by create and delete.
pub const ALL_IDS_CACHE_KEY: &str = "webhook_ids";

const DEFAULT_ROW_TTL: Duration = Duration::from_secs(3600);

/// Persistence component for the webhook entity.
///
/// Issues one statement per operation against the injected [`WebhookTable`]
/// and keeps two cache tiers coherent by deleting entries (never updating
/// them in place) whenever the underlying data changes. There is no
/// optimistic-concurrency check: concurrent updates are last-writer-wins,
/// and the backing store's row-level atomicity is the only coordination.
pub struct WebhookDataStore {
    table: Arc<dyn WebhookTable>,
    cache: Arc<dyn Cache>,
    listeners: Vec<Arc<dyn WebhookEventListener>>,
    row_ttl: Option<Duration>,
}

impl WebhookDataStore {
    /// Creates a store over the given statement executor and cache
    pub fn new(table: Arc<dyn WebhookTable>, cache: Arc<dyn Cache>) -> Self {
        Self {
            table,
            cache,
            listeners: Vec::new(),
            row_ttl: Some(DEFAULT_ROW_TTL),
        }
    }

    /// Registers a listener for the four store events
    pub fn with_listener(mut self, listener: Arc<dyn WebhookEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Overrides the TTL applied to row-cache entries. `None` stores rows
    /// with no explicit expiry; the all-ids entry always does.
    pub fn with_row_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.row_ttl = ttl;
        self
    }

    /// Creates a new webhook row and assigns the generated id back onto the
    /// entity.
    ///
    /// A creation timestamp already present on the entity is used as-is
    /// (with its UTC equivalent derived); otherwise both default to now and
    /// the default is written back. `date_modified` is not written on
    /// create.
    pub async fn create(&self, webhook: &mut Webhook) -> Result<(), DataStoreError> {
        let created = match webhook.date_created() {
            Some(date_created) => date_created,
            None => {
                let now = Local::now();
                webhook.set_date_created(now);
                now
            }
        };

        let row = NewWebhookRow::from_webhook(webhook, created);
        let id = self.table.insert(&row).await?;

        webhook.set_id(id);
        webhook.apply_changes();

        self.cache.delete(ALL_IDS_CACHE_KEY).await?;

        info!(id = %id, topic = %webhook.topic(), "webhook created");
        self.notify(WebhookStoreEvent::Created { id }).await;

        Ok(())
    }

    /// Reads the row for the entity's id and hydrates every field.
    ///
    /// Serves from the row cache when possible; a miss queries the table
    /// and populates the cache. A missing row is an explicit not-found
    /// failure and the entity is left unhydrated.
    pub async fn read(&self, webhook: &mut Webhook) -> Result<(), DataStoreError> {
        let id = self.require_id(webhook)?;
        let key = Self::row_key(id);

        let row = match self.cache.get::<WebhookRow>(&key).await? {
            Some(row) => {
                debug!(id = %id, "webhook row cache hit");
                Some(row)
            }
            None => {
                let row = self.table.select(id).await?;
                if let Some(row) = &row {
                    self.cache.add(&key, row, self.row_ttl).await?;
                }
                row
            }
        };

        match row {
            Some(row) => {
                webhook.load(WebhookId::new(row.id), row.to_props());
                self.notify(WebhookStoreEvent::Loaded {
                    webhook: webhook.clone(),
                })
                .await;
                Ok(())
            }
            None => Err(DataStoreError::not_found(format!(
                "webhook {} does not exist",
                id
            ))),
        }
    }

    /// Writes all mutable columns plus the date_modified pair for the
    /// entity's id.
    ///
    /// The modification timestamp comes from the entity's tracked stamp;
    /// an entity without a creation date (edge-case fallback) gets "now"
    /// written back instead. The statement's matched-row count is not
    /// inspected: concurrent writers are last-writer-wins and a vanished
    /// row updates nothing.
    pub async fn update(&self, webhook: &mut Webhook) -> Result<(), DataStoreError> {
        let id = self.require_id(webhook)?;

        let modified = if webhook.date_created().is_some() {
            webhook.date_modified().unwrap_or_else(Local::now)
        } else {
            let now = Local::now();
            webhook.set_date_modified(now);
            now
        };

        let update = WebhookUpdate::from_webhook(webhook, modified);
        self.table.update(id, &update).await?;

        webhook.apply_changes();

        // The set of ids is unchanged, so only the row entry goes.
        self.cache.delete(&Self::row_key(id)).await?;

        debug!(id = %id, "webhook updated");
        self.notify(WebhookStoreEvent::Updated { id }).await;

        Ok(())
    }

    /// Removes the row for the entity's id.
    ///
    /// `force` is accepted for interface symmetry with soft-delete-capable
    /// entities; webhooks have no trash state and deletion is always
    /// permanent.
    pub async fn delete(&self, webhook: &Webhook, force: bool) -> Result<(), DataStoreError> {
        let id = self.require_id(webhook)?;

        self.table.delete(id).await?;

        self.cache.delete(&Self::row_key(id)).await?;
        self.cache.delete(ALL_IDS_CACHE_KEY).await?;

        info!(id = %id, force, "webhook deleted");
        self.notify(WebhookStoreEvent::Deleted {
            id,
            webhook: webhook.clone(),
        })
        .await;

        Ok(())
    }

    /// Maps an API version label to its numeric form. See
    /// [`api_version_number`] for the malformed-label quirk.
    pub fn api_version_number(&self, label: &str) -> i32 {
        api_version_number(label)
    }

    /// Returns the ids of all webhooks, memoized under a single cache key
    /// with no explicit expiry.
    pub async fn get_all_ids(&self) -> Result<Vec<WebhookId>, DataStoreError> {
        if let Some(ids) = self.cache.get::<Vec<WebhookId>>(ALL_IDS_CACHE_KEY).await? {
            debug!(count = ids.len(), "webhook id list served from cache");
            return Ok(ids);
        }

        let ids = self.table.select_ids().await?;
        self.cache.set(ALL_IDS_CACHE_KEY, &ids, None).await?;

        Ok(ids)
    }

    fn require_id(&self, webhook: &Webhook) -> Result<WebhookId, DataStoreError> {
        webhook
            .id()
            .ok_or_else(|| DataStoreError::not_found("webhook id is not set"))
    }

    fn row_key(id: WebhookId) -> String {
        namespaced_key(ROW_CACHE_NAMESPACE, id)
    }

    async fn notify(&self, event: WebhookStoreEvent) {
        for listener in &self.listeners {
            listener.on_event(&event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::webhook::{
        MockWebhookTable, RecordingListener, WebhookRow, WebhookStatus,
    };
    use crate::infrastructure::webhook::InMemoryWebhookTable;

    fn sample_webhook() -> Webhook {
        Webhook::new()
            .with_name("Order created")
            .with_topic("order.created")
            .with_delivery_url("https://example.test/hook")
            .with_secret("s3cret")
            .with_user_id(12)
            .with_api_version("wc/v2")
    }

    fn store_with_table(
        table: Arc<dyn WebhookTable>,
    ) -> (WebhookDataStore, Arc<MockCache>, Arc<RecordingListener>) {
        let cache = Arc::new(MockCache::new());
        let listener = Arc::new(RecordingListener::new());
        let store = WebhookDataStore::new(table, cache.clone()).with_listener(listener.clone());
        (store, cache, listener)
    }

    fn in_memory_store() -> (
        WebhookDataStore,
        Arc<InMemoryWebhookTable>,
        Arc<MockCache>,
        Arc<RecordingListener>,
    ) {
        let table = Arc::new(InMemoryWebhookTable::new());
        let (store, cache, listener) = store_with_table(table.clone());
        (store, table, cache, listener)
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_commits_changes() {
        let (store, _table, _cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();

        store.create(&mut webhook).await.unwrap();

        let id = webhook.id().expect("id assigned");
        assert!(id.as_i64() > 0);
        assert!(!webhook.has_changes());
    }

    #[tokio::test]
    async fn test_create_defaults_creation_date_to_now() {
        let (store, _table, _cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        assert!(webhook.date_created().is_none());

        let before = Local::now();
        store.create(&mut webhook).await.unwrap();
        let after = Local::now();

        let created = webhook.date_created().expect("default written back");
        assert!(created >= before && created <= after);
    }

    #[tokio::test]
    async fn test_create_uses_preset_creation_date() {
        let (store, table, _cache, _listener) = in_memory_store();
        let preset = Local::now() - chrono::Duration::days(3);
        let mut webhook = sample_webhook();
        webhook.set_date_created(preset);

        store.create(&mut webhook).await.unwrap();

        let row = table
            .select(webhook.id().unwrap())
            .await
            .unwrap()
            .expect("row inserted");
        assert_eq!(row.date_created, preset.naive_local());
        assert_eq!(row.date_created_gmt, preset.naive_utc());
    }

    #[tokio::test]
    async fn test_create_invalidates_all_ids_cache() {
        let (store, _table, cache, _listener) = in_memory_store();

        let first = store.get_all_ids().await.unwrap();
        assert!(cache.contains(ALL_IDS_CACHE_KEY));

        let mut webhook = sample_webhook();
        store.create(&mut webhook).await.unwrap();
        assert!(!cache.contains(ALL_IDS_CACHE_KEY));

        let second = store.get_all_ids().await.unwrap();
        assert_eq!(second.len(), first.len() + 1);
        assert!(second.contains(&webhook.id().unwrap()));
    }

    #[tokio::test]
    async fn test_create_read_round_trip() {
        let (store, _table, _cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        webhook.set_failure_count(1);
        webhook.set_pending_delivery(true);
        store.create(&mut webhook).await.unwrap();

        let mut loaded = Webhook::new();
        loaded.set_id(webhook.id().unwrap());
        store.read(&mut loaded).await.unwrap();

        assert_eq!(loaded.status(), WebhookStatus::Active);
        assert_eq!(loaded.name(), "Order created");
        assert_eq!(loaded.user_id(), 12);
        assert_eq!(loaded.delivery_url(), "https://example.test/hook");
        assert_eq!(loaded.secret(), "s3cret");
        assert_eq!(loaded.topic(), "order.created");
        assert_eq!(loaded.api_version(), "wc/v2");
        assert_eq!(loaded.failure_count(), 1);
        assert!(loaded.pending_delivery());
        assert!(loaded.is_loaded());
    }

    #[tokio::test]
    async fn test_read_without_id_fails() {
        let (store, _table, _cache, _listener) = in_memory_store();
        let mut webhook = Webhook::new();

        let err = store.read(&mut webhook).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_read_nonexistent_id_fails_without_hydrating() {
        let (store, _table, _cache, _listener) = in_memory_store();
        let mut webhook = Webhook::new();
        webhook.set_id(WebhookId::new(999));

        let err = store.read(&mut webhook).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!webhook.is_loaded());
    }

    #[tokio::test]
    async fn test_read_populates_row_cache() {
        let (store, _table, cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        store.create(&mut webhook).await.unwrap();
        let id = webhook.id().unwrap();

        let mut loaded = Webhook::new();
        loaded.set_id(id);
        store.read(&mut loaded).await.unwrap();

        assert!(cache.contains(&WebhookDataStore::row_key(id)));
    }

    #[tokio::test]
    async fn test_read_serves_from_cache_without_touching_table() {
        let row = WebhookRow {
            id: 7,
            status: "active".to_string(),
            name: "Cached".to_string(),
            user_id: 3,
            delivery_url: "https://example.test/hook".to_string(),
            secret: "s3cret".to_string(),
            topic: "order.updated".to_string(),
            date_created: Local::now().naive_local(),
            date_created_gmt: Local::now().naive_utc(),
            date_modified: None,
            date_modified_gmt: None,
            api_version: 3,
            failure_count: 0,
            pending_delivery: false,
        };

        // The table expects no select at all; the cached row must satisfy
        // the read on its own.
        let mut table = MockWebhookTable::new();
        table.expect_select().never();

        let cache = Arc::new(
            MockCache::new().with_entry(&WebhookDataStore::row_key(WebhookId::new(7)), &row),
        );
        let store = WebhookDataStore::new(Arc::new(table), cache);

        let mut webhook = Webhook::new();
        webhook.set_id(WebhookId::new(7));
        store.read(&mut webhook).await.unwrap();

        assert_eq!(webhook.name(), "Cached");
        assert_eq!(webhook.topic(), "order.updated");
    }

    #[tokio::test]
    async fn test_update_persists_fields_and_advances_date_modified() {
        let (store, _table, _cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        store.create(&mut webhook).await.unwrap();
        let id = webhook.id().unwrap();

        let mut before = Webhook::new();
        before.set_id(id);
        store.read(&mut before).await.unwrap();
        let before_modified = before.date_modified();

        webhook.set_failure_count(3);
        store.update(&mut webhook).await.unwrap();

        let mut after = Webhook::new();
        after.set_id(id);
        store.read(&mut after).await.unwrap();

        assert_eq!(after.failure_count(), 3);
        let after_modified = after.date_modified().expect("date_modified written");
        if let Some(before_modified) = before_modified {
            assert!(after_modified >= before_modified);
        }
    }

    #[tokio::test]
    async fn test_update_preserves_creation_date() {
        let (store, table, _cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        store.create(&mut webhook).await.unwrap();
        let id = webhook.id().unwrap();

        let created = table.select(id).await.unwrap().unwrap().date_created;

        webhook.set_name("Renamed");
        store.update(&mut webhook).await.unwrap();

        let row = table.select(id).await.unwrap().unwrap();
        assert_eq!(row.date_created, created);
        assert_eq!(row.name, "Renamed");
    }

    #[tokio::test]
    async fn test_update_invalidates_row_cache_but_not_ids_cache() {
        let (store, _table, cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        store.create(&mut webhook).await.unwrap();
        let id = webhook.id().unwrap();

        // Prime both cache tiers.
        store.get_all_ids().await.unwrap();
        let mut loaded = Webhook::new();
        loaded.set_id(id);
        store.read(&mut loaded).await.unwrap();

        webhook.set_failure_count(1);
        store.update(&mut webhook).await.unwrap();

        assert!(!cache.contains(&WebhookDataStore::row_key(id)));
        assert!(cache.contains(ALL_IDS_CACHE_KEY));
    }

    #[tokio::test]
    async fn test_delete_then_read_fails() {
        let (store, _table, _cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        store.create(&mut webhook).await.unwrap();
        let id = webhook.id().unwrap();

        // Prime the row cache so the delete has a stale entry to remove.
        let mut loaded = Webhook::new();
        loaded.set_id(id);
        store.read(&mut loaded).await.unwrap();

        store.delete(&webhook, false).await.unwrap();

        let mut after = Webhook::new();
        after.set_id(id);
        let err = store.read(&mut after).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_invalidates_all_ids_cache() {
        let (store, _table, cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        store.create(&mut webhook).await.unwrap();
        let id = webhook.id().unwrap();

        let before = store.get_all_ids().await.unwrap();
        assert!(before.contains(&id));

        store.delete(&webhook, true).await.unwrap();
        assert!(!cache.contains(ALL_IDS_CACHE_KEY));

        let after = store.get_all_ids().await.unwrap();
        assert!(!after.contains(&id));
        assert_eq!(after.len(), before.len() - 1);
    }

    #[tokio::test]
    async fn test_get_all_ids_memoizes_result() {
        let (store, table, _cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        store.create(&mut webhook).await.unwrap();
        let id = webhook.id().unwrap();

        let first = store.get_all_ids().await.unwrap();

        // Bypass the store: the cached list must mask direct table changes
        // until an invalidating operation runs.
        table.delete(id).await.unwrap();
        let second = store.get_all_ids().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_events_fire_in_lifecycle_order() {
        let (store, _table, _cache, listener) = in_memory_store();
        let mut webhook = sample_webhook();

        store.create(&mut webhook).await.unwrap();
        let id = webhook.id().unwrap();

        let mut loaded = Webhook::new();
        loaded.set_id(id);
        store.read(&mut loaded).await.unwrap();

        loaded.set_status(WebhookStatus::Paused);
        store.update(&mut loaded).await.unwrap();

        store.delete(&loaded, false).await.unwrap();

        assert_eq!(
            listener.labels(),
            vec!["created", "loaded", "updated", "deleted"]
        );

        let events = listener.events();
        match &events[0] {
            WebhookStoreEvent::Created { id: event_id } => assert_eq!(*event_id, id),
            other => panic!("unexpected event: {:?}", other),
        }
        match &events[1] {
            WebhookStoreEvent::Loaded { webhook } => {
                assert_eq!(webhook.id(), Some(id));
                assert_eq!(webhook.name(), "Order created");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match &events[3] {
            WebhookStoreEvent::Deleted { id: event_id, webhook } => {
                assert_eq!(*event_id, id);
                assert_eq!(webhook.id(), Some(id));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_read_emits_no_event() {
        let (store, _table, _cache, listener) = in_memory_store();
        let mut webhook = Webhook::new();
        webhook.set_id(WebhookId::new(404));

        let _ = store.read(&mut webhook).await;
        assert!(listener.labels().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut table = MockWebhookTable::new();
        table
            .expect_insert()
            .returning(|_| Err(DataStoreError::storage("connection refused")));

        let (store, _cache, listener) = store_with_table(Arc::new(table));

        let mut webhook = sample_webhook();
        let err = store.create(&mut webhook).await.unwrap_err();
        assert!(matches!(err, DataStoreError::Storage { .. }));
        assert!(webhook.id().is_none());
        assert!(listener.labels().is_empty());
    }

    #[tokio::test]
    async fn test_api_version_number_delegation() {
        let (store, _table, _cache, _listener) = in_memory_store();

        assert_eq!(store.api_version_number("legacy_v3"), -1);
        assert_eq!(store.api_version_number("wc/v2"), 2);
        assert_eq!(store.api_version_number("wc/v1"), 1);
    }

    #[tokio::test]
    async fn test_creation_date_stable_across_updates() {
        let (store, table, _cache, _listener) = in_memory_store();
        let mut webhook = sample_webhook();
        store.create(&mut webhook).await.unwrap();
        let id = webhook.id().unwrap();
        let created = table.select(id).await.unwrap().unwrap().date_created;

        for count in 1..=3 {
            webhook.set_failure_count(count);
            store.update(&mut webhook).await.unwrap();
        }

        let row = table.select(id).await.unwrap().unwrap();
        assert_eq!(row.date_created, created);
        assert_eq!(row.failure_count, 3);
    }
}
