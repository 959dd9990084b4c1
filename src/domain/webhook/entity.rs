//! Webhook entity with explicit persisted/pending field snapshots

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Sentinel API version label mapped to the numeric value -1.
pub const LEGACY_API_VERSION: &str = "legacy_v3";

/// Default API version label for newly constructed webhooks.
pub const DEFAULT_API_VERSION: &str = "wc/v3";

/// Unique identifier for a webhook, assigned by the backing store on create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WebhookId(i64);

impl WebhookId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for WebhookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for WebhookId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Status of a webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    /// Webhook is active and will receive events
    #[default]
    Active,
    /// Webhook is paused and will not receive events
    Paused,
    /// Webhook is disabled due to repeated failures
    Disabled,
}

impl WebhookStatus {
    /// Returns the status as its persisted label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Disabled => "disabled",
        }
    }

    /// Parses a persisted status label. Unknown labels fall back to
    /// `Disabled`, matching the invalid-status handling of the entity.
    pub fn parse(label: &str) -> Self {
        match label {
            "active" => Self::Active,
            "paused" => Self::Paused,
            _ => Self::Disabled,
        }
    }
}

impl std::fmt::Display for WebhookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Committed field snapshot of a webhook.
///
/// This is the state last confirmed by storage (or the construction
/// defaults for an entity that was never persisted).
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookProps {
    pub status: WebhookStatus,
    pub name: String,
    pub user_id: i64,
    pub delivery_url: String,
    pub secret: String,
    pub topic: String,
    /// API version label, e.g. "wc/v3" or the legacy sentinel. The numeric
    /// form only exists at the row boundary.
    pub api_version: String,
    pub failure_count: i32,
    pub pending_delivery: bool,
    pub date_created: Option<DateTime<Local>>,
    pub date_modified: Option<DateTime<Local>>,
}

impl Default for WebhookProps {
    fn default() -> Self {
        Self {
            status: WebhookStatus::default(),
            name: String::new(),
            user_id: 0,
            delivery_url: String::new(),
            secret: String::new(),
            topic: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            failure_count: 0,
            pending_delivery: false,
            date_created: None,
            date_modified: None,
        }
    }
}

/// Uncommitted per-field changes, folded into the committed snapshot by
/// [`Webhook::apply_changes`].
#[derive(Debug, Clone, Default)]
struct WebhookChanges {
    status: Option<WebhookStatus>,
    name: Option<String>,
    user_id: Option<i64>,
    delivery_url: Option<String>,
    secret: Option<String>,
    topic: Option<String>,
    api_version: Option<String>,
    failure_count: Option<i32>,
    pending_delivery: Option<bool>,
    date_created: Option<DateTime<Local>>,
    date_modified: Option<DateTime<Local>>,
}

impl WebhookChanges {
    fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.name.is_none()
            && self.user_id.is_none()
            && self.delivery_url.is_none()
            && self.secret.is_none()
            && self.topic.is_none()
            && self.api_version.is_none()
            && self.failure_count.is_none()
            && self.pending_delivery.is_none()
            && self.date_created.is_none()
            && self.date_modified.is_none()
    }
}

/// In-memory webhook representation.
///
/// The entity keeps two snapshots: the committed state and a pending change
/// set. Accessors return the pending value when present so the store always
/// writes the caller's latest edits; [`Webhook::apply_changes`] commits the
/// pending set after a successful write. The table row remains the source of
/// truth.
///
/// Every setter other than the two date setters also stamps a pending
/// `date_modified` of "now"; the store reads that stamp on update.
#[derive(Debug, Clone)]
pub struct Webhook {
    id: Option<WebhookId>,
    data: WebhookProps,
    changes: WebhookChanges,
    object_read: bool,
}

impl Default for Webhook {
    fn default() -> Self {
        Self::new()
    }
}

impl Webhook {
    /// Creates a webhook with construction defaults and no assigned id
    pub fn new() -> Self {
        Self {
            id: None,
            data: WebhookProps::default(),
            changes: WebhookChanges::default(),
            object_read: false,
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Sets the event topic
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.set_topic(topic);
        self
    }

    /// Sets the delivery URL
    pub fn with_delivery_url(mut self, url: impl Into<String>) -> Self {
        self.set_delivery_url(url);
        self
    }

    /// Sets the signing secret
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.set_secret(secret);
        self
    }

    /// Sets the status
    pub fn with_status(mut self, status: WebhookStatus) -> Self {
        self.set_status(status);
        self
    }

    /// Sets the owning user id
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.set_user_id(user_id);
        self
    }

    /// Sets the API version label
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.set_api_version(api_version);
        self
    }

    pub fn id(&self) -> Option<WebhookId> {
        self.id
    }

    /// Assigns the store-generated id. The id is immutable in storage; a
    /// pre-set id is overwritten on create.
    pub fn set_id(&mut self, id: WebhookId) {
        self.id = Some(id);
    }

    pub fn status(&self) -> WebhookStatus {
        self.changes.status.unwrap_or(self.data.status)
    }

    pub fn name(&self) -> &str {
        self.changes.name.as_deref().unwrap_or(&self.data.name)
    }

    pub fn user_id(&self) -> i64 {
        self.changes.user_id.unwrap_or(self.data.user_id)
    }

    pub fn delivery_url(&self) -> &str {
        self.changes
            .delivery_url
            .as_deref()
            .unwrap_or(&self.data.delivery_url)
    }

    pub fn secret(&self) -> &str {
        self.changes.secret.as_deref().unwrap_or(&self.data.secret)
    }

    pub fn topic(&self) -> &str {
        self.changes.topic.as_deref().unwrap_or(&self.data.topic)
    }

    pub fn api_version(&self) -> &str {
        self.changes
            .api_version
            .as_deref()
            .unwrap_or(&self.data.api_version)
    }

    pub fn failure_count(&self) -> i32 {
        self.changes.failure_count.unwrap_or(self.data.failure_count)
    }

    pub fn pending_delivery(&self) -> bool {
        self.changes
            .pending_delivery
            .unwrap_or(self.data.pending_delivery)
    }

    pub fn date_created(&self) -> Option<DateTime<Local>> {
        self.changes.date_created.or(self.data.date_created)
    }

    /// The tracked modification timestamp: the stamp of the most recent
    /// field edit, or the committed value for an unmodified entity.
    pub fn date_modified(&self) -> Option<DateTime<Local>> {
        self.changes.date_modified.or(self.data.date_modified)
    }

    pub fn set_status(&mut self, status: WebhookStatus) {
        self.changes.status = Some(status);
        self.touch();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.changes.name = Some(name.into());
        self.touch();
    }

    pub fn set_user_id(&mut self, user_id: i64) {
        self.changes.user_id = Some(user_id);
        self.touch();
    }

    pub fn set_delivery_url(&mut self, url: impl Into<String>) {
        self.changes.delivery_url = Some(url.into());
        self.touch();
    }

    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.changes.secret = Some(secret.into());
        self.touch();
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.changes.topic = Some(topic.into());
        self.touch();
    }

    pub fn set_api_version(&mut self, api_version: impl Into<String>) {
        self.changes.api_version = Some(api_version.into());
        self.touch();
    }

    pub fn set_failure_count(&mut self, count: i32) {
        self.changes.failure_count = Some(count);
        self.touch();
    }

    pub fn set_pending_delivery(&mut self, pending: bool) {
        self.changes.pending_delivery = Some(pending);
        self.touch();
    }

    /// Sets the creation timestamp. Set once at creation and never changed
    /// afterward; does not stamp `date_modified`.
    pub fn set_date_created(&mut self, date_created: DateTime<Local>) {
        self.changes.date_created = Some(date_created);
    }

    pub fn set_date_modified(&mut self, date_modified: DateTime<Local>) {
        self.changes.date_modified = Some(date_modified);
    }

    /// Whether any uncommitted changes are pending
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Whether the entity was hydrated from storage
    pub fn is_loaded(&self) -> bool {
        self.object_read
    }

    /// Folds pending changes into the committed snapshot. Called by the
    /// store after a successful write.
    pub fn apply_changes(&mut self) {
        let changes = std::mem::take(&mut self.changes);

        if let Some(status) = changes.status {
            self.data.status = status;
        }
        if let Some(name) = changes.name {
            self.data.name = name;
        }
        if let Some(user_id) = changes.user_id {
            self.data.user_id = user_id;
        }
        if let Some(delivery_url) = changes.delivery_url {
            self.data.delivery_url = delivery_url;
        }
        if let Some(secret) = changes.secret {
            self.data.secret = secret;
        }
        if let Some(topic) = changes.topic {
            self.data.topic = topic;
        }
        if let Some(api_version) = changes.api_version {
            self.data.api_version = api_version;
        }
        if let Some(failure_count) = changes.failure_count {
            self.data.failure_count = failure_count;
        }
        if let Some(pending_delivery) = changes.pending_delivery {
            self.data.pending_delivery = pending_delivery;
        }
        if let Some(date_created) = changes.date_created {
            self.data.date_created = Some(date_created);
        }
        if let Some(date_modified) = changes.date_modified {
            self.data.date_modified = Some(date_modified);
        }
    }

    /// Replaces the committed state with values read from storage, discards
    /// pending changes and marks the entity as loaded.
    pub fn load(&mut self, id: WebhookId, props: WebhookProps) {
        self.id = Some(id);
        self.data = props;
        self.changes = WebhookChanges::default();
        self.object_read = true;
    }

    fn touch(&mut self) {
        self.changes.date_modified = Some(Local::now());
    }
}
