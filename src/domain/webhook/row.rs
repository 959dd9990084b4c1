//! Typed row schema for the webhooks table and the pure mappings between
//! rows and the entity. Mapping is testable without a live store connection.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Webhook, WebhookProps, WebhookStatus, LEGACY_API_VERSION};

/// Full SELECT shape of a webhook row.
///
/// Timestamps come in pairs: the local wall-clock value and its UTC
/// equivalent, both stored without a zone. `date_modified` is NULL until the
/// first update; create never writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookRow {
    pub id: i64,
    pub status: String,
    pub name: String,
    pub user_id: i64,
    pub delivery_url: String,
    pub secret: String,
    pub topic: String,
    pub date_created: NaiveDateTime,
    pub date_created_gmt: NaiveDateTime,
    pub date_modified: Option<NaiveDateTime>,
    pub date_modified_gmt: Option<NaiveDateTime>,
    pub api_version: i32,
    pub failure_count: i32,
    pub pending_delivery: bool,
}

/// INSERT shape: everything except the store-assigned id and the
/// date_modified pair.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWebhookRow {
    pub status: String,
    pub name: String,
    pub user_id: i64,
    pub delivery_url: String,
    pub secret: String,
    pub topic: String,
    pub date_created: NaiveDateTime,
    pub date_created_gmt: NaiveDateTime,
    pub api_version: i32,
    pub failure_count: i32,
    pub pending_delivery: bool,
}

/// UPDATE shape: all mutable columns plus the date_modified pair.
/// `date_created` is written once on insert and never again.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookUpdate {
    pub status: String,
    pub name: String,
    pub user_id: i64,
    pub delivery_url: String,
    pub secret: String,
    pub topic: String,
    pub date_modified: NaiveDateTime,
    pub date_modified_gmt: NaiveDateTime,
    pub api_version: i32,
    pub failure_count: i32,
    pub pending_delivery: bool,
}

impl NewWebhookRow {
    /// Builds the insert row from the entity's current (pending-merged)
    /// field values and the resolved creation timestamp.
    pub fn from_webhook(webhook: &Webhook, created: DateTime<Local>) -> Self {
        Self {
            status: webhook.status().as_str().to_string(),
            name: webhook.name().to_string(),
            user_id: webhook.user_id(),
            delivery_url: webhook.delivery_url().to_string(),
            secret: webhook.secret().to_string(),
            topic: webhook.topic().to_string(),
            date_created: created.naive_local(),
            date_created_gmt: created.naive_utc(),
            api_version: api_version_number(webhook.api_version()),
            failure_count: webhook.failure_count(),
            pending_delivery: webhook.pending_delivery(),
        }
    }
}

impl WebhookUpdate {
    /// Builds the update row from the entity's current (pending-merged)
    /// field values and the resolved modification timestamp.
    pub fn from_webhook(webhook: &Webhook, modified: DateTime<Local>) -> Self {
        Self {
            status: webhook.status().as_str().to_string(),
            name: webhook.name().to_string(),
            user_id: webhook.user_id(),
            delivery_url: webhook.delivery_url().to_string(),
            secret: webhook.secret().to_string(),
            topic: webhook.topic().to_string(),
            date_modified: modified.naive_local(),
            date_modified_gmt: modified.naive_utc(),
            api_version: api_version_number(webhook.api_version()),
            failure_count: webhook.failure_count(),
            pending_delivery: webhook.pending_delivery(),
        }
    }
}

impl WebhookRow {
    /// Maps the row into a committed entity snapshot. Timestamps are rebuilt
    /// from the UTC column so the mapping round-trips across zone changes.
    pub fn to_props(&self) -> WebhookProps {
        WebhookProps {
            status: WebhookStatus::parse(&self.status),
            name: self.name.clone(),
            user_id: self.user_id,
            delivery_url: self.delivery_url.clone(),
            secret: self.secret.clone(),
            topic: self.topic.clone(),
            api_version: api_version_label(self.api_version),
            failure_count: self.failure_count,
            pending_delivery: self.pending_delivery,
            date_created: Some(local_from_gmt(self.date_created_gmt)),
            date_modified: self.date_modified_gmt.map(local_from_gmt),
        }
    }
}

/// Maps an API version label to its persisted numeric form.
///
/// The legacy sentinel maps to -1; any other label yields the trailing
/// character parsed as a digit, with non-digit trailing characters yielding
/// 0. Malformed labels are an accepted quirk, not an error.
pub fn api_version_number(label: &str) -> i32 {
    if label == LEGACY_API_VERSION {
        return -1;
    }

    label
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as i32)
        .unwrap_or(0)
}

/// Reverse mapping used on read: -1 restores the legacy sentinel, any other
/// number restores a versioned label.
pub fn api_version_label(version: i32) -> String {
    if version == -1 {
        LEGACY_API_VERSION.to_string()
    } else {
        format!("wc/v{}", version)
    }
}

fn local_from_gmt(gmt: NaiveDateTime) -> DateTime<Local> {
    Utc.from_utc_datetime(&gmt).with_timezone(&Local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::WebhookId;

    fn sample_webhook() -> Webhook {
        Webhook::new()
            .with_name("Order created")
            .with_topic("order.created")
            .with_delivery_url("https://example.test/hook")
            .with_secret("s3cret")
            .with_user_id(12)
            .with_status(WebhookStatus::Active)
            .with_api_version("wc/v2")
    }

    #[test]
    fn test_api_version_number_legacy() {
        assert_eq!(api_version_number("legacy_v3"), -1);
    }

    #[test]
    fn test_api_version_number_versioned_labels() {
        assert_eq!(api_version_number("wc/v2"), 2);
        assert_eq!(api_version_number("wc/v1"), 1);
        assert_eq!(api_version_number("wc/v3"), 3);
    }

    #[test]
    fn test_api_version_number_malformed_label_yields_zero() {
        assert_eq!(api_version_number("wc/vx"), 0);
        assert_eq!(api_version_number(""), 0);
    }

    #[test]
    fn test_api_version_label_round_trip() {
        assert_eq!(api_version_label(-1), "legacy_v3");
        assert_eq!(api_version_label(2), "wc/v2");
        assert_eq!(api_version_number(&api_version_label(3)), 3);
    }

    #[test]
    fn test_new_row_from_webhook() {
        let webhook = sample_webhook();
        let created = Local::now();
        let row = NewWebhookRow::from_webhook(&webhook, created);

        assert_eq!(row.status, "active");
        assert_eq!(row.name, "Order created");
        assert_eq!(row.user_id, 12);
        assert_eq!(row.topic, "order.created");
        assert_eq!(row.api_version, 2);
        assert_eq!(row.date_created, created.naive_local());
        assert_eq!(row.date_created_gmt, created.naive_utc());
    }

    #[test]
    fn test_update_row_from_webhook() {
        let mut webhook = sample_webhook();
        webhook.set_failure_count(3);
        let modified = Local::now();
        let row = WebhookUpdate::from_webhook(&webhook, modified);

        assert_eq!(row.failure_count, 3);
        assert_eq!(row.date_modified, modified.naive_local());
        assert_eq!(row.date_modified_gmt, modified.naive_utc());
    }

    #[test]
    fn test_row_to_props() {
        let created = Local::now();
        let row = WebhookRow {
            id: 9,
            status: "paused".to_string(),
            name: "Order created".to_string(),
            user_id: 12,
            delivery_url: "https://example.test/hook".to_string(),
            secret: "s3cret".to_string(),
            topic: "order.created".to_string(),
            date_created: created.naive_local(),
            date_created_gmt: created.naive_utc(),
            date_modified: None,
            date_modified_gmt: None,
            api_version: -1,
            failure_count: 5,
            pending_delivery: true,
        };

        let props = row.to_props();

        assert_eq!(props.status, WebhookStatus::Paused);
        assert_eq!(props.api_version, "legacy_v3");
        assert_eq!(props.failure_count, 5);
        assert!(props.pending_delivery);
        assert_eq!(props.date_created.unwrap().naive_utc(), created.naive_utc());
        assert!(props.date_modified.is_none());
    }

    #[test]
    fn test_row_to_props_unknown_status_falls_back() {
        let created = Local::now();
        let row = WebhookRow {
            id: 1,
            status: "garbage".to_string(),
            name: String::new(),
            user_id: 0,
            delivery_url: String::new(),
            secret: String::new(),
            topic: String::new(),
            date_created: created.naive_local(),
            date_created_gmt: created.naive_utc(),
            date_modified: None,
            date_modified_gmt: None,
            api_version: 3,
            failure_count: 0,
            pending_delivery: false,
        };

        assert_eq!(row.to_props().status, WebhookStatus::Disabled);
    }

    #[test]
    fn test_hydration_round_trips_through_entity() {
        let created = Local::now();
        let row = WebhookRow {
            id: 4,
            status: "active".to_string(),
            name: "Order created".to_string(),
            user_id: 12,
            delivery_url: "https://example.test/hook".to_string(),
            secret: "s3cret".to_string(),
            topic: "order.created".to_string(),
            date_created: created.naive_local(),
            date_created_gmt: created.naive_utc(),
            date_modified: Some(created.naive_local()),
            date_modified_gmt: Some(created.naive_utc()),
            api_version: 2,
            failure_count: 1,
            pending_delivery: false,
        };

        let mut webhook = Webhook::new();
        webhook.load(WebhookId::new(row.id), row.to_props());

        assert_eq!(webhook.id(), Some(WebhookId::new(4)));
        assert_eq!(webhook.api_version(), "wc/v2");
        assert!(webhook.is_loaded());

        let back = WebhookUpdate::from_webhook(&webhook, webhook.date_modified().unwrap());
        assert_eq!(back.api_version, 2);
        assert_eq!(back.date_modified, row.date_modified.unwrap());
    }
}
