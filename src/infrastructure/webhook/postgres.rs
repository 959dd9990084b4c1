//! PostgreSQL webhook table implementation

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::config::DatabaseConfig;
use crate::domain::webhook::{NewWebhookRow, WebhookId, WebhookRow, WebhookTable, WebhookUpdate};
use crate::domain::DataStoreError;

/// PostgreSQL implementation of the webhook statement port.
///
/// Every operation is a single parameterized statement against the
/// `webhooks` table; the pool provides connection management and nothing
/// else is layered on top.
#[derive(Debug, Clone)]
pub struct PostgresWebhookTable {
    pool: PgPool,
}

impl PostgresWebhookTable {
    /// Creates a new table executor with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DataStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| {
                DataStoreError::storage(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ensures the webhooks table exists. Bootstrap only; schema evolution
    /// is out of scope for this layer.
    pub async fn ensure_table(&self) -> Result<(), DataStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS webhooks (
                id BIGSERIAL PRIMARY KEY,
                status VARCHAR(32) NOT NULL,
                name TEXT NOT NULL,
                user_id BIGINT NOT NULL,
                delivery_url TEXT NOT NULL,
                secret TEXT NOT NULL,
                topic VARCHAR(255) NOT NULL,
                date_created TIMESTAMP NOT NULL,
                date_created_gmt TIMESTAMP NOT NULL,
                date_modified TIMESTAMP,
                date_modified_gmt TIMESTAMP,
                api_version INTEGER NOT NULL,
                failure_count INTEGER NOT NULL DEFAULT 0,
                pending_delivery BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DataStoreError::storage(format!("Failed to create webhooks table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl WebhookTable for PostgresWebhookTable {
    async fn insert(&self, row: &NewWebhookRow) -> Result<WebhookId, DataStoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhooks (status, name, user_id, delivery_url, secret, topic,
                                  date_created, date_created_gmt, api_version,
                                  failure_count, pending_delivery)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&row.status)
        .bind(&row.name)
        .bind(row.user_id)
        .bind(&row.delivery_url)
        .bind(&row.secret)
        .bind(&row.topic)
        .bind(row.date_created)
        .bind(row.date_created_gmt)
        .bind(row.api_version)
        .bind(row.failure_count)
        .bind(row.pending_delivery)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DataStoreError::storage(format!("Failed to insert webhook: {}", e)))?;

        let id: i64 = result
            .try_get("id")
            .map_err(|e| DataStoreError::storage(format!("Failed to read generated id: {}", e)))?;

        Ok(WebhookId::new(id))
    }

    async fn select(&self, id: WebhookId) -> Result<Option<WebhookRow>, DataStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, status, name, user_id, delivery_url, secret, topic,
                   date_created, date_created_gmt, date_modified, date_modified_gmt,
                   api_version, failure_count, pending_delivery
            FROM webhooks
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DataStoreError::storage(format!("Failed to select webhook: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_webhook_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        id: WebhookId,
        update: &WebhookUpdate,
    ) -> Result<u64, DataStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE webhooks
            SET status = $2, name = $3, user_id = $4, delivery_url = $5, secret = $6,
                topic = $7, date_modified = $8, date_modified_gmt = $9,
                api_version = $10, failure_count = $11, pending_delivery = $12
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(&update.status)
        .bind(&update.name)
        .bind(update.user_id)
        .bind(&update.delivery_url)
        .bind(&update.secret)
        .bind(&update.topic)
        .bind(update.date_modified)
        .bind(update.date_modified_gmt)
        .bind(update.api_version)
        .bind(update.failure_count)
        .bind(update.pending_delivery)
        .execute(&self.pool)
        .await
        .map_err(|e| DataStoreError::storage(format!("Failed to update webhook: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: WebhookId) -> Result<u64, DataStoreError> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| DataStoreError::storage(format!("Failed to delete webhook: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn select_ids(&self) -> Result<Vec<WebhookId>, DataStoreError> {
        let rows = sqlx::query("SELECT id FROM webhooks")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DataStoreError::storage(format!("Failed to select webhook ids: {}", e)))?;

        let mut ids = Vec::with_capacity(rows.len());

        for row in rows {
            let id: i64 = row.try_get("id").map_err(|e| {
                DataStoreError::storage(format!("Failed to read webhook id: {}", e))
            })?;
            ids.push(WebhookId::new(id));
        }

        Ok(ids)
    }
}

fn row_to_webhook_row(row: &PgRow) -> Result<WebhookRow, DataStoreError> {
    let map_err =
        |e: sqlx::Error| DataStoreError::storage(format!("Failed to map webhook row: {}", e));

    Ok(WebhookRow {
        id: row.try_get("id").map_err(map_err)?,
        status: row.try_get("status").map_err(map_err)?,
        name: row.try_get("name").map_err(map_err)?,
        user_id: row.try_get("user_id").map_err(map_err)?,
        delivery_url: row.try_get("delivery_url").map_err(map_err)?,
        secret: row.try_get("secret").map_err(map_err)?,
        topic: row.try_get("topic").map_err(map_err)?,
        date_created: row.try_get("date_created").map_err(map_err)?,
        date_created_gmt: row.try_get("date_created_gmt").map_err(map_err)?,
        date_modified: row.try_get("date_modified").map_err(map_err)?,
        date_modified_gmt: row.try_get("date_modified_gmt").map_err(map_err)?,
        api_version: row.try_get("api_version").map_err(map_err)?,
        failure_count: row.try_get("failure_count").map_err(map_err)?,
        pending_delivery: row.try_get("pending_delivery").map_err(map_err)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::config::DatabaseConfig;

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::default();

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout_secs, 30);
        assert_eq!(config.idle_timeout_secs, 600);
    }
}
