//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DataStoreError;

/// Generic key-value cache with optional per-entry expiry.
///
/// This trait uses JSON strings internally to be dyn-compatible.
/// Use the [`CacheExt`] helper methods for typed operations.
///
/// A `ttl` of `None` stores the entry with no explicit expiry; such entries
/// live until explicitly deleted (or evicted by capacity pressure).
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value from the cache.
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DataStoreError>;

    /// Sets a raw JSON value in the cache, replacing any existing entry.
    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), DataStoreError>;

    /// Adds a value only if the key is absent. Returns whether it was added.
    async fn add_raw(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, DataStoreError> {
        if self.get_raw(key).await?.is_some() {
            Ok(false)
        } else {
            self.set_raw(key, value, ttl).await?;
            Ok(true)
        }
    }

    /// Deletes an entry. Returns whether a value was present.
    async fn delete(&self, key: &str) -> Result<bool, DataStoreError>;
}

/// Extension trait providing typed get/set/add operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DataStoreError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DataStoreError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the cache
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Option<Duration>,
    ) -> impl std::future::Future<Output = Result<(), DataStoreError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DataStoreError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }

    /// Adds a typed value only if the key is absent
    fn add<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Option<Duration>,
    ) -> impl std::future::Future<Output = Result<bool, DataStoreError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DataStoreError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.add_raw(key, &data, ttl).await
        }
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}
