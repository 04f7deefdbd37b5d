//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Snapshot store holding the upstream event data as JSON documents
///
/// Values are raw strings so the trait stays dyn-compatible; [`CacheExt`]
/// adds the typed layer. Expiry is per write.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Write several documents; backends that can do so apply them atomically
    async fn set_many_raw(
        &self,
        entries: &[(String, String)],
        ttl: Duration,
    ) -> Result<(), DomainError> {
        for (key, value) in entries {
            self.set_raw(key, value, ttl).await?;
        }
        Ok(())
    }

    /// Round-trip check used by the readiness probe
    async fn ping(&self) -> Result<(), DomainError> {
        self.get_raw("__ping__").await.map(|_| ())
    }
}

/// Serialize `value` for [`Cache::set_many_raw`]
pub fn encode_entry<V: Serialize>(
    key: impl Into<String>,
    value: &V,
) -> Result<(String, String), DomainError> {
    let key = key.into();
    let json = serde_json::to_string(value)
        .map_err(|e| DomainError::cache(format!("Failed to encode '{}': {}", key, e)))?;
    Ok((key, json))
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!(
                            "Failed to deserialize cache value '{}': {}",
                            key, e
                        ))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the cache with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}
