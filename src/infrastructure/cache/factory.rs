//! Cache backend selection

use std::sync::Arc;
use std::time::Duration;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache types
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CacheType {
    #[default]
    InMemory,
    Redis,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            "redis" => Ok(CacheType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Build the configured cache backend; `ttl` caps in-memory entry lifetime
pub async fn create_cache(
    cache_type: CacheType,
    redis_url: Option<&str>,
    key_prefix: Option<&str>,
    ttl: Duration,
) -> Result<Arc<dyn Cache>, DomainError> {
    match cache_type {
        CacheType::InMemory => Ok(Arc::new(InMemoryCache::with_config(
            InMemoryCacheConfig::default().with_default_ttl(ttl),
        ))),
        CacheType::Redis => {
            let url = redis_url.ok_or_else(|| {
                DomainError::configuration("Redis URL is required for Redis cache type")
            })?;

            let mut config = RedisCacheConfig::new(url);

            if let Some(prefix) = key_prefix {
                config = config.with_key_prefix(prefix);
            }

            Ok(Arc::new(RedisCache::new(config).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[test]
    fn test_cache_type_from_str() {
        assert_eq!("in_memory".parse::<CacheType>().unwrap(), CacheType::InMemory);
        assert_eq!("memory".parse::<CacheType>().unwrap(), CacheType::InMemory);
        assert_eq!("REDIS".parse::<CacheType>().unwrap(), CacheType::Redis);
        assert!("memcached".parse::<CacheType>().is_err());
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let cache = create_cache(CacheType::InMemory, None, None, Duration::from_secs(60))
            .await
            .unwrap();

        cache
            .set("test", &"value", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("test").await.unwrap();
        assert_eq!(result, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_create_redis_requires_url() {
        let result = create_cache(
            CacheType::Redis,
            None,
            Some("tracker"),
            Duration::from_secs(60),
        )
        .await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
