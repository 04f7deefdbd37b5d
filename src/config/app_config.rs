use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    pub tracker: TrackerConfig,
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Accreditation and user store
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `in_memory` or `postgres`
    pub backend: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

/// Event snapshot cache
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `in_memory` or `redis`
    pub backend: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    /// Lifetime of snapshots written by the sync job
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Falls back to `JWT_SECRET`, then to a random per-process secret
    pub jwt_secret: Option<String>,
    pub expiration_hours: u64,
    /// Email of the superuser created when the user store is empty
    pub admin_email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Every logged-in user administers every team
    pub demo_mode: bool,
    pub validity_months: u32,
    /// README whose "About" section is served on the index page
    pub readme_path: String,
}

/// Tournament platform API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub per_page: u32,
    /// Registration pages fetched per event before the sync gives up
    pub max_pages: u32,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            database_url: None,
            max_connections: 5,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            redis_url: None,
            key_prefix: None,
            ttl_secs: 24 * 60 * 60,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            expiration_hours: 24,
            admin_email: "admin@example.com".to_string(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            demo_mode: false,
            validity_months: 18,
            readme_path: "README.md".to_string(),
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "https://upai.usetopscore.com".to_string(),
            client_id: None,
            client_secret: None,
            per_page: 100,
            max_pages: 50,
            timeout_secs: 30,
        }
    }
}

impl UpstreamSettings {
    /// Client credentials, falling back to `UPAI_CLIENT_ID` / `UPAI_CLIENT_SECRET`
    pub fn credentials(&self) -> Option<(String, String)> {
        let client_id = self
            .client_id
            .clone()
            .or_else(|| std::env::var("UPAI_CLIENT_ID").ok())?;
        let client_secret = self
            .client_secret
            .clone()
            .or_else(|| std::env::var("UPAI_CLIENT_SECRET").ok())?;

        Some((client_id, client_secret))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, "in_memory");
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert_eq!(config.tracker.validity_months, 18);
        assert!(!config.tracker.demo_mode);
        assert_eq!(config.upstream.per_page, 100);
        assert_eq!(config.upstream.max_pages, 50);
    }

    #[test]
    fn test_partial_sources_keep_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("tracker.demo_mode", true)
            .unwrap()
            .set_override("cache.backend", "redis")
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.tracker.demo_mode);
        assert_eq!(config.tracker.validity_months, 18);
        assert_eq!(config.cache.backend, "redis");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_explicit_credentials_win() {
        let settings = UpstreamSettings {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            ..UpstreamSettings::default()
        };

        assert_eq!(
            settings.credentials(),
            Some(("id".to_string(), "secret".to_string()))
        );
    }
}
