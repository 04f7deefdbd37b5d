//! Accreditation Tracker
//!
//! Tracks player accreditation for league events:
//! - Event rosters read from a cache filled by the upstream sync job
//! - Per-team compliance computed against stored accreditations
//! - Team accreditation forms for captains and team admins
//! - In-memory or PostgreSQL stores, in-memory or Redis cache

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::{AccreditationServiceTrait, AppState, EventServiceTrait, UserServiceTrait};
use crate::config::{AuthConfig, CacheConfig, StorageConfig, TrackerConfig};
use domain::Cache;
use infrastructure::{
    accreditation::{InMemoryAccreditationRepository, PostgresAccreditationRepository},
    auth::{JwtConfig, JwtService},
    cache::{create_cache, CacheType},
    events::CacheEventSource,
    services::{AccreditationService, EventService, TrackerSettings},
    storage::{run_migrations, PostgresConfig, StorageType},
    upstream::{SyncService, UpstreamClient, UpstreamConfig},
    user::{
        Argon2Hasher, CreateUserRequest, InMemoryUserRepository, PostgresUserRepository,
        UserService,
    },
};
use rand::Rng;
use sqlx::PgPool;
use tracing::{info, warn};

/// Create the application state with all services initialized
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let cache = create_cache_from_config(&config.cache).await?;
    let source = Arc::new(CacheEventSource::new(cache.clone()));
    let settings = tracker_settings(&config.tracker);

    let storage_backend: StorageType = config.storage.backend.parse()?;
    info!(backend = %storage_backend, "Storage backend");

    // Each service wraps its store and is exposed through its trait
    let (event_service, accreditation_service, database): (
        Arc<dyn EventServiceTrait>,
        Arc<dyn AccreditationServiceTrait>,
        Option<PgPool>,
    ) = match storage_backend {
        StorageType::Postgres => {
            let pool = connect_database(&config.storage).await?;
            let applied = run_migrations(&pool).await?;
            info!(applied, "Database migrations checked");

            let repository = Arc::new(PostgresAccreditationRepository::new(pool.clone()));
            (
                Arc::new(EventService::new(source.clone(), repository.clone(), settings)),
                Arc::new(AccreditationService::new(source, repository, settings)),
                Some(pool),
            )
        }
        StorageType::InMemory => {
            let repository = Arc::new(InMemoryAccreditationRepository::new());
            (
                Arc::new(EventService::new(source.clone(), repository.clone(), settings)),
                Arc::new(AccreditationService::new(source, repository, settings)),
                None,
            )
        }
    };

    let user_service = create_user_service(storage_backend, database.as_ref());
    create_initial_admin_user(user_service.as_ref(), &config.auth).await?;

    let jwt_service = create_jwt_service(&config.auth);
    let about_html = load_about_html(&config.tracker.readme_path);

    let mut state = AppState::new(
        event_service,
        accreditation_service,
        user_service,
        jwt_service,
        cache,
    )
    .with_about_html(about_html);

    if let Some(pool) = database {
        state = state.with_database(pool);
    }

    if settings.demo_mode {
        warn!("Demo mode is on: every user administers every team");
    }

    Ok(state)
}

/// Build the configured snapshot cache
pub async fn create_cache_from_config(config: &CacheConfig) -> anyhow::Result<Arc<dyn Cache>> {
    let cache_type: CacheType = config.backend.parse()?;
    info!(backend = %cache_type, "Cache backend");

    let cache = create_cache(
        cache_type,
        config.redis_url.as_deref(),
        config.key_prefix.as_deref(),
        Duration::from_secs(config.ttl_secs),
    )
    .await?;

    Ok(cache)
}

/// Open the PostgreSQL pool; `DATABASE_URL` is used when no URL is configured
pub async fn connect_database(config: &StorageConfig) -> anyhow::Result<PgPool> {
    let url = config
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("storage.database_url or DATABASE_URL is required for PostgreSQL")
        })?;

    info!("Connecting to PostgreSQL...");
    let pool = PostgresConfig::new(url)
        .with_max_connections(config.max_connections)
        .connect()
        .await?;
    info!("PostgreSQL connection established");

    Ok(pool)
}

/// User service backed by the selected store
pub fn create_user_service(
    backend: StorageType,
    pool: Option<&PgPool>,
) -> Arc<dyn UserServiceTrait> {
    let hasher = Arc::new(Argon2Hasher::new());

    match (backend, pool) {
        (StorageType::Postgres, Some(pool)) => Arc::new(UserService::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            hasher,
        )),
        _ => Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            hasher,
        )),
    }
}

/// Sync job writing upstream events and rosters into `cache`
pub fn create_sync_service(
    config: &AppConfig,
    cache: Arc<dyn Cache>,
) -> anyhow::Result<SyncService> {
    let (client_id, client_secret) = config.upstream.credentials().ok_or_else(|| {
        anyhow::anyhow!("Upstream credentials missing: set UPAI_CLIENT_ID and UPAI_CLIENT_SECRET")
    })?;

    let upstream = UpstreamConfig::new(&config.upstream.base_url, client_id, client_secret)
        .with_per_page(config.upstream.per_page)
        .with_max_pages(config.upstream.max_pages)
        .with_timeout(Duration::from_secs(config.upstream.timeout_secs));
    let client = UpstreamClient::new(upstream)?;

    Ok(SyncService::new(
        client,
        cache,
        Duration::from_secs(config.cache.ttl_secs),
    ))
}

fn tracker_settings(config: &TrackerConfig) -> TrackerSettings {
    TrackerSettings::default()
        .with_demo_mode(config.demo_mode)
        .with_validity_months(config.validity_months)
}

/// Render the README's About section; a missing README gives an empty page
fn load_about_html(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(readme) => api::index::render_about(&readme),
        Err(e) => {
            warn!(path = %path, error = %e, "README not readable, index page will be empty");
            String::new()
        }
    }
}

/// Generate a random alphanumeric string
fn random_string(len: usize) -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Create JWT service from secret (config, env var, or random)
fn create_jwt_service(config: &AuthConfig) -> Arc<JwtService> {
    let secret = config
        .jwt_secret
        .clone()
        .or_else(|| std::env::var("JWT_SECRET").ok())
        .unwrap_or_else(|| {
            warn!(
                "No JWT secret configured. Generating random secret. \
                Tokens will NOT survive a restart."
            );
            random_string(64)
        });

    Arc::new(JwtService::new(JwtConfig::new(secret, config.expiration_hours)))
}

/// Create a superuser if the user store is empty
async fn create_initial_admin_user(
    user_service: &dyn UserServiceTrait,
    config: &AuthConfig,
) -> anyhow::Result<()> {
    if user_service.count().await? > 0 {
        return Ok(());
    }

    // Use ADMIN_DEFAULT_PASSWORD env var if set, otherwise generate random password
    let (password, is_default) = match std::env::var("ADMIN_DEFAULT_PASSWORD") {
        Ok(p) if !p.is_empty() => (p, true),
        _ => (random_string(16), false),
    };

    user_service
        .create(CreateUserRequest {
            id: "admin".to_string(),
            username: "admin".to_string(),
            email: config.admin_email.clone(),
            password: password.clone(),
            is_superuser: true,
        })
        .await?;

    info!("===========================================");
    info!("Initial admin user created!");
    info!("Username: admin");

    if is_default {
        info!("Password: (set via ADMIN_DEFAULT_PASSWORD)");
    } else {
        info!("Password: {}", password);
    }

    info!("===========================================");

    Ok(())
}
