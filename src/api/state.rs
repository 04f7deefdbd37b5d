//! Application state for shared services

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::accreditation::AccreditationRepository;
use crate::domain::event::EventSource;
use crate::domain::intake::AccreditationFormRow;
use crate::domain::user::UserRepository;
use crate::domain::{Cache, DomainError, User};
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::services::{
    AccreditationForm, AccreditationService, EventListing, EventPage, EventService,
    SubmissionOutcome,
};
use crate::infrastructure::user::{CreateUserRequest, PasswordHasher, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub event_service: Arc<dyn EventServiceTrait>,
    pub accreditation_service: Arc<dyn AccreditationServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub jwt_service: Arc<JwtService>,
    /// Event snapshot cache, probed by the readiness check
    pub cache: Arc<dyn Cache>,
    /// Set when the stores live in PostgreSQL
    pub database: Option<PgPool>,
    /// Rendered "About" section of the README
    pub about_html: Arc<str>,
}

/// Trait for event service operations
#[async_trait::async_trait]
pub trait EventServiceTrait: Send + Sync {
    async fn list_events(&self, today: NaiveDate) -> Result<EventListing, DomainError>;
    async fn event_page(&self, event_id: i64, user: &User) -> Result<EventPage, DomainError>;
}

/// Trait for accreditation form operations
#[async_trait::async_trait]
pub trait AccreditationServiceTrait: Send + Sync {
    async fn form(
        &self,
        event_id: i64,
        team_name: &str,
        user: &User,
    ) -> Result<AccreditationForm, DomainError>;

    async fn submit(
        &self,
        event_id: i64,
        team_name: &str,
        user: &User,
        rows: Vec<AccreditationFormRow>,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, DomainError>;
}

/// Trait for user account operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<Option<User>, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<User>, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<S, R> EventServiceTrait for EventService<S, R>
where
    S: EventSource + 'static,
    R: AccreditationRepository + 'static,
{
    async fn list_events(&self, today: NaiveDate) -> Result<EventListing, DomainError> {
        EventService::list_events(self, today).await
    }

    async fn event_page(&self, event_id: i64, user: &User) -> Result<EventPage, DomainError> {
        EventService::event_page(self, event_id, user).await
    }
}

#[async_trait::async_trait]
impl<S, R> AccreditationServiceTrait for AccreditationService<S, R>
where
    S: EventSource + 'static,
    R: AccreditationRepository + 'static,
{
    async fn form(
        &self,
        event_id: i64,
        team_name: &str,
        user: &User,
    ) -> Result<AccreditationForm, DomainError> {
        AccreditationService::form(self, event_id, team_name, user).await
    }

    async fn submit(
        &self,
        event_id: i64,
        team_name: &str,
        user: &User,
        rows: Vec<AccreditationFormRow>,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, DomainError> {
        AccreditationService::submit(self, event_id, team_name, user, rows, today).await
    }
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        UserService::create(self, request).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        event_service: Arc<dyn EventServiceTrait>,
        accreditation_service: Arc<dyn AccreditationServiceTrait>,
        user_service: Arc<dyn UserServiceTrait>,
        jwt_service: Arc<JwtService>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            event_service,
            accreditation_service,
            user_service,
            jwt_service,
            cache,
            database: None,
            about_html: Arc::from(""),
        }
    }

    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    pub fn with_about_html(mut self, html: impl Into<Arc<str>>) -> Self {
        self.about_html = html.into();
        self
    }
}
