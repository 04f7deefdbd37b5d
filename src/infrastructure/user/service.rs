//! User service for authentication and account creation

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::user::{
    validate_password, validate_user_email, validate_username, User, UserId, UserRepository,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_superuser: bool,
}

/// User service for authentication and management
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        validate_username(&request.username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_user_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        let user_id = UserId::new(&request.id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(user_id, &request.username, &request.email, password_hash)
            .with_superuser(request.is_superuser);

        let user = self.repository.create(user).await?;
        info!(user_id = %user.id(), username = %user.username(), superuser = user.is_superuser(), "Created user");

        Ok(user)
    }

    /// Check credentials; `None` for unknown users, wrong passwords and suspended accounts
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.repository.get_by_username(username).await? else {
            return Ok(None);
        };

        if !user.is_active() || !self.hasher.verify(password, user.password_hash()) {
            warn!(username = %username, "Rejected login");
            return Ok(None);
        }

        self.repository.record_login(user.id()).await?;
        self.repository.get(user.id()).await
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Get a user by ID
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.repository.get(&user_id).await
    }
}
