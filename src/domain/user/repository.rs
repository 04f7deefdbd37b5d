//! Account storage

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Login accounts; a captain's account email is matched against roster emails
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Fails with `Conflict` when the id, username or email is taken
    async fn create(&self, user: User) -> Result<User, DomainError>;

    async fn count(&self) -> Result<usize, DomainError>;

    /// Stamp `last_login_at` with the current time
    async fn record_login(&self, id: &UserId) -> Result<(), DomainError>;
}
