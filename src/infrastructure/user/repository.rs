//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(id.as_str()).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username() == username).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let id = user.id().as_str().to_string();

        if users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if users.values().any(|u| u.username() == user.username()) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                user.username()
            )));
        }

        if users.values().any(|u| u.email() == user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already belongs to another user",
                user.email()
            )));
        }

        users.insert(id, user.clone());
        Ok(user)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.users.read().await.len())
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut users = self.users.write().await;

        match users.get_mut(id.as_str()) {
            Some(user) => {
                user.record_login();
                Ok(())
            }
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, username: &str, email: &str) -> User {
        User::new(UserId::new(id).unwrap(), username, email, "hash")
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("u1", "ann", "ann@x.org")).await.unwrap();

        let found = repo.get_by_username("ann").await.unwrap().unwrap();
        assert_eq!(found.email(), "ann@x.org");
        assert!(repo.get_by_username("bo").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_username_and_email_are_unique() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("u1", "ann", "ann@x.org")).await.unwrap();

        assert!(repo.create(user("u2", "ann", "other@x.org")).await.is_err());
        assert!(repo.create(user("u3", "bo", "ann@x.org")).await.is_err());
    }

    #[tokio::test]
    async fn test_record_login() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("u1", "ann", "ann@x.org")).await.unwrap();

        repo.record_login(created.id()).await.unwrap();

        let found = repo.get(created.id()).await.unwrap().unwrap();
        assert!(found.last_login_at().is_some());
    }
}
