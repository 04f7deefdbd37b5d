//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_user_id, UserValidationError};

/// Opaque account id; see [`validate_user_id`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Suspended accounts keep their data but cannot log in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
}

impl UserStatus {
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            other => Err(format!("Unknown user status '{}'", other)),
        }
    }
}

/// Site account
///
/// The email is what links an account to registrations on the tournament
/// platform; team access is derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    /// Superusers administer every team
    is_superuser: bool,
    status: UserStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_superuser: false,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    pub fn with_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn is_active(&self) -> bool {
        self.status.can_login()
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }
}

/// Column values of a stored account
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_superuser: bool,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            is_superuser: row.is_superuser,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login_at: row.last_login_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User::new(
            UserId::new("captain-1").unwrap(),
            "captain",
            "captain@example.com",
            "hashed_password",
        )
    }

    #[test]
    fn test_user_id_validation() {
        assert_eq!(UserId::new("user-123").unwrap().as_str(), "user-123");
        assert!(UserId::new("").is_err());
        assert!(UserId::new("-user").is_err());
    }

    #[test]
    fn test_user_creation_defaults() {
        let user = create_test_user();

        assert_eq!(user.email(), "captain@example.com");
        assert!(user.is_active());
        assert!(!user.is_superuser());
        assert!(user.last_login_at().is_none());
        assert!(user.with_superuser(true).is_superuser());
    }

    #[test]
    fn test_suspended_user_cannot_login() {
        let now = Utc::now();
        let suspended = User::from(UserRow {
            id: UserId::new("captain-2").unwrap(),
            username: "benched".to_string(),
            email: "benched@example.com".to_string(),
            password_hash: "hash".to_string(),
            is_superuser: false,
            status: "suspended".parse().unwrap(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        });

        assert!(!suspended.is_active());
        assert_eq!(suspended.status().as_str(), "suspended");
    }

    #[test]
    fn test_serialization_excludes_password() {
        let json = serde_json::to_string(&create_test_user()).unwrap();

        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("\"is_superuser\":false"));
    }
}
