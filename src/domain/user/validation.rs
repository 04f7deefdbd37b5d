//! Account field rules
//!
//! Usernames follow the platform's own rules (letters, digits and `@.+-_`),
//! so captains can log in with the handle they already use there.

use thiserror::Error;
use validator::ValidateEmail;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID must be 1 to {0} letters, digits or single hyphens")]
    InvalidId(usize),

    #[error("Username must be 1 to {0} characters")]
    UsernameLength(usize),

    #[error("Username may only contain letters, digits and @/./+/-/_ characters, found '{0}'")]
    UsernameCharacter(char),

    #[error("Password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },

    #[error("Enter a valid email address: '{0}'")]
    InvalidEmail(String),
}

const MAX_USER_ID_LENGTH: usize = 64;
const MAX_USERNAME_LENGTH: usize = 150;
const PASSWORD_LENGTH: std::ops::RangeInclusive<usize> = 8..=128;

/// Ids are opaque: UUIDs from `create-user`, or a short slug such as `admin`
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    let well_formed = !id.is_empty()
        && id.len() <= MAX_USER_ID_LENGTH
        && !id.starts_with('-')
        && !id.ends_with('-')
        && !id.contains("--")
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if well_formed {
        Ok(())
    } else {
        Err(UserValidationError::InvalidId(MAX_USER_ID_LENGTH))
    }
}

pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameLength(MAX_USERNAME_LENGTH));
    }

    match username
        .chars()
        .find(|c| !c.is_alphanumeric() && !"@.+-_".contains(*c))
    {
        Some(c) => Err(UserValidationError::UsernameCharacter(c)),
        None => Ok(()),
    }
}

pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if PASSWORD_LENGTH.contains(&password.chars().count()) {
        Ok(())
    } else {
        Err(UserValidationError::PasswordLength {
            min: *PASSWORD_LENGTH.start(),
            max: *PASSWORD_LENGTH.end(),
        })
    }
}

/// The account email is what ties a login to platform registrations
pub fn validate_user_email(email: &str) -> Result<(), UserValidationError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(UserValidationError::InvalidEmail(email.to_string()))
    }
}
