//! User domain
//!
//! Site accounts used to log in. Team access is never stored on the account;
//! it is derived per request from the event roster.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId, UserRow, UserStatus};
pub use repository::UserRepository;
pub use validation::{
    validate_password, validate_user_email, validate_user_id, validate_username,
    UserValidationError,
};
