//! Infrastructure layer - External service implementations

pub mod accreditation;
pub mod auth;
pub mod cache;
pub mod events;
pub mod logging;
pub mod services;
pub mod storage;
pub mod upstream;
pub mod user;
