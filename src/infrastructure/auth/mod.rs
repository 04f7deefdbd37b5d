//! Authentication infrastructure module
//!
//! JWT bearer tokens for logged-in users.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtService};
