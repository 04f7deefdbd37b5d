//! Bearer-token user extractor

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

/// Extractor for handlers that need a logged-in user
///
/// Reads `Authorization: Bearer <jwt>`, validates the token and loads the
/// account it names. Suspended accounts are rejected.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = state
            .jwt_service
            .validate(token)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        debug!(user_id = %claims.user_id(), "Authenticated request");

        let user = state
            .user_service
            .get(claims.user_id())
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        if !user.is_active() {
            return Err(ApiError::unauthorized("User account is suspended"));
        }

        Ok(RequireUser(user))
    }
}

/// Token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(ApiError::unauthorized(
            "Authentication required. Provide 'Authorization: Bearer <token>'",
        ));
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Authorization scheme must be Bearer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        let headers = headers("Bearer eyJhbGciOiJIUzI1NiJ9.test");
        assert_eq!(bearer_token(&headers).unwrap(), "eyJhbGciOiJIUzI1NiJ9.test");
    }

    #[test]
    fn test_missing_header() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_other_scheme_or_empty_token() {
        assert!(bearer_token(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(bearer_token(&headers("Bearer   ")).is_err());
    }

    #[test]
    fn test_token_is_trimmed() {
        let headers = headers("Bearer   token-with-spaces   ");
        assert_eq!(bearer_token(&headers).unwrap(), "token-with-spaces");
    }
}
