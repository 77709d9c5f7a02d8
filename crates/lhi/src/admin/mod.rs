//! Administrator sessions guarding the dashboard endpoints.

mod auth;
pub mod router;

pub use auth::{AdminAuthenticator, AdminIdentity, AdminSession, AuthError};
pub use router::admin_router;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Resolve the `Authorization: Bearer <token>` header against the session store.
pub fn authorize(auth: &AdminAuthenticator, headers: &HeaderMap) -> Result<AdminIdentity, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    auth.verify(token)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::Expired => StatusCode::UNAUTHORIZED,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
