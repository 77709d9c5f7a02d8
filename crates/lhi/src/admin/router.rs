use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::auth::AdminAuthenticator;
use super::bearer_token;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

/// Router builder exposing admin login and logout.
pub fn admin_router(auth: Arc<AdminAuthenticator>) -> Router {
    Router::new()
        .route("/api/auth/admin-login", post(login_handler))
        .route("/api/auth/admin-logout", post(logout_handler))
        .with_state(auth)
}

pub(crate) async fn login_handler(
    State(auth): State<Arc<AdminAuthenticator>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match auth.login(&request.email, &request.password) {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn logout_handler(
    State(auth): State<Arc<AdminAuthenticator>>,
    headers: HeaderMap,
) -> Response {
    let revoked = bearer_token(&headers)
        .map(|token| auth.logout(token))
        .unwrap_or(false);
    (StatusCode::OK, Json(json!({ "revoked": revoked }))).into_response()
}
