use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ProductType;
use super::repository::AccessCodeRepository;
use super::service::{AccessCodeError, AccessCodeService, CodeListQuery, GenerateCodes};
use crate::admin::{authorize, AdminAuthenticator};
use crate::persistence::PageRequest;

pub(crate) struct AccessState<R> {
    service: Arc<AccessCodeService<R>>,
    auth: Arc<AdminAuthenticator>,
}

impl<R> Clone for AccessState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            auth: Arc::clone(&self.auth),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateRequest {
    #[serde(default)]
    code: String,
    #[serde(default)]
    product_type: ProductType,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatsQuery {
    #[serde(default)]
    product_type: Option<ProductType>,
}

/// Router builder for code validation and the admin code endpoints.
pub fn access_code_router<R>(
    service: Arc<AccessCodeService<R>>,
    auth: Arc<AdminAuthenticator>,
) -> Router
where
    R: AccessCodeRepository + 'static,
{
    Router::new()
        .route("/api/access-codes/validate", post(validate_handler::<R>))
        .route(
            "/api/admin/access-codes/generate",
            post(generate_handler::<R>),
        )
        .route("/api/admin/access-codes", get(list_handler::<R>))
        .route("/api/admin/access-codes/stats", get(stats_handler::<R>))
        .with_state(AccessState { service, auth })
}

pub(crate) async fn validate_handler<R>(
    State(state): State<AccessState<R>>,
    Json(request): Json<ValidateRequest>,
) -> Response
where
    R: AccessCodeRepository + 'static,
{
    if request.code.trim().is_empty() {
        let payload = json!({ "error": "Access code is required" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    match state.service.validate(&request.code, request.product_type) {
        Ok(redeemable) => {
            let payload = json!({
                "valid": true,
                "accessCodeId": redeemable.id,
                "productType": redeemable.product_type,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) if err.is_rejection() => {
            let status = match err {
                AccessCodeError::Invalid => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            };
            let payload = json!({ "valid": false, "message": err.to_string() });
            (status, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn generate_handler<R>(
    State(state): State<AccessState<R>>,
    headers: HeaderMap,
    Json(request): Json<GenerateCodes>,
) -> Response
where
    R: AccessCodeRepository + 'static,
{
    if let Err(err) = authorize(&state.auth, &headers) {
        return err.into_response();
    }

    match state.service.generate(request) {
        Ok(codes) => {
            let payload = json!({
                "count": codes.len(),
                "codes": codes,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err @ AccessCodeError::InvalidCount(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn list_handler<R>(
    State(state): State<AccessState<R>>,
    headers: HeaderMap,
    Query(page): Query<PageRequest>,
    Query(query): Query<CodeListQuery>,
) -> Response
where
    R: AccessCodeRepository + 'static,
{
    if let Err(err) = authorize(&state.auth, &headers) {
        return err.into_response();
    }

    match state.service.list(query, page) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn stats_handler<R>(
    State(state): State<AccessState<R>>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Response
where
    R: AccessCodeRepository + 'static,
{
    if let Err(err) = authorize(&state.auth, &headers) {
        return err.into_response();
    }

    match state.service.stats(query.product_type) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(other) => internal_error(other),
    }
}

fn internal_error(err: AccessCodeError) -> Response {
    tracing::error!(error = %err, "access code request failed");
    let payload = json!({ "error": "Internal server error" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
