use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use lhi::access::{access_code_router, AccessCodeRepository, AccessCodeService};
use lhi::admin::{admin_router, AdminAuthenticator};
use lhi::assessment::{assessment_router, AssessmentRepository, AssessmentService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_service_routes<A, C>(
    auth: Arc<AdminAuthenticator>,
    access: Arc<AccessCodeService<C>>,
    assessments: Arc<AssessmentService<A, C>>,
) -> Router
where
    A: AssessmentRepository + 'static,
    C: AccessCodeRepository + 'static,
{
    admin_router(Arc::clone(&auth))
        .merge(access_code_router(access, Arc::clone(&auth)))
        .merge(assessment_router(assessments, auth))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
