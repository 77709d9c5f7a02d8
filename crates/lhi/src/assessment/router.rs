use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use super::report::AssessmentId;
use super::repository::AssessmentRepository;
use super::service::{
    AssessmentQuery, AssessmentService, AssessmentServiceError, AssessmentSubmission, ClientInfo,
};
use crate::access::{AccessCodeError, AccessCodeRepository};
use crate::admin::{authorize, AdminAuthenticator};
use crate::persistence::{PageRequest, RepositoryError};

pub(crate) struct AssessmentState<A, C> {
    service: Arc<AssessmentService<A, C>>,
    auth: Arc<AdminAuthenticator>,
}

impl<A, C> AssessmentState<A, C> {
    pub(crate) fn new(
        service: Arc<AssessmentService<A, C>>,
        auth: Arc<AdminAuthenticator>,
    ) -> Self {
        Self { service, auth }
    }
}

impl<A, C> Clone for AssessmentState<A, C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            auth: Arc::clone(&self.auth),
        }
    }
}

/// Router builder exposing the questionnaire, submission, and admin reporting endpoints.
pub fn assessment_router<A, C>(
    service: Arc<AssessmentService<A, C>>,
    auth: Arc<AdminAuthenticator>,
) -> Router
where
    A: AssessmentRepository + 'static,
    C: AccessCodeRepository + 'static,
{
    Router::new()
        .route("/api/questionnaire", get(questionnaire_handler::<A, C>))
        .route("/api/assessments", post(submit_handler::<A, C>))
        .route("/api/assessments/:assessment_id", get(fetch_handler::<A, C>))
        .route("/api/admin/assessments", get(list_handler::<A, C>))
        .route("/api/admin/assessments/stats", get(stats_handler::<A, C>))
        .route("/api/admin/assessments/export", get(export_handler::<A, C>))
        .with_state(AssessmentState::new(service, auth))
}

pub(crate) async fn questionnaire_handler<A, C>(
    State(state): State<AssessmentState<A, C>>,
) -> Response
where
    A: AssessmentRepository + 'static,
    C: AccessCodeRepository + 'static,
{
    (StatusCode::OK, Json(state.service.engine().catalog())).into_response()
}

pub(crate) async fn submit_handler<A, C>(
    State(state): State<AssessmentState<A, C>>,
    headers: HeaderMap,
    Json(submission): Json<AssessmentSubmission>,
) -> Response
where
    A: AssessmentRepository + 'static,
    C: AccessCodeRepository + 'static,
{
    if submission.access_code.trim().is_empty() {
        let payload = json!({ "error": "Access code is required" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    match state
        .service
        .submit(submission, client_info(&headers))
        .await
    {
        Ok(assessment) => (StatusCode::CREATED, Json(assessment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn fetch_handler<A, C>(
    State(state): State<AssessmentState<A, C>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    A: AssessmentRepository + 'static,
    C: AccessCodeRepository + 'static,
{
    match state.service.get(&AssessmentId(assessment_id)) {
        Ok(record) => (StatusCode::OK, Json(record.enriched())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<A, C>(
    State(state): State<AssessmentState<A, C>>,
    headers: HeaderMap,
    Query(page): Query<PageRequest>,
    Query(query): Query<AssessmentQuery>,
) -> Response
where
    A: AssessmentRepository + 'static,
    C: AccessCodeRepository + 'static,
{
    if let Err(err) = authorize(&state.auth, &headers) {
        return err.into_response();
    }

    match state.service.list(query, page) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn stats_handler<A, C>(
    State(state): State<AssessmentState<A, C>>,
    headers: HeaderMap,
    Query(query): Query<AssessmentQuery>,
) -> Response
where
    A: AssessmentRepository + 'static,
    C: AccessCodeRepository + 'static,
{
    if let Err(err) = authorize(&state.auth, &headers) {
        return err.into_response();
    }

    match state.service.statistics(query) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<A, C>(
    State(state): State<AssessmentState<A, C>>,
    headers: HeaderMap,
    Query(query): Query<AssessmentQuery>,
) -> Response
where
    A: AssessmentRepository + 'static,
    C: AccessCodeRepository + 'static,
{
    if let Err(err) = authorize(&state.auth, &headers) {
        return err.into_response();
    }

    match state.service.export_csv(query) {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"assessments-{}.csv\"",
                Utc::now().format("%Y%m%d")
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, plus the user agent.
pub(crate) fn client_info(headers: &HeaderMap) -> ClientInfo {
    let header_text = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let ip_address = header_text("x-forwarded-for")
        .and_then(|chain| chain.split(',').next().map(|hop| hop.trim().to_string()))
        .filter(|hop| !hop.is_empty())
        .or_else(|| header_text("x-real-ip"));

    ClientInfo {
        ip_address,
        user_agent: header_text(header::USER_AGENT.as_str()),
    }
}

fn error_response(err: AssessmentServiceError) -> Response {
    let (status, message) = match &err {
        AssessmentServiceError::Access(AccessCodeError::Invalid) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        AssessmentServiceError::Access(AccessCodeError::AlreadyUsed)
        | AssessmentServiceError::Access(AccessCodeError::WrongProduct(_)) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        AssessmentServiceError::UnknownItem(_) | AssessmentServiceError::AnswerOutOfRange { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        AssessmentServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "Assessment not found".to_string())
        }
        AssessmentServiceError::Repository(RepositoryError::Conflict) => {
            (StatusCode::CONFLICT, "assessment already exists".to_string())
        }
        other => {
            tracing::error!(error = %other, "assessment request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    (status, Json(json!({ "error": message }))).into_response()
}
