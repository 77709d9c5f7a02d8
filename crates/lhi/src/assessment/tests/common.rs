use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use secrecy::SecretString;
use serde_json::Value;

use crate::access::{AccessCodeService, GenerateCodes, MasterCode, ProductType};
use crate::admin::AdminAuthenticator;
use crate::assessment::narrative::{NarrativeError, NarrativeGenerator};
use crate::assessment::report::{AiAnalysis, AssessmentId};
use crate::assessment::repository::{AssessmentRecord, AssessmentRepository};
use crate::assessment::scoring::{AnswerMap, AssessmentResult, ScoringEngine};
use crate::assessment::service::AssessmentService;
use crate::config::AdminConfig;
use crate::persistence::memory::{InMemoryAccessCodeRepository, InMemoryAssessmentRepository};
use crate::persistence::RepositoryError;

pub(super) const MASTER_CODE: &str = "LHI159951";
pub(super) const ADMIN_EMAIL: &str = "admin@example.com";
pub(super) const ADMIN_PASSWORD: &str = "correct horse";

pub(super) type MemoryService =
    AssessmentService<InMemoryAssessmentRepository, InMemoryAccessCodeRepository>;

pub(super) struct FixedNarrator;

#[async_trait]
impl NarrativeGenerator for FixedNarrator {
    async fn analyze(&self, result: &AssessmentResult) -> Result<AiAnalysis, NarrativeError> {
        Ok(AiAnalysis {
            result_interpretation: format!("score {}", result.total_score),
            strengths: "listening".to_string(),
            areas_to_watch: "withdrawal".to_string(),
            personalized_advice: "check in weekly".to_string(),
            professional_advice: "none needed".to_string(),
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Suspends once before answering, so joined submissions interleave at the narrative step.
pub(super) struct YieldingNarrator;

#[async_trait]
impl NarrativeGenerator for YieldingNarrator {
    async fn analyze(&self, result: &AssessmentResult) -> Result<AiAnalysis, NarrativeError> {
        tokio::task::yield_now().await;
        FixedNarrator.analyze(result).await
    }

    fn name(&self) -> &str {
        "yielding"
    }
}

pub(super) struct FailingNarrator;

#[async_trait]
impl NarrativeGenerator for FailingNarrator {
    async fn analyze(&self, _result: &AssessmentResult) -> Result<AiAnalysis, NarrativeError> {
        Err(NarrativeError::Api {
            status: 503,
            body: "overloaded".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

pub(super) fn access_service() -> Arc<AccessCodeService<InMemoryAccessCodeRepository>> {
    Arc::new(AccessCodeService::new(
        Arc::new(InMemoryAccessCodeRepository::default()),
        vec![MasterCode::new(MASTER_CODE, vec![ProductType::Lhi])],
    ))
}

pub(super) fn build_service_with<A>(
    repository: Arc<A>,
    narrator: Arc<dyn NarrativeGenerator>,
) -> (
    Arc<AssessmentService<A, InMemoryAccessCodeRepository>>,
    Arc<AccessCodeService<InMemoryAccessCodeRepository>>,
)
where
    A: AssessmentRepository + 'static,
{
    let access = access_service();
    let service = Arc::new(AssessmentService::new(
        Arc::new(ScoringEngine::default()),
        repository,
        Arc::clone(&access),
        narrator,
    ));
    (service, access)
}

pub(super) fn build_service(
    narrator: Arc<dyn NarrativeGenerator>,
) -> (
    Arc<MemoryService>,
    Arc<AccessCodeService<InMemoryAccessCodeRepository>>,
) {
    build_service_with(Arc::new(InMemoryAssessmentRepository::default()), narrator)
}

pub(super) fn issue_code(access: &AccessCodeService<InMemoryAccessCodeRepository>) -> String {
    access
        .generate(GenerateCodes {
            count: 1,
            batch_id: Some("test".to_string()),
            product_type: ProductType::Lhi,
        })
        .expect("code generated")
        .remove(0)
        .code
}

pub(super) fn uniform_answers(value: i32) -> AnswerMap {
    (1..=40).map(|item| (item, value)).collect()
}

pub(super) fn admin_auth() -> Arc<AdminAuthenticator> {
    Arc::new(AdminAuthenticator::from_config(&AdminConfig {
        email: ADMIN_EMAIL.to_string(),
        name: "Test Admin".to_string(),
        password: Some(SecretString::from(ADMIN_PASSWORD.to_string())),
        session_ttl_minutes: 60,
    }))
}

pub(super) fn admin_token(auth: &AdminAuthenticator) -> String {
    auth.login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .expect("admin login")
        .token
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
