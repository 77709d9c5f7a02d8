use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::catalog::ItemId;
use super::export::{export_csv, ExportError};
use super::narrative::{FallbackNarrator, NarrativeGenerator};
use super::report::{AiAnalysis, AssessmentId, EnrichedAssessment};
use super::repository::{AssessmentRecord, AssessmentRepository, AssessmentSummary};
use super::scoring::{AnswerMap, AssessmentResult, ScoringEngine};
use super::stats::{compute_statistics, AssessmentStatistics};
use crate::access::{AccessCodeError, AccessCodeRepository, AccessCodeService, ProductType};
use crate::persistence::{Page, PageRequest, RepositoryError};

const LIKERT_MIN: i32 = 1;
const LIKERT_MAX: i32 = 5;

/// Questionnaire answers posted by a respondent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSubmission {
    pub access_code: String,
    #[serde(default)]
    pub answers: AnswerMap,
}

/// Request metadata recorded alongside a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Product filter shared by the admin listing, statistics, and export endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentQuery {
    #[serde(default)]
    pub product_type: Option<ProductType>,
}

/// Service composing access-code redemption, scoring, narrative, and storage.
pub struct AssessmentService<A, C> {
    engine: Arc<ScoringEngine>,
    repository: Arc<A>,
    access: Arc<AccessCodeService<C>>,
    narrator: Arc<dyn NarrativeGenerator>,
}

impl<A, C> AssessmentService<A, C>
where
    A: AssessmentRepository + 'static,
    C: AccessCodeRepository + 'static,
{
    pub fn new(
        engine: Arc<ScoringEngine>,
        repository: Arc<A>,
        access: Arc<AccessCodeService<C>>,
        narrator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            engine,
            repository,
            access,
            narrator,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Redeem the access code, score the answers, attach a narrative, and persist.
    ///
    /// The code is claimed before the record is stored, so concurrent submissions with one
    /// code store at most one record. A failed insert releases the claim.
    pub async fn submit(
        &self,
        submission: AssessmentSubmission,
        client: ClientInfo,
    ) -> Result<EnrichedAssessment, AssessmentServiceError> {
        let redeemable = self.access.validate(&submission.access_code, ProductType::Lhi)?;
        self.check_answers(&submission.answers)?;

        let result = self.engine.score(&submission.answers);
        let analysis = self.narrate(&result).await;

        let record = AssessmentRecord {
            id: AssessmentId::generate(),
            access_code: redeemable.code.clone(),
            product_type: redeemable.product_type,
            result,
            answers: submission.answers,
            ai_analysis: Some(analysis),
            ip_address: client.ip_address,
            user_agent: client.user_agent,
            created_at: Utc::now(),
        };

        self.access
            .mark_used(&redeemable, record.ip_address.as_deref())?;
        let stored = match self.repository.insert(record) {
            Ok(stored) => stored,
            Err(err) => {
                if let Err(release_err) = self.access.release(&redeemable) {
                    error!(
                        code = %redeemable.code,
                        error = %release_err,
                        "failed to release access code after storage error"
                    );
                }
                return Err(err.into());
            }
        };

        info!(
            assessment_id = %stored.id,
            total_score = stored.result.total_score,
            category = stored.result.category.label(),
            "assessment recorded"
        );

        Ok(stored.enriched())
    }

    pub fn get(&self, id: &AssessmentId) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Newest-first page of assessment summaries.
    pub fn list(
        &self,
        query: AssessmentQuery,
        page: PageRequest,
    ) -> Result<Page<AssessmentSummary>, AssessmentServiceError> {
        let summaries = self
            .newest_first(query)?
            .iter()
            .map(AssessmentRecord::summary)
            .collect();
        Ok(page.paginate(summaries))
    }

    pub fn statistics(
        &self,
        query: AssessmentQuery,
    ) -> Result<AssessmentStatistics, AssessmentServiceError> {
        let records = self.filtered(query)?;
        Ok(compute_statistics(&records, Utc::now()))
    }

    pub fn export_csv(&self, query: AssessmentQuery) -> Result<String, AssessmentServiceError> {
        let records = self.newest_first(query)?;
        Ok(export_csv(self.engine.catalog(), &records)?)
    }

    fn check_answers(&self, answers: &AnswerMap) -> Result<(), AssessmentServiceError> {
        for (&item, &value) in answers {
            if self.engine.catalog().item(item).is_none() {
                return Err(AssessmentServiceError::UnknownItem(item));
            }
            if !(LIKERT_MIN..=LIKERT_MAX).contains(&value) {
                return Err(AssessmentServiceError::AnswerOutOfRange { item, value });
            }
        }
        Ok(())
    }

    async fn narrate(&self, result: &AssessmentResult) -> AiAnalysis {
        match self.narrator.analyze(result).await {
            Ok(analysis) if !analysis.is_empty() => analysis,
            Ok(_) => {
                warn!(narrator = self.narrator.name(), "narrative was empty, using fallback text");
                FallbackNarrator.analysis(result)
            }
            Err(err) => {
                warn!(
                    narrator = self.narrator.name(),
                    error = %err,
                    "narrative generation failed, using fallback text"
                );
                FallbackNarrator.analysis(result)
            }
        }
    }

    fn filtered(&self, query: AssessmentQuery) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(self
            .repository
            .all()?
            .into_iter()
            .filter(|record| query.product_type.map_or(true, |p| record.product_type == p))
            .collect())
    }

    fn newest_first(
        &self,
        query: AssessmentQuery,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let mut records = self.filtered(query)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Access(#[from] AccessCodeError),
    #[error("question {0} is not part of the questionnaire")]
    UnknownItem(ItemId),
    #[error("answer {value} for question {item} must be between 1 and 5")]
    AnswerOutOfRange { item: ItemId, value: i32 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
