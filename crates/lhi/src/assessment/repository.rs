use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::report::{AiAnalysis, AssessmentId, EnrichedAssessment};
use super::scoring::{AnswerMap, AssessmentResult, AttachmentStyle, Category};
use crate::access::ProductType;
use crate::persistence::RepositoryError;

/// Persisted submission: the scored result plus redemption and client metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub access_code: String,
    pub product_type: ProductType,
    pub result: AssessmentResult,
    pub answers: AnswerMap,
    pub ai_analysis: Option<AiAnalysis>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn enriched(&self) -> EnrichedAssessment {
        let enriched = EnrichedAssessment::new(self.result.clone()).with_id(self.id.clone());
        match &self.ai_analysis {
            Some(analysis) => enriched.with_analysis(analysis.clone()),
            None => enriched,
        }
    }

    pub fn summary(&self) -> AssessmentSummary {
        AssessmentSummary {
            id: self.id.clone(),
            access_code: self.access_code.clone(),
            total_score: self.result.total_score,
            category: self.result.category,
            attachment_style: self.result.attachment_style,
            created_at: self.created_at,
        }
    }
}

/// Row shape for admin listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub id: AssessmentId,
    pub access_code: String,
    pub total_score: u8,
    pub category: Category,
    pub attachment_style: AttachmentStyle,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}
