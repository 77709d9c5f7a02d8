use serde::{Deserialize, Serialize};

use super::scoring::AssessmentResult;

/// Identifier assigned when an assessment is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub String);

impl AssessmentId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Narrative elaboration of a scored result, split into report sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub result_interpretation: String,
    pub strengths: String,
    pub areas_to_watch: String,
    pub personalized_advice: String,
    pub professional_advice: String,
}

impl AiAnalysis {
    pub fn is_empty(&self) -> bool {
        self.result_interpretation.is_empty()
            && self.strengths.is_empty()
            && self.areas_to_watch.is_empty()
            && self.personalized_advice.is_empty()
            && self.professional_advice.is_empty()
    }
}

/// A scored result plus the fields attached after scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAssessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_id: Option<AssessmentId>,
    #[serde(flatten)]
    pub result: AssessmentResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
}

impl EnrichedAssessment {
    pub fn new(result: AssessmentResult) -> Self {
        Self {
            assessment_id: None,
            result,
            ai_analysis: None,
        }
    }

    pub fn with_id(mut self, id: AssessmentId) -> Self {
        self.assessment_id = Some(id);
        self
    }

    pub fn with_analysis(mut self, analysis: AiAnalysis) -> Self {
        self.ai_analysis = Some(analysis);
        self
    }
}

impl From<AssessmentResult> for EnrichedAssessment {
    fn from(result: AssessmentResult) -> Self {
        Self::new(result)
    }
}
