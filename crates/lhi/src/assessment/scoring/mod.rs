mod cdf;
mod policy;
mod rules;

pub use cdf::normal_cdf;
pub use policy::{AttachmentStyle, Category, Level};

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, DimensionRole, ItemId};
use rules::{round_half_up, score_dimensions};

/// Respondent answers keyed by item id. Values are Likert points, nominally 1..=5.
pub type AnswerMap = BTreeMap<ItemId, i32>;

/// Stateless scorer bound to one questionnaire catalog.
///
/// Scoring performs no validation: skipped items count as the neutral midpoint and
/// out-of-range values are used as given.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: Catalog,
}

impl ScoringEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Score an answer map, stamping the result with today's local date.
    pub fn score(&self, answers: &AnswerMap) -> AssessmentResult {
        self.score_at(answers, Local::now().date_naive())
    }

    pub fn score_at(&self, answers: &AnswerMap, date: NaiveDate) -> AssessmentResult {
        let signals = score_dimensions(answers, &self.catalog);

        let total_score = round_half_up(normal_cdf(signals.mean_z) * 100.0) as u8;
        let category = Category::from_total_score(total_score);

        let anxiety_z = self.role_z_score(&signals.results, DimensionRole::Anxiety);
        let avoidance_z = self.role_z_score(&signals.results, DimensionRole::Avoidance);
        let attachment_style = AttachmentStyle::classify(anxiety_z, avoidance_z);

        AssessmentResult {
            total_score,
            category,
            dimensions: signals.results,
            attachment_style,
            timestamp: date.format("%Y/%-m/%-d").to_string(),
        }
    }

    fn role_z_score(&self, results: &[DimensionResult], role: DimensionRole) -> f64 {
        self.catalog
            .dimension_with_role(role)
            .and_then(|dimension| results.iter().find(|result| result.id == dimension.id))
            .map(|result| result.z_score)
            .unwrap_or(0.0)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

/// Per-dimension statistics, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionResult {
    pub id: String,
    pub name: String,
    pub raw_score: f64,
    /// Health-signed: higher is healthier.
    pub z_score: f64,
    pub t_score: i32,
    pub level: Level,
}

/// Output of a scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub total_score: u8,
    pub category: Category,
    pub dimensions: Vec<DimensionResult>,
    pub attachment_style: AttachmentStyle,
    pub timestamp: String,
}

impl AssessmentResult {
    pub fn dimension(&self, id: &str) -> Option<&DimensionResult> {
        self.dimensions.iter().find(|dimension| dimension.id == id)
    }

    /// Equality that ignores the call-time timestamp.
    pub fn same_score(&self, other: &AssessmentResult) -> bool {
        self.total_score == other.total_score
            && self.category == other.category
            && self.attachment_style == other.attachment_style
            && self.dimensions == other.dimensions
    }
}
