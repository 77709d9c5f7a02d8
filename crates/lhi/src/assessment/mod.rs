//! Relationship health questionnaire: catalog, scoring, narrative reports, and the
//! submission pipeline that stores and aggregates scored assessments.

pub mod catalog;
pub mod export;
pub mod narrative;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, CatalogError, Dimension, DimensionRole, Item, ItemId};
pub use export::{csv_header, export_csv, write_csv, ExportError};
pub use narrative::{
    narrator_from_config, ChatCompletionNarrator, FallbackNarrator, NarrativeError,
    NarrativeGenerator,
};
pub use report::{AiAnalysis, AssessmentId, EnrichedAssessment};
pub use repository::{AssessmentRecord, AssessmentRepository, AssessmentSummary};
pub use router::assessment_router;
pub use scoring::{
    normal_cdf, AnswerMap, AssessmentResult, AttachmentStyle, Category, DimensionResult, Level,
    ScoringEngine,
};
pub use service::{
    AssessmentQuery, AssessmentService, AssessmentServiceError, AssessmentSubmission, ClientInfo,
};
pub use stats::{
    compute_statistics, AssessmentStatistics, AttachmentCount, CategoryCount, DailyCount,
};
