//! Single-use and master access codes gating questionnaire submissions.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    AccessCode, AccessCodeId, CodeFilter, CodeStats, MasterCode, ProductType, ProductUsage,
    RedeemableCode, UnknownProductType, UsageCounts,
};
pub use repository::AccessCodeRepository;
pub use router::access_code_router;
pub use service::{
    AccessCodeError, AccessCodeService, CodeListQuery, GenerateCodes, MAX_BATCH_SIZE,
};
