use chrono::{DateTime, Utc};

use super::domain::{AccessCode, AccessCodeId};
use crate::persistence::RepositoryError;

/// Storage abstraction for redeemable access codes.
pub trait AccessCodeRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the code string already exists.
    fn insert(&self, code: AccessCode) -> Result<AccessCode, RepositoryError>;
    fn find_by_code(&self, code: &str) -> Result<Option<AccessCode>, RepositoryError>;
    fn fetch(&self, id: &AccessCodeId) -> Result<Option<AccessCode>, RepositoryError>;
    /// Flag a code as consumed. Fails with [`RepositoryError::Conflict`] if it already was.
    fn mark_used(
        &self,
        id: &AccessCodeId,
        ip_address: Option<String>,
        used_at: DateTime<Utc>,
    ) -> Result<AccessCode, RepositoryError>;
    /// Undo [`AccessCodeRepository::mark_used`] for a redemption that could not complete.
    fn release(&self, id: &AccessCodeId) -> Result<AccessCode, RepositoryError>;
    fn all(&self) -> Result<Vec<AccessCode>, RepositoryError>;
}
