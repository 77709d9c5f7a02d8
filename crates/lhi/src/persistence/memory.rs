//! Process-local repository adapters backed by mutex-guarded maps.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::RepositoryError;
use crate::access::{AccessCode, AccessCodeId, AccessCodeRepository};
use crate::assessment::{AssessmentId, AssessmentRecord, AssessmentRepository};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

#[derive(Default, Clone)]
pub struct InMemoryAccessCodeRepository {
    codes: Arc<Mutex<HashMap<AccessCodeId, AccessCode>>>,
}

impl AccessCodeRepository for InMemoryAccessCodeRepository {
    fn insert(&self, code: AccessCode) -> Result<AccessCode, RepositoryError> {
        let mut guard = lock(&self.codes)?;
        if guard.contains_key(&code.id) || guard.values().any(|stored| stored.code == code.code) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(code.id.clone(), code.clone());
        Ok(code)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<AccessCode>, RepositoryError> {
        let guard = lock(&self.codes)?;
        Ok(guard.values().find(|stored| stored.code == code).cloned())
    }

    fn fetch(&self, id: &AccessCodeId) -> Result<Option<AccessCode>, RepositoryError> {
        let guard = lock(&self.codes)?;
        Ok(guard.get(id).cloned())
    }

    fn mark_used(
        &self,
        id: &AccessCodeId,
        ip_address: Option<String>,
        used_at: DateTime<Utc>,
    ) -> Result<AccessCode, RepositoryError> {
        let mut guard = lock(&self.codes)?;
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if stored.is_used {
            return Err(RepositoryError::Conflict);
        }
        stored.is_used = true;
        stored.used_at = Some(used_at);
        stored.used_by_ip = ip_address;
        Ok(stored.clone())
    }

    fn release(&self, id: &AccessCodeId) -> Result<AccessCode, RepositoryError> {
        let mut guard = lock(&self.codes)?;
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        stored.is_used = false;
        stored.used_at = None;
        stored.used_by_ip = None;
        Ok(stored.clone())
    }

    fn all(&self) -> Result<Vec<AccessCode>, RepositoryError> {
        let guard = lock(&self.codes)?;
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.values().cloned().collect())
    }
}
