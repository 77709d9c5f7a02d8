use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info};

use super::domain::{
    AccessCode, CodeFilter, CodeStats, MasterCode, ProductType, ProductUsage, RedeemableCode,
    UsageCounts,
};
use super::repository::AccessCodeRepository;
use crate::persistence::{Page, PageRequest, RepositoryError};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 8;
const MASTER_BATCH: &str = "MASTER";
pub const MAX_BATCH_SIZE: usize = 1000;

/// Request to mint a batch of single-use codes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodes {
    pub count: usize,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub product_type: ProductType,
}

/// Listing query for the admin code table.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeListQuery {
    #[serde(default)]
    pub filter: CodeFilter,
    #[serde(default)]
    pub product_type: Option<ProductType>,
}

/// Issues, validates, and redeems access codes.
pub struct AccessCodeService<R> {
    repository: Arc<R>,
    master_codes: Vec<MasterCode>,
}

impl<R> AccessCodeService<R>
where
    R: AccessCodeRepository + 'static,
{
    pub fn new(repository: Arc<R>, master_codes: Vec<MasterCode>) -> Self {
        Self {
            repository,
            master_codes,
        }
    }

    pub fn generate(&self, request: GenerateCodes) -> Result<Vec<AccessCode>, AccessCodeError> {
        self.generate_with(&mut rand::rng(), request)
    }

    /// Mint up to `count` codes; collisions with existing codes are skipped.
    pub fn generate_with<G>(
        &self,
        rng: &mut G,
        request: GenerateCodes,
    ) -> Result<Vec<AccessCode>, AccessCodeError>
    where
        G: Rng + ?Sized,
    {
        if request.count == 0 || request.count > MAX_BATCH_SIZE {
            return Err(AccessCodeError::InvalidCount(request.count));
        }

        let batch_id = request
            .batch_id
            .filter(|batch| !batch.trim().is_empty())
            .unwrap_or_else(|| format!("BATCH_{}", Utc::now().timestamp_millis()));

        let mut created = Vec::with_capacity(request.count);
        for _ in 0..request.count {
            let code = random_code(rng);
            match self.repository.insert(AccessCode::issue(
                code.clone(),
                request.product_type,
                batch_id.clone(),
            )) {
                Ok(stored) => created.push(stored),
                Err(RepositoryError::Conflict) => {
                    debug!(%code, "skipping duplicate access code");
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(
            batch_id = %batch_id,
            product = %request.product_type,
            requested = request.count,
            created = created.len(),
            "generated access codes"
        );

        Ok(created)
    }

    /// Check that `code` may be redeemed for `product`.
    pub fn validate(
        &self,
        code: &str,
        product: ProductType,
    ) -> Result<RedeemableCode, AccessCodeError> {
        let normalized = code.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(AccessCodeError::Invalid);
        }

        if let Some(master) = self.master(&normalized) {
            if !master.admits(product) {
                return Err(AccessCodeError::WrongProduct(product));
            }
            let stored = match self.repository.find_by_code(&normalized)? {
                Some(stored) => stored,
                None => match self.repository.insert(AccessCode::issue(
                    normalized.clone(),
                    product,
                    MASTER_BATCH,
                )) {
                    Ok(stored) => stored,
                    Err(RepositoryError::Conflict) => self
                        .repository
                        .find_by_code(&normalized)?
                        .ok_or(RepositoryError::NotFound)?,
                    Err(err) => return Err(err.into()),
                },
            };
            return Ok(RedeemableCode {
                id: stored.id,
                code: normalized,
                product_type: product,
                master: true,
            });
        }

        let stored = self
            .repository
            .find_by_code(&normalized)?
            .ok_or(AccessCodeError::Invalid)?;

        if !stored.product_type.admits(product) {
            return Err(AccessCodeError::WrongProduct(product));
        }
        if stored.is_used {
            return Err(AccessCodeError::AlreadyUsed);
        }

        Ok(RedeemableCode {
            id: stored.id,
            code: stored.code,
            product_type: product,
            master: false,
        })
    }

    /// Consume a validated code. Master codes are never consumed.
    pub fn mark_used(
        &self,
        redeemable: &RedeemableCode,
        ip_address: Option<&str>,
    ) -> Result<(), AccessCodeError> {
        if redeemable.master {
            return Ok(());
        }

        match self.repository.mark_used(
            &redeemable.id,
            ip_address.map(str::to_string),
            Utc::now(),
        ) {
            Ok(_) => Ok(()),
            Err(RepositoryError::Conflict) => Err(AccessCodeError::AlreadyUsed),
            Err(err) => Err(err.into()),
        }
    }

    /// Return a consumed code to the available pool. Master codes are untouched.
    pub fn release(&self, redeemable: &RedeemableCode) -> Result<(), AccessCodeError> {
        if redeemable.master {
            return Ok(());
        }
        self.repository.release(&redeemable.id)?;
        Ok(())
    }

    pub fn stats(&self, product: Option<ProductType>) -> Result<CodeStats, AccessCodeError> {
        let codes = self.repository.all()?;

        let counts = UsageCounts::tally(
            codes
                .iter()
                .filter(|code| product.map_or(true, |p| code.product_type == p)),
        );

        let by_product = match product {
            Some(_) => None,
            None => Some(
                ProductType::VARIANTS
                    .iter()
                    .map(|variant| ProductUsage {
                        product_type: *variant,
                        counts: UsageCounts::tally(
                            codes.iter().filter(|code| code.product_type == *variant),
                        ),
                    })
                    .collect(),
            ),
        };

        Ok(CodeStats { counts, by_product })
    }

    /// Newest-first page of codes matching the query.
    pub fn list(
        &self,
        query: CodeListQuery,
        page: PageRequest,
    ) -> Result<Page<AccessCode>, AccessCodeError> {
        let mut codes: Vec<AccessCode> = self
            .repository
            .all()?
            .into_iter()
            .filter(|code| query.filter.matches(code))
            .filter(|code| query.product_type.map_or(true, |p| code.product_type == p))
            .collect();
        codes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(page.paginate(codes))
    }

    fn master(&self, code: &str) -> Option<&MasterCode> {
        self.master_codes
            .iter()
            .find(|master| master.code() == code)
    }
}

fn random_code<G: Rng + ?Sized>(rng: &mut G) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Error raised by access code operations.
#[derive(Debug, thiserror::Error)]
pub enum AccessCodeError {
    #[error("Invalid access code")]
    Invalid,
    #[error("Access code already used")]
    AlreadyUsed,
    #[error("This code is not valid for {0}")]
    WrongProduct(ProductType),
    #[error("code count must be between 1 and 1000, got {0}")]
    InvalidCount(usize),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AccessCodeError {
    /// Whether the error reflects the code itself rather than infrastructure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AccessCodeError::Invalid | AccessCodeError::AlreadyUsed | AccessCodeError::WrongProduct(_)
        )
    }
}
