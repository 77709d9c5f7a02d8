use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored access codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCodeId(pub String);

impl AccessCodeId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Product a code unlocks. `All` codes redeem against any product.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ProductType {
    #[default]
    #[serde(rename = "LHI")]
    Lhi,
    #[serde(rename = "LCI")]
    Lci,
    #[serde(rename = "ALL")]
    All,
}

impl ProductType {
    pub const VARIANTS: [ProductType; 3] = [ProductType::Lhi, ProductType::Lci, ProductType::All];

    pub fn label(&self) -> &'static str {
        match self {
            ProductType::Lhi => "LHI",
            ProductType::Lci => "LCI",
            ProductType::All => "ALL",
        }
    }

    /// Whether a code issued for `self` may be redeemed for `requested`.
    pub fn admits(&self, requested: ProductType) -> bool {
        *self == ProductType::All || *self == requested
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product type '{0}'")]
pub struct UnknownProductType(pub String);

impl FromStr for ProductType {
    type Err = UnknownProductType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LHI" => Ok(ProductType::Lhi),
            "LCI" => Ok(ProductType::Lci),
            "ALL" => Ok(ProductType::All),
            _ => Err(UnknownProductType(value.to_string())),
        }
    }
}

/// One redeemable code as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCode {
    pub id: AccessCodeId,
    pub code: String,
    pub product_type: ProductType,
    pub batch_id: String,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub used_by_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AccessCode {
    pub fn issue(
        code: impl Into<String>,
        product_type: ProductType,
        batch_id: impl Into<String>,
    ) -> Self {
        Self {
            id: AccessCodeId::generate(),
            code: code.into(),
            product_type,
            batch_id: batch_id.into(),
            is_used: false,
            used_at: None,
            used_by_ip: None,
            created_at: Utc::now(),
        }
    }
}

/// Reusable code that is never consumed, restricted to a set of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterCode {
    code: String,
    products: Vec<ProductType>,
}

impl MasterCode {
    pub fn new(code: &str, products: Vec<ProductType>) -> Self {
        Self {
            code: code.trim().to_ascii_uppercase(),
            products,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn products(&self) -> &[ProductType] {
        &self.products
    }

    pub fn admits(&self, requested: ProductType) -> bool {
        self.products.iter().any(|product| product.admits(requested))
    }
}

/// A code that passed validation and may be consumed by a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemableCode {
    pub id: AccessCodeId,
    pub code: String,
    pub product_type: ProductType,
    pub master: bool,
}

/// Used/available filter for code listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeFilter {
    #[default]
    All,
    Used,
    Available,
}

impl CodeFilter {
    pub fn matches(&self, code: &AccessCode) -> bool {
        match self {
            CodeFilter::All => true,
            CodeFilter::Used => code.is_used,
            CodeFilter::Available => !code.is_used,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UsageCounts {
    pub total: usize,
    pub used: usize,
    pub available: usize,
}

impl UsageCounts {
    pub fn tally<'a>(codes: impl IntoIterator<Item = &'a AccessCode>) -> Self {
        let mut counts = UsageCounts::default();
        for code in codes {
            counts.total += 1;
            if code.is_used {
                counts.used += 1;
            }
        }
        counts.available = counts.total - counts.used;
        counts
    }
}

/// Aggregate usage, with a per-product breakdown when no product filter applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeStats {
    #[serde(flatten)]
    pub counts: UsageCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_product: Option<Vec<ProductUsage>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUsage {
    pub product_type: ProductType,
    #[serde(flatten)]
    pub counts: UsageCounts,
}
