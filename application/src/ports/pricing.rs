//! Pricing port
//!
//! Values allocated assets when an investing room is unwound.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use investa_domain::{AllocationLine, CandidateId};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("No price for asset {0}")]
    UnknownAsset(CandidateId),

    #[error("Pricing source unavailable: {0}")]
    Unavailable(String),
}

impl PricingError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PricingError::Unavailable(_))
    }
}

#[async_trait]
pub trait PricingSource: Send + Sync {
    /// Current realized value of the position opened by `line` at
    /// `invested_at`.
    async fn realized_value(
        &self,
        line: &AllocationLine,
        invested_at: DateTime<Utc>,
    ) -> Result<Decimal, PricingError>;
}
