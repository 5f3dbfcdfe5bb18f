//! Placeholder pricing source.
//!
//! Values every position at `invested * growth_factor`, with optional
//! per-asset factors so scenarios can model a losing asset.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use investa_application::ports::pricing::{PricingError, PricingSource};
use investa_domain::{AllocationLine, CandidateId};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

/// Decimal places of a realized value.
const PRICE_SCALE: u32 = 2;

#[derive(Debug, Clone)]
pub struct FixedGrowthPricing {
    growth_factor: Decimal,
    overrides: HashMap<CandidateId, Decimal>,
}

impl FixedGrowthPricing {
    pub fn new(growth_factor: Decimal) -> Self {
        Self {
            growth_factor,
            overrides: HashMap::new(),
        }
    }

    /// Use `factor` for `asset` instead of the global growth factor.
    pub fn with_override(mut self, asset: CandidateId, factor: Decimal) -> Self {
        self.overrides.insert(asset, factor);
        self
    }

    pub fn growth_factor(&self) -> Decimal {
        self.growth_factor
    }
}

impl Default for FixedGrowthPricing {
    fn default() -> Self {
        Self::new(Decimal::new(115, 2))
    }
}

#[async_trait]
impl PricingSource for FixedGrowthPricing {
    async fn realized_value(
        &self,
        line: &AllocationLine,
        _invested_at: DateTime<Utc>,
    ) -> Result<Decimal, PricingError> {
        let factor = self
            .overrides
            .get(&line.candidate_id)
            .copied()
            .unwrap_or(self.growth_factor);
        Ok((line.amount * factor).round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::ToZero))
    }
}
