//! Proportional profit split with exact sums.

use crate::core::ids::UserId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept on each profit share.
pub const SHARE_SCALE: u32 = 2;

/// Wallet distribution progress of a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DistributionStatus {
    /// Record written, credits not yet attempted
    #[default]
    Pending,
    Complete,
    /// Some credits failed and can be retried
    Incomplete { failed: Vec<UserId> },
}

impl DistributionStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, DistributionStatus::Complete)
    }

    pub fn failed(&self) -> &[UserId] {
        match self {
            DistributionStatus::Incomplete { failed } => failed,
            _ => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionStatus::Pending => "pending",
            DistributionStatus::Complete => "complete",
            DistributionStatus::Incomplete { .. } => "incomplete",
        }
    }
}

/// Split `total_profit` across `contributions` in proportion to each amount.
///
/// Each share is truncated to [`SHARE_SCALE`] places and the residual is
/// assigned to the largest contributor (first one on ties), so the shares
/// always sum to `total_profit` exactly. A zero pool yields all-zero shares.
pub fn split_profit(total_profit: Decimal, contributions: &[Decimal]) -> Vec<Decimal> {
    let pool: Decimal = contributions.iter().copied().sum();
    if pool <= Decimal::ZERO {
        return vec![Decimal::ZERO; contributions.len()];
    }

    let mut shares: Vec<Decimal> = contributions
        .iter()
        .map(|c| {
            (total_profit * *c / pool)
                .round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::ToZero)
        })
        .collect();

    let residual = total_profit - shares.iter().copied().sum::<Decimal>();
    if !residual.is_zero() {
        let mut largest = 0;
        for (i, c) in contributions.iter().enumerate() {
            if *c > contributions[largest] {
                largest = i;
            }
        }
        shares[largest] += residual;
    }
    shares
}
