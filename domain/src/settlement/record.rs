//! Settlement record written when an investing room is unwound.

use super::distribution::{DistributionStatus, split_profit};
use crate::allocation::AllocationSnapshot;
use crate::core::error::DomainError;
use crate::core::ids::{CandidateId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Realized value of one allocated asset at unwind time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetValuation {
    pub candidate_id: CandidateId,
    pub invested: Decimal,
    pub realized_value: Decimal,
}

impl AssetValuation {
    pub fn profit(&self) -> Decimal {
        self.realized_value - self.invested
    }
}

/// One member's slice of the settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPayout {
    pub user_id: UserId,
    pub contribution: Decimal,
    pub profit_share: Decimal,
    /// `contribution + profit_share`
    pub total_return: Decimal,
    /// Whether the wallet credit has gone through
    #[serde(default)]
    pub credited: bool,
}

impl MemberPayout {
    /// Members with nothing to receive are never credited.
    pub fn requires_credit(&self) -> bool {
        self.total_return > Decimal::ZERO && !self.credited
    }
}

/// The terminal computation for a room.
///
/// Figures are fixed when the record is written; only the distribution
/// progress (`credited`, `distribution`) changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Sum of the snapshot amounts
    pub total_invested: Decimal,
    /// Floor remainder of the allocation, returned at face value
    pub uninvested_amount: Decimal,
    pub total_realized_value: Decimal,
    /// `total_realized_value - total_invested`
    pub total_profit: Decimal,
    pub assets: Vec<AssetValuation>,
    pub payouts: Vec<MemberPayout>,
    pub distribution: DistributionStatus,
    pub settled_by: UserId,
    pub settled_at: DateTime<Utc>,
}

impl SettlementRecord {
    /// Compute the settlement of `snapshot`.
    ///
    /// `valuations` must price every snapshot line. Profit is split across
    /// `contributions` in proportion to each member's contribution.
    pub fn compute(
        snapshot: &AllocationSnapshot,
        valuations: Vec<AssetValuation>,
        contributions: &[(UserId, Decimal)],
        settled_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        for line in &snapshot.lines {
            if !valuations.iter().any(|v| v.candidate_id == line.candidate_id) {
                return Err(DomainError::InvalidAllocation(format!(
                    "no valuation for allocated asset {}",
                    line.candidate_id
                )));
            }
        }
        if let Some(v) = valuations.iter().find(|v| v.realized_value < Decimal::ZERO) {
            return Err(DomainError::InvalidAmount(format!(
                "negative realized value for {}",
                v.candidate_id
            )));
        }

        let pool: Decimal = contributions.iter().map(|(_, c)| *c).sum();
        if pool <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount(
                "room has no contributions to settle".into(),
            ));
        }

        let total_invested = snapshot.total_allocated;
        let total_realized_value: Decimal = valuations.iter().map(|v| v.realized_value).sum();
        let total_profit = total_realized_value - total_invested;

        let amounts: Vec<Decimal> = contributions.iter().map(|(_, c)| *c).collect();
        let shares = split_profit(total_profit, &amounts);

        let payouts = contributions
            .iter()
            .zip(shares)
            .map(|((user_id, contribution), profit_share)| MemberPayout {
                user_id: user_id.clone(),
                contribution: *contribution,
                profit_share,
                total_return: *contribution + profit_share,
                credited: false,
            })
            .collect();

        Ok(Self {
            total_invested,
            uninvested_amount: pool - total_invested,
            total_realized_value,
            total_profit,
            assets: valuations,
            payouts,
            distribution: DistributionStatus::Pending,
            settled_by,
            settled_at: now,
        })
    }

    pub fn payout(&self, user: &UserId) -> Option<&MemberPayout> {
        self.payouts.iter().find(|p| &p.user_id == user)
    }

    /// Payouts whose credit is still outstanding.
    pub fn pending_credits(&self) -> impl Iterator<Item = &MemberPayout> {
        self.payouts.iter().filter(|p| p.requires_credit())
    }

    pub fn total_returned(&self) -> Decimal {
        self.payouts.iter().map(|p| p.total_return).sum()
    }

    /// Mark `succeeded` as credited and recompute the distribution status.
    pub fn apply_credit_results(&mut self, succeeded: &[UserId]) {
        for payout in &mut self.payouts {
            if succeeded.contains(&payout.user_id) {
                payout.credited = true;
            }
        }
        let failed: Vec<UserId> = self.pending_credits().map(|p| p.user_id.clone()).collect();
        self.distribution = if failed.is_empty() {
            DistributionStatus::Complete
        } else {
            DistributionStatus::Incomplete { failed }
        };
    }
}
