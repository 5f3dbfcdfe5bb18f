//! Allocation snapshot: the immutable record of an executed allocation.

use super::candidate::{AllocationCandidate, AssetClass};
use crate::core::error::DomainError;
use crate::core::ids::{CandidateId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One allocated asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub candidate_id: CandidateId,
    pub name: String,
    pub asset: AssetClass,
    pub allocation_percent: Decimal,
    /// `floor(collected * percent / 100)`
    pub amount: Decimal,
}

/// Ordered allocation computed from the collected amount at execution time.
///
/// Amounts are floored so the sum never exceeds the pool; the remainder is
/// left unallocated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSnapshot {
    pub lines: Vec<AllocationLine>,
    pub collected_amount: Decimal,
    pub total_allocated: Decimal,
    pub unallocated: Decimal,
    pub executed_by: UserId,
    pub executed_at: DateTime<Utc>,
}

impl AllocationSnapshot {
    /// Compute the snapshot for the approved candidates, in the given order.
    pub fn compute(
        collected_amount: Decimal,
        approved: &[&AllocationCandidate],
        executed_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if approved.is_empty() {
            return Err(DomainError::NoApprovedCandidates);
        }

        let mut total_percent = Decimal::ZERO;
        for candidate in approved {
            candidate.validate()?;
            total_percent += candidate.allocation_percent;
        }
        if total_percent > Decimal::ONE_HUNDRED {
            return Err(DomainError::InvalidAllocation(format!(
                "approved candidates allocate {}% of the pool",
                total_percent
            )));
        }

        let lines: Vec<AllocationLine> = approved
            .iter()
            .map(|c| AllocationLine {
                candidate_id: c.id.clone(),
                name: c.name.clone(),
                asset: c.asset.clone(),
                allocation_percent: c.allocation_percent,
                amount: (collected_amount * c.allocation_percent / Decimal::ONE_HUNDRED).floor(),
            })
            .collect();

        let total_allocated: Decimal = lines.iter().map(|l| l.amount).sum();

        Ok(Self {
            lines,
            collected_amount,
            total_allocated,
            unallocated: collected_amount - total_allocated,
            executed_by,
            executed_at: now,
        })
    }

    pub fn line(&self, id: &CandidateId) -> Option<&AllocationLine> {
        self.lines.iter().find(|l| &l.candidate_id == id)
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.line(id).is_some()
    }

    pub fn asset_ids(&self) -> impl Iterator<Item = &CandidateId> {
        self.lines.iter().map(|l| &l.candidate_id)
    }
}
