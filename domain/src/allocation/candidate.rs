//! Allocation candidates supplied by the recommendation feed.

use crate::core::error::DomainError;
use crate::core::ids::CandidateId;
use crate::room::RiskTier;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Asset class of a candidate with its class-specific metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AssetClass {
    Stock {
        ticker: String,
        #[serde(default)]
        exchange: Option<String>,
    },
    Bond {
        issuer: String,
        maturity_years: u32,
        /// Annual coupon in percent
        coupon_rate: Decimal,
    },
    Etf {
        ticker: String,
        /// Annual expense ratio in percent
        expense_ratio: Decimal,
    },
    Crypto {
        symbol: String,
        #[serde(default)]
        network: Option<String>,
    },
}

impl AssetClass {
    pub fn kind(&self) -> &'static str {
        match self {
            AssetClass::Stock { .. } => "stock",
            AssetClass::Bond { .. } => "bond",
            AssetClass::Etf { .. } => "etf",
            AssetClass::Crypto { .. } => "crypto",
        }
    }

    /// Ticker, issuer or symbol, whichever identifies the instrument.
    pub fn instrument(&self) -> &str {
        match self {
            AssetClass::Stock { ticker, .. } | AssetClass::Etf { ticker, .. } => ticker,
            AssetClass::Bond { issuer, .. } => issuer,
            AssetClass::Crypto { symbol, .. } => symbol,
        }
    }
}

/// Expected annual return range in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReturnBand {
    pub low: Decimal,
    pub high: Decimal,
}

/// A proposed investment item, immutable once presented for a voting round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationCandidate {
    pub id: CandidateId,
    pub name: String,
    pub asset: AssetClass,
    #[serde(default)]
    pub risk: RiskTier,
    /// Proposed share of the pool, 0-100
    pub allocation_percent: Decimal,
    #[serde(default)]
    pub expected_return: ReturnBand,
    /// Fee rate in percent
    #[serde(default)]
    pub fee_rate: Decimal,
}

impl AllocationCandidate {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.allocation_percent <= Decimal::ZERO
            || self.allocation_percent > Decimal::ONE_HUNDRED
        {
            return Err(DomainError::InvalidAllocation(format!(
                "candidate {} has allocation {}%, expected (0, 100]",
                self.id, self.allocation_percent
            )));
        }
        if self.expected_return.low > self.expected_return.high {
            return Err(DomainError::InvalidAllocation(format!(
                "candidate {} has an inverted return band",
                self.id
            )));
        }
        Ok(())
    }
}

/// The candidate set pinned for a room's allocation vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingRound {
    pub candidates: Vec<AllocationCandidate>,
    pub opened_at: DateTime<Utc>,
}

impl VotingRound {
    /// Pin a candidate set. Ids must be unique and every candidate valid.
    pub fn open(
        candidates: Vec<AllocationCandidate>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if candidates.is_empty() {
            return Err(DomainError::InvalidAllocation(
                "recommendation feed returned no candidates".into(),
            ));
        }
        for (i, c) in candidates.iter().enumerate() {
            c.validate()?;
            if candidates[..i].iter().any(|other| other.id == c.id) {
                return Err(DomainError::InvalidAllocation(format!(
                    "duplicate candidate id {}",
                    c.id
                )));
            }
        }
        Ok(Self {
            candidates,
            opened_at: now,
        })
    }

    pub fn candidate(&self, id: &CandidateId) -> Option<&AllocationCandidate> {
        self.candidates.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.candidate(id).is_some()
    }

    pub fn candidate_ids(&self) -> impl Iterator<Item = &CandidateId> {
        self.candidates.iter().map(|c| &c.id)
    }
}
