//! Type definitions for the room orchestrator.

use crate::ports::identity::IdentityError;
use crate::ports::pricing::PricingError;
use crate::ports::recommendation_feed::FeedError;
use crate::ports::room_repository::StoreError;
use crate::ports::wallet::WalletError;
use investa_domain::{Contribution, DomainError, Member, Room, RoomId, RoomStatus, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by [`RoomOrchestrator`](super::RoomOrchestrator)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Recommendation feed error: {0}")]
    Feed(#[from] FeedError),
}

impl RoomError {
    /// Whether the same request may succeed if sent again.
    ///
    /// Business-rule violations are never retryable; collaborator outages
    /// are.
    pub fn is_retryable(&self) -> bool {
        match self {
            RoomError::Domain(_) => false,
            RoomError::Identity(e) => e.is_transient(),
            RoomError::Store(e) => e.is_transient(),
            RoomError::Wallet(e) => e.is_transient(),
            RoomError::Pricing(e) => e.is_transient(),
            RoomError::Feed(e) => e.is_transient(),
        }
    }

    /// The business-rule violation, if that is what this is.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            RoomError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Offset/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: usize = 20;

    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole listing
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .collect();
        Self {
            items,
            total,
            offset: request.offset,
            limit: request.limit,
        }
    }

    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}

/// Outcome of a recorded contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionReceipt {
    pub contribution: Contribution,
    pub collected_amount: Decimal,
    pub status: RoomStatus,
    /// Whether this contribution completed the goal
    pub became_ready: bool,
}

/// Refund issued when a room is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub user_id: UserId,
    pub amount: Decimal,
    pub refunded: bool,
}

/// One member's position in one room.
///
/// Before settlement the current value is the contribution itself; no
/// unrealized valuation is guessed. Once a settlement record exists the
/// member's recorded payout is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPerformance {
    pub room_id: RoomId,
    pub room_name: String,
    pub status: RoomStatus,
    pub invested_amount: Decimal,
    pub current_value: Decimal,
    pub returns: Decimal,
    /// `returns / invested * 100`, two decimal places; zero with nothing invested
    pub returns_percent: Decimal,
    pub settled: bool,
}

impl RoomPerformance {
    pub fn new(room: &Room, member: &Member) -> Self {
        let invested_amount = member.contribution;
        let payout = room
            .settlement
            .as_ref()
            .and_then(|record| record.payout(&member.user_id));
        let current_value = payout.map_or(invested_amount, |p| p.total_return);
        let returns = current_value - invested_amount;
        let returns_percent = if invested_amount > Decimal::ZERO {
            (returns / invested_amount * Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            Decimal::ZERO
        };
        Self {
            room_id: room.id.clone(),
            room_name: room.name.clone(),
            status: room.status,
            invested_amount,
            current_value,
            returns,
            returns_percent,
            settled: room.settlement.is_some(),
        }
    }
}

/// Outcome of a room deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub room_id: RoomId,
    pub refunds: Vec<Refund>,
}

impl DeletionReport {
    pub fn failed_refunds(&self) -> impl Iterator<Item = &Refund> {
        self.refunds.iter().filter(|r| !r.refunded)
    }
}
