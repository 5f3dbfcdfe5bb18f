//! Room entities: the room itself, its members and their contributions.

use super::lifecycle::RoomStatus;
use crate::allocation::{AllocationSnapshot, VotingRound};
use crate::core::error::DomainError;
use crate::core::ids::{RoomCode, RoomId, UserId};
use crate::settlement::SettlementRecord;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk appetite declared for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

/// Investment-type tag used to pick recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentType {
    Stocks,
    Crypto,
    Bonds,
    Etf,
    #[default]
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Request to create a room. The creator comes from the verified identity,
/// never from this payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub goal_amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    pub max_members: u32,
    #[serde(default)]
    pub risk_tier: RiskTier,
    #[serde(default)]
    pub investment_type: InvestmentType,
    #[serde(default)]
    pub visibility: Visibility,
}

/// A group investment pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub code: RoomCode,
    pub name: String,
    pub description: String,
    pub goal_amount: Decimal,
    /// Monotonically non-decreasing until settlement
    pub collected_amount: Decimal,
    pub currency: String,
    pub max_members: u32,
    pub member_count: u32,
    pub risk_tier: RiskTier,
    pub investment_type: InvestmentType,
    pub visibility: Visibility,
    pub creator: UserId,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every mutation; used for optimistic concurrency checks
    pub version: u64,
    /// Candidates pinned for the allocation vote
    pub voting_round: Option<VotingRound>,
    /// Written once by allocation execution
    pub allocation: Option<AllocationSnapshot>,
    /// Written once by settlement
    pub settlement: Option<SettlementRecord>,
}

impl Room {
    /// Create an open room. The creator counts as the first member.
    pub fn new(
        request: NewRoom,
        creator: UserId,
        default_currency: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if request.name.trim().is_empty() {
            return Err(DomainError::InvalidRoom("name must not be empty".into()));
        }
        if request.goal_amount <= Decimal::ZERO {
            return Err(DomainError::InvalidRoom(format!(
                "goal amount must be positive, got {}",
                request.goal_amount
            )));
        }
        if request.max_members == 0 {
            return Err(DomainError::InvalidRoom(
                "max members must be at least 1".into(),
            ));
        }

        Ok(Self {
            id: RoomId::generate(),
            code: RoomCode::generate(),
            name: request.name.trim().to_string(),
            description: request.description,
            goal_amount: request.goal_amount,
            collected_amount: Decimal::ZERO,
            currency: request
                .currency
                .unwrap_or_else(|| default_currency.to_string()),
            max_members: request.max_members,
            member_count: 1,
            risk_tier: request.risk_tier,
            investment_type: request.investment_type,
            visibility: request.visibility,
            creator,
            status: RoomStatus::Open,
            created_at: now,
            updated_at: now,
            version: 0,
            voting_round: None,
            allocation: None,
            settlement: None,
        })
    }

    pub fn is_creator(&self, user: &UserId) -> bool {
        &self.creator == user
    }

    pub fn ensure_creator(&self, user: &UserId, action: &'static str) -> Result<(), DomainError> {
        if self.is_creator(user) {
            Ok(())
        } else {
            Err(DomainError::Unauthorized { action })
        }
    }

    /// Fail with `InvalidState` unless the room is in one of `allowed`.
    pub fn ensure_status(
        &self,
        operation: &'static str,
        allowed: &[RoomStatus],
    ) -> Result<(), DomainError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(DomainError::InvalidState {
                operation,
                status: self.status,
            })
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.member_count < self.max_members
    }

    /// Funding still needed to reach the goal.
    pub fn remaining_goal(&self) -> Decimal {
        (self.goal_amount - self.collected_amount).max(Decimal::ZERO)
    }

    /// Count a new member in. Fails when the room no longer takes members
    /// or is at capacity.
    pub fn admit_member(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.accepts_members() {
            return Err(DomainError::InvalidState {
                operation: "join room",
                status: self.status,
            });
        }
        if !self.has_capacity() {
            return Err(DomainError::RoomFull {
                max_members: self.max_members,
            });
        }
        self.member_count += 1;
        self.touch(now);
        Ok(())
    }

    /// Count a departing member out.
    pub fn release_member(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_status("leave room", &[RoomStatus::Open, RoomStatus::Ready])?;
        self.member_count = self.member_count.saturating_sub(1).max(1);
        self.touch(now);
        Ok(())
    }

    /// Pin the candidate set of the allocation vote. Returns the pinned
    /// round, which is the existing one if a round was already opened.
    pub fn pin_voting_round(&mut self, round: VotingRound, now: DateTime<Utc>) -> Result<&VotingRound, DomainError> {
        if self.voting_round.is_none() {
            self.ensure_status("open voting round", &[RoomStatus::Open, RoomStatus::Ready])?;
            self.voting_round = Some(round);
            self.touch(now);
        }
        self.voting_round.as_ref().ok_or(DomainError::InvalidState {
            operation: "open voting round",
            status: self.status,
        })
    }

    /// Add a contribution to the collected amount.
    ///
    /// Flips `open -> ready` exactly once, the moment collected reaches the
    /// goal. Returns `true` when that flip happened on this call.
    pub fn apply_contribution(&mut self, amount: Decimal, now: DateTime<Utc>) -> Result<bool, DomainError> {
        self.ensure_status("contribute", &[RoomStatus::Open])?;
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount(format!(
                "contribution must be positive, got {}",
                amount
            )));
        }
        if amount > self.remaining_goal() {
            return Err(DomainError::InvalidAmount(format!(
                "contribution {} exceeds remaining goal {}",
                amount,
                self.remaining_goal()
            )));
        }

        self.collected_amount += amount;
        let became_ready = self.collected_amount >= self.goal_amount;
        if became_ready {
            self.status = self.status.transition(RoomStatus::Ready)?;
        }
        self.touch(now);
        Ok(became_ready)
    }

    /// Record the one-shot allocation and move to `investing`.
    pub fn begin_investing(
        &mut self,
        snapshot: AllocationSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.allocation.is_some() {
            return Err(DomainError::InvalidState {
                operation: "execute allocation",
                status: self.status,
            });
        }
        self.ensure_status("execute allocation", &[RoomStatus::Ready])?;
        self.status = self.status.transition(RoomStatus::Investing)?;
        self.allocation = Some(snapshot);
        self.touch(now);
        Ok(())
    }

    /// Attach the settlement record. The room stays `investing` until the
    /// distribution completes, see [`Room::apply_credit_results`].
    pub fn record_settlement(
        &mut self,
        record: SettlementRecord,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.settlement.is_some() {
            return Err(DomainError::AlreadySettled(self.id.clone()));
        }
        self.ensure_status("end investment", &[RoomStatus::Investing])?;
        self.settlement = Some(record);
        self.touch(now);
        Ok(())
    }

    /// Record the outcome of a round of wallet credits.
    ///
    /// Closes the room once every payout has been credited. Returns `true`
    /// when the distribution is complete.
    pub fn apply_credit_results(
        &mut self,
        succeeded: &[UserId],
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let record = self.settlement.as_mut().ok_or(DomainError::InvalidState {
            operation: "distribute settlement",
            status: self.status,
        })?;
        record.apply_credit_results(succeeded);
        let complete = record.distribution.is_complete();
        if complete && self.status != RoomStatus::Closed {
            self.status = self.status.transition(RoomStatus::Closed)?;
        }
        self.touch(now);
        Ok(complete)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Left,
}

/// Membership of one user in one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    /// Cumulative contribution; never decreases while the room is open/ready
    pub contribution: Decimal,
    pub is_creator: bool,
    pub joined_at: DateTime<Utc>,
    pub status: MemberStatus,
}

impl Member {
    pub fn new(
        room_id: RoomId,
        user_id: UserId,
        display_name: impl Into<String>,
        email: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            room_id,
            user_id,
            display_name: display_name.into(),
            email,
            contribution: Decimal::ZERO,
            is_creator: false,
            joined_at: now,
            status: MemberStatus::Active,
        }
    }

    pub fn as_creator(mut self) -> Self {
        self.is_creator = true;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Immutable record of one funding event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: String,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Contribution {
    pub fn new(room_id: RoomId, user_id: UserId, amount: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            room_id,
            user_id,
            amount,
            created_at: now,
        }
    }
}

/// Poll view of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub code: RoomCode,
    pub name: String,
    pub status: RoomStatus,
    pub goal_amount: Decimal,
    pub collected_amount: Decimal,
    pub currency: String,
    pub member_count: u32,
    pub max_members: u32,
    pub visibility: Visibility,
    pub has_allocation: bool,
    pub has_settlement: bool,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            code: room.code.clone(),
            name: room.name.clone(),
            status: room.status,
            goal_amount: room.goal_amount,
            collected_amount: room.collected_amount,
            currency: room.currency.clone(),
            member_count: room.member_count,
            max_members: room.max_members,
            visibility: room.visibility,
            has_allocation: room.allocation.is_some(),
            has_settlement: room.settlement.is_some(),
        }
    }
}

impl RoomSummary {
    /// Funding progress in percent, capped at 100.
    pub fn progress_percent(&self) -> Decimal {
        if self.goal_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.collected_amount * Decimal::ONE_HUNDRED / self.goal_amount)
            .min(Decimal::ONE_HUNDRED)
            .round_dp(2)
    }
}
