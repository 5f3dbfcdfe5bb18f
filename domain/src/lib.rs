//! Domain layer for investa
//!
//! Entities, value objects and the pure decision logic of an investment
//! room. This crate performs no I/O.
//!
//! # Core Concepts
//!
//! ## Room
//!
//! A pool of member contributions with a funding goal. Its lifecycle is a
//! closed table: `open -> ready -> investing -> closed`, with deletion
//! possible only before any allocation is executed.
//!
//! ## Quorum
//!
//! Members vote one-member-one-vote on allocation candidates and, once
//! invested, on stopping each allocated asset. Tallies are never stored;
//! [`ApprovalTally`] and [`StopTally`] are re-derived from the live votes.
//!
//! ## Allocation and Settlement
//!
//! - [`AllocationSnapshot`]: the one-shot split of the collected pool
//! - [`SettlementRecord`]: realized value, profit and each member's return

pub mod allocation;
pub mod config;
pub mod core;
pub mod quorum;
pub mod room;
pub mod settlement;

pub use allocation::{
    AllocationCandidate, AllocationLine, AllocationSnapshot, AssetClass, ReturnBand, VotingRound,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    error::DomainError,
    ids::{CandidateId, RoomCode, RoomId, UserId},
};
pub use quorum::{
    ApprovalTally, ConsensusOutcome, QuorumRule, StopTally, Vote, VoteChoice, VoteSubject,
};
pub use room::{
    Contribution, InvestmentType, Member, MemberStatus, NewRoom, RiskTier, Room, RoomStatus,
    RoomSummary, Visibility,
};
pub use settlement::{AssetValuation, DistributionStatus, MemberPayout, SettlementRecord};
