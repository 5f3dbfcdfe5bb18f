//! Domain error types

use super::ids::{CandidateId, RoomCode, RoomId, UserId};
use crate::room::lifecycle::RoomStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Business-rule violations.
///
/// Every variant is a local validation failure surfaced directly to the
/// caller. None of them are transient, so none of them are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("No room with code {0}")]
    RoomCodeNotFound(RoomCode),

    #[error("User {user} is not an active member of room {room}")]
    NotAMember { room: RoomId, user: UserId },

    #[error("Only the room creator may {action}")]
    Unauthorized { action: &'static str },

    #[error("Subject is not open for voting: {0}")]
    InvalidSubject(String),

    #[error("Operation '{operation}' is not allowed while room is {status}")]
    InvalidState {
        operation: &'static str,
        status: RoomStatus,
    },

    #[error("Transition {from} -> {to} is not allowed")]
    InvalidTransition { from: RoomStatus, to: RoomStatus },

    #[error("Voting incomplete: {pending} member(s) have not voted on candidate {candidate}")]
    IncompleteVoting {
        candidate: CandidateId,
        pending: usize,
    },

    #[error("Stop not approved for asset {asset}: {votes}/{threshold} stop votes")]
    StopNotApproved {
        asset: CandidateId,
        votes: usize,
        threshold: usize,
    },

    #[error("No approved candidates supplied")]
    NoApprovedCandidates,

    #[error("Candidate {0} has not been approved")]
    CandidateNotApproved(CandidateId),

    #[error("Room {0} has already been settled")]
    AlreadySettled(RoomId),

    #[error("Room is full ({max_members} members)")]
    RoomFull { max_members: u32 },

    #[error("User {0} is already a member of this room")]
    AlreadyMember(UserId),

    #[error("The room creator cannot leave; delete the room instead")]
    CreatorCannotLeave,

    #[error("Members who contributed ({0}) cannot leave the room")]
    ContributedMemberCannotLeave(Decimal),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Invalid room settings: {0}")]
    InvalidRoom(String),
}

impl DomainError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::RoomNotFound(_) => "room_not_found",
            DomainError::RoomCodeNotFound(_) => "room_code_not_found",
            DomainError::NotAMember { .. } => "not_a_member",
            DomainError::Unauthorized { .. } => "unauthorized",
            DomainError::InvalidSubject(_) => "invalid_subject",
            DomainError::InvalidState { .. } => "invalid_state",
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::IncompleteVoting { .. } => "incomplete_voting",
            DomainError::StopNotApproved { .. } => "stop_not_approved",
            DomainError::NoApprovedCandidates => "no_approved_candidates",
            DomainError::CandidateNotApproved(_) => "candidate_not_approved",
            DomainError::AlreadySettled(_) => "already_settled",
            DomainError::RoomFull { .. } => "room_full",
            DomainError::AlreadyMember(_) => "already_member",
            DomainError::CreatorCannotLeave => "creator_cannot_leave",
            DomainError::ContributedMemberCannotLeave(_) => "contributed_member_cannot_leave",
            DomainError::InvalidAmount(_) => "invalid_amount",
            DomainError::InvalidAllocation(_) => "invalid_allocation",
            DomainError::InvalidRoom(_) => "invalid_room",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_display() {
        let error = DomainError::InvalidState {
            operation: "execute allocation",
            status: RoomStatus::Open,
        };
        assert_eq!(
            error.to_string(),
            "Operation 'execute allocation' is not allowed while room is open"
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(DomainError::NoApprovedCandidates.code(), "no_approved_candidates");
        assert_eq!(
            DomainError::AlreadySettled(RoomId::new("r1")).code(),
            "already_settled"
        );
        assert_eq!(
            DomainError::Unauthorized { action: "end" }.code(),
            "unauthorized"
        );
    }
}
