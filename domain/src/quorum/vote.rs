//! Vote types for room decisions
//!
//! Two decision subjects exist: approving an allocation candidate, and
//! stopping (unwinding) an allocated asset. A member holds at most one live
//! vote per subject; casting again replaces the previous vote.

use crate::core::ids::{CandidateId, RoomId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a vote is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum VoteSubject {
    /// Approval of a candidate in the allocation voting round
    Allocation(CandidateId),
    /// Unwinding of an asset in the executed allocation
    Stop(CandidateId),
}

impl VoteSubject {
    pub fn target(&self) -> &CandidateId {
        match self {
            VoteSubject::Allocation(id) | VoteSubject::Stop(id) => id,
        }
    }

    /// Whether `choice` is a meaningful answer for this subject.
    pub fn accepts(&self, choice: VoteChoice) -> bool {
        match self {
            VoteSubject::Allocation(_) => {
                matches!(choice, VoteChoice::Approve | VoteChoice::Reject)
            }
            VoteSubject::Stop(_) => matches!(choice, VoteChoice::Stop),
        }
    }
}

impl std::fmt::Display for VoteSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteSubject::Allocation(id) => write!(f, "allocation:{}", id),
            VoteSubject::Stop(id) => write!(f, "stop:{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Approve,
    Reject,
    Stop,
}

impl std::fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteChoice::Approve => write!(f, "approve"),
            VoteChoice::Reject => write!(f, "reject"),
            VoteChoice::Stop => write!(f, "stop"),
        }
    }
}

impl std::str::FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "yes" => Ok(VoteChoice::Approve),
            "reject" | "no" => Ok(VoteChoice::Reject),
            "stop" => Ok(VoteChoice::Stop),
            other => Err(format!("Unknown vote choice: {}", other)),
        }
    }
}

/// A single live vote from a member
///
/// # Example
///
/// ```
/// use investa_domain::quorum::{Vote, VoteChoice, VoteSubject};
/// use investa_domain::{CandidateId, RoomId, UserId};
///
/// let vote = Vote::allocation(RoomId::new("r1"), CandidateId::new("aapl"), UserId::new("alice"), true);
/// assert_eq!(vote.choice, VoteChoice::Approve);
/// assert_eq!(vote.subject, VoteSubject::Allocation(CandidateId::new("aapl")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub room_id: RoomId,
    pub subject: VoteSubject,
    pub voter: UserId,
    pub choice: VoteChoice,
    pub cast_at: DateTime<Utc>,
}

impl Vote {
    /// Create a vote. Pairing of subject and choice is validated by the
    /// caller via [`VoteSubject::accepts`].
    pub fn new(room_id: RoomId, subject: VoteSubject, voter: UserId, choice: VoteChoice) -> Self {
        Self {
            room_id,
            subject,
            voter,
            choice,
            cast_at: Utc::now(),
        }
    }

    /// Approve or reject an allocation candidate
    pub fn allocation(room_id: RoomId, candidate: CandidateId, voter: UserId, approve: bool) -> Self {
        let choice = if approve {
            VoteChoice::Approve
        } else {
            VoteChoice::Reject
        };
        Self::new(room_id, VoteSubject::Allocation(candidate), voter, choice)
    }

    /// Vote to stop an allocated asset
    pub fn stop(room_id: RoomId, asset: CandidateId, voter: UserId) -> Self {
        Self::new(room_id, VoteSubject::Stop(asset), voter, VoteChoice::Stop)
    }

    pub fn is_approval(&self) -> bool {
        self.choice == VoteChoice::Approve
    }

    pub fn is_rejection(&self) -> bool {
        self.choice == VoteChoice::Reject
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_vote() {
        let vote = Vote::allocation(
            RoomId::new("r"),
            CandidateId::new("c"),
            UserId::new("u"),
            false,
        );
        assert!(vote.is_rejection());
        assert!(!vote.is_approval());
    }

    #[test]
    fn test_subject_accepts() {
        let alloc = VoteSubject::Allocation(CandidateId::new("c"));
        let stop = VoteSubject::Stop(CandidateId::new("c"));

        assert!(alloc.accepts(VoteChoice::Approve));
        assert!(alloc.accepts(VoteChoice::Reject));
        assert!(!alloc.accepts(VoteChoice::Stop));
        assert!(stop.accepts(VoteChoice::Stop));
        assert!(!stop.accepts(VoteChoice::Approve));
    }

    #[test]
    fn test_subjects_for_same_target_are_distinct() {
        let id = CandidateId::new("btc");
        assert_ne!(VoteSubject::Allocation(id.clone()), VoteSubject::Stop(id.clone()));
        assert_eq!(VoteSubject::Stop(id.clone()).target(), &id);
        assert_eq!(VoteSubject::Stop(id).to_string(), "stop:btc");
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!("APPROVE".parse::<VoteChoice>().ok(), Some(VoteChoice::Approve));
        assert_eq!("no".parse::<VoteChoice>().ok(), Some(VoteChoice::Reject));
        assert!("maybe".parse::<VoteChoice>().is_err());
    }
}
