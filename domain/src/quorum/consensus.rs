//! Consensus outcome of a decision subject.

use serde::{Deserialize, Serialize};

/// Outcome of a vote tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusOutcome {
    /// Decided: approved
    Approved,
    /// Decided: rejected
    Rejected,
    /// Not decided yet (members still voting)
    Pending,
}

impl ConsensusOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, ConsensusOutcome::Approved)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ConsensusOutcome::Rejected)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ConsensusOutcome::Pending)
    }
}

impl std::fmt::Display for ConsensusOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusOutcome::Approved => write!(f, "Approved"),
            ConsensusOutcome::Rejected => write!(f, "Rejected"),
            ConsensusOutcome::Pending => write!(f, "Pending"),
        }
    }
}
