//! Room lifecycle state machine
//!
//! ```text
//!   open ──(collected ≥ goal)──▶ ready ──(execute)──▶ investing ──(end)──▶ closed
//!     │                           │
//!     └──────(creator delete)─────┴──▶ (removed)
//! ```
//!
//! Deletion is not a status: a deleted room no longer exists. It is only
//! permitted from `open` or `ready`, see [`RoomStatus::is_deletable`].

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a room.
///
/// `closed` is the one canonical terminal value; "ended" is accepted when
/// parsing but never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Accepting members and contributions
    #[default]
    Open,
    /// Funding goal reached; allocation voting may conclude
    Ready,
    /// Allocation executed; stop voting in progress
    Investing,
    /// Settled and distributed
    Closed,
}

impl RoomStatus {
    /// Whether the transition table contains `self -> to`.
    pub fn can_transition_to(self, to: RoomStatus) -> bool {
        matches!(
            (self, to),
            (RoomStatus::Open, RoomStatus::Ready)
                | (RoomStatus::Ready, RoomStatus::Investing)
                | (RoomStatus::Investing, RoomStatus::Closed)
        )
    }

    /// Validate `self -> to`, returning the new status.
    pub fn transition(self, to: RoomStatus) -> Result<RoomStatus, DomainError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(DomainError::InvalidTransition { from: self, to })
        }
    }

    /// Creator deletion is only possible before any execution.
    pub fn is_deletable(self) -> bool {
        matches!(self, RoomStatus::Open | RoomStatus::Ready)
    }

    /// Members may join while the room has not started investing.
    pub fn accepts_members(self) -> bool {
        matches!(self, RoomStatus::Open | RoomStatus::Ready)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RoomStatus::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Open => "open",
            RoomStatus::Ready => "ready",
            RoomStatus::Investing => "investing",
            RoomStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(RoomStatus::Open),
            "ready" => Ok(RoomStatus::Ready),
            "investing" => Ok(RoomStatus::Investing),
            // Legacy alias for the terminal state
            "closed" | "ended" => Ok(RoomStatus::Closed),
            other => Err(format!(
                "Unknown room status: {}. Valid: open, ready, investing, closed",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RoomStatus; 4] = [
        RoomStatus::Open,
        RoomStatus::Ready,
        RoomStatus::Investing,
        RoomStatus::Closed,
    ];

    #[test]
    fn test_transition_table() {
        let allowed = [
            (RoomStatus::Open, RoomStatus::Ready),
            (RoomStatus::Ready, RoomStatus::Investing),
            (RoomStatus::Investing, RoomStatus::Closed),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = RoomStatus::Open.transition(RoomStatus::Investing).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: RoomStatus::Open,
                to: RoomStatus::Investing
            }
        );
        assert!(RoomStatus::Closed.transition(RoomStatus::Open).is_err());
    }

    #[test]
    fn test_deletable() {
        assert!(RoomStatus::Open.is_deletable());
        assert!(RoomStatus::Ready.is_deletable());
        assert!(!RoomStatus::Investing.is_deletable());
        assert!(!RoomStatus::Closed.is_deletable());
    }

    #[test]
    fn test_ended_normalizes_to_closed() {
        assert_eq!("ended".parse::<RoomStatus>().ok(), Some(RoomStatus::Closed));
        assert_eq!("Closed".parse::<RoomStatus>().ok(), Some(RoomStatus::Closed));
        assert_eq!(RoomStatus::Closed.to_string(), "closed");
        assert!("paused".parse::<RoomStatus>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RoomStatus::Investing).unwrap();
        assert_eq!(json, "\"investing\"");
    }
}
