//! Recommendation feed port
//!
//! Supplies the allocation candidates presented to a room's voting round.

use async_trait::async_trait;
use investa_domain::{AllocationCandidate, InvestmentType, Room};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("No recommendations for investment type {0:?}")]
    NoCandidates(InvestmentType),

    #[error("Recommendation feed unavailable: {0}")]
    Unavailable(String),
}

impl FeedError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::Unavailable(_))
    }
}

/// Read-only source of candidates.
///
/// For the same room state the feed must return the same candidates; the
/// orchestrator pins the first answer anyway.
#[async_trait]
pub trait RecommendationFeed: Send + Sync {
    async fn candidates(&self, room: &Room) -> Result<Vec<AllocationCandidate>, FeedError>;
}
