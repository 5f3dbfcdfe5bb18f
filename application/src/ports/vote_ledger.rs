//! Vote ledger port
//!
//! Holds the live votes of every room. A vote is keyed by
//! `(room, subject, voter)`; recording a second vote for the same key
//! replaces the first. The ledger keeps no counters: tallies are derived by
//! the caller from [`VoteLedger::list_votes`].

use super::room_repository::StoreError;
use async_trait::async_trait;
use investa_domain::{RoomId, UserId, Vote, VoteSubject};

#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Upsert the live vote. Returns the vote it replaced, if any.
    async fn record_vote(&self, vote: Vote) -> Result<Option<Vote>, StoreError>;

    /// All live votes for one subject in a room.
    async fn list_votes(&self, room: &RoomId, subject: &VoteSubject)
    -> Result<Vec<Vote>, StoreError>;

    /// Drop every live vote cast by `voter` in the room. Returns how many.
    async fn retract_votes(&self, room: &RoomId, voter: &UserId) -> Result<usize, StoreError>;

    /// Drop every vote of the room.
    async fn clear_room(&self, room: &RoomId) -> Result<(), StoreError>;
}
