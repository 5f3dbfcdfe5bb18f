//! Room repository port
//!
//! Persistence for rooms, their members and contribution records.
//!
//! Every write is a compare-and-swap on [`Room::version`]: the caller passes
//! the version it observed before mutating, and the store rejects the write
//! with [`StoreError::VersionConflict`] if another writer got there first.
//! The room handed to a commit already carries the bumped version.

use async_trait::async_trait;
use investa_domain::{Contribution, Member, Room, RoomCode, RoomId, UserId};
use thiserror::Error;

/// Errors raised by the room and vote stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Room not found in store: {0}")]
    NotFound(RoomId),

    #[error("Version conflict on room {room}: expected {expected}, found {found}")]
    VersionConflict {
        room: RoomId,
        expected: u64,
        found: u64,
    },

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::VersionConflict { .. }
        )
    }
}

/// Store for rooms, members and contributions
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Insert a new room together with its creator membership.
    async fn insert_room(&self, room: Room, creator: Member) -> Result<(), StoreError>;

    async fn get_room(&self, id: &RoomId) -> Result<Option<Room>, StoreError>;

    async fn find_by_code(&self, code: &RoomCode) -> Result<Option<Room>, StoreError>;

    /// All rooms, in no particular order.
    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// Rooms in which `user` holds an active membership.
    async fn rooms_for_member(&self, user: &UserId) -> Result<Vec<Room>, StoreError>;

    async fn member(&self, room: &RoomId, user: &UserId) -> Result<Option<Member>, StoreError>;

    /// Every membership of the room, including members who left.
    async fn members(&self, room: &RoomId) -> Result<Vec<Member>, StoreError>;

    async fn contributions(&self, room: &RoomId) -> Result<Vec<Contribution>, StoreError>;

    /// Replace the room.
    async fn commit_room(&self, room: &Room, expected_version: u64) -> Result<(), StoreError>;

    /// Replace the room and upsert one membership in the same write.
    async fn commit_membership(
        &self,
        room: &Room,
        expected_version: u64,
        member: Member,
    ) -> Result<(), StoreError>;

    /// Replace the room, append the contribution and add its amount to the
    /// member's running total, all in the same write.
    async fn commit_contribution(
        &self,
        room: &Room,
        expected_version: u64,
        contribution: Contribution,
    ) -> Result<(), StoreError>;

    /// Remove the room with its members and contributions.
    async fn delete_room(&self, id: &RoomId, expected_version: u64) -> Result<(), StoreError>;
}
