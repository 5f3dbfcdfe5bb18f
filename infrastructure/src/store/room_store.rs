//! [`RoomRepository`] backed by in-process maps.

use async_trait::async_trait;
use investa_application::ports::room_repository::{RoomRepository, StoreError};
use investa_domain::{Contribution, Member, Room, RoomCode, RoomId, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct RoomTables {
    rooms: HashMap<RoomId, Room>,
    codes: HashMap<RoomCode, RoomId>,
    /// Members per room, in join order
    members: HashMap<RoomId, Vec<Member>>,
    contributions: HashMap<RoomId, Vec<Contribution>>,
}

impl RoomTables {
    fn check_version(&self, id: &RoomId, expected: u64) -> Result<(), StoreError> {
        let current = self
            .rooms
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if current.version != expected {
            return Err(StoreError::VersionConflict {
                room: id.clone(),
                expected,
                found: current.version,
            });
        }
        Ok(())
    }

    fn upsert_member(&mut self, member: Member) {
        let members = self.members.entry(member.room_id.clone()).or_default();
        match members.iter_mut().find(|m| m.user_id == member.user_id) {
            Some(existing) => *existing = member,
            None => members.push(member),
        }
    }
}

/// Room store that lives for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryRoomStore {
    tables: RwLock<RoomTables>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomStore {
    async fn insert_room(&self, room: Room, creator: Member) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.rooms.contains_key(&room.id) {
            return Err(StoreError::Duplicate(room.id.to_string()));
        }
        if tables.codes.contains_key(&room.code) {
            return Err(StoreError::Duplicate(room.code.to_string()));
        }
        debug!(room_id = %room.id, code = %room.code, "Inserting room");
        tables.codes.insert(room.code.clone(), room.id.clone());
        tables.members.insert(room.id.clone(), vec![creator]);
        tables.contributions.insert(room.id.clone(), Vec::new());
        tables.rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn get_room(&self, id: &RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.tables.read().await.rooms.get(id).cloned())
    }

    async fn find_by_code(&self, code: &RoomCode) -> Result<Option<Room>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .codes
            .get(code)
            .and_then(|id| tables.rooms.get(id))
            .cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        Ok(self.tables.read().await.rooms.values().cloned().collect())
    }

    async fn rooms_for_member(&self, user: &UserId) -> Result<Vec<Room>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .filter(|(_, members)| {
                members
                    .iter()
                    .any(|m| &m.user_id == user && m.is_active())
            })
            .filter_map(|(id, _)| tables.rooms.get(id).cloned())
            .collect())
    }

    async fn member(&self, room: &RoomId, user: &UserId) -> Result<Option<Member>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .get(room)
            .and_then(|members| members.iter().find(|m| &m.user_id == user))
            .cloned())
    }

    async fn members(&self, room: &RoomId) -> Result<Vec<Member>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.members.get(room).cloned().unwrap_or_default())
    }

    async fn contributions(&self, room: &RoomId) -> Result<Vec<Contribution>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.contributions.get(room).cloned().unwrap_or_default())
    }

    async fn commit_room(&self, room: &Room, expected_version: u64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_version(&room.id, expected_version)?;
        tables.rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn commit_membership(
        &self,
        room: &Room,
        expected_version: u64,
        member: Member,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_version(&room.id, expected_version)?;
        tables.upsert_member(member);
        tables.rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn commit_contribution(
        &self,
        room: &Room,
        expected_version: u64,
        contribution: Contribution,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_version(&room.id, expected_version)?;

        let member = tables
            .members
            .get_mut(&room.id)
            .and_then(|members| {
                members
                    .iter_mut()
                    .find(|m| m.user_id == contribution.user_id)
            })
            .ok_or_else(|| StoreError::NotFound(room.id.clone()))?;
        member.contribution += contribution.amount;

        tables
            .contributions
            .entry(room.id.clone())
            .or_default()
            .push(contribution);
        tables.rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn delete_room(&self, id: &RoomId, expected_version: u64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_version(id, expected_version)?;
        if let Some(room) = tables.rooms.remove(id) {
            tables.codes.remove(&room.code);
        }
        tables.members.remove(id);
        tables.contributions.remove(id);
        debug!(room_id = %id, "Deleted room");
        Ok(())
    }
}
