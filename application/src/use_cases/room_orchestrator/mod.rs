//! Room orchestrator
//!
//! The façade over the room lifecycle. Every mutating request is validated
//! against the current room state and the caller's verified identity before
//! any store or collaborator is touched.
//!
//! | Operation                | Caller  | Allowed status      | Transition          |
//! |--------------------------|---------|---------------------|---------------------|
//! | `create_room`            | anyone  | -                   | -> open             |
//! | `join_room`/`join_by_code` | anyone | open, ready        | -                   |
//! | `leave_room`             | member  | open, ready         | -                   |
//! | `delete_room`            | creator | open, ready         | -> (deleted)        |
//! | `contribute`             | member  | open                | open -> ready       |
//! | `open_voting_round`      | member  | open, ready         | -                   |
//! | `cast_vote` (allocation) | member  | open, ready         | -                   |
//! | `execute_allocation`     | creator | ready               | ready -> investing  |
//! | `cast_vote` (stop)       | member  | investing           | -                   |
//! | `end_investment`         | creator | investing           | investing -> closed |
//! | `retry_failed_credits`   | creator | investing           | investing -> closed |
//!
//! Mutations of one room, votes included, are serialized by a per-room
//! lock, and every store write is additionally guarded by the room's
//! optimistic version.

mod contributions;
mod execution;
mod rooms;
mod settlement;
#[cfg(test)]
mod test_support;
mod types;
mod voting;

pub use types::{
    ContributionReceipt, DeletionReport, Page, PageRequest, Refund, RoomError, RoomPerformance,
};

use crate::config::RoomPolicy;
use crate::ports::audit_log::{AuditEvent, AuditLog, NoAuditLog};
use crate::ports::identity::{AccessToken, IdentityProvider, VerifiedIdentity};
use crate::ports::pricing::PricingSource;
use crate::ports::recommendation_feed::RecommendationFeed;
use crate::ports::room_repository::{RoomRepository, StoreError};
use crate::ports::vote_ledger::VoteLedger;
use crate::ports::wallet::Wallet;
use investa_domain::{DomainError, Member, Room, RoomId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// The collaborators a [`RoomOrchestrator`] drives.
#[derive(Clone)]
pub struct RoomPorts {
    pub rooms: Arc<dyn RoomRepository>,
    pub votes: Arc<dyn VoteLedger>,
    pub wallet: Arc<dyn Wallet>,
    pub feed: Arc<dyn RecommendationFeed>,
    pub pricing: Arc<dyn PricingSource>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Per-room mutual exclusion. Rooms never wait on each other.
#[derive(Default)]
pub(crate) struct RoomLocks {
    inner: Mutex<HashMap<RoomId, Arc<tokio::sync::Mutex<()>>>>,
}

impl RoomLocks {
    pub(crate) async fn acquire(&self, room: &RoomId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(room.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry of a room that was deleted or closed.
    pub(crate) fn forget(&self, room: &RoomId) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(room);
    }

    #[cfg(test)]
    pub(crate) fn is_tracked(&self, room: &RoomId) -> bool {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.contains_key(room)
    }
}

/// Use case façade for investment rooms
pub struct RoomOrchestrator {
    pub(super) rooms: Arc<dyn RoomRepository>,
    pub(super) votes: Arc<dyn VoteLedger>,
    pub(super) wallet: Arc<dyn Wallet>,
    pub(super) feed: Arc<dyn RecommendationFeed>,
    pub(super) pricing: Arc<dyn PricingSource>,
    pub(super) identity: Arc<dyn IdentityProvider>,
    pub(super) audit: Arc<dyn AuditLog>,
    pub(super) policy: RoomPolicy,
    pub(super) locks: RoomLocks,
}

impl RoomOrchestrator {
    pub fn new(ports: RoomPorts) -> Self {
        Self {
            rooms: ports.rooms,
            votes: ports.votes,
            wallet: ports.wallet,
            feed: ports.feed,
            pricing: ports.pricing,
            identity: ports.identity,
            audit: Arc::new(NoAuditLog),
            policy: RoomPolicy::default(),
            locks: RoomLocks::default(),
        }
    }

    /// Set voting rules and room limits
    pub fn with_policy(mut self, policy: RoomPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the audit trail
    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    pub fn policy(&self) -> &RoomPolicy {
        &self.policy
    }

    // ==================== Shared helpers ====================

    pub(super) async fn authenticate(
        &self,
        token: &AccessToken,
    ) -> Result<VerifiedIdentity, RoomError> {
        Ok(self.identity.verify(token).await?)
    }

    pub(super) async fn load_room(&self, id: &RoomId) -> Result<Room, RoomError> {
        self.rooms
            .get_room(id)
            .await?
            .ok_or_else(|| DomainError::RoomNotFound(id.clone()).into())
    }

    /// The caller's active membership, or `NotAMember`.
    pub(super) async fn require_member(
        &self,
        room: &Room,
        user: &UserId,
    ) -> Result<Member, RoomError> {
        match self.rooms.member(&room.id, user).await? {
            Some(member) if member.is_active() => Ok(member),
            _ => Err(DomainError::NotAMember {
                room: room.id.clone(),
                user: user.clone(),
            }
            .into()),
        }
    }

    pub(super) async fn active_members(&self, room: &RoomId) -> Result<Vec<Member>, RoomError> {
        let mut members: Vec<Member> = self
            .rooms
            .members(room)
            .await?
            .into_iter()
            .filter(Member::is_active)
            .collect();
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(members)
    }

    /// Map a lost version race to the business error the caller should see.
    pub(super) async fn resolve_conflict(
        &self,
        err: StoreError,
        on_conflict: impl FnOnce(&Room) -> DomainError,
    ) -> RoomError {
        match err {
            StoreError::VersionConflict { ref room, .. } => match self.load_room(room).await {
                Ok(current) => on_conflict(&current).into(),
                Err(reload) => reload,
            },
            other => other.into(),
        }
    }

    pub(super) fn audit(&self, event_type: &'static str, room: &RoomId, payload: serde_json::Value) {
        self.audit
            .record(AuditEvent::new(event_type, room.clone(), payload));
    }
}
