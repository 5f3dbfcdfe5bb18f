//! Room management: create, join, leave, delete and the read-side queries.

use super::{DeletionReport, Page, PageRequest, Refund, RoomError, RoomOrchestrator, RoomPerformance};
use crate::ports::identity::AccessToken;
use crate::ports::room_repository::StoreError;
use chrono::Utc;
use futures::future::join_all;
use investa_domain::{
    Contribution, DomainError, Member, MemberStatus, NewRoom, Room, RoomCode, RoomId, RoomStatus,
    RoomSummary, SettlementRecord, Visibility,
};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info, warn};

/// Fresh codes tried when a generated room code collides.
const CODE_ATTEMPTS: usize = 5;

impl RoomOrchestrator {
    /// Create a room owned by the caller, who becomes its first member.
    pub async fn create_room(&self, token: &AccessToken, spec: NewRoom) -> Result<Room, RoomError> {
        let caller = self.authenticate(token).await?;

        if spec.max_members > self.policy.max_members_cap {
            return Err(DomainError::InvalidRoom(format!(
                "max members {} exceeds the limit of {}",
                spec.max_members, self.policy.max_members_cap
            ))
            .into());
        }

        let now = Utc::now();
        let mut room = Room::new(spec, caller.user_id.clone(), &self.policy.default_currency, now)?;
        let creator = Member::new(
            room.id.clone(),
            caller.user_id.clone(),
            caller.display_name.clone(),
            caller.email.clone(),
            now,
        )
        .as_creator();

        let mut attempt = 1;
        loop {
            match self.rooms.insert_room(room.clone(), creator.clone()).await {
                Ok(()) => break,
                Err(StoreError::Duplicate(key)) if attempt < CODE_ATTEMPTS => {
                    debug!(key = %key, attempt, "Room code collision, regenerating");
                    room.code = RoomCode::generate();
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(room_id = %room.id, code = %room.code, creator = %caller.user_id, "Room created");
        self.audit(
            "room_created",
            &room.id,
            json!({
                "code": room.code,
                "name": room.name,
                "creator": caller.user_id,
                "goal_amount": room.goal_amount,
                "max_members": room.max_members,
            }),
        );
        Ok(room)
    }

    pub async fn join_room(&self, token: &AccessToken, room_id: &RoomId) -> Result<Member, RoomError> {
        let caller = self.authenticate(token).await?;
        let _guard = self.locks.acquire(room_id).await;

        let mut room = self.load_room(room_id).await?;
        let existing = self.rooms.member(room_id, &caller.user_id).await?;
        if existing.as_ref().is_some_and(Member::is_active) {
            return Err(DomainError::AlreadyMember(caller.user_id).into());
        }

        let now = Utc::now();
        let expected = room.version;
        room.admit_member(now)?;

        // A member who left earlier rejoins under the same key
        let member = match existing {
            Some(mut previous) => {
                previous.status = MemberStatus::Active;
                previous.display_name = caller.display_name.clone();
                previous.email = caller.email.clone();
                previous.joined_at = now;
                previous
            }
            None => Member::new(
                room.id.clone(),
                caller.user_id.clone(),
                caller.display_name.clone(),
                caller.email.clone(),
                now,
            ),
        };

        self.rooms
            .commit_membership(&room, expected, member.clone())
            .await?;

        info!(room_id = %room.id, member = %caller.user_id, members = room.member_count, "Member joined");
        self.audit(
            "member_joined",
            &room.id,
            json!({ "member": caller.user_id, "member_count": room.member_count }),
        );
        Ok(member)
    }

    pub async fn join_by_code(&self, token: &AccessToken, code: &RoomCode) -> Result<Member, RoomError> {
        let room = self
            .rooms
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::RoomCodeNotFound(code.clone()))?;
        self.join_room(token, &room.id).await
    }

    /// Leave a room before it invests. Members who already contributed stay,
    /// so the collected amount never shrinks.
    pub async fn leave_room(&self, token: &AccessToken, room_id: &RoomId) -> Result<(), RoomError> {
        let caller = self.authenticate(token).await?;
        let _guard = self.locks.acquire(room_id).await;

        let mut room = self.load_room(room_id).await?;
        let mut member = self.require_member(&room, &caller.user_id).await?;
        if member.is_creator {
            return Err(DomainError::CreatorCannotLeave.into());
        }
        if member.contribution > Decimal::ZERO {
            room.ensure_status("leave room", &[RoomStatus::Open, RoomStatus::Ready])?;
            return Err(DomainError::ContributedMemberCannotLeave(member.contribution).into());
        }

        let expected = room.version;
        room.release_member(Utc::now())?;
        member.status = MemberStatus::Left;
        self.rooms.commit_membership(&room, expected, member).await?;

        let retracted = self.votes.retract_votes(room_id, &caller.user_id).await?;

        info!(room_id = %room.id, member = %caller.user_id, retracted, "Member left");
        self.audit(
            "member_left",
            &room.id,
            json!({
                "member": caller.user_id,
                "member_count": room.member_count,
                "retracted_votes": retracted,
            }),
        );
        Ok(())
    }

    /// Delete a room that has not started investing, refunding every
    /// contribution through the wallet.
    ///
    /// The room is removed first; a refund that then fails is reported in the
    /// returned [`DeletionReport`] and audited as `credit_failed`.
    pub async fn delete_room(
        &self,
        token: &AccessToken,
        room_id: &RoomId,
    ) -> Result<DeletionReport, RoomError> {
        let caller = self.authenticate(token).await?;
        let guard = self.locks.acquire(room_id).await;

        let room = self.load_room(room_id).await?;
        room.ensure_creator(&caller.user_id, "delete the room")?;
        if !room.status.is_deletable() {
            return Err(DomainError::InvalidState {
                operation: "delete room",
                status: room.status,
            }
            .into());
        }

        let owed: Vec<Member> = self
            .rooms
            .members(room_id)
            .await?
            .into_iter()
            .filter(|m| m.contribution > Decimal::ZERO)
            .collect();

        self.rooms.delete_room(room_id, room.version).await?;
        self.votes.clear_room(room_id).await?;
        drop(guard);
        self.locks.forget(room_id);

        let reference = format!("refund:{}", room_id);
        let results = join_all(
            owed.iter()
                .map(|m| self.wallet.credit(&m.user_id, m.contribution, &reference)),
        )
        .await;

        let mut refunds = Vec::with_capacity(owed.len());
        for (member, result) in owed.into_iter().zip(results) {
            let refunded = match result {
                Ok(()) => true,
                Err(e) => {
                    warn!(room_id = %room_id, member = %member.user_id, error = %e, "Refund failed");
                    self.audit(
                        "credit_failed",
                        room_id,
                        json!({
                            "member": member.user_id,
                            "amount": member.contribution,
                            "reason": "refund",
                            "error": e.to_string(),
                        }),
                    );
                    false
                }
            };
            refunds.push(Refund {
                user_id: member.user_id,
                amount: member.contribution,
                refunded,
            });
        }

        info!(room_id = %room_id, refunds = refunds.len(), "Room deleted");
        self.audit(
            "room_deleted",
            room_id,
            json!({
                "deleted_by": caller.user_id,
                "refunded_total": refunds.iter().filter(|r| r.refunded).map(|r| r.amount).sum::<Decimal>(),
            }),
        );
        Ok(DeletionReport {
            room_id: room_id.clone(),
            refunds,
        })
    }

    // ==================== Queries ====================

    pub async fn room(&self, room_id: &RoomId) -> Result<Room, RoomError> {
        self.load_room(room_id).await
    }

    pub async fn room_summary(&self, room_id: &RoomId) -> Result<RoomSummary, RoomError> {
        Ok(RoomSummary::from(&self.load_room(room_id).await?))
    }

    /// Active members, oldest first.
    pub async fn list_members(&self, room_id: &RoomId) -> Result<Vec<Member>, RoomError> {
        self.load_room(room_id).await?;
        self.active_members(room_id).await
    }

    /// Contribution records, oldest first.
    pub async fn list_contributions(&self, room_id: &RoomId) -> Result<Vec<Contribution>, RoomError> {
        self.load_room(room_id).await?;
        let mut contributions = self.rooms.contributions(room_id).await?;
        contributions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(contributions)
    }

    /// Open public rooms, newest first.
    pub async fn list_public_rooms(&self, page: PageRequest) -> Result<Page<RoomSummary>, RoomError> {
        let mut rooms: Vec<Room> = self
            .rooms
            .list_rooms()
            .await?
            .into_iter()
            .filter(|r| r.status == RoomStatus::Open && r.visibility == Visibility::Public)
            .collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let summaries = rooms.iter().map(RoomSummary::from).collect();
        Ok(Page::from_all(summaries, page))
    }

    /// Rooms the caller is an active member of, newest first.
    pub async fn rooms_for_member(&self, token: &AccessToken) -> Result<Vec<RoomSummary>, RoomError> {
        let caller = self.authenticate(token).await?;
        let mut rooms = self.rooms.rooms_for_member(&caller.user_id).await?;
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rooms.iter().map(RoomSummary::from).collect())
    }

    /// The caller's position in each room they are an active member of,
    /// newest room first.
    pub async fn room_performance(&self, token: &AccessToken) -> Result<Vec<RoomPerformance>, RoomError> {
        let caller = self.authenticate(token).await?;
        let mut rooms = self.rooms.rooms_for_member(&caller.user_id).await?;
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut performance = Vec::with_capacity(rooms.len());
        for room in &rooms {
            if let Some(member) = self.rooms.member(&room.id, &caller.user_id).await? {
                performance.push(RoomPerformance::new(room, &member));
            }
        }
        Ok(performance)
    }

    /// The settlement record, once one has been written.
    pub async fn settlement(&self, room_id: &RoomId) -> Result<Option<SettlementRecord>, RoomError> {
        Ok(self.load_room(room_id).await?.settlement)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use investa_domain::{VoteChoice, VoteSubject};
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_room_adds_creator() {
        let h = Harness::new();
        let room = h.create_room("alice", 10_000, 4).await;

        assert_eq!(room.status, RoomStatus::Open);
        assert!(room.code.as_str().starts_with("ROOM-"));
        let members = h.orchestrator.list_members(&room.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert!(members[0].is_creator);
        assert_eq!(members[0].display_name, "Alice");
        assert_eq!(h.audit.types(), vec!["room_created"]);
    }

    #[tokio::test]
    async fn test_create_room_respects_cap() {
        let h = Harness::new();
        let err = h
            .orchestrator
            .create_room(&token("alice"), new_room(1000, 51))
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::Domain(DomainError::InvalidRoom(_))));
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let h = Harness::new();
        let err = h
            .orchestrator
            .create_room(&AccessToken::new("nobody"), new_room(1000, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::Identity(_)));
    }

    #[tokio::test]
    async fn test_join_full_and_duplicate() {
        let h = Harness::new();
        let room = h.create_room("alice", 1000, 2).await;

        h.orchestrator.join_room(&token("bob"), &room.id).await.unwrap();
        let err = h.orchestrator.join_room(&token("bob"), &room.id).await.unwrap_err();
        assert_eq!(err, RoomError::Domain(DomainError::AlreadyMember(user("bob"))));

        let err = h.orchestrator.join_room(&token("carol"), &room.id).await.unwrap_err();
        assert_eq!(err, RoomError::Domain(DomainError::RoomFull { max_members: 2 }));
    }

    #[tokio::test]
    async fn test_join_by_code() {
        let h = Harness::new();
        let room = h.create_room("alice", 1000, 4).await;

        let member = h
            .orchestrator
            .join_by_code(&token("bob"), &room.code)
            .await
            .unwrap();
        assert_eq!(member.room_id, room.id);

        let err = h
            .orchestrator
            .join_by_code(&token("bob"), &RoomCode::new("ROOM-ZZZZZZ"))
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::Domain(DomainError::RoomCodeNotFound(_))));
    }

    #[tokio::test]
    async fn test_leave_rules() {
        let h = Harness::new();
        let room = h.create_room("alice", 1000, 4).await;
        h.join(&room.id, &["bob", "carol"]).await;
        h.orchestrator
            .contribute(&token("carol"), &room.id, Decimal::from(100))
            .await
            .unwrap();

        let err = h.orchestrator.leave_room(&token("alice"), &room.id).await.unwrap_err();
        assert_eq!(err, RoomError::Domain(DomainError::CreatorCannotLeave));

        let err = h.orchestrator.leave_room(&token("carol"), &room.id).await.unwrap_err();
        assert!(matches!(
            err,
            RoomError::Domain(DomainError::ContributedMemberCannotLeave(_))
        ));

        h.orchestrator.leave_room(&token("bob"), &room.id).await.unwrap();
        let summary = h.orchestrator.room_summary(&room.id).await.unwrap();
        assert_eq!(summary.member_count, 2);

        let err = h.orchestrator.leave_room(&token("bob"), &room.id).await.unwrap_err();
        assert!(matches!(err, RoomError::Domain(DomainError::NotAMember { .. })));

        // Rejoining reuses the membership
        h.orchestrator.join_room(&token("bob"), &room.id).await.unwrap();
        assert_eq!(h.orchestrator.list_members(&room.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_leave_retracts_votes() {
        let h = Harness::new();
        let room = h.create_room("alice", 1000, 4).await;
        h.join(&room.id, &["bob"]).await;
        let round = h.open_round(&room.id).await;
        let cand = round.candidates[0].id.clone();

        h.vote(&room.id, "bob", VoteSubject::Allocation(cand.clone()), VoteChoice::Approve)
            .await;
        assert_eq!(h.orchestrator.approval_tally(&room.id, &cand).await.unwrap().approve_count, 1);

        h.orchestrator.leave_room(&token("bob"), &room.id).await.unwrap();
        let tally = h.orchestrator.approval_tally(&room.id, &cand).await.unwrap();
        assert_eq!(tally.approve_count, 0);
        assert_eq!(tally.total_members, 1);
    }

    #[tokio::test]
    async fn test_delete_refunds_contributions() {
        let h = Harness::new();
        let room = h.create_room("alice", 1000, 4).await;
        h.join(&room.id, &["bob"]).await;
        h.orchestrator
            .contribute(&token("bob"), &room.id, Decimal::from(300))
            .await
            .unwrap();
        assert_eq!(h.wallet.balance("bob"), Decimal::from(STARTING_BALANCE - 300));

        let err = h.orchestrator.delete_room(&token("bob"), &room.id).await.unwrap_err();
        assert!(matches!(err, RoomError::Domain(DomainError::Unauthorized { .. })));

        let report = h.orchestrator.delete_room(&token("alice"), &room.id).await.unwrap();
        assert_eq!(report.refunds.len(), 1);
        assert_eq!(report.failed_refunds().count(), 0);
        assert_eq!(h.wallet.balance("bob"), Decimal::from(STARTING_BALANCE));

        let err = h.orchestrator.room_summary(&room.id).await.unwrap_err();
        assert_eq!(err, RoomError::Domain(DomainError::RoomNotFound(room.id.clone())));
        assert!(h.audit.types().contains(&"room_deleted"));
    }

    #[tokio::test]
    async fn test_delete_forbidden_once_investing() {
        let h = Harness::new();
        let room = h.invested_room(&[("alice", 6000), ("bob", 4000)]).await;
        let err = h.orchestrator.delete_room(&token("alice"), &room).await.unwrap_err();
        assert!(matches!(err, RoomError::Domain(DomainError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_public_listing_newest_first() {
        let h = Harness::new();
        let first = h.create_room("alice", 1000, 4).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = h.create_room("bob", 1000, 4).await;
        let mut private = new_room(1000, 4);
        private.visibility = Visibility::Private;
        h.orchestrator.create_room(&token("carol"), private).await.unwrap();

        let page = h.orchestrator.list_public_rooms(PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
        let ids: Vec<_> = page.items.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let page = h
            .orchestrator
            .list_public_rooms(PageRequest::new(1, 1))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_rooms_for_member() {
        let h = Harness::new();
        let a = h.create_room("alice", 1000, 4).await;
        h.create_room("bob", 1000, 4).await;
        h.join(&a.id, &["carol"]).await;

        let rooms = h.orchestrator.rooms_for_member(&token("carol")).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, a.id);
    }

    #[tokio::test]
    async fn test_room_performance() {
        let h = Harness::new();
        let settled = h.invested_room(&[("alice", 6000), ("bob", 4000)]).await;
        let lines = h.orchestrator.room(&settled).await.unwrap().allocation.unwrap().lines;
        for line in lines {
            for name in ["alice", "bob"] {
                h.vote(&settled, name, VoteSubject::Stop(line.candidate_id.clone()), VoteChoice::Stop)
                    .await;
            }
        }
        h.orchestrator.end_investment(&token("alice"), &settled).await.unwrap();

        let open = h.create_room("carol", 1000, 4).await;
        h.join(&open.id, &["alice"]).await;
        h.orchestrator
            .contribute(&token("alice"), &open.id, Decimal::from(500))
            .await
            .unwrap();
        h.create_room("dave", 1000, 4).await;

        let performance = h.orchestrator.room_performance(&token("alice")).await.unwrap();
        assert_eq!(performance.len(), 2);

        let closed = performance.iter().find(|p| p.room_id == settled).unwrap();
        assert!(closed.settled);
        assert_eq!(closed.status, RoomStatus::Closed);
        assert_eq!(closed.invested_amount, Decimal::from(6000));
        assert_eq!(closed.current_value, Decimal::from(6900));
        assert_eq!(closed.returns, Decimal::from(900));
        assert_eq!(closed.returns_percent, Decimal::from(15));

        let pending = performance.iter().find(|p| p.room_id == open.id).unwrap();
        assert!(!pending.settled);
        assert_eq!(pending.current_value, Decimal::from(500));
        assert_eq!(pending.returns, Decimal::ZERO);
        assert_eq!(pending.returns_percent, Decimal::ZERO);
    }
}
