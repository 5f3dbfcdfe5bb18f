//! Voting: the allocation round, vote recording and the derived tallies.
//!
//! Tallies are never stored. Each read lists the live votes of the subject
//! and folds them with the configured rule.

use super::{RoomError, RoomOrchestrator};
use crate::ports::identity::AccessToken;
use chrono::Utc;
use investa_domain::{
    ApprovalTally, CandidateId, DomainError, Room, RoomId, RoomStatus, StopTally, UserId, Vote,
    VoteChoice, VoteSubject, VotingRound,
};
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, info};

impl RoomOrchestrator {
    /// Pin the candidates of the allocation vote.
    ///
    /// The first call asks the recommendation feed; later calls return the
    /// pinned round without consulting it again.
    pub async fn open_voting_round(
        &self,
        token: &AccessToken,
        room_id: &RoomId,
    ) -> Result<VotingRound, RoomError> {
        let caller = self.authenticate(token).await?;
        let _guard = self.locks.acquire(room_id).await;

        let mut room = self.load_room(room_id).await?;
        self.require_member(&room, &caller.user_id).await?;
        if let Some(round) = &room.voting_round {
            return Ok(round.clone());
        }
        room.ensure_status("open voting round", &[RoomStatus::Open, RoomStatus::Ready])?;

        let candidates = self.feed.candidates(&room).await?;
        let now = Utc::now();
        let round = VotingRound::open(candidates, now)?;
        let expected = room.version;
        let round = room.pin_voting_round(round, now)?.clone();
        self.rooms.commit_room(&room, expected).await?;

        info!(room_id = %room.id, candidates = round.candidates.len(), "Voting round opened");
        Ok(round)
    }

    /// Record the caller's live vote on `subject`, replacing any earlier one.
    pub async fn cast_vote(
        &self,
        token: &AccessToken,
        room_id: &RoomId,
        subject: VoteSubject,
        choice: VoteChoice,
    ) -> Result<Vote, RoomError> {
        let caller = self.authenticate(token).await?;
        if !subject.accepts(choice) {
            return Err(DomainError::InvalidSubject(format!(
                "'{}' is not a valid choice for {}",
                choice, subject
            ))
            .into());
        }

        // Membership and phase must still hold when the vote lands
        let _guard = self.locks.acquire(room_id).await;
        let room = self.load_room(room_id).await?;
        self.require_member(&room, &caller.user_id).await?;

        ensure_open_subject(&room, &subject)?;

        let vote = Vote::new(room.id.clone(), subject, caller.user_id, choice);
        let replaced = self.votes.record_vote(vote.clone()).await?;

        debug!(
            room_id = %room.id,
            member = %vote.voter,
            subject = %vote.subject,
            choice = %vote.choice,
            replaced = replaced.is_some(),
            "Vote recorded"
        );
        self.audit(
            "vote_recorded",
            &room.id,
            json!({
                "member": vote.voter,
                "subject": vote.subject,
                "choice": vote.choice,
                "replaced": replaced.map(|v| v.choice),
            }),
        );
        Ok(vote)
    }

    /// Approval tally of one candidate of the pinned round.
    pub async fn approval_tally(
        &self,
        room_id: &RoomId,
        candidate: &CandidateId,
    ) -> Result<ApprovalTally, RoomError> {
        let room = self.load_room(room_id).await?;
        let in_round = room
            .voting_round
            .as_ref()
            .is_some_and(|round| round.contains(candidate));
        if !in_round {
            return Err(DomainError::InvalidSubject(format!(
                "candidate {} is not in the voting round",
                candidate
            ))
            .into());
        }
        self.tally_candidate(&room, candidate).await
    }

    /// Approval tallies of every candidate of the pinned round, in round order.
    pub async fn approval_tallies(&self, room_id: &RoomId) -> Result<Vec<ApprovalTally>, RoomError> {
        let room = self.load_room(room_id).await?;
        let Some(round) = &room.voting_round else {
            return Ok(Vec::new());
        };
        let mut tallies = Vec::with_capacity(round.candidates.len());
        for id in round.candidate_ids() {
            tallies.push(self.tally_candidate(&room, id).await?);
        }
        Ok(tallies)
    }

    /// Stop tally of one allocated asset.
    pub async fn stop_tally(&self, room_id: &RoomId, asset: &CandidateId) -> Result<StopTally, RoomError> {
        let room = self.load_room(room_id).await?;
        let allocated = room
            .allocation
            .as_ref()
            .is_some_and(|snapshot| snapshot.contains(asset));
        if !allocated {
            return Err(DomainError::InvalidSubject(format!(
                "asset {} is not in the executed allocation",
                asset
            ))
            .into());
        }
        self.tally_stop(&room, asset).await
    }

    /// Stop tallies of every allocated asset, in snapshot order.
    pub async fn stop_tallies(&self, room_id: &RoomId) -> Result<Vec<StopTally>, RoomError> {
        let room = self.load_room(room_id).await?;
        let Some(snapshot) = &room.allocation else {
            return Ok(Vec::new());
        };
        let mut tallies = Vec::with_capacity(snapshot.lines.len());
        for id in snapshot.asset_ids() {
            tallies.push(self.tally_stop(&room, id).await?);
        }
        Ok(tallies)
    }

    pub(super) async fn tally_candidate(
        &self,
        room: &Room,
        candidate: &CandidateId,
    ) -> Result<ApprovalTally, RoomError> {
        let (votes, members) = self
            .member_votes(room, &VoteSubject::Allocation(candidate.clone()))
            .await?;
        Ok(ApprovalTally::from_votes(
            candidate.clone(),
            &votes,
            members,
            self.policy.approval_rule,
        ))
    }

    pub(super) async fn tally_stop(&self, room: &Room, asset: &CandidateId) -> Result<StopTally, RoomError> {
        let (votes, members) = self
            .member_votes(room, &VoteSubject::Stop(asset.clone()))
            .await?;
        Ok(StopTally::from_votes(
            asset.clone(),
            &votes,
            members,
            self.policy.stop_rule,
        ))
    }

    /// Live votes on `subject` cast by current members, with the member count.
    ///
    /// A vote whose voter is no longer active is ignored, so votes and the
    /// membership they are counted against always agree.
    async fn member_votes(
        &self,
        room: &Room,
        subject: &VoteSubject,
    ) -> Result<(Vec<Vote>, usize), RoomError> {
        let active: HashSet<UserId> = self
            .active_members(&room.id)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        let votes = self
            .votes
            .list_votes(&room.id, subject)
            .await?
            .into_iter()
            .filter(|v| active.contains(&v.voter))
            .collect();
        Ok((votes, active.len()))
    }
}

/// Whether `subject` is open for voting in the room's current phase.
///
/// Allocation votes target the pinned round until an allocation is executed;
/// stop votes target the executed allocation until it is settled.
fn ensure_open_subject(room: &Room, subject: &VoteSubject) -> Result<(), DomainError> {
    let open = match subject {
        VoteSubject::Allocation(id) => {
            matches!(room.status, RoomStatus::Open | RoomStatus::Ready)
                && room.allocation.is_none()
                && room
                    .voting_round
                    .as_ref()
                    .is_some_and(|round| round.contains(id))
        }
        VoteSubject::Stop(id) => {
            room.status == RoomStatus::Investing
                && room.settlement.is_none()
                && room
                    .allocation
                    .as_ref()
                    .is_some_and(|snapshot| snapshot.contains(id))
        }
    };
    if open {
        Ok(())
    } else {
        Err(DomainError::InvalidSubject(format!(
            "{} is not open for voting while room is {}",
            subject, room.status
        )))
    }
}
