//! Allocation execution: the one-shot `ready -> investing` transition.

use super::{RoomError, RoomOrchestrator};
use crate::ports::identity::AccessToken;
use chrono::Utc;
use investa_domain::{
    AllocationCandidate, AllocationSnapshot, CandidateId, DomainError, RoomId, RoomStatus,
};
use serde_json::json;
use tracing::info;

impl RoomOrchestrator {
    /// Execute the allocation of a ready room.
    ///
    /// Approval is re-derived from the live votes here; nothing the caller
    /// claims about the votes is trusted. Every candidate of the round must
    /// have a vote from every member, and each listed candidate must be
    /// approved. The snapshot is computed from the collected amount at this
    /// moment and is immutable afterwards.
    pub async fn execute_allocation(
        &self,
        token: &AccessToken,
        room_id: &RoomId,
        approved: &[CandidateId],
    ) -> Result<AllocationSnapshot, RoomError> {
        let caller = self.authenticate(token).await?;
        let _guard = self.locks.acquire(room_id).await;

        let mut room = self.load_room(room_id).await?;
        room.ensure_creator(&caller.user_id, "execute the allocation")?;
        if room.allocation.is_some() {
            return Err(DomainError::InvalidState {
                operation: "execute allocation",
                status: room.status,
            }
            .into());
        }
        room.ensure_status("execute allocation", &[RoomStatus::Ready])?;

        if approved.is_empty() {
            return Err(DomainError::NoApprovedCandidates.into());
        }
        for (i, id) in approved.iter().enumerate() {
            if approved[..i].contains(id) {
                return Err(DomainError::InvalidAllocation(format!(
                    "candidate {} listed twice",
                    id
                ))
                .into());
            }
        }

        let round = room.voting_round.clone().ok_or_else(|| {
            DomainError::InvalidSubject(format!(
                "candidate {} is not in the voting round",
                approved[0]
            ))
        })?;
        let mut selected: Vec<&AllocationCandidate> = Vec::with_capacity(approved.len());
        for id in approved {
            let candidate = round.candidate(id).ok_or_else(|| {
                DomainError::InvalidSubject(format!("candidate {} is not in the voting round", id))
            })?;
            selected.push(candidate);
        }

        // Full participation on the whole round, then approval of each pick
        let mut tallies = Vec::with_capacity(round.candidates.len());
        for id in round.candidate_ids() {
            let tally = self.tally_candidate(&room, id).await?;
            if tally.pending_count > 0 {
                return Err(DomainError::IncompleteVoting {
                    candidate: id.clone(),
                    pending: tally.pending_count,
                }
                .into());
            }
            tallies.push(tally);
        }
        for id in approved {
            let is_approved = tallies
                .iter()
                .any(|t| &t.candidate_id == id && t.approved);
            if !is_approved {
                return Err(DomainError::CandidateNotApproved(id.clone()).into());
            }
        }

        let now = Utc::now();
        let snapshot =
            AllocationSnapshot::compute(room.collected_amount, &selected, caller.user_id.clone(), now)?;

        let expected = room.version;
        room.begin_investing(snapshot.clone(), now)?;
        if let Err(e) = self.rooms.commit_room(&room, expected).await {
            return Err(self
                .resolve_conflict(e, |current| DomainError::InvalidState {
                    operation: "execute allocation",
                    status: current.status,
                })
                .await);
        }

        info!(
            room_id = %room.id,
            assets = snapshot.lines.len(),
            allocated = %snapshot.total_allocated,
            unallocated = %snapshot.unallocated,
            "Allocation executed"
        );
        self.audit(
            "allocation_executed",
            &room.id,
            json!({
                "executed_by": caller.user_id,
                "collected_amount": snapshot.collected_amount,
                "total_allocated": snapshot.total_allocated,
                "lines": snapshot.lines.iter().map(|l| json!({
                    "candidate_id": l.candidate_id,
                    "percent": l.allocation_percent,
                    "amount": l.amount,
                })).collect::<Vec<_>>(),
            }),
        );
        Ok(snapshot)
    }
}
