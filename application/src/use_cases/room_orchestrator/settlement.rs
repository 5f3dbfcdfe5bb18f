//! Settlement: ending an investment and distributing the returns.
//!
//! ```text
//! end_investment
//!   ├─ every asset stop-approved?        (StopNotApproved otherwise)
//!   ├─ price each asset                  (PricingSource)
//!   ├─ compute + commit SettlementRecord (distribution = pending)
//!   └─ credit every member concurrently
//!        ├─ all ok      -> distribution complete, room closed
//!        └─ some failed -> distribution incomplete, room stays investing
//!                          (retry_failed_credits picks up from here)
//! ```
//!
//! Each payout is credited under its own `settlement:{room}:{member}`
//! reference. Wallet credits are idempotent per reference, so a retry after
//! a lost write never pays a member twice.

use super::{RoomError, RoomOrchestrator};
use crate::ports::identity::AccessToken;
use chrono::Utc;
use futures::future::{join_all, try_join_all};
use investa_domain::{
    AssetValuation, DomainError, Room, RoomId, RoomStatus, SettlementRecord, UserId,
};
use serde_json::json;
use tracing::{info, warn};

impl RoomOrchestrator {
    /// Settle an investing room whose assets are all stop-approved.
    ///
    /// Runs at most once per room: any later call fails with
    /// `AlreadySettled` and leaves the record untouched.
    pub async fn end_investment(
        &self,
        token: &AccessToken,
        room_id: &RoomId,
    ) -> Result<SettlementRecord, RoomError> {
        let caller = self.authenticate(token).await?;
        let _guard = self.locks.acquire(room_id).await;

        let mut room = self.load_room(room_id).await?;
        room.ensure_creator(&caller.user_id, "end the investment")?;
        if room.settlement.is_some() {
            return Err(DomainError::AlreadySettled(room.id.clone()).into());
        }
        room.ensure_status("end investment", &[RoomStatus::Investing])?;
        let snapshot = room.allocation.clone().ok_or(DomainError::InvalidState {
            operation: "end investment",
            status: room.status,
        })?;

        for id in snapshot.asset_ids() {
            let tally = self.tally_stop(&room, id).await?;
            if !tally.stop_approved {
                return Err(DomainError::StopNotApproved {
                    asset: id.clone(),
                    votes: tally.stop_votes,
                    threshold: tally.threshold,
                }
                .into());
            }
        }

        let executed_at = snapshot.executed_at;
        let valuations = try_join_all(snapshot.lines.iter().map(|line| async move {
            let realized_value = self.pricing.realized_value(line, executed_at).await?;
            Ok::<_, RoomError>(AssetValuation {
                candidate_id: line.candidate_id.clone(),
                invested: line.amount,
                realized_value,
            })
        }))
        .await?;

        let contributions: Vec<(UserId, _)> = self
            .active_members(room_id)
            .await?
            .into_iter()
            .map(|m| (m.user_id, m.contribution))
            .collect();

        let now = Utc::now();
        let record = SettlementRecord::compute(
            &snapshot,
            valuations,
            &contributions,
            caller.user_id.clone(),
            now,
        )?;

        let expected = room.version;
        room.record_settlement(record.clone(), now)?;
        if let Err(e) = self.rooms.commit_room(&room, expected).await {
            return Err(self
                .resolve_conflict(e, |current| DomainError::AlreadySettled(current.id.clone()))
                .await);
        }

        info!(
            room_id = %room.id,
            invested = %record.total_invested,
            realized = %record.total_realized_value,
            profit = %record.total_profit,
            "Settlement written"
        );
        self.audit(
            "settlement_written",
            &room.id,
            json!({
                "settled_by": caller.user_id,
                "total_invested": record.total_invested,
                "uninvested_amount": record.uninvested_amount,
                "total_realized_value": record.total_realized_value,
                "total_profit": record.total_profit,
                "payouts": record.payouts,
            }),
        );

        self.finish_distribution(&mut room).await
    }

    /// Re-attempt the credits of an incomplete distribution.
    ///
    /// Payout figures are never recomputed. A complete distribution is
    /// returned as is.
    pub async fn retry_failed_credits(
        &self,
        token: &AccessToken,
        room_id: &RoomId,
    ) -> Result<SettlementRecord, RoomError> {
        let caller = self.authenticate(token).await?;
        let _guard = self.locks.acquire(room_id).await;

        let mut room = self.load_room(room_id).await?;
        room.ensure_creator(&caller.user_id, "retry settlement credits")?;
        let Some(record) = &room.settlement else {
            return Err(DomainError::InvalidState {
                operation: "retry settlement credits",
                status: room.status,
            }
            .into());
        };
        if record.distribution.is_complete() {
            return Ok(record.clone());
        }

        info!(room_id = %room.id, pending = record.pending_credits().count(), "Retrying settlement credits");
        self.finish_distribution(&mut room).await
    }

    /// Distribute, then drop the room's lock entry once it is closed.
    async fn finish_distribution(&self, room: &mut Room) -> Result<SettlementRecord, RoomError> {
        let record = self.distribute(room).await?;
        if room.status == RoomStatus::Closed {
            self.locks.forget(&room.id);
        }
        Ok(record)
    }

    /// Credit every outstanding payout once and persist the outcome.
    async fn distribute(&self, room: &mut Room) -> Result<SettlementRecord, RoomError> {
        let pending: Vec<(UserId, _)> = room
            .settlement
            .as_ref()
            .map(|r| {
                r.pending_credits()
                    .map(|p| (p.user_id.clone(), p.total_return))
                    .collect()
            })
            .unwrap_or_default();

        let references: Vec<String> = pending
            .iter()
            .map(|(user, _)| settlement_reference(&room.id, user))
            .collect();
        let results = join_all(
            pending
                .iter()
                .zip(&references)
                .map(|((user, amount), reference)| self.wallet.credit(user, *amount, reference)),
        )
        .await;

        let mut succeeded = Vec::with_capacity(pending.len());
        for ((user, amount), result) in pending.iter().zip(results) {
            match result {
                Ok(()) => succeeded.push(user.clone()),
                Err(e) => {
                    warn!(room_id = %room.id, member = %user, error = %e, "Settlement credit failed");
                    self.audit(
                        "credit_failed",
                        &room.id,
                        json!({
                            "member": user,
                            "amount": amount,
                            "reason": "settlement",
                            "error": e.to_string(),
                        }),
                    );
                }
            }
        }

        let expected = room.version;
        let complete = room.apply_credit_results(&succeeded, Utc::now())?;
        self.rooms.commit_room(room, expected).await?;

        if complete {
            info!(room_id = %room.id, credited = succeeded.len(), "Distribution complete, room closed");
        } else {
            warn!(
                room_id = %room.id,
                failed = pending.len() - succeeded.len(),
                "Distribution incomplete, room stays investing"
            );
        }

        room.settlement.clone().ok_or_else(|| {
            DomainError::InvalidState {
                operation: "distribute settlement",
                status: room.status,
            }
            .into()
        })
    }
}

/// Wallet reference of one member's settlement payout.
fn settlement_reference(room: &RoomId, user: &UserId) -> String {
    format!("settlement:{}:{}", room, user)
}
