//! Contributions: funding a room until it reaches its goal.

use super::{ContributionReceipt, RoomError, RoomOrchestrator};
use crate::ports::identity::AccessToken;
use chrono::Utc;
use investa_domain::{Contribution, DomainError, RoomId};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};

impl RoomOrchestrator {
    /// Move `amount` from the caller's wallet into the room.
    ///
    /// The wallet is debited before the store write; if the write fails the
    /// debit is reversed. Reaching the goal flips the room to `ready` within
    /// the same write.
    pub async fn contribute(
        &self,
        token: &AccessToken,
        room_id: &RoomId,
        amount: Decimal,
    ) -> Result<ContributionReceipt, RoomError> {
        let caller = self.authenticate(token).await?;
        let _guard = self.locks.acquire(room_id).await;

        let mut room = self.load_room(room_id).await?;
        self.require_member(&room, &caller.user_id).await?;

        if amount < self.policy.min_contribution {
            return Err(DomainError::InvalidAmount(format!(
                "contribution {} is below the minimum of {}",
                amount, self.policy.min_contribution
            ))
            .into());
        }

        let now = Utc::now();
        let expected = room.version;
        let became_ready = room.apply_contribution(amount, now)?;
        let contribution = Contribution::new(room.id.clone(), caller.user_id.clone(), amount, now);

        self.wallet
            .debit(&caller.user_id, amount, &contribution.id)
            .await?;

        if let Err(e) = self
            .rooms
            .commit_contribution(&room, expected, contribution.clone())
            .await
        {
            warn!(room_id = %room.id, member = %caller.user_id, error = %e, "Contribution write failed, reversing debit");
            if let Err(reversal) = self
                .wallet
                .credit(&caller.user_id, amount, &contribution.id)
                .await
            {
                warn!(member = %caller.user_id, error = %reversal, "Debit reversal failed");
                self.audit(
                    "credit_failed",
                    &room.id,
                    json!({
                        "member": caller.user_id,
                        "amount": amount,
                        "reason": "debit_reversal",
                        "error": reversal.to_string(),
                    }),
                );
            }
            return Err(e.into());
        }

        info!(
            room_id = %room.id,
            member = %caller.user_id,
            amount = %amount,
            collected = %room.collected_amount,
            "Contribution recorded"
        );
        self.audit(
            "contribution_recorded",
            &room.id,
            json!({
                "contribution_id": contribution.id,
                "member": caller.user_id,
                "amount": amount,
                "collected_amount": room.collected_amount,
                "became_ready": became_ready,
            }),
        );
        if became_ready {
            info!(room_id = %room.id, goal = %room.goal_amount, "Goal reached, room is ready");
        }

        Ok(ContributionReceipt {
            contribution,
            collected_amount: room.collected_amount,
            status: room.status,
            became_ready,
        })
    }
}
