//! Room policy: the tunable rules of the room orchestrator.
//!
//! These are application parameters, loaded from the `[voting]` and
//! `[rooms]` config sections. The decision math itself lives in the domain.

use investa_domain::QuorumRule;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hard upper bound on room size.
pub const MAX_MEMBERS_LIMIT: u32 = 50;

/// Voting rules and room limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPolicy {
    /// Rule an allocation candidate's approvals must meet.
    pub approval_rule: QuorumRule,
    /// Rule the stop votes on an asset must meet.
    pub stop_rule: QuorumRule,
    /// Largest `max_members` a new room may declare.
    pub max_members_cap: u32,
    /// Smallest accepted contribution.
    pub min_contribution: Decimal,
    /// Currency for rooms created without one.
    pub default_currency: String,
}

impl Default for RoomPolicy {
    fn default() -> Self {
        Self {
            approval_rule: QuorumRule::Majority,
            stop_rule: QuorumRule::STOP_DEFAULT,
            max_members_cap: MAX_MEMBERS_LIMIT,
            min_contribution: Decimal::ONE,
            default_currency: "NGN".to_string(),
        }
    }
}

impl RoomPolicy {
    // ==================== Builder Methods ====================

    pub fn with_approval_rule(mut self, rule: QuorumRule) -> Self {
        self.approval_rule = rule;
        self
    }

    pub fn with_stop_rule(mut self, rule: QuorumRule) -> Self {
        self.stop_rule = rule;
        self
    }

    /// Clamped to [`MAX_MEMBERS_LIMIT`].
    pub fn with_max_members_cap(mut self, cap: u32) -> Self {
        self.max_members_cap = cap.clamp(1, MAX_MEMBERS_LIMIT);
        self
    }

    pub fn with_min_contribution(mut self, amount: Decimal) -> Self {
        self.min_contribution = amount;
        self
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }
}
