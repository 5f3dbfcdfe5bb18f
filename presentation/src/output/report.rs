//! Read model rendered by the formatters.

use investa_domain::{
    AllocationSnapshot, ApprovalTally, Member, RoomSummary, SettlementRecord, StopTally,
};
use serde::Serialize;

/// Everything the CLI prints about one room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomReport {
    pub summary: RoomSummary,
    pub members: Vec<Member>,
    /// One tally per pinned candidate, empty before the voting round opens
    pub approvals: Vec<ApprovalTally>,
    /// One tally per allocated asset, empty before execution
    pub stops: Vec<StopTally>,
    pub allocation: Option<AllocationSnapshot>,
    pub settlement: Option<SettlementRecord>,
}
