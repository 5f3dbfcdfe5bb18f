//! Room domain: the pooled-funds record, its members and lifecycle.

pub mod entities;
pub mod lifecycle;

pub use entities::{
    Contribution, InvestmentType, Member, MemberStatus, NewRoom, RiskTier, Room, RoomSummary,
    Visibility,
};
pub use lifecycle::RoomStatus;
