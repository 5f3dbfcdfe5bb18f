//! Application layer for investa
//!
//! This crate contains the room orchestrator, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::RoomPolicy;
pub use ports::{
    audit_log::{AuditEvent, AuditLog, NoAuditLog},
    identity::{AccessToken, IdentityError, IdentityProvider, VerifiedIdentity},
    pricing::{PricingError, PricingSource},
    recommendation_feed::{FeedError, RecommendationFeed},
    room_repository::{RoomRepository, StoreError},
    vote_ledger::VoteLedger,
    wallet::{Wallet, WalletError},
};
pub use use_cases::room_orchestrator::{
    ContributionReceipt, DeletionReport, Page, PageRequest, Refund, RoomError, RoomOrchestrator,
    RoomPerformance, RoomPorts,
};
