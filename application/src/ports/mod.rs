//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod audit_log;
pub mod identity;
pub mod pricing;
pub mod recommendation_feed;
pub mod room_repository;
pub mod vote_ledger;
pub mod wallet;
