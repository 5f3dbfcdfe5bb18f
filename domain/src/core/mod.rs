//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: room, user, candidate identifiers and join codes
//! - [`error::DomainError`]: business-rule violations

pub mod error;
pub mod ids;
