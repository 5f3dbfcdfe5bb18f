//! Infrastructure layer for investa
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod feed;
pub mod identity;
pub mod logging;
pub mod pricing;
pub mod store;
pub mod wallet;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileLoggingConfig, FileOutputConfig, FilePricingConfig,
    FileRoomsConfig, FileVotingConfig,
};
pub use feed::StaticRecommendationFeed;
pub use identity::StaticTokenIdentity;
pub use logging::JsonlAuditLog;
pub use pricing::FixedGrowthPricing;
pub use store::{InMemoryRoomStore, InMemoryVoteLedger};
pub use wallet::{InMemoryWallet, LedgerEntry};
