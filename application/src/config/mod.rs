//! Application-level configuration.
//!
//! - [`RoomPolicy`]: voting rules and room limits applied by the orchestrator

pub mod room_policy;

pub use room_policy::RoomPolicy;
