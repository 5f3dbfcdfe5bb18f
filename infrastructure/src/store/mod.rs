//! In-memory stores for rooms and votes.
//!
//! Both stores hold their state behind a single `tokio::sync::RwLock`, so
//! every port operation is atomic with respect to the others. Room writes
//! are additionally checked against [`Room::version`](investa_domain::Room).

mod room_store;
mod vote_store;

pub use room_store::InMemoryRoomStore;
pub use vote_store::InMemoryVoteLedger;
