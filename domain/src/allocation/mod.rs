//! Allocation domain: candidates, the voting round and the executed snapshot.

pub mod candidate;
pub mod snapshot;

pub use candidate::{AllocationCandidate, AssetClass, ReturnBand, VotingRound};
pub use snapshot::{AllocationLine, AllocationSnapshot};
