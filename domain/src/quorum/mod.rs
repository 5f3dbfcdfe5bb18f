//! Group-decision domain
//!
//! Members decide collectively through votes:
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │  Allocation voting   │     │  Stop voting         │
//! │  approve / reject    │     │  stop                │
//! │  per candidate       │     │  per allocated asset │
//! │  rule: majority      │     │  rule: 70%           │
//! └──────────┬───────────┘     └──────────┬───────────┘
//!            ▼                            ▼
//!      ApprovalTally                 StopTally
//!   (pure, re-derived from the live votes on every read)
//! ```

pub mod consensus;
pub mod rule;
pub mod tally;
pub mod vote;

pub use consensus::ConsensusOutcome;
pub use rule::QuorumRule;
pub use tally::{ApprovalTally, StopTally};
pub use vote::{Vote, VoteChoice, VoteSubject};
