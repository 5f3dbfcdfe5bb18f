//! Vote aggregation
//!
//! Tallies are pure functions of the live votes for one subject. Nothing is
//! counted incrementally: every read rescans the votes, so a changed vote or
//! a late-joining member shows up on the next poll without reconciliation.

use super::consensus::ConsensusOutcome;
use super::rule::QuorumRule;
use super::vote::{Vote, VoteChoice};
use crate::core::ids::CandidateId;
use serde::{Deserialize, Serialize};

/// Aggregate of allocation-approval votes for one candidate.
///
/// Two notions are kept apart:
/// - `meets_rule`: approvals strictly outnumber rejections AND reach the
///   quorum floor (`ceil(members / 2)` under the default rule).
/// - `approved`: `meets_rule` with every member having voted. This is the
///   decision the room acts upon; a candidate cannot pass while members are
///   still deciding.
///
/// # Example
///
/// ```
/// use investa_domain::quorum::{ApprovalTally, QuorumRule, Vote};
/// use investa_domain::{CandidateId, RoomId, UserId};
///
/// let cand = CandidateId::new("aapl");
/// let votes = vec![
///     Vote::allocation(RoomId::new("r"), cand.clone(), UserId::new("a"), true),
///     Vote::allocation(RoomId::new("r"), cand.clone(), UserId::new("b"), true),
/// ];
/// let tally = ApprovalTally::from_votes(cand, &votes, 4, QuorumRule::Majority);
/// assert!(tally.meets_rule);
/// assert_eq!(tally.pending_count, 2);
/// assert!(!tally.approved);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalTally {
    pub candidate_id: CandidateId,
    pub approve_count: usize,
    pub reject_count: usize,
    /// `max(0, members - approve - reject)`
    pub pending_count: usize,
    pub total_members: usize,
    /// Approvals needed under the configured rule
    pub threshold: usize,
    pub meets_rule: bool,
    pub approved: bool,
    pub outcome: ConsensusOutcome,
}

impl ApprovalTally {
    pub fn from_votes<'a>(
        candidate_id: CandidateId,
        votes: impl IntoIterator<Item = &'a Vote>,
        total_members: usize,
        rule: QuorumRule,
    ) -> Self {
        let (mut approve_count, mut reject_count) = (0usize, 0usize);
        for vote in votes {
            match vote.choice {
                VoteChoice::Approve => approve_count += 1,
                VoteChoice::Reject => reject_count += 1,
                VoteChoice::Stop => {}
            }
        }

        let pending_count = total_members.saturating_sub(approve_count + reject_count);
        let threshold = rule.threshold(total_members);
        let meets_rule =
            approve_count > reject_count && rule.is_satisfied(approve_count, total_members);
        let approved = meets_rule && pending_count == 0;

        let outcome = if approved {
            ConsensusOutcome::Approved
        } else if pending_count == 0 {
            ConsensusOutcome::Rejected
        } else {
            ConsensusOutcome::Pending
        };

        Self {
            candidate_id,
            approve_count,
            reject_count,
            pending_count,
            total_members,
            threshold,
            meets_rule,
            approved,
            outcome,
        }
    }

    /// Whether every member has voted on this candidate.
    pub fn is_complete(&self) -> bool {
        self.pending_count == 0
    }

    /// Visual summary, e.g. `[●●○··]` (approve, reject, pending).
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        summary.extend(std::iter::repeat_n('●', self.approve_count));
        summary.extend(std::iter::repeat_n('○', self.reject_count));
        summary.extend(std::iter::repeat_n('·', self.pending_count));
        summary.push(']');
        summary
    }
}

/// Aggregate of stop votes for one allocated asset.
///
/// # Example
///
/// ```
/// use investa_domain::quorum::{QuorumRule, StopTally};
/// use investa_domain::CandidateId;
///
/// let tally = StopTally::from_votes(
///     CandidateId::new("btc"),
///     std::iter::empty(),
///     5,
///     QuorumRule::STOP_DEFAULT,
/// );
/// assert_eq!(tally.threshold, 4);
/// assert!(!tally.stop_approved);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTally {
    pub asset_id: CandidateId,
    pub stop_votes: usize,
    pub total_members: usize,
    pub threshold: usize,
    pub stop_approved: bool,
}

impl StopTally {
    pub fn from_votes<'a>(
        asset_id: CandidateId,
        votes: impl IntoIterator<Item = &'a Vote>,
        total_members: usize,
        rule: QuorumRule,
    ) -> Self {
        let stop_votes = votes
            .into_iter()
            .filter(|v| v.choice == VoteChoice::Stop)
            .count();
        let threshold = rule.threshold(total_members);

        Self {
            asset_id,
            stop_votes,
            total_members,
            threshold,
            stop_approved: rule.is_satisfied(stop_votes, total_members),
        }
    }

    pub fn remaining(&self) -> usize {
        self.threshold.saturating_sub(self.stop_votes)
    }
}
