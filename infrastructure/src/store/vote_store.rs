//! [`VoteLedger`] backed by in-process maps.

use async_trait::async_trait;
use investa_application::ports::room_repository::StoreError;
use investa_application::ports::vote_ledger::VoteLedger;
use investa_domain::{RoomId, UserId, Vote, VoteSubject};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Live votes per room, keyed by (subject, voter).
///
/// The key makes "one live vote per member per subject" structural: a new
/// vote overwrites the previous one in a single write.
#[derive(Default)]
pub struct InMemoryVoteLedger {
    rooms: RwLock<HashMap<RoomId, BTreeMap<(VoteSubject, UserId), Vote>>>,
}

impl InMemoryVoteLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoteLedger for InMemoryVoteLedger {
    async fn record_vote(&self, vote: Vote) -> Result<Option<Vote>, StoreError> {
        let mut rooms = self.rooms.write().await;
        let key = (vote.subject.clone(), vote.voter.clone());
        Ok(rooms
            .entry(vote.room_id.clone())
            .or_default()
            .insert(key, vote))
    }

    async fn list_votes(
        &self,
        room: &RoomId,
        subject: &VoteSubject,
    ) -> Result<Vec<Vote>, StoreError> {
        let rooms = self.rooms.read().await;
        Ok(rooms
            .get(room)
            .map(|votes| {
                votes
                    .iter()
                    .filter(|((s, _), _)| s == subject)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn retract_votes(&self, room: &RoomId, voter: &UserId) -> Result<usize, StoreError> {
        let mut rooms = self.rooms.write().await;
        let Some(votes) = rooms.get_mut(room) else {
            return Ok(0);
        };
        let before = votes.len();
        votes.retain(|(_, v), _| v != voter);
        Ok(before - votes.len())
    }

    async fn clear_room(&self, room: &RoomId) -> Result<(), StoreError> {
        self.rooms.write().await.remove(room);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use investa_domain::{CandidateId, VoteChoice};

    fn room() -> RoomId {
        RoomId::new("room-1")
    }

    #[tokio::test]
    async fn test_revote_replaces_previous() {
        let ledger = InMemoryVoteLedger::new();
        let aapl = CandidateId::new("aapl");

        let first = ledger
            .record_vote(Vote::allocation(room(), aapl.clone(), UserId::new("alice"), true))
            .await
            .unwrap();
        assert!(first.is_none());

        let previous = ledger
            .record_vote(Vote::allocation(room(), aapl.clone(), UserId::new("alice"), false))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(previous.choice, VoteChoice::Approve);

        let votes = ledger
            .list_votes(&room(), &VoteSubject::Allocation(aapl))
            .await
            .unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].choice, VoteChoice::Reject);
    }

    #[tokio::test]
    async fn test_subjects_are_independent() {
        let ledger = InMemoryVoteLedger::new();
        let aapl = CandidateId::new("aapl");
        ledger
            .record_vote(Vote::allocation(room(), aapl.clone(), UserId::new("alice"), true))
            .await
            .unwrap();
        ledger
            .record_vote(Vote::stop(room(), aapl.clone(), UserId::new("alice")))
            .await
            .unwrap();

        let approvals = ledger
            .list_votes(&room(), &VoteSubject::Allocation(aapl.clone()))
            .await
            .unwrap();
        let stops = ledger
            .list_votes(&room(), &VoteSubject::Stop(aapl))
            .await
            .unwrap();
        assert_eq!(approvals.len(), 1);
        assert_eq!(stops.len(), 1);
    }

    #[tokio::test]
    async fn test_retract_only_touches_voter() {
        let ledger = InMemoryVoteLedger::new();
        let aapl = CandidateId::new("aapl");
        for name in ["alice", "bob"] {
            ledger
                .record_vote(Vote::allocation(room(), aapl.clone(), UserId::new(name), true))
                .await
                .unwrap();
        }

        let removed = ledger
            .retract_votes(&room(), &UserId::new("bob"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        let left = ledger
            .list_votes(&room(), &VoteSubject::Allocation(aapl))
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].voter, UserId::new("alice"));
    }

    #[tokio::test]
    async fn test_concurrent_votes_all_recorded() {
        let ledger = std::sync::Arc::new(InMemoryVoteLedger::new());
        let aapl = CandidateId::new("aapl");
        let handles: Vec<_> = (0..20)
            .map(|i| {
                let ledger = ledger.clone();
                let aapl = aapl.clone();
                tokio::spawn(async move {
                    ledger
                        .record_vote(Vote::allocation(
                            room(),
                            aapl,
                            UserId::new(format!("member-{}", i)),
                            i % 2 == 0,
                        ))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let votes = ledger
            .list_votes(&room(), &VoteSubject::Allocation(aapl))
            .await
            .unwrap();
        assert_eq!(votes.len(), 20);
    }
}
