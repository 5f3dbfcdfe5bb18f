//! In-memory mock ports and a harness for orchestrator tests.

use super::RoomOrchestrator;
use super::RoomPorts;
use crate::ports::audit_log::{AuditEvent, AuditLog};
use crate::ports::identity::{AccessToken, IdentityError, IdentityProvider, VerifiedIdentity};
use crate::ports::pricing::{PricingError, PricingSource};
use crate::ports::recommendation_feed::{FeedError, RecommendationFeed};
use crate::ports::room_repository::{RoomRepository, StoreError};
use crate::ports::vote_ledger::VoteLedger;
use crate::ports::wallet::{Wallet, WalletError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use investa_domain::{
    AllocationCandidate, AllocationLine, AssetClass, CandidateId, Contribution, InvestmentType,
    Member, NewRoom, ReturnBand, RiskTier, Room, RoomCode, RoomId, UserId, Visibility, Vote,
    VoteChoice, VoteSubject, VotingRound,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) const STARTING_BALANCE: i64 = 50_000;

pub(crate) fn token(name: &str) -> AccessToken {
    AccessToken::new(name)
}

pub(crate) fn user(name: &str) -> UserId {
    UserId::new(name)
}

pub(crate) fn new_room(goal: i64, max_members: u32) -> NewRoom {
    NewRoom {
        name: "Tech Growth".to_string(),
        description: String::new(),
        goal_amount: Decimal::from(goal),
        currency: None,
        max_members,
        risk_tier: RiskTier::Moderate,
        investment_type: InvestmentType::Stocks,
        visibility: Visibility::Public,
    }
}

pub(crate) fn candidate(id: &str, percent: i64) -> AllocationCandidate {
    AllocationCandidate {
        id: CandidateId::new(id),
        name: id.to_uppercase(),
        asset: AssetClass::Stock {
            ticker: id.to_uppercase(),
            exchange: None,
        },
        risk: RiskTier::Moderate,
        allocation_percent: Decimal::from(percent),
        expected_return: ReturnBand::default(),
        fee_rate: Decimal::ZERO,
    }
}

// ==================== Mock ports ====================

#[derive(Default)]
struct RoomState {
    rooms: HashMap<RoomId, Room>,
    members: HashMap<(RoomId, UserId), Member>,
    contributions: Vec<Contribution>,
}

#[derive(Default)]
pub(crate) struct MockRooms {
    state: Mutex<RoomState>,
    fail_next: AtomicBool,
}

impl MockRooms {
    pub(crate) fn fail_next_commit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check(&self, state: &RoomState, room: &Room, expected: u64) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        let current = state
            .rooms
            .get(&room.id)
            .ok_or_else(|| StoreError::NotFound(room.id.clone()))?;
        if current.version != expected {
            return Err(StoreError::VersionConflict {
                room: room.id.clone(),
                expected,
                found: current.version,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RoomRepository for MockRooms {
    async fn insert_room(&self, room: Room, creator: Member) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.rooms.values().any(|r| r.code == room.code) {
            return Err(StoreError::Duplicate(room.code.to_string()));
        }
        state
            .members
            .insert((room.id.clone(), creator.user_id.clone()), creator);
        state.rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn get_room(&self, id: &RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.state.lock().unwrap().rooms.get(id).cloned())
    }

    async fn find_by_code(&self, code: &RoomCode) -> Result<Option<Room>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.rooms.values().find(|r| &r.code == code).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        Ok(self.state.lock().unwrap().rooms.values().cloned().collect())
    }

    async fn rooms_for_member(&self, user: &UserId) -> Result<Vec<Room>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .members
            .values()
            .filter(|m| &m.user_id == user && m.is_active())
            .filter_map(|m| state.rooms.get(&m.room_id).cloned())
            .collect())
    }

    async fn member(&self, room: &RoomId, user: &UserId) -> Result<Option<Member>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.members.get(&(room.clone(), user.clone())).cloned())
    }

    async fn members(&self, room: &RoomId) -> Result<Vec<Member>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .members
            .values()
            .filter(|m| &m.room_id == room)
            .cloned()
            .collect())
    }

    async fn contributions(&self, room: &RoomId) -> Result<Vec<Contribution>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contributions
            .iter()
            .filter(|c| &c.room_id == room)
            .cloned()
            .collect())
    }

    async fn commit_room(&self, room: &Room, expected_version: u64) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        self.check(&state, room, expected_version)?;
        state.rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn commit_membership(
        &self,
        room: &Room,
        expected_version: u64,
        member: Member,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        self.check(&state, room, expected_version)?;
        state.rooms.insert(room.id.clone(), room.clone());
        state
            .members
            .insert((member.room_id.clone(), member.user_id.clone()), member);
        Ok(())
    }

    async fn commit_contribution(
        &self,
        room: &Room,
        expected_version: u64,
        contribution: Contribution,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        self.check(&state, room, expected_version)?;
        let key = (contribution.room_id.clone(), contribution.user_id.clone());
        let member = state
            .members
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(room.id.clone()))?;
        member.contribution += contribution.amount;
        state.rooms.insert(room.id.clone(), room.clone());
        state.contributions.push(contribution);
        Ok(())
    }

    async fn delete_room(&self, id: &RoomId, expected_version: u64) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let room = state
            .rooms
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        self.check(&state, &room, expected_version)?;
        state.rooms.remove(id);
        state.members.retain(|(room, _), _| room != id);
        state.contributions.retain(|c| &c.room_id != id);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockVotes {
    votes: Mutex<HashMap<(RoomId, VoteSubject, UserId), Vote>>,
}

#[async_trait]
impl VoteLedger for MockVotes {
    async fn record_vote(&self, vote: Vote) -> Result<Option<Vote>, StoreError> {
        let key = (vote.room_id.clone(), vote.subject.clone(), vote.voter.clone());
        Ok(self.votes.lock().unwrap().insert(key, vote))
    }

    async fn list_votes(
        &self,
        room: &RoomId,
        subject: &VoteSubject,
    ) -> Result<Vec<Vote>, StoreError> {
        let votes = self.votes.lock().unwrap();
        Ok(votes
            .values()
            .filter(|v| &v.room_id == room && &v.subject == subject)
            .cloned()
            .collect())
    }

    async fn retract_votes(&self, room: &RoomId, voter: &UserId) -> Result<usize, StoreError> {
        let mut votes = self.votes.lock().unwrap();
        let before = votes.len();
        votes.retain(|(r, _, v), _| !(r == room && v == voter));
        Ok(before - votes.len())
    }

    async fn clear_room(&self, room: &RoomId) -> Result<(), StoreError> {
        self.votes.lock().unwrap().retain(|(r, _, _), _| r != room);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockWallet {
    balances: Mutex<HashMap<UserId, Decimal>>,
    failing: Mutex<HashSet<UserId>>,
    applied: Mutex<HashSet<(UserId, String)>>,
    fail_store_on_credit: Mutex<Option<Arc<MockRooms>>>,
}

impl MockWallet {
    pub(crate) fn balance(&self, name: &str) -> Decimal {
        self.balances
            .lock()
            .unwrap()
            .get(&user(name))
            .copied()
            .unwrap_or(Decimal::from(STARTING_BALANCE))
    }

    pub(crate) fn fail_credits_for(&self, name: &str) {
        self.failing.lock().unwrap().insert(user(name));
    }

    pub(crate) fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Make the next room write fail once the first credit has gone through.
    pub(crate) fn fail_store_after_credit(&self, rooms: Arc<MockRooms>) {
        *self.fail_store_on_credit.lock().unwrap() = Some(rooms);
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn debit(&self, who: &UserId, amount: Decimal, _reference: &str) -> Result<(), WalletError> {
        let mut balances = self.balances.lock().unwrap();
        let balance = balances
            .entry(who.clone())
            .or_insert(Decimal::from(STARTING_BALANCE));
        if *balance < amount {
            return Err(WalletError::InsufficientFunds {
                user: who.clone(),
                requested: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(())
    }

    async fn credit(&self, who: &UserId, amount: Decimal, reference: &str) -> Result<(), WalletError> {
        if self.failing.lock().unwrap().contains(who) {
            return Err(WalletError::Unavailable("injected failure".into()));
        }
        if !self
            .applied
            .lock()
            .unwrap()
            .insert((who.clone(), reference.to_string()))
        {
            return Ok(());
        }
        *self
            .balances
            .lock()
            .unwrap()
            .entry(who.clone())
            .or_insert(Decimal::from(STARTING_BALANCE)) += amount;
        if let Some(rooms) = self.fail_store_on_credit.lock().unwrap().take() {
            rooms.fail_next_commit();
        }
        Ok(())
    }
}

pub(crate) struct MockFeed {
    candidates: Mutex<Vec<AllocationCandidate>>,
    calls: AtomicUsize,
}

impl Default for MockFeed {
    fn default() -> Self {
        Self {
            candidates: Mutex::new(vec![candidate("aapl", 60), candidate("bnd", 40)]),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MockFeed {
    pub(crate) fn replace_with(&self, candidates: Vec<AllocationCandidate>) {
        *self.candidates.lock().unwrap() = candidates;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecommendationFeed for MockFeed {
    async fn candidates(&self, _room: &Room) -> Result<Vec<AllocationCandidate>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.lock().unwrap().clone())
    }
}

/// Values every asset at invested * 1.15.
#[derive(Default)]
pub(crate) struct MockPricing {
    unavailable: AtomicBool,
}

impl MockPricing {
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl PricingSource for MockPricing {
    async fn realized_value(
        &self,
        line: &AllocationLine,
        _invested_at: DateTime<Utc>,
    ) -> Result<Decimal, PricingError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PricingError::Unavailable("injected failure".into()));
        }
        Ok(line.amount * Decimal::new(115, 2))
    }
}

/// Accepts any token except "nobody"; the token is the user id.
pub(crate) struct MockIdentity;

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn verify(&self, token: &AccessToken) -> Result<VerifiedIdentity, IdentityError> {
        let name = token.as_str();
        if name == "nobody" {
            return Err(IdentityError::InvalidToken);
        }
        let mut display_name = name.to_string();
        if let Some(first) = display_name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Ok(VerifiedIdentity {
            user_id: UserId::new(name),
            display_name,
            email: Some(format!("{}@example.com", name)),
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingAudit {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingAudit {
    pub(crate) fn types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditLog for RecordingAudit {
    fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}

// ==================== Harness ====================

pub(crate) struct Harness {
    pub orchestrator: Arc<RoomOrchestrator>,
    pub rooms: Arc<MockRooms>,
    pub votes: Arc<MockVotes>,
    pub wallet: Arc<MockWallet>,
    pub feed: Arc<MockFeed>,
    pub pricing: Arc<MockPricing>,
    pub audit: Arc<RecordingAudit>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let rooms = Arc::new(MockRooms::default());
        let votes = Arc::new(MockVotes::default());
        let wallet = Arc::new(MockWallet::default());
        let feed = Arc::new(MockFeed::default());
        let pricing = Arc::new(MockPricing::default());
        let audit = Arc::new(RecordingAudit::default());

        let orchestrator = RoomOrchestrator::new(RoomPorts {
            rooms: rooms.clone(),
            votes: votes.clone(),
            wallet: wallet.clone(),
            feed: feed.clone(),
            pricing: pricing.clone(),
            identity: Arc::new(MockIdentity),
        })
        .with_audit_log(audit.clone());

        Self {
            orchestrator: Arc::new(orchestrator),
            rooms,
            votes,
            wallet,
            feed,
            pricing,
            audit,
        }
    }

    pub(crate) async fn create_room(&self, creator: &str, goal: i64, max_members: u32) -> Room {
        self.orchestrator
            .create_room(&token(creator), new_room(goal, max_members))
            .await
            .unwrap()
    }

    pub(crate) async fn join(&self, room: &RoomId, names: &[&str]) {
        for name in names {
            self.orchestrator.join_room(&token(name), room).await.unwrap();
        }
    }

    pub(crate) async fn open_round(&self, room: &RoomId) -> VotingRound {
        let creator = self.orchestrator.room(room).await.unwrap().creator;
        self.orchestrator
            .open_voting_round(&token(creator.as_str()), room)
            .await
            .unwrap()
    }

    pub(crate) async fn vote(&self, room: &RoomId, name: &str, subject: VoteSubject, choice: VoteChoice) {
        self.orchestrator
            .cast_vote(&token(name), room, subject, choice)
            .await
            .unwrap();
    }

    /// A room in `investing`: the first entry creates it, everybody
    /// contributes their amount (the goal is the sum), all members approve
    /// both default candidates and the creator executes them.
    pub(crate) async fn invested_room(&self, contributions: &[(&str, i64)]) -> RoomId {
        let goal: i64 = contributions.iter().map(|(_, a)| a).sum();
        let names: Vec<&str> = contributions.iter().map(|(n, _)| *n).collect();
        let room = self
            .create_room(names[0], goal, contributions.len().max(2) as u32)
            .await;
        self.join(&room.id, &names[1..]).await;
        let round = self.open_round(&room.id).await;

        for (name, amount) in contributions {
            self.orchestrator
                .contribute(&token(name), &room.id, Decimal::from(*amount))
                .await
                .unwrap();
        }
        for cand in &round.candidates {
            for name in &names {
                self.vote(&room.id, name, VoteSubject::Allocation(cand.id.clone()), VoteChoice::Approve)
                    .await;
            }
        }
        let ids: Vec<CandidateId> = round.candidates.iter().map(|c| c.id.clone()).collect();
        self.orchestrator
            .execute_allocation(&token(names[0]), &room.id, &ids)
            .await
            .unwrap();
        room.id
    }

    /// Member totals, contribution records and the room's collected amount agree.
    pub(crate) async fn assert_reconciled(&self, room: &RoomId) {
        let collected = self.orchestrator.room(room).await.unwrap().collected_amount;
        let members: Decimal = self
            .rooms
            .members(room)
            .await
            .unwrap()
            .iter()
            .map(|m| m.contribution)
            .sum();
        let records: Decimal = self
            .rooms
            .contributions(room)
            .await
            .unwrap()
            .iter()
            .map(|c| c.amount)
            .sum();
        assert_eq!(members, collected);
        assert_eq!(records, collected);
    }
}
