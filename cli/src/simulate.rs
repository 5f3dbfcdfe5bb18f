//! Runs a [`Scenario`] against in-memory adapters.

use crate::scenario::Scenario;
use anyhow::{Context, Result};
use investa_application::{AccessToken, AuditLog, RoomError, RoomOrchestrator, RoomPorts};
use investa_domain::{CandidateId, RoomId, VoteChoice, VoteSubject};
use investa_infrastructure::{
    FileConfig, InMemoryRoomStore, InMemoryVoteLedger, InMemoryWallet, StaticRecommendationFeed,
    StaticTokenIdentity,
};
use investa_presentation::RoomReport;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Simulation {
    orchestrator: RoomOrchestrator,
    scenario: Scenario,
}

impl Simulation {
    pub async fn new(scenario: Scenario, config: &FileConfig, audit: Arc<dyn AuditLog>) -> Self {
        let wallet = InMemoryWallet::new();
        for member in &scenario.members {
            wallet
                .deposit(&investa_domain::UserId::new(&member.id), member.balance)
                .await;
        }

        let identity = scenario
            .members
            .iter()
            .fold(StaticTokenIdentity::new(), |identity, m| {
                identity.with_user(&m.id, &m.name)
            });

        let mut feed = StaticRecommendationFeed::builtin();
        if let Some(candidates) = &scenario.candidates {
            feed = feed.with_catalog(scenario.room.investment_type, candidates.clone());
        }

        let orchestrator = RoomOrchestrator::new(RoomPorts {
            rooms: Arc::new(InMemoryRoomStore::new()),
            votes: Arc::new(InMemoryVoteLedger::new()),
            wallet: Arc::new(wallet),
            feed: Arc::new(feed),
            pricing: Arc::new(config.to_pricing()),
            identity: Arc::new(identity),
        })
        .with_policy(config.to_policy())
        .with_audit_log(audit);

        Self {
            orchestrator,
            scenario,
        }
    }

    /// Create the room, then play every scripted step.
    ///
    /// Returns the room id together with the first failing step, if any.
    /// The room as it stood at that point can still be reported.
    pub async fn run(&self) -> Result<(RoomId, Option<RoomError>)> {
        let creator = token(&self.scenario.creator().id);
        let room = self
            .orchestrator
            .create_room(&creator, self.scenario.room.clone())
            .await
            .context("creating the room")?;
        info!(room_id = %room.id, code = %room.code, "Scenario room created");

        let outcome = self.play(&room.id).await.err();
        if let Some(err) = &outcome {
            warn!(room_id = %room.id, error = %err, "Scenario stopped early");
        }
        Ok((room.id, outcome))
    }

    async fn play(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let scenario = &self.scenario;
        let creator = token(&scenario.creator().id);

        for member in &scenario.members[1..] {
            self.orchestrator.join_room(&token(&member.id), room_id).await?;
        }

        let round = self.orchestrator.open_voting_round(&creator, room_id).await?;

        for member in &scenario.members {
            if let Some(amount) = member.contribution {
                self.orchestrator
                    .contribute(&token(&member.id), room_id, amount)
                    .await?;
            }
        }

        if scenario.approve_all {
            for candidate in &round.candidates {
                for member in &scenario.members {
                    self.orchestrator
                        .cast_vote(
                            &token(&member.id),
                            room_id,
                            VoteSubject::Allocation(candidate.id.clone()),
                            VoteChoice::Approve,
                        )
                        .await?;
                }
            }
        }
        for vote in &scenario.votes {
            self.orchestrator
                .cast_vote(
                    &token(&vote.member),
                    room_id,
                    VoteSubject::Allocation(vote.candidate.clone()),
                    vote.choice,
                )
                .await?;
        }

        let selected: Vec<CandidateId> = match &scenario.execute {
            Some(ids) => ids.clone(),
            None => self
                .orchestrator
                .approval_tallies(room_id)
                .await?
                .into_iter()
                .filter(|t| t.approved)
                .map(|t| t.candidate_id)
                .collect(),
        };
        let snapshot = self
            .orchestrator
            .execute_allocation(&creator, room_id, &selected)
            .await?;

        if scenario.stop_all {
            for line in &snapshot.lines {
                for member in &scenario.members {
                    self.orchestrator
                        .cast_vote(
                            &token(&member.id),
                            room_id,
                            VoteSubject::Stop(line.candidate_id.clone()),
                            VoteChoice::Stop,
                        )
                        .await?;
                }
            }
        }
        for stop in &scenario.stops {
            self.orchestrator
                .cast_vote(
                    &token(&stop.member),
                    room_id,
                    VoteSubject::Stop(stop.asset.clone()),
                    VoteChoice::Stop,
                )
                .await?;
        }

        if scenario.end {
            self.orchestrator.end_investment(&creator, room_id).await?;
        }
        Ok(())
    }

    pub async fn report(&self, room_id: &RoomId) -> Result<RoomReport, RoomError> {
        let room = self.orchestrator.room(room_id).await?;
        Ok(RoomReport {
            summary: (&room).into(),
            members: self.orchestrator.list_members(room_id).await?,
            approvals: self.orchestrator.approval_tallies(room_id).await?,
            stops: self.orchestrator.stop_tallies(room_id).await?,
            allocation: room.allocation,
            settlement: room.settlement,
        })
    }
}

/// Scenario members authenticate with their own id.
fn token(member: &str) -> AccessToken {
    AccessToken::new(member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use investa_application::NoAuditLog;
    use investa_domain::{DistributionStatus, RoomStatus};
    use rust_decimal::Decimal;

    fn scenario(text: &str) -> Scenario {
        toml::from_str(text).unwrap()
    }

    const SETTLED: &str = r#"
approve_all = true
stop_all = true

[room]
name = "Circle"
goal_amount = "1000"
max_members = 2
investment_type = "stocks"

[[members]]
id = "alice"
name = "Alice"
balance = "5000"
contribution = "600"

[[members]]
id = "bob"
name = "Bob"
balance = "5000"
contribution = "400"
"#;

    #[tokio::test]
    async fn test_full_scenario_settles() {
        let sim = Simulation::new(scenario(SETTLED), &FileConfig::default(), Arc::new(NoAuditLog)).await;
        let (room_id, halted) = sim.run().await.unwrap();
        assert!(halted.is_none());

        let report = sim.report(&room_id).await.unwrap();
        assert_eq!(report.summary.status, RoomStatus::Closed);
        let record = report.settlement.unwrap();
        assert_eq!(record.distribution, DistributionStatus::Complete);
        // Builtin stocks catalog allocates 100% at a 1.15 growth factor
        assert_eq!(record.total_profit, Decimal::from(150));
        let returned: Decimal = record.payouts.iter().map(|p| p.total_return).sum();
        assert_eq!(returned, Decimal::from(1150));
    }

    #[tokio::test]
    async fn test_missing_stop_votes_halts_before_settlement() {
        let text = SETTLED.replace("stop_all = true", "stop_all = false");
        let sim = Simulation::new(scenario(&text), &FileConfig::default(), Arc::new(NoAuditLog)).await;
        let (room_id, halted) = sim.run().await.unwrap();

        let err = halted.unwrap();
        assert!(matches!(
            err.as_domain(),
            Some(investa_domain::DomainError::StopNotApproved { .. })
        ));
        let report = sim.report(&room_id).await.unwrap();
        assert_eq!(report.summary.status, RoomStatus::Investing);
        assert!(report.settlement.is_none());
        assert_eq!(report.stops.len(), 3);
    }

    #[tokio::test]
    async fn test_demo_scenario_returns_rejected_share() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/tech-growth.toml");
        let demo = Scenario::load(&path).unwrap();
        let sim = Simulation::new(demo, &FileConfig::default(), Arc::new(NoAuditLog)).await;
        let (room_id, halted) = sim.run().await.unwrap();
        assert!(halted.is_none());

        let report = sim.report(&room_id).await.unwrap();
        let allocation = report.allocation.unwrap();
        assert_eq!(allocation.lines.len(), 2);
        let record = report.settlement.unwrap();
        assert_eq!(record.total_invested, Decimal::from(7500));
        assert_eq!(record.uninvested_amount, Decimal::from(2500));
        assert_eq!(record.total_profit, Decimal::from(1125));
    }
}
