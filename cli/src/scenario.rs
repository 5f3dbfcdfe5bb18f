//! Scripted room scenarios for `investa simulate`.
//!
//! A scenario lists the members of one room and the actions they take, in
//! order: join, contribute, vote, execute, stop, end.
//!
//! ```toml
//! [room]
//! name = "Tech Growth Circle"
//! goal_amount = "10000"
//! max_members = 4
//! investment_type = "stocks"
//!
//! [[members]]            # the first member creates the room
//! id = "alice"
//! name = "Alice"
//! balance = "20000"
//! contribution = "4000"
//!
//! [[votes]]
//! member = "alice"
//! candidate = "aapl"
//! choice = "approve"
//! ```

use anyhow::{Context, Result, bail};
use investa_domain::{AllocationCandidate, CandidateId, NewRoom, VoteChoice};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub room: NewRoom,
    pub members: Vec<ScenarioMember>,
    /// Replaces the feed catalog for the room's investment type
    #[serde(default)]
    pub candidates: Option<Vec<AllocationCandidate>>,
    #[serde(default)]
    pub votes: Vec<ScenarioVote>,
    /// Every member approves every candidate; `votes` are applied afterwards
    #[serde(default)]
    pub approve_all: bool,
    /// Candidates to execute; defaults to every approved candidate
    #[serde(default)]
    pub execute: Option<Vec<CandidateId>>,
    #[serde(default)]
    pub stops: Vec<ScenarioStop>,
    /// Every member votes to stop every allocated asset
    #[serde(default)]
    pub stop_all: bool,
    /// Settle once the stop votes are in
    #[serde(default = "default_true")]
    pub end: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioMember {
    pub id: String,
    pub name: String,
    pub balance: Decimal,
    #[serde(default)]
    pub contribution: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioVote {
    pub member: String,
    pub candidate: CandidateId,
    pub choice: VoteChoice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStop {
    pub member: String,
    pub asset: CandidateId,
}

fn default_true() -> bool {
    true
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario: Scenario =
            toml::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))?;
        scenario.check()?;
        Ok(scenario)
    }

    /// Structural checks; room rules are left to the orchestrator.
    fn check(&self) -> Result<()> {
        if self.members.is_empty() {
            bail!("scenario needs at least one member (the creator)");
        }
        let mut seen = HashSet::new();
        for member in &self.members {
            if !seen.insert(member.id.as_str()) {
                bail!("member '{}' is listed twice", member.id);
            }
        }
        let unknown = self
            .votes
            .iter()
            .map(|v| v.member.as_str())
            .chain(self.stops.iter().map(|s| s.member.as_str()))
            .find(|m| !seen.contains(m));
        if let Some(member) = unknown {
            bail!("'{}' votes but is not a scenario member", member);
        }
        Ok(())
    }

    pub fn creator(&self) -> &ScenarioMember {
        &self.members[0]
    }
}
