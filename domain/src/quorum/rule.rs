//! Quorum rules for group decisions
//!
//! A rule turns the room's member count into the minimum number of
//! supporting votes a decision needs. Allocation approval uses
//! [`QuorumRule::Majority`]; unwinding a position uses the stricter
//! `Percentage(70)` supermajority.

use serde::{Deserialize, Serialize};

/// Rule for determining the vote threshold of a decision
///
/// - `Majority`: at least half of all members, `ceil(n / 2)` (default)
/// - `Unanimous`: every member
/// - `AtLeast(n)`: a fixed number of votes
/// - `Percentage(p)`: at least `ceil(n * p / 100)` votes
///
/// # Example
///
/// ```
/// use investa_domain::quorum::QuorumRule;
///
/// let rule = QuorumRule::Majority;
/// assert!(rule.is_satisfied(2, 4));  // ceil(4/2) = 2
/// assert!(!rule.is_satisfied(1, 4));
///
/// let stop = QuorumRule::Percentage(70);
/// assert_eq!(stop.threshold(5), 4); // ceil(3.5)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuorumRule {
    /// At least half of all members
    #[default]
    Majority,

    /// All members
    Unanimous,

    /// At least n votes
    AtLeast(usize),

    /// At least this percentage of members (0-100)
    Percentage(u8),
}

impl QuorumRule {
    /// Supermajority required to stop an allocated asset.
    pub const STOP_DEFAULT: QuorumRule = QuorumRule::Percentage(70);

    /// Minimum supporting votes needed out of `total` members.
    ///
    /// Integer ceiling arithmetic only, so thresholds never drift with
    /// floating-point rounding.
    pub fn threshold(&self, total: usize) -> usize {
        match self {
            QuorumRule::Majority => total.div_ceil(2),
            QuorumRule::Unanimous => total,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => (total * usize::from(*p)).div_ceil(100),
        }
    }

    /// Check whether `votes` supporting votes out of `total` members meet the rule.
    ///
    /// An empty electorate never satisfies a rule.
    pub fn is_satisfied(&self, votes: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        votes >= self.threshold(total).max(1)
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::Majority => "majority (at least half of members)".to_string(),
            QuorumRule::Unanimous => "unanimous (every member)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} votes", n),
            QuorumRule::Percentage(p) => format!("at least {}% of members", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or("Missing number after atleast:")?
                    .parse()
                    .map_err(|_| "Invalid number for atleast")?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| "Invalid percentage")?;
                if p > 100 {
                    return Err(format!("Percentage out of range: {}", p));
                }
                Ok(QuorumRule::Percentage(p))
            }
            _ => Err(format!(
                "Unknown quorum rule: {}. Valid: majority, unanimous, atleast:N, percentage:N or N%",
                s
            )),
        }
    }
}
