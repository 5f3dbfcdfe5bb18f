//! Voting configuration from TOML (`[voting]` section)
//!
//! ```toml
//! [voting]
//! approval_rule = "majority"   # or "unanimous", "atleast:N", "N%"
//! stop_rule = "70%"
//! ```

use investa_domain::{ConfigIssue, ConfigIssueCode, QuorumRule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVotingConfig {
    /// Rule an allocation candidate must meet
    pub approval_rule: String,
    /// Rule the stop votes on an asset must meet
    pub stop_rule: String,
}

impl Default for FileVotingConfig {
    fn default() -> Self {
        Self {
            approval_rule: "majority".to_string(),
            stop_rule: QuorumRule::STOP_DEFAULT.to_string(),
        }
    }
}

impl FileVotingConfig {
    pub fn parse_approval_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        parse_rule("voting.approval_rule", &self.approval_rule, QuorumRule::Majority)
    }

    pub fn parse_stop_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        parse_rule("voting.stop_rule", &self.stop_rule, QuorumRule::STOP_DEFAULT)
    }
}

fn parse_rule(field: &str, value: &str, fallback: QuorumRule) -> (QuorumRule, Vec<ConfigIssue>) {
    match value.parse::<QuorumRule>() {
        Ok(rule) => (rule, Vec::new()),
        Err(reason) => {
            let issue = ConfigIssue::warning(
                ConfigIssueCode::InvalidRule {
                    field: field.to_string(),
                    value: value.to_string(),
                },
                format!("{}: {}, falling back to '{}'", field, reason, fallback),
            );
            (fallback, vec![issue])
        }
    }
}
