//! Raw TOML configuration data types
//!
//! These structs mirror the TOML config file. Values that need parsing
//! (rules, decimals) stay strings here so a bad value becomes a
//! [`ConfigIssue`] instead of a load failure.

mod logging;
mod output;
mod pricing;
mod rooms;
mod voting;

pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use pricing::FilePricingConfig;
pub use rooms::FileRoomsConfig;
pub use voting::FileVotingConfig;

use crate::pricing::FixedGrowthPricing;
use investa_application::RoomPolicy;
use investa_domain::{CandidateId, ConfigIssue};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Approval and stop rules
    pub voting: FileVotingConfig,
    /// Room limits
    pub rooms: FileRoomsConfig,
    /// Placeholder pricing adapter
    pub pricing: FilePricingConfig,
    /// Log and audit files
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.voting.parse_approval_rule().1);
        issues.extend(self.voting.parse_stop_rule().1);
        issues.extend(self.rooms.parse_max_members_cap().1);
        issues.extend(self.rooms.parse_min_contribution().1);
        issues.extend(self.pricing.parse_growth_factor().1);
        issues.extend(self.pricing.parse_overrides().1);
        issues
    }

    /// Room policy with invalid fields replaced by their defaults.
    pub fn to_policy(&self) -> RoomPolicy {
        RoomPolicy::default()
            .with_approval_rule(self.voting.parse_approval_rule().0)
            .with_stop_rule(self.voting.parse_stop_rule().0)
            .with_max_members_cap(self.rooms.parse_max_members_cap().0)
            .with_min_contribution(self.rooms.parse_min_contribution().0)
            .with_default_currency(self.rooms.default_currency.clone())
    }

    /// Pricing adapter configured from `[pricing]`.
    pub fn to_pricing(&self) -> FixedGrowthPricing {
        self.pricing
            .parse_overrides()
            .0
            .into_iter()
            .fold(
                FixedGrowthPricing::new(self.pricing.parse_growth_factor().0),
                |pricing, (asset, factor)| pricing.with_override(CandidateId::new(asset), factor),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use investa_domain::{OutputFormat, QuorumRule};
    use rust_decimal::Decimal;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[voting]
approval_rule = "unanimous"
stop_rule = "atleast:3"

[rooms]
max_members_cap = 20
min_contribution = "100"
default_currency = "USD"

[pricing]
growth_factor = "1.05"

[logging]
audit_file = "audit.jsonl"

[output]
format = "summary"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_empty());

        let policy = config.to_policy();
        assert_eq!(policy.approval_rule, QuorumRule::Unanimous);
        assert_eq!(policy.stop_rule, QuorumRule::AtLeast(3));
        assert_eq!(policy.max_members_cap, 20);
        assert_eq!(policy.min_contribution, Decimal::from(100));
        assert_eq!(policy.default_currency, "USD");
        assert_eq!(config.to_pricing().growth_factor(), Decimal::new(105, 2));
        assert_eq!(config.output.format, Some(OutputFormat::Summary));
        assert!(!config.output.color);
        assert!(config.logging.audit_file.is_some());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let toml_str = r#"
[voting]
stop_rule = "60%"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let policy = config.to_policy();
        assert_eq!(policy.stop_rule, QuorumRule::Percentage(60));
        assert_eq!(policy.approval_rule, QuorumRule::Majority);
        assert_eq!(policy.max_members_cap, 50);
        assert_eq!(policy.default_currency, "NGN");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.to_policy(), RoomPolicy::default());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let toml_str = r#"
[voting]
approval_rule = "most"

[rooms]
max_members_cap = 500

[pricing]
growth_factor = "-1"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 1);

        let policy = config.to_policy();
        assert_eq!(policy.approval_rule, QuorumRule::Majority);
        assert_eq!(policy.max_members_cap, 50);
    }
}
