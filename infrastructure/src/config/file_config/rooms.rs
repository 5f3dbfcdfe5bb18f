//! Room limits from TOML (`[rooms]` section)
//!
//! ```toml
//! [rooms]
//! max_members_cap = 50
//! min_contribution = "1"
//! default_currency = "NGN"
//! ```

use investa_application::config::room_policy::MAX_MEMBERS_LIMIT;
use investa_domain::{ConfigIssue, ConfigIssueCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoomsConfig {
    /// Largest `max_members` a room may declare (at most 50)
    pub max_members_cap: u32,
    /// Smallest accepted contribution, as a decimal string
    pub min_contribution: String,
    /// Currency for rooms created without one
    pub default_currency: String,
}

impl Default for FileRoomsConfig {
    fn default() -> Self {
        Self {
            max_members_cap: MAX_MEMBERS_LIMIT,
            min_contribution: "1".to_string(),
            default_currency: "NGN".to_string(),
        }
    }
}

impl FileRoomsConfig {
    pub fn parse_max_members_cap(&self) -> (u32, Vec<ConfigIssue>) {
        let field = "rooms.max_members_cap";
        let value = self.max_members_cap;
        if value == 0 {
            let issue = ConfigIssue::warning(
                ConfigIssueCode::NonPositive {
                    field: field.to_string(),
                    value: value.to_string(),
                },
                format!("{}: must be at least 1, using {}", field, MAX_MEMBERS_LIMIT),
            );
            return (MAX_MEMBERS_LIMIT, vec![issue]);
        }
        if value > MAX_MEMBERS_LIMIT {
            let issue = ConfigIssue::warning(
                ConfigIssueCode::AboveLimit {
                    field: field.to_string(),
                    value: value.to_string(),
                    limit: MAX_MEMBERS_LIMIT.to_string(),
                },
                format!("{}: {} exceeds the limit, using {}", field, value, MAX_MEMBERS_LIMIT),
            );
            return (MAX_MEMBERS_LIMIT, vec![issue]);
        }
        (value, Vec::new())
    }

    pub fn parse_min_contribution(&self) -> (Decimal, Vec<ConfigIssue>) {
        parse_positive_decimal("rooms.min_contribution", &self.min_contribution, Decimal::ONE)
    }
}

/// Parse a strictly positive decimal, falling back with a warning.
pub(super) fn parse_positive_decimal(
    field: &str,
    value: &str,
    fallback: Decimal,
) -> (Decimal, Vec<ConfigIssue>) {
    match Decimal::from_str(value.trim()) {
        Ok(d) if d > Decimal::ZERO => (d, Vec::new()),
        Ok(_) => {
            let issue = ConfigIssue::warning(
                ConfigIssueCode::NonPositive {
                    field: field.to_string(),
                    value: value.to_string(),
                },
                format!("{}: must be positive, using {}", field, fallback),
            );
            (fallback, vec![issue])
        }
        Err(e) => {
            let issue = ConfigIssue::warning(
                ConfigIssueCode::InvalidDecimal {
                    field: field.to_string(),
                    value: value.to_string(),
                },
                format!("{}: {}, using {}", field, e, fallback),
            );
            (fallback, vec![issue])
        }
    }
}
