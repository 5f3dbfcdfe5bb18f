//! Placeholder pricing configuration from TOML (`[pricing]` section)
//!
//! ```toml
//! [pricing]
//! growth_factor = "1.15"
//!
//! [pricing.overrides]
//! btc = "0.8"
//! ```

use investa_domain::{ConfigIssue, ConfigIssueCode, Severity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePricingConfig {
    /// Multiplier applied to every invested amount at settlement
    pub growth_factor: String,
    /// Per-asset multipliers keyed by candidate id
    pub overrides: BTreeMap<String, String>,
}

impl Default for FilePricingConfig {
    fn default() -> Self {
        Self {
            growth_factor: "1.15".to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

impl FilePricingConfig {
    fn default_factor() -> Decimal {
        Decimal::new(115, 2)
    }

    /// A factor that does not parse or is not positive is an error: the
    /// pricing adapter would produce meaningless settlements.
    fn parse_factor(field: String, value: &str) -> (Decimal, Vec<ConfigIssue>) {
        let code = match Decimal::from_str(value.trim()) {
            Ok(d) if d > Decimal::ZERO => return (d, Vec::new()),
            Ok(_) => ConfigIssueCode::NonPositive {
                field: field.clone(),
                value: value.to_string(),
            },
            Err(_) => ConfigIssueCode::InvalidDecimal {
                field: field.clone(),
                value: value.to_string(),
            },
        };
        let issue = ConfigIssue {
            severity: Severity::Error,
            code,
            message: format!("{}: '{}' is not a positive decimal", field, value),
        };
        (Self::default_factor(), vec![issue])
    }

    pub fn parse_growth_factor(&self) -> (Decimal, Vec<ConfigIssue>) {
        Self::parse_factor("pricing.growth_factor".to_string(), &self.growth_factor)
    }

    pub fn parse_overrides(&self) -> (Vec<(String, Decimal)>, Vec<ConfigIssue>) {
        let mut factors = Vec::new();
        let mut issues = Vec::new();
        for (asset, value) in &self.overrides {
            let (factor, found) = Self::parse_factor(format!("pricing.overrides.{}", asset), value);
            if found.is_empty() {
                factors.push((asset.clone(), factor));
            }
            issues.extend(found);
        }
        (factors, issues)
    }
}
