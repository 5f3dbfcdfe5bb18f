//! Settlement domain: realized value, profit and its distribution.

pub mod distribution;
pub mod record;

pub use distribution::{DistributionStatus, SHARE_SCALE, split_profit};
pub use record::{AssetValuation, MemberPayout, SettlementRecord};
