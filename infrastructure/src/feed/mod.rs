//! Static recommendation feed.
//!
//! Serves a fixed candidate catalog per investment type. Rooms whose type
//! has no catalog entry fall back to the `mixed` catalog.

use async_trait::async_trait;
use investa_application::ports::recommendation_feed::{FeedError, RecommendationFeed};
use investa_domain::{
    AllocationCandidate, AssetClass, CandidateId, InvestmentType, ReturnBand, RiskTier, Room,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

pub struct StaticRecommendationFeed {
    catalog: HashMap<InvestmentType, Vec<AllocationCandidate>>,
}

impl StaticRecommendationFeed {
    /// An empty feed; every lookup fails with [`FeedError::NoCandidates`].
    pub fn empty() -> Self {
        Self {
            catalog: HashMap::new(),
        }
    }

    /// The built-in demo catalog.
    pub fn builtin() -> Self {
        Self::empty()
            .with_catalog(
                InvestmentType::Stocks,
                vec![
                    stock("aapl", "Apple Inc.", 40, RiskTier::Moderate, (8, 14)),
                    stock("msft", "Microsoft Corp.", 35, RiskTier::Moderate, (7, 12)),
                    stock("nvda", "NVIDIA Corp.", 25, RiskTier::Aggressive, (12, 30)),
                ],
            )
            .with_catalog(
                InvestmentType::Bonds,
                vec![
                    bond("fgn-2030", "FGN Bond 2030", 60, 5, 14),
                    bond("ust-10y", "US Treasury 10Y", 40, 10, 4),
                ],
            )
            .with_catalog(
                InvestmentType::Etf,
                vec![
                    etf("vti", "Vanguard Total Market", 70, Decimal::new(3, 2)),
                    etf("qqq", "Invesco QQQ", 30, Decimal::new(20, 2)),
                ],
            )
            .with_catalog(
                InvestmentType::Crypto,
                vec![
                    crypto("btc", "Bitcoin", 60, None),
                    crypto("eth", "Ether", 40, Some("ethereum")),
                ],
            )
            .with_catalog(
                InvestmentType::Mixed,
                vec![
                    stock("aapl", "Apple Inc.", 40, RiskTier::Moderate, (8, 14)),
                    bond("fgn-2030", "FGN Bond 2030", 35, 5, 14),
                    crypto("btc", "Bitcoin", 15, None),
                ],
            )
    }

    /// Replace the candidates served for `investment_type`.
    pub fn with_catalog(
        mut self,
        investment_type: InvestmentType,
        candidates: Vec<AllocationCandidate>,
    ) -> Self {
        self.catalog.insert(investment_type, candidates);
        self
    }
}

impl Default for StaticRecommendationFeed {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl RecommendationFeed for StaticRecommendationFeed {
    async fn candidates(&self, room: &Room) -> Result<Vec<AllocationCandidate>, FeedError> {
        let candidates = self
            .catalog
            .get(&room.investment_type)
            .or_else(|| self.catalog.get(&InvestmentType::Mixed))
            .filter(|c| !c.is_empty())
            .ok_or(FeedError::NoCandidates(room.investment_type))?;
        debug!(
            room_id = %room.id,
            count = candidates.len(),
            "Serving static recommendations"
        );
        Ok(candidates.clone())
    }
}

fn stock(id: &str, name: &str, percent: i64, risk: RiskTier, band: (i64, i64)) -> AllocationCandidate {
    AllocationCandidate {
        id: CandidateId::new(id),
        name: name.to_string(),
        asset: AssetClass::Stock {
            ticker: id.to_uppercase(),
            exchange: Some("NASDAQ".to_string()),
        },
        risk,
        allocation_percent: Decimal::from(percent),
        expected_return: ReturnBand {
            low: Decimal::from(band.0),
            high: Decimal::from(band.1),
        },
        fee_rate: Decimal::new(5, 1),
    }
}

fn bond(id: &str, issuer: &str, percent: i64, maturity_years: u32, coupon: i64) -> AllocationCandidate {
    AllocationCandidate {
        id: CandidateId::new(id),
        name: issuer.to_string(),
        asset: AssetClass::Bond {
            issuer: issuer.to_string(),
            maturity_years,
            coupon_rate: Decimal::from(coupon),
        },
        risk: RiskTier::Conservative,
        allocation_percent: Decimal::from(percent),
        expected_return: ReturnBand {
            low: Decimal::from(coupon),
            high: Decimal::from(coupon),
        },
        fee_rate: Decimal::new(1, 1),
    }
}

fn etf(id: &str, name: &str, percent: i64, expense_ratio: Decimal) -> AllocationCandidate {
    AllocationCandidate {
        id: CandidateId::new(id),
        name: name.to_string(),
        asset: AssetClass::Etf {
            ticker: id.to_uppercase(),
            expense_ratio,
        },
        risk: RiskTier::Moderate,
        allocation_percent: Decimal::from(percent),
        expected_return: ReturnBand {
            low: Decimal::from(6),
            high: Decimal::from(11),
        },
        fee_rate: expense_ratio,
    }
}

fn crypto(id: &str, name: &str, percent: i64, network: Option<&str>) -> AllocationCandidate {
    AllocationCandidate {
        id: CandidateId::new(id),
        name: name.to_string(),
        asset: AssetClass::Crypto {
            symbol: id.to_uppercase(),
            network: network.map(str::to_string),
        },
        risk: RiskTier::Aggressive,
        allocation_percent: Decimal::from(percent),
        expected_return: ReturnBand {
            low: Decimal::from(-40),
            high: Decimal::from(80),
        },
        fee_rate: Decimal::ONE,
    }
}
