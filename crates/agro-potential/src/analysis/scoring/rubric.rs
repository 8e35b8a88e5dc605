use serde::{Deserialize, Serialize};

/// Weight, point ceiling and saturation threshold of one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub weight: f64,
    pub max_points: f64,
    pub saturation: f64,
}

impl Criterion {
    /// `raw / saturation`, clamped to `[0, 1]`.
    pub fn normalize(&self, raw: f64) -> f64 {
        if self.saturation <= 0.0 {
            return 0.0;
        }
        (raw / self.saturation).clamp(0.0, 1.0)
    }

    pub fn points(&self, normalized: f64) -> f64 {
        normalized * self.max_points
    }
}

/// Internal split of the market-activity criterion across its three signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketMix {
    pub fertilizers: f64,
    pub consultoria: f64,
    pub agrotoxicos: f64,
}

/// Full scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRubric {
    pub diversity: Criterion,
    pub financial: Criterion,
    pub territorial: Criterion,
    pub market_activity: Criterion,
    pub market_mix: MarketMix,
    pub productivity: Criterion,
    pub score_cap: f64,
}

impl ScoringRubric {
    /// 30/25/20/25 primary split with a 5 point productivity bonus.
    pub fn standard() -> Self {
        Self {
            diversity: Criterion {
                weight: 0.30,
                max_points: 30.0,
                saturation: 20.0,
            },
            financial: Criterion {
                weight: 0.25,
                max_points: 25.0,
                saturation: 1.0,
            },
            territorial: Criterion {
                weight: 0.20,
                max_points: 20.0,
                saturation: 50.0,
            },
            market_activity: Criterion {
                weight: 0.25,
                max_points: 25.0,
                saturation: 100.0,
            },
            market_mix: MarketMix {
                fertilizers: 0.4,
                consultoria: 0.3,
                agrotoxicos: 0.3,
            },
            productivity: Criterion {
                weight: 0.05,
                max_points: 5.0,
                saturation: 5000.0,
            },
            score_cap: 100.0,
        }
    }
}

impl Default for ScoringRubric {
    fn default() -> Self {
        Self::standard()
    }
}
