mod rubric;
mod rules;

pub use rubric::{Criterion, MarketMix, ScoringRubric};

use serde::{Deserialize, Serialize};

/// Everything the engine needs, already extracted from the datasets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringInputs {
    pub municipality_count: usize,
    pub crop_diversity: usize,
    pub avg_productivity: f64,
    pub total_receita: f64,
    pub total_despesa: f64,
    pub market: MarketSignals,
}

/// Coverage percentages (0–100) of the three input-usage datasets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSignals {
    pub fertilizers: f64,
    pub consultoria: f64,
    pub agrotoxicos: f64,
}

/// Discrete contribution to the potential score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub raw_value: f64,
    pub normalized: f64,
    pub weight: f64,
    pub max_points: f64,
    pub score: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialComponent {
    #[serde(flatten)]
    pub component: ScoreComponent,
    pub receita: f64,
    pub despesa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketActivityComponent {
    #[serde(flatten)]
    pub component: ScoreComponent,
    pub raw_values: MarketSignals,
    pub subscores: MarketSignals,
}

/// Points per primary dimension, in the fixed dimension order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentPoints {
    pub diversity: f64,
    pub financial: f64,
    pub territorial: f64,
    pub market_activity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub base_score: f64,
    pub productivity_bonus: f64,
    pub final_score: f64,
    pub breakdown: ComponentPoints,
    pub description: String,
}

/// The calculation matrix: five components plus the capped total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub diversity: ScoreComponent,
    pub financial: FinancialComponent,
    pub territorial: ScoreComponent,
    pub market_activity: MarketActivityComponent,
    pub productivity_bonus: ScoreComponent,
    pub summary: ScoreSummary,
}

impl ScoreBreakdown {
    pub fn final_score(&self) -> f64 {
        self.summary.final_score
    }

    /// Primary dimensions with their scores, in tie-break order.
    pub fn primary_scores(&self) -> [(PrimaryDimension, f64); 4] {
        [
            (PrimaryDimension::Diversity, self.diversity.score),
            (PrimaryDimension::Financial, self.financial.component.score),
            (PrimaryDimension::Territorial, self.territorial.score),
            (
                PrimaryDimension::MarketActivity,
                self.market_activity.component.score,
            ),
        ]
    }

    /// Lowest-scoring primary dimension; the earliest one wins a tie.
    pub fn weakest_dimension(&self) -> (PrimaryDimension, f64) {
        let scores = self.primary_scores();
        let mut weakest = scores[0];
        for candidate in &scores[1..] {
            if candidate.1 < weakest.1 {
                weakest = *candidate;
            }
        }
        weakest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryDimension {
    Diversity,
    Financial,
    Territorial,
    MarketActivity,
}

impl PrimaryDimension {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Diversity => "diversidade de culturas",
            Self::Financial => "performance financeira",
            Self::Territorial => "abrangência territorial",
            Self::MarketActivity => "atividade de mercado",
        }
    }
}

/// Stateless scorer applying a rubric to extracted inputs.
#[derive(Debug, Clone, Default)]
pub struct PotentialScoringEngine {
    rubric: ScoringRubric,
}

impl PotentialScoringEngine {
    pub fn new(rubric: ScoringRubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &ScoringRubric {
        &self.rubric
    }

    pub fn score(&self, inputs: &ScoringInputs) -> ScoreBreakdown {
        rules::score_inputs(inputs, &self.rubric)
    }
}
