//! Territory analytics over a dataset snapshot.
//!
//! [`aggregate`] and [`detail`] are pure reductions of one dataset over a set of
//! municipality codes; [`descriptive`] answers per-crop and per-category
//! lookups over a whole dataset. [`scoring`] turns those reductions into the bounded
//! potential score and its calculation matrix, and [`recommendations`] reads the
//! matrix back as findings. [`PotentialAnalyzer`] and [`commercial_analysis`]
//! run every sub-analysis in isolation: a failing source is scored as zero and
//! reported through [`AnalysisWarning`] instead of failing the request.

pub mod aggregate;
pub mod commercial;
pub mod descriptive;
pub mod detail;
pub mod potential;
pub mod recommendations;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use aggregate::{
    aggregate, coverage, dataset_total, usage_signal, CategoryTotal, UsageSignal,
    EXCLUDED_TOTAL_CATEGORIES,
};
pub use commercial::{
    commercial_analysis, municipality_labels, CategoryRanking, CommercialAnalysis, CropsData,
    MunicipalityLabel,
};
pub use descriptive::{
    category_municipalities, compare_crops, crop_by_state, crop_chart, crop_municipalities,
    is_municipality_entry, statistical_summary, CropChart, CropComparison, CropComparisonRow,
    CropMunicipalities, LookupError, MunicipalityValue, StateMunicipality, StateRollup,
    StatisticalSummary,
};
pub use detail::{
    crop_areas, extract_crop_summary, extract_financial_summary, CropArea, CropSummary, CropTotal,
    FinancialSummary, MunicipalityFinance, FINANCIAL_TOTAL_CATEGORY,
};
pub use potential::{compute_potential_score, DataBySource, PotentialAnalysis, PotentialAnalyzer};
pub use recommendations::generate_recommendations;
pub use scoring::{
    Criterion, MarketMix, MarketSignals, PotentialScoringEngine, PrimaryDimension, ScoreBreakdown,
    ScoreComponent, ScoringInputs, ScoringRubric,
};

use serde::{Deserialize, Serialize};

use crate::datasets::{DatasetError, DatasetKind};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("non-finite aggregate {value} in dataset {dataset}")]
    NonFinite { dataset: DatasetKind, value: f64 },
}

/// A sub-analysis that could not run and was scored as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWarning {
    pub source: String,
    pub message: String,
}
