use serde::Serialize;
use tracing::{debug, warn};

use crate::datasets::{DatasetCatalog, DatasetKind, MunicipalitySet};

use super::aggregate::{dataset_total, usage_signal, UsageSignal, EXCLUDED_TOTAL_CATEGORIES};
use super::detail::{checked_crop_summary, checked_financial_summary, CropSummary, CropTotal};
use super::recommendations::generate_recommendations;
use super::scoring::{MarketSignals, PotentialScoringEngine, ScoreBreakdown, ScoringInputs};
use super::{AnalysisError, AnalysisWarning};

/// Rough value per harvested hectare used for the headline `totalValue`.
const VALUE_PER_HECTARE: f64 = 1000.0;

/// Raw total per source, keyed the way the web client reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataBySource {
    pub crops: f64,
    pub fertilizers: f64,
    pub agrotoxicos: f64,
    pub consultoria: f64,
    pub corretivos: f64,
    pub despesas: f64,
    pub escolaridade: f64,
    pub receitas: f64,
}

/// Response body of a potential analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialAnalysis {
    pub potential_score: f64,
    pub total_value: f64,
    pub crops_diversity: usize,
    pub avg_productivity: f64,
    pub fertilizers_usage: f64,
    pub agrotoxicos_usage: f64,
    pub technical_assistance: f64,
    pub recommendations: Vec<String>,
    pub data_by_source: DataBySource,
    pub top_crops: Vec<CropTotal>,
    pub calculation_matrix: ScoreBreakdown,
    pub degraded: bool,
    pub warnings: Vec<AnalysisWarning>,
}

/// Everything read from the datasets for one territory before scoring.
#[derive(Debug, Default)]
struct TerritorySignals {
    crops: CropSummary,
    fertilizers: UsageSignal,
    agrotoxicos: UsageSignal,
    consultoria: UsageSignal,
    corretivos: f64,
    escolaridade: f64,
    receita: f64,
    despesa: f64,
}

impl TerritorySignals {
    fn scoring_inputs(&self, municipality_count: usize) -> ScoringInputs {
        ScoringInputs {
            municipality_count,
            crop_diversity: self.crops.diversity,
            avg_productivity: self.crops.avg_productivity,
            total_receita: self.receita,
            total_despesa: self.despesa,
            market: MarketSignals {
                fertilizers: self.fertilizers.usage_percentage,
                consultoria: self.consultoria.usage_percentage,
                agrotoxicos: self.agrotoxicos.usage_percentage,
            },
        }
    }
}

/// Reads a dataset snapshot for a set of municipalities and produces the full
/// potential analysis.
#[derive(Debug, Clone, Default)]
pub struct PotentialAnalyzer {
    engine: PotentialScoringEngine,
}

impl PotentialAnalyzer {
    pub fn new(engine: PotentialScoringEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &PotentialScoringEngine {
        &self.engine
    }

    pub fn analyze(&self, catalog: &DatasetCatalog, codes: &MunicipalitySet) -> PotentialAnalysis {
        let mut warnings = Vec::new();
        let signals = gather_signals(catalog, codes, &mut warnings);
        let matrix = self.engine.score(&signals.scoring_inputs(codes.len()));
        let recommendations = generate_recommendations(&matrix);

        report_degradation("potential", codes, &warnings);
        debug!(
            municipios = codes.len(),
            score = matrix.final_score(),
            "potential analysis computed"
        );

        let data_by_source = DataBySource {
            crops: signals.crops.total_value,
            fertilizers: signals.fertilizers.total,
            agrotoxicos: signals.agrotoxicos.total,
            consultoria: signals.consultoria.total,
            corretivos: signals.corretivos,
            despesas: signals.despesa,
            escolaridade: signals.escolaridade,
            receitas: signals.receita,
        };

        PotentialAnalysis {
            potential_score: matrix.final_score(),
            total_value: data_by_source.crops * VALUE_PER_HECTARE
                + data_by_source.despesas
                + data_by_source.receitas,
            crops_diversity: signals.crops.diversity,
            avg_productivity: signals.crops.avg_productivity,
            fertilizers_usage: signals.fertilizers.usage_percentage,
            agrotoxicos_usage: signals.agrotoxicos.usage_percentage,
            technical_assistance: signals.consultoria.usage_percentage,
            recommendations,
            data_by_source,
            top_crops: signals.crops.top_crops,
            calculation_matrix: matrix,
            degraded: !warnings.is_empty(),
            warnings,
        }
    }
}

/// Calculation matrix for `codes` with the standard rubric.
pub fn compute_potential_score(
    catalog: &DatasetCatalog,
    codes: &MunicipalitySet,
) -> ScoreBreakdown {
    let mut warnings = Vec::new();
    let signals = gather_signals(catalog, codes, &mut warnings);
    report_degradation("score", codes, &warnings);
    PotentialScoringEngine::default().score(&signals.scoring_inputs(codes.len()))
}

fn gather_signals(
    catalog: &DatasetCatalog,
    codes: &MunicipalitySet,
    warnings: &mut Vec<AnalysisWarning>,
) -> TerritorySignals {
    let crops = isolated(warnings, DatasetKind::Crops.key(), || {
        checked_crop_summary(&*catalog.dataset(DatasetKind::Crops)?, codes)
    });
    let fertilizers = isolated(warnings, DatasetKind::Fertilizers.key(), || {
        usage(catalog, DatasetKind::Fertilizers, codes)
    });
    let agrotoxicos = isolated(warnings, DatasetKind::Agrotoxicos.key(), || {
        usage(catalog, DatasetKind::Agrotoxicos, codes)
    });
    let consultoria = isolated(warnings, DatasetKind::Consultoria.key(), || {
        usage(catalog, DatasetKind::Consultoria, codes)
    });
    let corretivos = isolated(warnings, DatasetKind::Corretivos.key(), || {
        total(catalog, DatasetKind::Corretivos, codes)
    });
    let escolaridade = isolated(warnings, DatasetKind::Escolaridade.key(), || {
        total(catalog, DatasetKind::Escolaridade, codes)
    });
    let financial = isolated(warnings, "financeiro", || {
        checked_financial_summary(
            &*catalog.dataset(DatasetKind::Receitas)?,
            &*catalog.dataset(DatasetKind::Despesas)?,
            codes,
        )
    });

    TerritorySignals {
        crops,
        fertilizers,
        agrotoxicos,
        consultoria,
        corretivos,
        escolaridade,
        receita: financial.total_receita,
        despesa: financial.total_despesa,
    }
}

fn usage(
    catalog: &DatasetCatalog,
    kind: DatasetKind,
    codes: &MunicipalitySet,
) -> Result<UsageSignal, AnalysisError> {
    usage_signal(kind, &*catalog.dataset(kind)?, codes)
}

fn total(
    catalog: &DatasetCatalog,
    kind: DatasetKind,
    codes: &MunicipalitySet,
) -> Result<f64, AnalysisError> {
    dataset_total(
        kind,
        &*catalog.dataset(kind)?,
        codes,
        &EXCLUDED_TOTAL_CATEGORIES,
    )
}

/// Runs one sub-analysis; a failure falls back to the zero value and is
/// recorded instead of aborting the whole analysis.
pub(crate) fn isolated<T, F>(warnings: &mut Vec<AnalysisWarning>, source: &str, step: F) -> T
where
    T: Default,
    F: FnOnce() -> Result<T, AnalysisError>,
{
    match step() {
        Ok(value) => value,
        Err(error) => {
            warnings.push(AnalysisWarning {
                source: source.to_string(),
                message: error.to_string(),
            });
            T::default()
        }
    }
}

pub(crate) fn report_degradation(
    analysis: &str,
    codes: &MunicipalitySet,
    warnings: &[AnalysisWarning],
) {
    if warnings.is_empty() {
        return;
    }

    let sources = warnings
        .iter()
        .map(|warning| warning.source.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let details = warnings
        .iter()
        .map(|warning| warning.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    warn!(
        analysis,
        municipios = codes.len(),
        sources = %sources,
        details = %details,
        "analysis degraded; failed sources scored as zero"
    );
}
