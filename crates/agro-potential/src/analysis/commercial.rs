use serde::Serialize;

use crate::datasets::{
    CategoryDataset, DatasetCatalog, DatasetKind, MunicipalityCode, MunicipalitySet,
};

use super::aggregate::{aggregate, ensure_finite, CategoryTotal, EXCLUDED_TOTAL_CATEGORIES};
use super::detail::{checked_financial_summary, crop_areas, CropArea, FinancialSummary};
use super::potential::{isolated, report_degradation};
use super::{AnalysisError, AnalysisWarning};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CropsData {
    pub crops: Vec<CropArea>,
}

/// Display name of a territory municipality, taken from the crop dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityLabel {
    pub code: MunicipalityCode,
    pub name: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryRanking {
    pub categories: Vec<CategoryTotal>,
}

impl CategoryRanking {
    pub fn grand_total(&self) -> f64 {
        self.categories.iter().map(|entry| entry.total).sum()
    }
}

/// Detailed per-territory breakdown behind the commercial spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialAnalysis {
    pub financial_data: FinancialSummary,
    pub crops_data: CropsData,
    pub fertilizer_data: CategoryRanking,
    pub agrotoxico_data: CategoryRanking,
    pub consultoria_data: CategoryRanking,
    pub corretivos_data: CategoryRanking,
    pub escolaridade_data: CategoryRanking,
    pub municipios_data: Vec<MunicipalityLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AnalysisWarning>,
}

impl CommercialAnalysis {
    /// Ranked input datasets in sheet order.
    pub fn rankings(&self) -> [(DatasetKind, &CategoryRanking); 5] {
        [
            (DatasetKind::Fertilizers, &self.fertilizer_data),
            (DatasetKind::Agrotoxicos, &self.agrotoxico_data),
            (DatasetKind::Consultoria, &self.consultoria_data),
            (DatasetKind::Corretivos, &self.corretivos_data),
            (DatasetKind::Escolaridade, &self.escolaridade_data),
        ]
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

pub fn commercial_analysis(
    catalog: &DatasetCatalog,
    codes: &MunicipalitySet,
) -> CommercialAnalysis {
    let mut warnings = Vec::new();

    let financial_data = isolated(&mut warnings, "financeiro", || {
        checked_financial_summary(
            &*catalog.dataset(DatasetKind::Receitas)?,
            &*catalog.dataset(DatasetKind::Despesas)?,
            codes,
        )
    });
    let crops_data = isolated(&mut warnings, DatasetKind::Crops.key(), || {
        let crops = crop_areas(&*catalog.dataset(DatasetKind::Crops)?, codes);
        let total: f64 = crops.iter().map(|crop| crop.total_area).sum();
        ensure_finite(DatasetKind::Crops, total)?;
        Ok(CropsData { crops })
    });

    let mut ranking = |kind: DatasetKind| {
        isolated(&mut warnings, kind.key(), || ranked(catalog, kind, codes))
    };
    let fertilizer_data = ranking(DatasetKind::Fertilizers);
    let agrotoxico_data = ranking(DatasetKind::Agrotoxicos);
    let consultoria_data = ranking(DatasetKind::Consultoria);
    let corretivos_data = ranking(DatasetKind::Corretivos);
    let escolaridade_data = ranking(DatasetKind::Escolaridade);

    let crops = catalog.dataset(DatasetKind::Crops).ok();
    let municipios_data = municipality_labels(crops.as_deref(), codes);

    report_degradation("commercial", codes, &warnings);

    CommercialAnalysis {
        financial_data,
        crops_data,
        fertilizer_data,
        agrotoxico_data,
        consultoria_data,
        corretivos_data,
        escolaridade_data,
        municipios_data,
        warnings,
    }
}

fn ranked(
    catalog: &DatasetCatalog,
    kind: DatasetKind,
    codes: &MunicipalitySet,
) -> Result<CategoryRanking, AnalysisError> {
    let categories = aggregate(&*catalog.dataset(kind)?, codes, &EXCLUDED_TOTAL_CATEGORIES);
    let ranking = CategoryRanking { categories };
    ensure_finite(kind, ranking.grand_total())?;
    Ok(ranking)
}

/// Names each code from the first crop entry that carries one; unknown codes
/// get a placeholder. Sorted by state, then name.
pub fn municipality_labels(
    crops: Option<&CategoryDataset>,
    codes: &MunicipalitySet,
) -> Vec<MunicipalityLabel> {
    let mut labels: Vec<MunicipalityLabel> = codes
        .iter()
        .map(|code| {
            let named = crops.and_then(|crops| {
                crops
                    .categories()
                    .filter_map(|(_, values)| values.get(code))
                    .find(|record| {
                        record
                            .municipality_name
                            .as_deref()
                            .is_some_and(|name| !name.is_empty())
                    })
            });
            match named {
                Some(record) => MunicipalityLabel {
                    code: code.clone(),
                    name: record.municipality_name.clone().unwrap_or_default(),
                    state: record.state_code.clone().unwrap_or_default(),
                },
                None => MunicipalityLabel {
                    code: code.clone(),
                    name: format!("Município {code}"),
                    state: "XX".to_string(),
                },
            }
        })
        .collect();

    labels.sort_by(|left, right| {
        left.state
            .cmp(&right.state)
            .then_with(|| left.name.cmp(&right.name))
    });
    labels
}
