use std::cmp::Ordering;

use serde::Serialize;

use crate::datasets::{CategoryDataset, DatasetKind, MunicipalityCode, MunicipalitySet};

use super::aggregate::ensure_finite;
use super::AnalysisError;

/// Revenue and expense files keep the municipality-wide figure under this category.
pub const FINANCIAL_TOTAL_CATEGORY: &str = "Total";

const TOP_CROPS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropTotal {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CropSummary {
    pub diversity: usize,
    pub avg_productivity: f64,
    pub total_value: f64,
    pub top_crops: Vec<CropTotal>,
}

pub fn extract_crop_summary(crops: &CategoryDataset, codes: &MunicipalitySet) -> CropSummary {
    let mut total_value = 0.0;
    let mut diversity = 0;
    let mut ranked = Vec::new();

    for (name, values) in crops.categories() {
        let crop_total: f64 = codes
            .iter()
            .filter_map(|code| values.get(code))
            .map(|record| record.value)
            .sum();
        total_value += crop_total;

        if crop_total > 0.0 {
            diversity += 1;
            ranked.push(CropTotal {
                name: name.to_string(),
                value: crop_total,
            });
        }
    }

    ranked.sort_by(|left, right| {
        right
            .value
            .partial_cmp(&left.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.name.cmp(&right.name))
    });
    ranked.truncate(TOP_CROPS_LIMIT);

    CropSummary {
        diversity,
        avg_productivity: total_value / codes.len().max(1) as f64,
        total_value,
        top_crops: ranked,
    }
}

pub(crate) fn checked_crop_summary(
    crops: &CategoryDataset,
    codes: &MunicipalitySet,
) -> Result<CropSummary, AnalysisError> {
    let summary = extract_crop_summary(crops, codes);
    ensure_finite(DatasetKind::Crops, summary.total_value)?;
    Ok(summary)
}

/// Crop row for the commercial report: area plus how many of the territory's
/// municipalities appear in the crop's data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropArea {
    pub name: String,
    pub total_area: f64,
    pub municipalities_count: usize,
}

pub fn crop_areas(crops: &CategoryDataset, codes: &MunicipalitySet) -> Vec<CropArea> {
    let mut areas: Vec<CropArea> = crops
        .categories()
        .filter_map(|(name, values)| {
            let present: Vec<f64> = codes
                .iter()
                .filter_map(|code| values.get(code))
                .map(|record| record.value)
                .collect();
            let total_area: f64 = present.iter().sum();
            (total_area > 0.0).then(|| CropArea {
                name: name.to_string(),
                total_area,
                municipalities_count: present.len(),
            })
        })
        .collect();

    areas.sort_by(|left, right| {
        right
            .total_area
            .partial_cmp(&left.total_area)
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.name.cmp(&right.name))
    });
    areas
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityFinance {
    pub code: MunicipalityCode,
    pub name: String,
    pub state: String,
    pub receita: f64,
    pub despesa: f64,
    pub saldo: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub municipios: Vec<MunicipalityFinance>,
    pub total_receita: f64,
    pub total_despesa: f64,
    pub saldo: f64,
}

pub fn extract_financial_summary(
    revenue: &CategoryDataset,
    expense: &CategoryDataset,
    codes: &MunicipalitySet,
) -> FinancialSummary {
    let mut summary = FinancialSummary::default();

    for code in codes {
        let receita_record = revenue.record(FINANCIAL_TOTAL_CATEGORY, code);
        let despesa_record = expense.record(FINANCIAL_TOTAL_CATEGORY, code);

        let receita = receita_record.map_or(0.0, |record| record.value);
        let despesa = despesa_record.map_or(0.0, |record| record.value);
        if receita == 0.0 && despesa == 0.0 {
            continue;
        }

        // Name and state come from the revenue entry when it carries a name.
        let named = receita_record
            .filter(|record| {
                record
                    .municipality_name
                    .as_deref()
                    .is_some_and(|name| !name.is_empty())
            })
            .or(despesa_record);
        let name = named
            .and_then(|record| record.municipality_name.clone())
            .unwrap_or_default();
        let state = named
            .and_then(|record| record.state_code.clone())
            .unwrap_or_default();

        summary.municipios.push(MunicipalityFinance {
            code: code.clone(),
            name,
            state,
            receita,
            despesa,
            saldo: receita - despesa,
        });
        summary.total_receita += receita;
        summary.total_despesa += despesa;
    }

    summary.saldo = summary.total_receita - summary.total_despesa;
    summary
}

pub(crate) fn checked_financial_summary(
    revenue: &CategoryDataset,
    expense: &CategoryDataset,
    codes: &MunicipalitySet,
) -> Result<FinancialSummary, AnalysisError> {
    let summary = extract_financial_summary(revenue, expense, codes);
    ensure_finite(DatasetKind::Receitas, summary.total_receita)?;
    ensure_finite(DatasetKind::Despesas, summary.total_despesa)?;
    Ok(summary)
}
