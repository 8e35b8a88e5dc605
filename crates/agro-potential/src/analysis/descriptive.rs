use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::datasets::{
    CategoryDataset, CategoryValues, DatasetKind, DatasetRecord, MunicipalityCode,
};

/// Entries shown per crop chart.
pub const CHART_LIMIT: usize = 20;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Categoria '{category}' não encontrada em {dataset}")]
    UnknownCategory {
        dataset: DatasetKind,
        category: String,
    },
    #[error("Cultura não encontrada")]
    UnknownCrop(String),
    #[error("Nenhum município válido encontrado para esta cultura")]
    NoMunicipalities(String),
}

/// One municipality's value inside a dataset category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityValue {
    pub municipality_code: MunicipalityCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    pub value: f64,
}

/// Municipality listing for a crop, with the crop actually resolved when the
/// requested name only matched partially.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropMunicipalities {
    pub crop: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_crop: Option<String>,
    pub data: Vec<MunicipalityValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CropChart {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticalSummary {
    pub mean: f64,
    pub median: f64,
    pub mode: Option<f64>,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMunicipality {
    pub name: String,
    pub area: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateRollup {
    pub total_area: f64,
    pub municipalities_count: usize,
    pub max_area: f64,
    pub average_area: f64,
    pub municipalities: Vec<StateMunicipality>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropComparisonRow {
    pub municipality_code: MunicipalityCode,
    pub municipality_name: Option<String>,
    pub state_code: Option<String>,
    pub crop1_area: f64,
    pub crop2_area: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropComparison {
    pub crop1: String,
    pub crop2: String,
    pub comparison_data: Vec<CropComparisonRow>,
    pub common_municipalities: usize,
}

/// Seven-digit IBGE municipality codes start with the region digit 1-5; other
/// shapes are regional aggregates mixed into the source tables. Records also
/// need a municipality name to be listed.
pub fn is_municipality_entry(code: &MunicipalityCode, name: Option<&str>) -> bool {
    let code = code.as_str();
    code.len() == 7
        && code.bytes().all(|byte| byte.is_ascii_digit())
        && matches!(code.as_bytes()[0], b'1'..=b'5')
        && name.is_some_and(|name| !name.trim().is_empty())
}

/// Every entry of `category`, largest value first. Unlike the crop lookups this
/// keeps regional aggregates and unnamed records.
pub fn category_municipalities(
    kind: DatasetKind,
    dataset: &CategoryDataset,
    category: &str,
) -> Result<Vec<MunicipalityValue>, LookupError> {
    let values = dataset
        .category(category)
        .ok_or_else(|| LookupError::UnknownCategory {
            dataset: kind,
            category: category.to_string(),
        })?;
    Ok(sorted_entries(values.iter()))
}

/// Municipalities growing `crop`. An unknown name falls back to the first crop
/// (in name order) that contains it or is contained by it, case-insensitively.
pub fn crop_municipalities(
    crops: &CategoryDataset,
    crop: &str,
) -> Result<CropMunicipalities, LookupError> {
    if let Some(values) = crops.category(crop) {
        return Ok(CropMunicipalities {
            crop: crop.to_string(),
            matched_crop: None,
            data: ranked_entries(values),
        });
    }

    let wanted = crop.to_lowercase();
    let (matched, values) = crops
        .categories()
        .find(|(name, _)| {
            let name = name.to_lowercase();
            name.contains(&wanted) || wanted.contains(&name)
        })
        .ok_or_else(|| LookupError::UnknownCrop(crop.to_string()))?;

    Ok(CropMunicipalities {
        crop: crop.to_string(),
        matched_crop: Some(matched.to_string()),
        data: ranked_entries(values),
    })
}

/// Top municipalities by harvested area, labelled `Name (UF)`.
pub fn crop_chart(crops: &CategoryDataset, crop: &str) -> Result<CropChart, LookupError> {
    let values = exact_crop(crops, crop)?;
    let mut chart = CropChart::default();
    for entry in ranked_entries(values).into_iter().take(CHART_LIMIT) {
        chart.labels.push(format!(
            "{} ({})",
            entry.municipality_name.unwrap_or_default(),
            entry.state_code.unwrap_or_else(|| "XX".to_string())
        ));
        chart.data.push(entry.value);
    }
    Ok(chart)
}

pub fn statistical_summary(
    crops: &CategoryDataset,
    crop: &str,
) -> Result<StatisticalSummary, LookupError> {
    let values: Vec<f64> = ranked_entries(exact_crop(crops, crop)?)
        .into_iter()
        .map(|entry| entry.value)
        .collect();
    summarize(&values).ok_or_else(|| LookupError::NoMunicipalities(crop.to_string()))
}

/// Per-state totals for `crop`, keyed by UF.
pub fn crop_by_state(
    crops: &CategoryDataset,
    crop: &str,
) -> Result<BTreeMap<String, StateRollup>, LookupError> {
    let mut states: BTreeMap<String, StateRollup> = BTreeMap::new();
    for entry in ranked_entries(exact_crop(crops, crop)?) {
        let state = entry.state_code.unwrap_or_else(|| "XX".to_string());
        let rollup = states.entry(state).or_default();
        rollup.total_area += entry.value;
        rollup.municipalities_count += 1;
        rollup.max_area = rollup.max_area.max(entry.value);
        rollup.municipalities.push(StateMunicipality {
            name: entry.municipality_name.unwrap_or_default(),
            area: entry.value,
        });
    }
    for rollup in states.values_mut() {
        rollup.average_area = rollup.total_area / rollup.municipalities_count as f64;
    }
    Ok(states)
}

/// Side-by-side areas for municipalities present in both crops. The ratio
/// divides by at least one hectare.
pub fn compare_crops(
    crops: &CategoryDataset,
    crop1: &str,
    crop2: &str,
) -> Result<CropComparison, LookupError> {
    let first = exact_crop(crops, crop1)?;
    let second = exact_crop(crops, crop2)?;

    let mut comparison_data: Vec<CropComparisonRow> = first
        .iter()
        .filter_map(|(code, left)| {
            let right = second.get(code)?;
            Some(CropComparisonRow {
                municipality_code: code.clone(),
                municipality_name: left.municipality_name.clone(),
                state_code: left.state_code.clone(),
                crop1_area: left.value,
                crop2_area: right.value,
                ratio: left.value / right.value.max(1.0),
            })
        })
        .collect();
    comparison_data.sort_by(|left, right| left.municipality_code.cmp(&right.municipality_code));

    Ok(CropComparison {
        crop1: crop1.to_string(),
        crop2: crop2.to_string(),
        common_municipalities: comparison_data.len(),
        comparison_data,
    })
}

fn exact_crop<'a>(
    crops: &'a CategoryDataset,
    crop: &str,
) -> Result<&'a CategoryValues, LookupError> {
    crops
        .category(crop)
        .ok_or_else(|| LookupError::UnknownCrop(crop.to_string()))
}

/// Named municipality entries only, largest value first.
fn ranked_entries(values: &CategoryValues) -> Vec<MunicipalityValue> {
    sorted_entries(
        values
            .iter()
            .filter(|(code, record)| {
                is_municipality_entry(code, record.municipality_name.as_deref())
            }),
    )
}

fn sorted_entries<'a, I>(values: I) -> Vec<MunicipalityValue>
where
    I: Iterator<Item = (&'a MunicipalityCode, &'a DatasetRecord)>,
{
    let mut entries: Vec<MunicipalityValue> = values
        .map(|(code, record)| MunicipalityValue {
            municipality_code: code.clone(),
            municipality_name: record.municipality_name.clone(),
            state_code: record.state_code.clone(),
            value: record.value,
        })
        .collect();
    entries.sort_by(|left, right| {
        right
            .value
            .partial_cmp(&left.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.municipality_code.cmp(&right.municipality_code))
    });
    entries
}

fn summarize(values: &[f64]) -> Option<StatisticalSummary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|left, right| left.partial_cmp(right).unwrap_or(Ordering::Equal));
    let count = sorted.len();
    let total: f64 = sorted.iter().sum();
    let mean = total / count as f64;

    let median = if count % 2 == 1 {
        sorted[count / 2]
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    };

    let std_dev = if count > 1 {
        let squares: f64 = sorted.iter().map(|value| (value - mean).powi(2)).sum();
        (squares / (count - 1) as f64).sqrt()
    } else {
        0.0
    };

    let (q1, q3) = if count >= 4 {
        (Some(quartile(&sorted, 1)), Some(quartile(&sorted, 3)))
    } else {
        (None, None)
    };

    Some(StatisticalSummary {
        mean,
        median,
        mode: mode(&sorted),
        std_dev,
        min: sorted[0],
        max: sorted[count - 1],
        q1,
        q3,
        total,
        count,
    })
}

/// Exclusive-method quartile over sorted data with at least four values.
fn quartile(sorted: &[f64], index: usize) -> f64 {
    let m = sorted.len() + 1;
    let j = index * m / 4;
    let delta = (index * m - j * 4) as f64;
    (sorted[j - 1] * (4.0 - delta) + sorted[j] * delta) / 4.0
}

/// Most frequent value, only when some value repeats; ties keep the smallest.
fn mode(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut index = 0;
    while index < sorted.len() {
        let value = sorted[index];
        let run = sorted[index..]
            .iter()
            .take_while(|candidate| **candidate == value)
            .count();
        if run > 1 && best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        index += run.max(1);
    }
    best.map(|(value, _)| value)
}
