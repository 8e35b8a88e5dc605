use std::cmp::Ordering;

use serde::Serialize;

use crate::datasets::{CategoryDataset, DatasetKind, MunicipalitySet};

use super::AnalysisError;

/// Pseudo-categories that hold per-municipality grand totals. Matching is exact
/// and case-sensitive.
pub const EXCLUDED_TOTAL_CATEGORIES: [&str; 3] =
    ["Total Estabelecimentos", "Total estabelecimentos", "TOTAL"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
}

/// Sums each non-excluded category over `codes` and ranks the positive ones,
/// largest first. Equal totals fall back to category name order.
pub fn aggregate(
    dataset: &CategoryDataset,
    codes: &MunicipalitySet,
    excluded: &[&str],
) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = dataset
        .categories()
        .filter(|(name, _)| !excluded.contains(name))
        .map(|(name, values)| CategoryTotal {
            name: name.to_string(),
            total: codes
                .iter()
                .filter_map(|code| values.get(code))
                .map(|record| record.value)
                .sum(),
        })
        .filter(|entry| entry.total > 0.0)
        .collect();

    sort_descending(&mut totals);
    totals
}

pub(crate) fn sort_descending(totals: &mut [CategoryTotal]) {
    totals.sort_by(|left, right| {
        right
            .total
            .partial_cmp(&left.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.name.cmp(&right.name))
    });
}

/// Percentage of `codes` with a positive value in any non-excluded category,
/// capped at 100. A municipality is counted at most once.
pub fn coverage(dataset: &CategoryDataset, codes: &MunicipalitySet, excluded: &[&str]) -> f64 {
    if codes.is_empty() {
        return 0.0;
    }

    let covered = codes
        .iter()
        .filter(|code| {
            dataset
                .categories()
                .filter(|(name, _)| !excluded.contains(name))
                .any(|(_, values)| values.get(*code).is_some_and(|record| record.value > 0.0))
        })
        .count();

    let percentage = covered as f64 / codes.len().max(1) as f64 * 100.0;
    percentage.min(100.0)
}

/// Sum of every non-excluded value over `codes`; rejects NaN or infinite input.
pub fn dataset_total(
    kind: DatasetKind,
    dataset: &CategoryDataset,
    codes: &MunicipalitySet,
    excluded: &[&str],
) -> Result<f64, AnalysisError> {
    let total: f64 = dataset
        .categories()
        .filter(|(name, _)| !excluded.contains(name))
        .flat_map(|(_, values)| codes.iter().filter_map(move |code| values.get(code)))
        .map(|record| record.value)
        .sum();

    ensure_finite(kind, total)
}

pub(crate) fn ensure_finite(kind: DatasetKind, value: f64) -> Result<f64, AnalysisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::NonFinite {
            dataset: kind,
            value,
        })
    }
}

/// Usage signal for one input dataset: coverage percentage plus raw total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageSignal {
    pub usage_percentage: f64,
    pub total: f64,
}

pub fn usage_signal(
    kind: DatasetKind,
    dataset: &CategoryDataset,
    codes: &MunicipalitySet,
) -> Result<UsageSignal, AnalysisError> {
    let total = dataset_total(kind, dataset, codes, &EXCLUDED_TOTAL_CATEGORIES)?;
    Ok(UsageSignal {
        usage_percentage: coverage(dataset, codes, &EXCLUDED_TOTAL_CATEGORIES),
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::municipality_set;

    fn fertilizer_dataset() -> CategoryDataset {
        CategoryDataset::new()
            .with_value("Total Estabelecimentos", "1", 90.0)
            .with_value("Total estabelecimentos", "1", 90.0)
            .with_value("TOTAL", "1", 90.0)
            .with_value("total", "1", 7.0)
            .with_value("Químico", "1", 30.0)
            .with_value("Químico", "2", 20.0)
            .with_value("Orgânico", "2", 50.0)
            .with_value("Calcário", "3", 0.0)
            .with_value("Negativo", "1", -4.0)
    }

    #[test]
    fn aggregate_excludes_total_bins_exactly() {
        let codes = municipality_set(["1", "2", "3"]);
        let totals = aggregate(&fertilizer_dataset(), &codes, &EXCLUDED_TOTAL_CATEGORIES);
        let names: Vec<&str> = totals.iter().map(|entry| entry.name.as_str()).collect();

        assert_eq!(names, vec!["Orgânico", "Químico", "total"]);
        assert!(totals.iter().all(|entry| entry.total > 0.0));
    }

    #[test]
    fn aggregate_breaks_ties_by_name() {
        let dataset = CategoryDataset::new()
            .with_value("Zinco", "1", 5.0)
            .with_value("Boro", "1", 5.0)
            .with_value("Cobre", "1", 9.0);
        let totals = aggregate(&dataset, &municipality_set(["1"]), &[]);
        let names: Vec<&str> = totals.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["Cobre", "Boro", "Zinco"]);
    }

    #[test]
    fn aggregate_ignores_codes_outside_the_set() {
        let totals = aggregate(
            &fertilizer_dataset(),
            &municipality_set(["2"]),
            &EXCLUDED_TOTAL_CATEGORIES,
        );
        assert_eq!(
            totals,
            vec![
                CategoryTotal {
                    name: "Orgânico".to_string(),
                    total: 50.0
                },
                CategoryTotal {
                    name: "Químico".to_string(),
                    total: 20.0
                },
            ]
        );
    }

    #[test]
    fn coverage_counts_each_municipality_once() {
        let codes = municipality_set(["1", "2", "3", "4"]);
        let pct = coverage(&fertilizer_dataset(), &codes, &EXCLUDED_TOTAL_CATEGORIES);
        assert_eq!(pct, 50.0);
    }

    #[test]
    fn coverage_ignores_total_bins_and_empty_sets() {
        let dataset = CategoryDataset::new().with_value("TOTAL", "9", 10.0);
        assert_eq!(
            coverage(&dataset, &municipality_set(["9"]), &EXCLUDED_TOTAL_CATEGORIES),
            0.0
        );
        assert_eq!(
            coverage(
                &fertilizer_dataset(),
                &MunicipalitySet::new(),
                &EXCLUDED_TOTAL_CATEGORIES
            ),
            0.0
        );
    }

    #[test]
    fn dataset_total_rejects_non_finite_sums() {
        let dataset = CategoryDataset::new().with_value("Químico", "1", f64::INFINITY);
        match dataset_total(
            DatasetKind::Fertilizers,
            &dataset,
            &municipality_set(["1"]),
            &[],
        ) {
            Err(AnalysisError::NonFinite { dataset, .. }) => {
                assert_eq!(dataset, DatasetKind::Fertilizers)
            }
            other => panic!("expected non-finite error, got {other:?}"),
        }
    }
}
