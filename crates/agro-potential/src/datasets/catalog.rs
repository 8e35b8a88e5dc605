use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use super::domain::{CategoryDataset, DatasetKind};
use super::DatasetError;

/// Immutable snapshot of every dataset the analyses read.
///
/// A kind that was never loaded reads as an empty dataset. A kind whose file
/// could not be parsed is kept as *unavailable* so analyses can report it
/// instead of silently scoring zero.
#[derive(Debug, Clone, Default)]
pub struct DatasetCatalog {
    datasets: BTreeMap<DatasetKind, Arc<CategoryDataset>>,
    unavailable: BTreeMap<DatasetKind, String>,
}

impl DatasetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, kind: DatasetKind, dataset: CategoryDataset) -> Self {
        self.insert(kind, dataset);
        self
    }

    pub fn insert(&mut self, kind: DatasetKind, dataset: CategoryDataset) {
        self.unavailable.remove(&kind);
        self.datasets.insert(kind, Arc::new(dataset));
    }

    pub fn mark_unavailable(&mut self, kind: DatasetKind, reason: impl Into<String>) {
        self.datasets.remove(&kind);
        self.unavailable.insert(kind, reason.into());
    }

    pub fn dataset(&self, kind: DatasetKind) -> Result<Arc<CategoryDataset>, DatasetError> {
        if let Some(reason) = self.unavailable.get(&kind) {
            return Err(DatasetError::Unavailable {
                kind,
                reason: reason.clone(),
            });
        }

        Ok(self
            .datasets
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Arc::new(CategoryDataset::new())))
    }

    pub fn is_loaded(&self, kind: DatasetKind) -> bool {
        self.datasets.contains_key(&kind)
    }

    pub fn unavailable(&self) -> impl Iterator<Item = (DatasetKind, &str)> {
        self.unavailable
            .iter()
            .map(|(kind, reason)| (*kind, reason.as_str()))
    }

    pub fn statistics(&self) -> DatasetStatistics {
        let category_counts = DatasetKind::ordered()
            .into_iter()
            .map(|kind| DatasetCategoryCount {
                dataset: kind,
                label: kind.label(),
                categories: self.datasets.get(&kind).map_or(0, |dataset| dataset.len()),
                available: !self.unavailable.contains_key(&kind),
            })
            .collect();

        let distinct = |kind: DatasetKind| {
            self.datasets
                .get(&kind)
                .map_or(0, |dataset| dataset.municipalities().len())
        };

        let total_establishments = self
            .datasets
            .get(&DatasetKind::Fertilizers)
            .and_then(|dataset| dataset.category("Total Estabelecimentos"))
            .map_or(0.0, |values| values.values().map(|record| record.value).sum());

        DatasetStatistics {
            total_crops: self
                .datasets
                .get(&DatasetKind::Crops)
                .map_or(0, |dataset| dataset.len()),
            total_municipalities: distinct(DatasetKind::Crops),
            total_fertilizer_municipalities: distinct(DatasetKind::Fertilizers),
            total_establishments,
            datasets: category_counts,
        }
    }

    /// Sorted category names for one dataset.
    pub fn category_names(&self, kind: DatasetKind) -> Result<Vec<String>, DatasetError> {
        let dataset = self.dataset(kind)?;
        let names: BTreeSet<String> = dataset
            .category_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(names.into_iter().collect())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetCategoryCount {
    pub dataset: DatasetKind,
    pub label: &'static str,
    pub categories: usize,
    pub available: bool,
}

/// Portal-wide dataset counters shown on the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatistics {
    pub total_crops: usize,
    pub total_municipalities: usize,
    pub total_fertilizer_municipalities: usize,
    pub total_establishments: f64,
    pub datasets: Vec<DatasetCategoryCount>,
}
