use crate::datasets::{
    CategoryDataset, DatasetCatalog, DatasetKind, DatasetRecord, MunicipalityCode, MunicipalitySet,
};

pub(super) fn codes(count: usize) -> MunicipalitySet {
    (0..count)
        .map(|index| MunicipalityCode(format!("51{index:05}")))
        .collect()
}

/// `crop_count` crops of `area_per_crop` hectares in every municipality.
pub(super) fn crop_dataset(
    codes: &MunicipalitySet,
    crop_count: usize,
    area_per_crop: f64,
) -> CategoryDataset {
    let mut dataset = CategoryDataset::new();
    for crop in 0..crop_count {
        for code in codes {
            dataset.insert(
                format!("Cultura {crop:02}"),
                code.clone(),
                DatasetRecord::new(area_per_crop),
            );
        }
    }
    dataset
}

/// One usage category holding `value` for the first `covered` municipalities.
pub(super) fn usage_dataset(
    codes: &MunicipalitySet,
    covered: usize,
    value: f64,
) -> CategoryDataset {
    let mut dataset = CategoryDataset::new();
    for code in codes.iter().take(covered) {
        dataset.insert("Estabelecimentos com uso", code.clone(), DatasetRecord::new(value));
        dataset.insert(
            "Total Estabelecimentos",
            code.clone(),
            DatasetRecord::new(value * 10.0),
        );
    }
    dataset
}

pub(super) fn financial_dataset(
    codes: &MunicipalitySet,
    per_municipality: f64,
) -> CategoryDataset {
    let mut dataset = CategoryDataset::new();
    for code in codes {
        dataset.insert(
            "Total",
            code.clone(),
            DatasetRecord::named(per_municipality, "Município", "MT"),
        );
    }
    dataset
}

/// Every signal at or past its saturation threshold.
pub(super) fn saturated_catalog(codes: &MunicipalitySet) -> DatasetCatalog {
    let covered = codes.len();
    DatasetCatalog::new()
        .with_dataset(DatasetKind::Crops, crop_dataset(codes, 20, 250.0))
        .with_dataset(DatasetKind::Fertilizers, usage_dataset(codes, covered, 3.0))
        .with_dataset(DatasetKind::Agrotoxicos, usage_dataset(codes, covered, 2.0))
        .with_dataset(DatasetKind::Consultoria, usage_dataset(codes, covered, 1.0))
        .with_dataset(DatasetKind::Corretivos, usage_dataset(codes, covered, 4.0))
        .with_dataset(DatasetKind::Receitas, financial_dataset(codes, 1000.0))
        .with_dataset(DatasetKind::Despesas, CategoryDataset::new())
}
