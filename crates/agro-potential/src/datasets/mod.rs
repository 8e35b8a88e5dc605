//! Static IBGE-keyed datasets: typed records, catalog snapshots, file loading.

mod catalog;
mod domain;
mod loader;
mod provider;

pub use catalog::{DatasetCatalog, DatasetCategoryCount, DatasetStatistics};
pub use domain::{
    municipality_set, CategoryDataset, CategoryValues, DatasetKind, DatasetRecord,
    MunicipalityCode, MunicipalitySet,
};
pub use loader::{dataset_from_reader, load_catalog, load_dataset};
pub use provider::{DatasetProvider, FileDatasetProvider, StaticDatasetProvider};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset {kind} unavailable: {reason}")]
    Unavailable { kind: DatasetKind, reason: String },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown dataset '{0}'")]
    UnknownKind(String),
}
