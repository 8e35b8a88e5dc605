use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::catalog::DatasetCatalog;
use super::domain::{CategoryDataset, DatasetKind};
use super::DatasetError;

pub fn load_dataset(path: &Path) -> Result<CategoryDataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    dataset_from_reader(BufReader::new(file)).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn dataset_from_reader<R: Read>(reader: R) -> Result<CategoryDataset, serde_json::Error> {
    serde_json::from_reader(reader)
}

/// Reads every known dataset file from `data_dir`. Missing files leave the
/// dataset empty; unreadable or malformed files mark it unavailable.
pub fn load_catalog(data_dir: &Path) -> DatasetCatalog {
    let mut catalog = DatasetCatalog::new();

    for kind in DatasetKind::ordered() {
        let path: PathBuf = data_dir.join(kind.file_name());
        match load_dataset(&path) {
            Ok(dataset) => {
                info!(dataset = %kind, categories = dataset.len(), "dataset loaded");
                catalog.insert(kind, dataset);
            }
            Err(DatasetError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!(
                    dataset = %kind,
                    path = %path.display(),
                    "dataset file not found; using empty dataset"
                );
            }
            Err(err) => {
                error!(dataset = %kind, error = %err, "dataset could not be loaded");
                catalog.mark_unavailable(kind, err.to_string());
            }
        }
    }

    catalog
}
