use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::info;

use super::catalog::DatasetCatalog;
use super::loader::load_catalog;

/// Source of dataset snapshots. Analyses take one snapshot per call and
/// never observe a reload half-way through.
pub trait DatasetProvider: Send + Sync {
    fn catalog(&self) -> Arc<DatasetCatalog>;

    /// Refreshes the snapshot from the backing source. Fixed providers keep
    /// their catalog.
    fn reload(&self) -> Arc<DatasetCatalog> {
        self.catalog()
    }
}

/// Fixed in-memory catalog, used for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDatasetProvider {
    catalog: Arc<DatasetCatalog>,
}

impl StaticDatasetProvider {
    pub fn new(catalog: DatasetCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

impl DatasetProvider for StaticDatasetProvider {
    fn catalog(&self) -> Arc<DatasetCatalog> {
        self.catalog.clone()
    }
}

/// Catalog backed by JSON files in a data directory, refreshed on demand.
#[derive(Debug)]
pub struct FileDatasetProvider {
    data_dir: PathBuf,
    current: RwLock<Arc<DatasetCatalog>>,
}

impl FileDatasetProvider {
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let catalog = load_catalog(&data_dir);
        Self {
            data_dir,
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Re-reads every file and swaps the snapshot in one step.
    pub fn reload(&self) -> Arc<DatasetCatalog> {
        let fresh = Arc::new(load_catalog(&self.data_dir));
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = fresh.clone();
        info!(data_dir = %self.data_dir.display(), "dataset catalog reloaded");
        fresh
    }
}

impl DatasetProvider for FileDatasetProvider {
    fn catalog(&self) -> Arc<DatasetCatalog> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn reload(&self) -> Arc<DatasetCatalog> {
        FileDatasetProvider::reload(self)
    }
}
