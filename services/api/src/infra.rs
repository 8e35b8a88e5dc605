use agro_potential::registry::{RecordStore, RepositoryError, Territory, TerritoryId};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local record store; records are lost on restart.
#[derive(Clone)]
pub(crate) struct InMemoryStore<T> {
    records: Arc<Mutex<BTreeMap<TerritoryId, T>>>,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl<T> InMemoryStore<T> {
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<TerritoryId, T>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store lock poisoned".to_string()))
    }
}

impl<T: Territory> RecordStore<T> for InMemoryStore<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id(), record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.id()) {
            guard.insert(record.id(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: TerritoryId) -> Result<Option<T>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.values().cloned().collect())
    }
}
