use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::info;

use crate::analysis::{
    self, CropChart, CropComparison, CropMunicipalities, LookupError, MunicipalityValue,
    PotentialAnalysis, PotentialAnalyzer, StateRollup, StatisticalSummary,
};
use crate::datasets::{
    CategoryDataset, DatasetError, DatasetKind, DatasetProvider, DatasetStatistics,
    MunicipalitySet,
};
use crate::export::{CommercialReport, ReportContext};

use super::domain::{
    NewRevenda, NewVendedor, Revenda, RevendaUpdate, Territory, TerritoryId, TerritoryKind,
    ValidationError, Vendedor, VendedorUpdate,
};
use super::repository::{RecordStore, RepositoryError};

/// Service composing the revenda and vendedor stores with the dataset provider.
pub struct TerritoryService<R, V, P> {
    revendas: Arc<R>,
    vendedores: Arc<V>,
    datasets: Arc<P>,
    analyzer: PotentialAnalyzer,
    sequence: AtomicU64,
    /// Serializes the uniqueness check with the write that follows it.
    writes: Mutex<()>,
}

impl<R, V, P> TerritoryService<R, V, P>
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    pub fn new(revendas: Arc<R>, vendedores: Arc<V>, datasets: Arc<P>) -> Self {
        Self::with_analyzer(revendas, vendedores, datasets, PotentialAnalyzer::default())
    }

    pub fn with_analyzer(
        revendas: Arc<R>,
        vendedores: Arc<V>,
        datasets: Arc<P>,
        analyzer: PotentialAnalyzer,
    ) -> Self {
        Self {
            revendas,
            vendedores,
            datasets,
            analyzer,
            sequence: AtomicU64::new(1),
            writes: Mutex::new(()),
        }
    }

    fn next_id(&self) -> TerritoryId {
        TerritoryId(self.sequence.fetch_add(1, Ordering::Relaxed))
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, TerritoryServiceError> {
        self.writes.lock().map_err(|_| {
            RepositoryError::Unavailable("registry write lock poisoned".to_string()).into()
        })
    }

    pub fn create_revenda(&self, payload: NewRevenda) -> Result<Revenda, TerritoryServiceError> {
        let mut revenda = payload.validate(TerritoryId::PENDING, Utc::now())?;
        let _guard = self.write_lock()?;
        ensure_unique(self.revendas.as_ref(), &revenda)?;
        revenda.id = self.next_id();
        let stored = self.revendas.insert(revenda)?;
        info!(id = %stored.id, municipios = stored.municipios.len(), "revenda created");
        Ok(stored)
    }

    pub fn update_revenda(
        &self,
        id: TerritoryId,
        changes: RevendaUpdate,
    ) -> Result<Revenda, TerritoryServiceError> {
        let _guard = self.write_lock()?;
        let mut revenda = self.get_revenda(id)?;
        changes.apply(&mut revenda, Utc::now())?;
        ensure_unique(self.revendas.as_ref(), &revenda)?;
        self.revendas.update(revenda.clone())?;
        Ok(revenda)
    }

    /// Soft delete: the record stays fetchable but leaves every listing.
    pub fn deactivate_revenda(&self, id: TerritoryId) -> Result<Revenda, TerritoryServiceError> {
        let _guard = self.write_lock()?;
        let mut revenda = self.get_revenda(id)?;
        revenda.ativo = false;
        revenda.updated_at = Utc::now();
        self.revendas.update(revenda.clone())?;
        info!(id = %id, "revenda deactivated");
        Ok(revenda)
    }

    pub fn get_revenda(&self, id: TerritoryId) -> Result<Revenda, TerritoryServiceError> {
        self.revendas
            .fetch(id)?
            .ok_or(TerritoryServiceError::NotFound(TerritoryKind::Revenda))
    }

    pub fn list_revendas(&self) -> Result<Vec<Revenda>, TerritoryServiceError> {
        active(self.revendas.as_ref())
    }

    pub fn create_vendedor(&self, payload: NewVendedor) -> Result<Vendedor, TerritoryServiceError> {
        let mut vendedor = payload.validate(TerritoryId::PENDING, Utc::now())?;
        let _guard = self.write_lock()?;
        ensure_unique(self.vendedores.as_ref(), &vendedor)?;
        vendedor.id = self.next_id();
        let stored = self.vendedores.insert(vendedor)?;
        info!(id = %stored.id, municipios = stored.municipios.len(), "vendedor created");
        Ok(stored)
    }

    pub fn update_vendedor(
        &self,
        id: TerritoryId,
        changes: VendedorUpdate,
    ) -> Result<Vendedor, TerritoryServiceError> {
        let _guard = self.write_lock()?;
        let mut vendedor = self.get_vendedor(id)?;
        changes.apply(&mut vendedor, Utc::now())?;
        ensure_unique(self.vendedores.as_ref(), &vendedor)?;
        self.vendedores.update(vendedor.clone())?;
        Ok(vendedor)
    }

    pub fn deactivate_vendedor(&self, id: TerritoryId) -> Result<Vendedor, TerritoryServiceError> {
        let _guard = self.write_lock()?;
        let mut vendedor = self.get_vendedor(id)?;
        vendedor.ativo = false;
        vendedor.updated_at = Utc::now();
        self.vendedores.update(vendedor.clone())?;
        info!(id = %id, "vendedor deactivated");
        Ok(vendedor)
    }

    pub fn get_vendedor(&self, id: TerritoryId) -> Result<Vendedor, TerritoryServiceError> {
        self.vendedores
            .fetch(id)?
            .ok_or(TerritoryServiceError::NotFound(TerritoryKind::Vendedor))
    }

    pub fn list_vendedores(&self) -> Result<Vec<Vendedor>, TerritoryServiceError> {
        active(self.vendedores.as_ref())
    }

    /// Potential analysis for an ad-hoc municipality selection.
    pub fn analyze_municipalities(&self, codes: &MunicipalitySet) -> PotentialAnalysis {
        let catalog = self.datasets.catalog();
        self.analyzer.analyze(&catalog, codes)
    }

    pub fn analyze_revenda_potential(
        &self,
        id: TerritoryId,
    ) -> Result<PotentialAnalysis, TerritoryServiceError> {
        let revenda = self.get_revenda(id)?;
        Ok(self.analyze_territory(&revenda))
    }

    pub fn analyze_vendedor_potential(
        &self,
        id: TerritoryId,
    ) -> Result<PotentialAnalysis, TerritoryServiceError> {
        let vendedor = self.get_vendedor(id)?;
        Ok(self.analyze_territory(&vendedor))
    }

    pub fn commercial_revenda(
        &self,
        id: TerritoryId,
    ) -> Result<CommercialReport, TerritoryServiceError> {
        let revenda = self.get_revenda(id)?;
        self.commercial_report(&revenda)
    }

    pub fn commercial_vendedor(
        &self,
        id: TerritoryId,
    ) -> Result<CommercialReport, TerritoryServiceError> {
        let vendedor = self.get_vendedor(id)?;
        self.commercial_report(&vendedor)
    }

    pub fn statistics(&self) -> DatasetStatistics {
        self.datasets.catalog().statistics()
    }

    pub fn categories(
        &self,
        dataset: &str,
    ) -> Result<(DatasetKind, Vec<String>), TerritoryServiceError> {
        let kind = DatasetKind::from_key(dataset)
            .ok_or_else(|| DatasetError::UnknownKind(dataset.to_string()))?;
        let names = self.datasets.catalog().category_names(kind)?;
        Ok((kind, names))
    }

    /// Re-reads the datasets and returns the statistics of the fresh snapshot.
    pub fn reload_datasets(&self) -> DatasetStatistics {
        let statistics = self.datasets.reload().statistics();
        info!(
            crops = statistics.total_crops,
            municipalities = statistics.total_municipalities,
            "datasets reloaded"
        );
        statistics
    }

    pub fn category_data(
        &self,
        dataset: &str,
        category: &str,
    ) -> Result<(DatasetKind, Vec<MunicipalityValue>), TerritoryServiceError> {
        let kind = DatasetKind::from_key(dataset)
            .ok_or_else(|| DatasetError::UnknownKind(dataset.to_string()))?;
        let values = self.datasets.catalog().dataset(kind)?;
        let data = analysis::category_municipalities(kind, &values, category)?;
        Ok((kind, data))
    }

    pub fn crop_data(&self, crop: &str) -> Result<CropMunicipalities, TerritoryServiceError> {
        self.with_crops(|crops| analysis::crop_municipalities(crops, crop))
    }

    pub fn crop_chart(&self, crop: &str) -> Result<CropChart, TerritoryServiceError> {
        self.with_crops(|crops| analysis::crop_chart(crops, crop))
    }

    pub fn crop_statistics(
        &self,
        crop: &str,
    ) -> Result<StatisticalSummary, TerritoryServiceError> {
        self.with_crops(|crops| analysis::statistical_summary(crops, crop))
    }

    pub fn crop_by_state(
        &self,
        crop: &str,
    ) -> Result<BTreeMap<String, StateRollup>, TerritoryServiceError> {
        self.with_crops(|crops| analysis::crop_by_state(crops, crop))
    }

    pub fn compare_crops(
        &self,
        crop1: &str,
        crop2: &str,
    ) -> Result<CropComparison, TerritoryServiceError> {
        self.with_crops(|crops| analysis::compare_crops(crops, crop1, crop2))
    }

    fn with_crops<T>(
        &self,
        lookup: impl FnOnce(&CategoryDataset) -> Result<T, LookupError>,
    ) -> Result<T, TerritoryServiceError> {
        let crops = self.datasets.catalog().dataset(DatasetKind::Crops)?;
        Ok(lookup(crops.as_ref())?)
    }

    fn analyze_territory<T: Territory>(&self, territory: &T) -> PotentialAnalysis {
        let codes = territory.municipality_set();
        info!(
            kind = T::KIND.label(),
            id = %territory.id(),
            municipios = codes.len(),
            "analyzing territory potential"
        );
        self.analyze_municipalities(&codes)
    }

    fn commercial_report<T: Territory>(
        &self,
        territory: &T,
    ) -> Result<CommercialReport, TerritoryServiceError> {
        let codes = territory.municipality_set();
        if codes.is_empty() {
            return Err(TerritoryServiceError::EmptyTerritory(T::KIND));
        }

        let context = ReportContext {
            heading: T::KIND.report_heading().to_string(),
            name: territory.nome().to_string(),
            profile: territory
                .profile()
                .into_iter()
                .map(|(label, value)| (label.to_string(), value))
                .collect(),
            municipality_count: codes.len(),
            generated_at: Utc::now(),
        };
        Ok(CommercialReport::from_snapshot(
            context,
            &self.datasets.catalog(),
            &codes,
            &self.analyzer,
        ))
    }
}

fn active<T, S>(store: &S) -> Result<Vec<T>, TerritoryServiceError>
where
    T: Territory,
    S: RecordStore<T> + ?Sized,
{
    Ok(store
        .list()?
        .into_iter()
        .filter(|record| record.is_active())
        .collect())
}

/// Rejects a record whose unique keys collide with another active record.
fn ensure_unique<T, S>(store: &S, candidate: &T) -> Result<(), TerritoryServiceError>
where
    T: Territory,
    S: RecordStore<T> + ?Sized,
{
    for existing in store.list()? {
        if existing.id() == candidate.id() || !existing.is_active() {
            continue;
        }
        for ((label, wanted), (_, taken)) in candidate
            .unique_keys()
            .into_iter()
            .zip(existing.unique_keys())
        {
            if wanted == taken {
                return Err(TerritoryServiceError::Duplicate(label));
            }
        }
    }
    Ok(())
}

/// Error raised by the territory service.
#[derive(Debug, thiserror::Error)]
pub enum TerritoryServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{} já cadastrado", .0)]
    Duplicate(&'static str),
    #[error("{}", not_found_message(.0))]
    NotFound(TerritoryKind),
    #[error("{}", empty_territory_message(.0))]
    EmptyTerritory(TerritoryKind),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn not_found_message(kind: &TerritoryKind) -> &'static str {
    match kind {
        TerritoryKind::Revenda => "Revenda não encontrada",
        TerritoryKind::Vendedor => "Vendedor não encontrado",
    }
}

fn empty_territory_message(kind: &TerritoryKind) -> &'static str {
    match kind {
        TerritoryKind::Revenda => "Nenhum município encontrado para esta revenda",
        TerritoryKind::Vendedor => "Nenhum município encontrado para este vendedor",
    }
}
