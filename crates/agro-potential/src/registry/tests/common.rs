use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::datasets::{
    CategoryDataset, DatasetCatalog, DatasetKind, DatasetRecord, MunicipalityCode,
    StaticDatasetProvider,
};
use crate::registry::domain::{NewRevenda, NewVendedor, Territory, TerritoryId};
use crate::registry::repository::{RecordStore, RepositoryError};
use crate::registry::{territory_router, Revenda, TerritoryService, Vendedor};

pub(super) const SORRISO: &str = "5107925";
pub(super) const CUIABA: &str = "5103403";

pub(super) struct MemoryStore<T> {
    records: Mutex<BTreeMap<TerritoryId, T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T: Territory> RecordStore<T> for MemoryStore<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut records = self.records.lock().expect("store mutex poisoned");
        if records.contains_key(&record.id()) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(record.id(), record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("store mutex poisoned");
        match records.get_mut(&record.id()) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: TerritoryId) -> Result<Option<T>, RepositoryError> {
        let records = self.records.lock().expect("store mutex poisoned");
        Ok(records.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        let records = self.records.lock().expect("store mutex poisoned");
        Ok(records.values().cloned().collect())
    }
}

pub(super) struct UnavailableStore;

impl<T: Territory> RecordStore<T> for UnavailableStore {
    fn insert(&self, _record: T) -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: T) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: TerritoryId) -> Result<Option<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryService =
    TerritoryService<MemoryStore<Revenda>, MemoryStore<Vendedor>, StaticDatasetProvider>;

pub(super) fn catalog() -> DatasetCatalog {
    let mut crops = CategoryDataset::new();
    crops.insert("Soja", SORRISO, DatasetRecord::named(600_000.0, "Sorriso", "MT"));
    crops.insert("Milho", SORRISO, DatasetRecord::named(400_000.0, "Sorriso", "MT"));
    crops.insert("Soja", CUIABA, DatasetRecord::named(2_000.0, "Cuiabá", "MT"));

    let mut receitas = CategoryDataset::new();
    receitas.insert("Total", SORRISO, DatasetRecord::named(900_000.0, "Sorriso", "MT"));
    receitas.insert("Total", CUIABA, DatasetRecord::named(100_000.0, "Cuiabá", "MT"));
    let mut despesas = CategoryDataset::new();
    despesas.insert("Total", SORRISO, DatasetRecord::named(300_000.0, "Sorriso", "MT"));

    DatasetCatalog::new()
        .with_dataset(DatasetKind::Crops, crops)
        .with_dataset(
            DatasetKind::Fertilizers,
            CategoryDataset::new()
                .with_value("Total Estabelecimentos", SORRISO, 500.0)
                .with_value("Adubação química", SORRISO, 320.0)
                .with_value("Adubação orgânica", CUIABA, 40.0),
        )
        .with_dataset(
            DatasetKind::Escolaridade,
            CategoryDataset::new().with_value("Ensino médio", SORRISO, 210.0),
        )
        .with_dataset(DatasetKind::Receitas, receitas)
        .with_dataset(DatasetKind::Despesas, despesas)
}

pub(super) fn build_service() -> MemoryService {
    TerritoryService::new(
        Arc::new(MemoryStore::default()),
        Arc::new(MemoryStore::default()),
        Arc::new(StaticDatasetProvider::new(catalog())),
    )
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    territory_router(Arc::new(service))
}

pub(super) fn revenda_payload(cnpj: &str) -> NewRevenda {
    NewRevenda {
        nome: "Agro Sul".to_string(),
        cnpj: cnpj.to_string(),
        cnae: "4683-4/00".to_string(),
        municipios: vec![MunicipalityCode::from(SORRISO), MunicipalityCode::from(CUIABA)],
        ..NewRevenda::default()
    }
}

pub(super) fn vendedor_payload(email: &str, cpf: &str) -> NewVendedor {
    NewVendedor {
        nome: "Ana Souza".to_string(),
        email: email.to_string(),
        telefone: "65 99999-0000".to_string(),
        cpf: cpf.to_string(),
        municipios: vec![MunicipalityCode::from(SORRISO)],
        ..NewVendedor::default()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
