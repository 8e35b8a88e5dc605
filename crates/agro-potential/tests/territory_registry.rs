use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use agro_potential::datasets::{
    CategoryDataset, DatasetCatalog, DatasetKind, DatasetRecord, FileDatasetProvider,
    StaticDatasetProvider,
};
use agro_potential::registry::{
    territory_router, RecordStore, RepositoryError, Revenda, Territory, TerritoryId,
    TerritoryService, Vendedor,
};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

struct VecStore<T>(Mutex<BTreeMap<TerritoryId, T>>);

impl<T> Default for VecStore<T> {
    fn default() -> Self {
        Self(Mutex::new(BTreeMap::new()))
    }
}

impl<T: Territory> RecordStore<T> for VecStore<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        self.0
            .lock()
            .expect("store mutex poisoned")
            .insert(record.id(), record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<(), RepositoryError> {
        let mut records = self.0.lock().expect("store mutex poisoned");
        if !records.contains_key(&record.id()) {
            return Err(RepositoryError::NotFound);
        }
        records.insert(record.id(), record);
        Ok(())
    }

    fn fetch(&self, id: TerritoryId) -> Result<Option<T>, RepositoryError> {
        Ok(self.0.lock().expect("store mutex poisoned").get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

fn router() -> axum::Router {
    let mut crops = CategoryDataset::new();
    crops.insert("Café", "3106200", DatasetRecord::named(35.0, "Belo Horizonte", "MG"));
    crops.insert("Soja", "3170206", DatasetRecord::named(120_000.0, "Uberlândia", "MG"));
    let catalog = DatasetCatalog::new().with_dataset(DatasetKind::Crops, crops);

    let service = TerritoryService::new(
        Arc::new(VecStore::<Revenda>::default()),
        Arc::new(VecStore::<Vendedor>::default()),
        Arc::new(StaticDatasetProvider::new(catalog)),
    );
    territory_router(Arc::new(service))
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    (status, body.to_vec())
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("json payload")
}

#[tokio::test]
async fn revenda_lifecycle_from_registration_to_export() {
    let router = router();

    let (status, body) = send(
        &router,
        Request::post("/api/revendas")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "nome": "Café & Grãos",
                    "cnpj": "98.765.432/0001-10",
                    "cnae": "4623-1/06",
                    "cor": "#795548",
                    "municipios_codigos": ["3106200", 3170206]
                })
                .to_string(),
            ))
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json_body(&body)["revenda"]["id"]
        .as_u64()
        .expect("numeric id");

    let (status, body) = send(
        &router,
        Request::get(format!("/api/analise-potencial/{id}"))
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let analysis = &json_body(&body)["analysis"];
    assert_eq!(analysis["cropsDiversity"], json!(2));
    assert_eq!(analysis["topCrops"][0]["name"], json!("Soja"));

    let (status, body) = send(
        &router,
        Request::get(format!("/api/analise-comercial/csv/{id}?sheet=culturas"))
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let csv = String::from_utf8(body).expect("utf-8 csv");
    assert!(csv.lines().nth(1).expect("first crop").starts_with("Soja,120000.00,1,"));

    let (status, _) = send(
        &router,
        Request::delete(format!("/api/revendas/{id}"))
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &router,
        Request::get("/api/revendas")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(json_body(&body), json!({"success": true, "revendas": []}));
}

#[tokio::test]
async fn reload_route_picks_up_new_dataset_files() {
    let dir = std::env::temp_dir().join(format!(
        "agro-potential-reload-route-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch dir created");

    let service = TerritoryService::new(
        Arc::new(VecStore::<Revenda>::default()),
        Arc::new(VecStore::<Vendedor>::default()),
        Arc::new(FileDatasetProvider::open(&dir)),
    );
    let router = territory_router(Arc::new(service));

    let (status, _) = send(
        &router,
        Request::get("/api/crop-data/Soja")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    std::fs::write(
        dir.join(DatasetKind::Crops.file_name()),
        r#"{"Soja": {"5107925": {"harvested_area": 600000, "municipality_name": "Sorriso", "state_code": "MT"}}}"#,
    )
    .expect("crop file written");

    let (status, body) = send(
        &router,
        Request::post("/api/datasets/reload")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["statistics"]["total_crops"], json!(1));

    let (status, body) = send(
        &router,
        Request::get("/api/crop-data/Soja")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["data"][0]["municipality_name"], json!("Sorriso"));

    let _ = std::fs::remove_dir_all(&dir);
}
