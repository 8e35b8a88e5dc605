use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::datasets::{DatasetError, DatasetProvider, MunicipalityCode, MunicipalitySet};
use crate::export::{render_sheet, CommercialReport, CommercialSheet, ExportError};

use super::domain::{
    NewRevenda, NewVendedor, Revenda, RevendaUpdate, TerritoryId, TerritoryView,
    ValidationError, Vendedor, VendedorUpdate,
};
use super::repository::{RecordStore, RepositoryError};
use super::service::{TerritoryService, TerritoryServiceError};

type SharedService<R, V, P> = State<Arc<TerritoryService<R, V, P>>>;

/// Router exposing the registry, potential analysis and CSV export endpoints.
pub fn territory_router<R, V, P>(service: Arc<TerritoryService<R, V, P>>) -> Router
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    Router::new()
        .route("/api/statistics", get(statistics_handler::<R, V, P>))
        .route(
            "/api/datasets/:dataset/categories",
            get(categories_handler::<R, V, P>),
        )
        .route(
            "/api/datasets/:dataset/categories/:category",
            get(category_data_handler::<R, V, P>),
        )
        .route("/api/datasets/reload", post(reload_datasets_handler::<R, V, P>))
        .route("/api/crop-data/:crop", get(crop_data_handler::<R, V, P>))
        .route("/api/crop-chart-data/:crop", get(crop_chart_handler::<R, V, P>))
        .route(
            "/api/analysis/statistical-summary/:crop",
            get(crop_statistics_handler::<R, V, P>),
        )
        .route("/api/analysis/by-state/:crop", get(crop_by_state_handler::<R, V, P>))
        .route(
            "/api/analysis/comparison/:crop1/:crop2",
            get(crop_comparison_handler::<R, V, P>),
        )
        .route("/api/analise-potencial", post(analyze_selection_handler::<R, V, P>))
        .route(
            "/api/analise-potencial/:revenda_id",
            get(revenda_potential_handler::<R, V, P>),
        )
        .route(
            "/api/analise-potencial-vendedor/:vendedor_id",
            get(vendedor_potential_handler::<R, V, P>),
        )
        .route(
            "/api/revendas",
            get(list_revendas_handler::<R, V, P>).post(create_revenda_handler::<R, V, P>),
        )
        .route(
            "/api/revendas/:revenda_id",
            put(update_revenda_handler::<R, V, P>).delete(delete_revenda_handler::<R, V, P>),
        )
        .route(
            "/api/vendedores",
            get(list_vendedores_handler::<R, V, P>).post(create_vendedor_handler::<R, V, P>),
        )
        .route(
            "/api/vendedores/:vendedor_id",
            put(update_vendedor_handler::<R, V, P>).delete(delete_vendedor_handler::<R, V, P>),
        )
        .route(
            "/api/analise-comercial/csv/:revenda_id",
            get(revenda_csv_handler::<R, V, P>),
        )
        .route(
            "/api/analise-comercial-vendedor/csv/:vendedor_id",
            get(vendedor_csv_handler::<R, V, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub municipios: Vec<MunicipalityCode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SheetQuery {
    pub sheet: Option<String>,
}

impl TerritoryServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::EmptyTerritory(_) => StatusCode::BAD_REQUEST,
            Self::Duplicate(_) | Self::Repository(RepositoryError::Conflict) => {
                StatusCode::CONFLICT
            }
            Self::NotFound(_)
            | Self::Repository(RepositoryError::NotFound)
            | Self::Lookup(_)
            | Self::Dataset(DatasetError::UnknownKind(_)) => StatusCode::NOT_FOUND,
            Self::Dataset(_) | Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn failure(status: StatusCode, message: impl ToString) -> Response {
    let payload = json!({
        "success": false,
        "error": message.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn service_failure(error: TerritoryServiceError) -> Response {
    failure(error.status_code(), error)
}

pub(crate) async fn statistics_handler<R, V, P>(State(service): SharedService<R, V, P>) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    let payload = json!({
        "success": true,
        "statistics": service.statistics(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn categories_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(dataset): Path<String>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.categories(&dataset) {
        Ok((kind, categories)) => {
            let payload = json!({
                "success": true,
                "dataset": kind.key(),
                "categories": categories,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn reload_datasets_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    let payload = json!({
        "success": true,
        "statistics": service.reload_datasets(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn category_data_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path((dataset, category)): Path<(String, String)>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.category_data(&dataset, &category) {
        Ok((kind, data)) => {
            let payload = json!({
                "success": true,
                "dataset": kind.key(),
                "category": category,
                "data": data,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn crop_data_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(crop): Path<String>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.crop_data(&crop) {
        Ok(listing) => {
            let mut payload = json!({
                "success": true,
                "data": listing.data,
            });
            if let Some(matched) = listing.matched_crop {
                payload["matched_crop"] = json!(matched);
            }
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn crop_chart_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(crop): Path<String>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.crop_chart(&crop) {
        Ok(chart) => {
            let payload = json!({
                "success": true,
                "chart_data": chart,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn crop_statistics_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(crop): Path<String>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.crop_statistics(&crop) {
        Ok(summary) => {
            let payload = json!({
                "success": true,
                "summary": summary,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn crop_by_state_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(crop): Path<String>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.crop_by_state(&crop) {
        Ok(states) => {
            let payload = json!({
                "success": true,
                "states_data": states,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn crop_comparison_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path((crop1, crop2)): Path<(String, String)>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.compare_crops(&crop1, &crop2) {
        Ok(comparison) => {
            let mut payload = json!(comparison);
            payload["success"] = json!(true);
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn analyze_selection_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    axum::Json(request): axum::Json<SelectionRequest>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    let codes: MunicipalitySet = request
        .municipios
        .into_iter()
        .map(|code| MunicipalityCode::from(code.0))
        .filter(|code| !code.as_str().is_empty())
        .collect();
    if codes.is_empty() {
        return failure(StatusCode::BAD_REQUEST, ValidationError::NoMunicipalities);
    }

    let analysis = service.analyze_municipalities(&codes);
    let payload = json!({
        "success": true,
        "analysis": analysis,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn revenda_potential_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(revenda_id): Path<u64>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.analyze_revenda_potential(TerritoryId(revenda_id)) {
        Ok(analysis) => {
            let payload = json!({
                "success": true,
                "analysis": analysis,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn vendedor_potential_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(vendedor_id): Path<u64>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.analyze_vendedor_potential(TerritoryId(vendedor_id)) {
        Ok(analysis) => {
            let payload = json!({
                "success": true,
                "analysis": analysis,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn list_revendas_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.list_revendas() {
        Ok(revendas) => {
            let revendas: Vec<TerritoryView<Revenda>> =
                revendas.into_iter().map(TerritoryView::from).collect();
            let payload = json!({
                "success": true,
                "revendas": revendas,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn create_revenda_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    axum::Json(payload): axum::Json<NewRevenda>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.create_revenda(payload) {
        Ok(revenda) => {
            let payload = json!({
                "success": true,
                "message": "Revenda cadastrada com sucesso!",
                "revenda": TerritoryView::from(revenda),
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn update_revenda_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(revenda_id): Path<u64>,
    axum::Json(changes): axum::Json<RevendaUpdate>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.update_revenda(TerritoryId(revenda_id), changes) {
        Ok(revenda) => {
            let payload = json!({
                "success": true,
                "message": "Revenda atualizada com sucesso!",
                "revenda": TerritoryView::from(revenda),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn delete_revenda_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(revenda_id): Path<u64>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.deactivate_revenda(TerritoryId(revenda_id)) {
        Ok(_) => {
            let payload = json!({
                "success": true,
                "message": "Revenda removida com sucesso!",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn list_vendedores_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.list_vendedores() {
        Ok(vendedores) => {
            let vendedores: Vec<TerritoryView<Vendedor>> =
                vendedores.into_iter().map(TerritoryView::from).collect();
            let payload = json!({
                "success": true,
                "vendedores": vendedores,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn create_vendedor_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    axum::Json(payload): axum::Json<NewVendedor>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.create_vendedor(payload) {
        Ok(vendedor) => {
            let payload = json!({
                "success": true,
                "message": "Vendedor cadastrado com sucesso!",
                "vendedor": TerritoryView::from(vendedor),
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn update_vendedor_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(vendedor_id): Path<u64>,
    axum::Json(changes): axum::Json<VendedorUpdate>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.update_vendedor(TerritoryId(vendedor_id), changes) {
        Ok(vendedor) => {
            let payload = json!({
                "success": true,
                "message": "Vendedor atualizado com sucesso!",
                "vendedor": TerritoryView::from(vendedor),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn delete_vendedor_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(vendedor_id): Path<u64>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.deactivate_vendedor(TerritoryId(vendedor_id)) {
        Ok(_) => {
            let payload = json!({
                "success": true,
                "message": "Vendedor removido com sucesso!",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn revenda_csv_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(revenda_id): Path<u64>,
    Query(query): Query<SheetQuery>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.commercial_revenda(TerritoryId(revenda_id)) {
        Ok(report) => csv_response(&report, query),
        Err(error) => service_failure(error),
    }
}

pub(crate) async fn vendedor_csv_handler<R, V, P>(
    State(service): SharedService<R, V, P>,
    Path(vendedor_id): Path<u64>,
    Query(query): Query<SheetQuery>,
) -> Response
where
    R: RecordStore<Revenda> + 'static,
    V: RecordStore<Vendedor> + 'static,
    P: DatasetProvider + 'static,
{
    match service.commercial_vendedor(TerritoryId(vendedor_id)) {
        Ok(report) => csv_response(&report, query),
        Err(error) => service_failure(error),
    }
}

fn csv_response(report: &CommercialReport, query: SheetQuery) -> Response {
    let sheet = match query.sheet.as_deref().map(str::parse::<CommercialSheet>) {
        None => CommercialSheet::Resumo,
        Some(Ok(sheet)) => sheet,
        Some(Err(error)) => return failure(StatusCode::BAD_REQUEST, error),
    };

    match render_sheet(report, sheet) {
        Ok(body) => {
            let disposition = format!("attachment; filename=\"{}\"", report.file_name(sheet));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(error @ ExportError::UnknownSheet(_)) => failure(StatusCode::BAD_REQUEST, error),
        Err(error) => failure(StatusCode::INTERNAL_SERVER_ERROR, error),
    }
}
