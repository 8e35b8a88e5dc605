use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryStore};
use crate::routes::with_portal_routes;
use agro_potential::config::AppConfig;
use agro_potential::datasets::{DatasetProvider, FileDatasetProvider};
use agro_potential::error::AppError;
use agro_potential::registry::{Revenda, TerritoryService, Vendedor};
use agro_potential::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.datasets.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let datasets = Arc::new(FileDatasetProvider::open(&config.datasets.data_dir));
    let catalog = datasets.catalog();
    for (kind, reason) in catalog.unavailable() {
        warn!(dataset = %kind, %reason, "serving without dataset");
    }
    let statistics = catalog.statistics();
    info!(
        data_dir = %config.datasets.data_dir.display(),
        crops = statistics.total_crops,
        municipalities = statistics.total_municipalities,
        "datasets ready"
    );

    let territory_service = Arc::new(TerritoryService::new(
        Arc::new(InMemoryStore::<Revenda>::default()),
        Arc::new(InMemoryStore::<Vendedor>::default()),
        datasets,
    ));

    let app = with_portal_routes(territory_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "agro potential portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
