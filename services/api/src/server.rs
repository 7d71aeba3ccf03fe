use crate::cli::ServeArgs;
use crate::infra::{AppState, CurveStore};
use crate::routes::with_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use labspace::config::AppConfig;
use labspace::error::AppError;
use labspace::telemetry;
use labspace::workflows::selection::{CsvMaterialRepository, MaterialSelectionService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        tensile_files: Arc::new(CurveStore::default()),
        dsc_files: Arc::new(CurveStore::default()),
    };

    let catalog_path = config.storage.data_dir.join("materials.csv");
    let repository = Arc::new(CsvMaterialRepository::open(&catalog_path)?);
    let selection_service = Arc::new(MaterialSelectionService::new(repository));

    let app = with_routes(selection_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, catalog = %catalog_path.display(), "lab common space ready");

    axum::serve(listener, app).await?;
    Ok(())
}
