use crate::cli::ServeArgs;
use crate::infra::{load_stations, AppState, InMemoryStore};
use crate::routes::with_outreach_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use outreach::config::AppConfig;
use outreach::error::AppError;
use outreach::store::RestStoreClient;
use outreach::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let routes = if config.store.url.is_some() {
        if args.stations.is_some() {
            warn!("ignoring --stations because STORE_URL is configured");
        }
        let client = Arc::new(RestStoreClient::new(&config.store)?);
        info!(bucket = %config.store.bucket, "using hosted store");
        with_outreach_routes(client.clone(), client)
    } else {
        let stations = load_stations(args.stations.as_deref())?;
        let store = Arc::new(InMemoryStore::with_stations(stations));
        info!("STORE_URL not set; using in-memory store");
        with_outreach_routes(store.clone(), store)
    };

    let app = routes
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "outreach tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
