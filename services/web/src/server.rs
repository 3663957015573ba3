use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use careers_site::config::AppConfig;
use careers_site::error::AppError;
use careers_site::http::ReqwestGateway;
use careers_site::telemetry;
use careers_site::{site_router, SiteState};
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let gateway = Arc::new(ReqwestGateway::new(&config.upstream)?);
    let site = Arc::new(
        SiteState::new(
            gateway,
            &config.greenhouse,
            &config.partners,
            config.templates_dir.clone(),
        )
        .with_upload_limit(config.max_upload_bytes),
    );

    let app = operational_routes()
        .merge(site_router(site))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "careers site ready");

    axum::serve(listener, app).await?;
    Ok(())
}
