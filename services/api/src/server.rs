use crate::cli::ServeArgs;
use crate::demo::DemoStack;
use crate::infra::{AppState, ConfiguredIdentity};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use society_hub::config::AppConfig;
use society_hub::error::AppError;
use society_hub::telemetry;
use society_hub::{HubState, ServiceError, SocietyService, TenantContext};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
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
    let context = Arc::new(RwLock::new(TenantContext::new()));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        context: context.clone(),
    };

    let stack = DemoStack::seeded().map_err(ServiceError::from)?;
    info!(
        units = stack.units.len(),
        bills = stack.bills.len(),
        complaints = stack.complaints.len(),
        visitors = stack.visitors.len(),
        events = stack.events.len(),
        "seeded in-memory repositories"
    );
    let service = Arc::new(SocietyService::new(stack.repositories()));

    let app = with_operational_routes(HubState::new(service, context.clone()))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    let identity = ConfiguredIdentity::new(config.session.principal());
    context.write().await.refresh(&identity, &stack.directory)?;

    info!(?config.environment, %addr, "society hub ready");

    axum::serve(listener, app).await?;
    Ok(())
}
