use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCaseRepository, InMemoryNotificationSink};
use crate::routes::with_office_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use seguro_defeso::config::AppConfig;
use seguro_defeso::error::AppError;
use seguro_defeso::telemetry;
use seguro_defeso::workflows::cases::CaseService;
use seguro_defeso::workflows::eligibility::EligibilityEngine;
use seguro_defeso::workflows::intake::IntakeSessions;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryCaseRepository::default());
    let notifications = Arc::new(InMemoryNotificationSink::default());
    let engine = EligibilityEngine::for_profile(config.intake.profile, config.intake.simulate_latency);
    let case_service = Arc::new(CaseService::new(repository, notifications, engine));
    let sessions = Arc::new(IntakeSessions::new(config.intake));

    let app = with_office_routes(case_service, sessions)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        profile = config.intake.profile.label(),
        "seguro-defeso office api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
