use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use seguro_defeso::workflows::cases::{case_router, CaseRepository, CaseService, NotificationSink};
use seguro_defeso::workflows::intake::{intake_router, IntakeSessions};

/// Full HTTP surface: case tracking, intake sessions and the operational endpoints.
pub(crate) fn with_office_routes<R, N>(
    service: Arc<CaseService<R, N>>,
    sessions: Arc<IntakeSessions>,
) -> axum::Router
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    case_router(service)
        .merge(intake_router(sessions))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
