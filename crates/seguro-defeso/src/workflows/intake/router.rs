use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{DocumentCategory, IntakeProfile, UploadedFile};
use super::orchestrator::{BatchSummary, IntakeLog, IntakeNotice};
use super::sessions::{IntakeSessionId, IntakeSessionView, IntakeSessions};

/// Router builder exposing the upload widget over HTTP.
pub fn intake_router(sessions: Arc<IntakeSessions>) -> Router {
    Router::new()
        .route("/api/v1/intake/sessions", post(open_handler))
        .route(
            "/api/v1/intake/sessions/:session_id",
            get(view_handler).delete(close_handler),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/files",
            post(upload_handler),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/documents/:category",
            delete(remove_handler),
        )
        .with_state(sessions)
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(default)]
    pub profile: Option<IntakeProfile>,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub summary: BatchSummary,
    pub notices: Vec<NoticeView>,
    #[serde(flatten)]
    pub session: IntakeSessionView,
}

#[derive(Debug, Serialize)]
pub struct NoticeView {
    pub message: String,
    #[serde(flatten)]
    pub notice: IntakeNotice,
}

impl From<IntakeNotice> for NoticeView {
    fn from(notice: IntakeNotice) -> Self {
        Self {
            message: notice.message(),
            notice,
        }
    }
}

fn session_not_found(id: &IntakeSessionId) -> Response {
    let payload = json!({
        "error": format!("intake session {} not found", id.0),
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

async fn open_handler(
    State(sessions): State<Arc<IntakeSessions>>,
    request: Option<axum::Json<OpenSessionRequest>>,
) -> Response {
    let profile = request.and_then(|axum::Json(body)| body.profile);
    let session = sessions.open(profile);
    (StatusCode::CREATED, axum::Json(session.view().await)).into_response()
}

async fn view_handler(
    State(sessions): State<Arc<IntakeSessions>>,
    Path(session_id): Path<String>,
) -> Response {
    let id = IntakeSessionId(session_id);
    match sessions.get(&id) {
        Some(session) => (StatusCode::OK, axum::Json(session.view().await)).into_response(),
        None => session_not_found(&id),
    }
}

async fn close_handler(
    State(sessions): State<Arc<IntakeSessions>>,
    Path(session_id): Path<String>,
) -> Response {
    let id = IntakeSessionId(session_id);
    if sessions.close(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_not_found(&id)
    }
}

async fn upload_handler(
    State(sessions): State<Arc<IntakeSessions>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<UploadRequest>,
) -> Response {
    let id = IntakeSessionId(session_id);
    let Some(session) = sessions.get(&id) else {
        return session_not_found(&id);
    };

    let mut log = IntakeLog::default();
    let mut orchestrator = session.orchestrator.lock().await;
    let summary = orchestrator.process_batch(request.files, &mut log).await;
    let view = IntakeSessionView::from_orchestrator(&session.id, session.profile, &orchestrator);

    let response = UploadResponse {
        summary,
        notices: log.notices.into_iter().map(NoticeView::from).collect(),
        session: view,
    };
    (StatusCode::OK, axum::Json(response)).into_response()
}

async fn remove_handler(
    State(sessions): State<Arc<IntakeSessions>>,
    Path((session_id, category)): Path<(String, String)>,
) -> Response {
    let id = IntakeSessionId(session_id);
    let Some(session) = sessions.get(&id) else {
        return session_not_found(&id);
    };
    let Some(category) = DocumentCategory::from_code(&category) else {
        let payload = json!({
            "error": format!("unknown document category '{category}'"),
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    };

    let mut log = IntakeLog::default();
    let mut orchestrator = session.orchestrator.lock().await;
    let removed = orchestrator.remove_document(category, &mut log);
    let view = IntakeSessionView::from_orchestrator(&session.id, session.profile, &orchestrator);

    if removed {
        (StatusCode::OK, axum::Json(view)).into_response()
    } else {
        let payload = json!({
            "error": format!("no document bound to {}", category.code()),
        });
        (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
    }
}
