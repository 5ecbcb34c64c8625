use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use super::domain::{
    CaseStatus, ProcessImport, ProcessStatus, RecordId, SolicitationStatus,
    SolicitationSubmission,
};
use super::export::{export_cases_csv, export_processes_csv, CsvDocument};
use crate::error::AppError;
use super::listing::ListQuery;
use super::report::{
    render_analysis_report, render_document_request, render_process_report, TextDocument,
};
use super::repository::{CaseRepository, NotificationSink};
use super::service::{CaseService, CaseServiceError};

/// Router builder exposing solicitations, processes and the case overview.
pub fn case_router<R, N>(service: Arc<CaseService<R, N>>) -> Router
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/solicitacoes",
            post(submit_handler::<R, N>).get(list_solicitations_handler::<R, N>),
        )
        .route(
            "/api/v1/solicitacoes/:id",
            get(solicitation_handler::<R, N>),
        )
        .route(
            "/api/v1/solicitacoes/:id/approve",
            post(approve_handler::<R, N>),
        )
        .route(
            "/api/v1/solicitacoes/:id/processo",
            post(convert_handler::<R, N>),
        )
        .route(
            "/api/v1/solicitacoes/:id/relatorio",
            get(analysis_report_handler::<R, N>),
        )
        .route(
            "/api/v1/solicitacoes/:id/documentos-pendentes",
            get(document_request_handler::<R, N>),
        )
        .route(
            "/api/v1/processos",
            get(list_processes_handler::<R, N>).post(register_process_handler::<R, N>),
        )
        .route(
            "/api/v1/processos/export",
            get(export_processes_handler::<R, N>),
        )
        .route("/api/v1/processos/:id", get(process_handler::<R, N>))
        .route(
            "/api/v1/processos/:id/relatorio",
            get(process_report_handler::<R, N>),
        )
        .route("/api/v1/casos", get(list_cases_handler::<R, N>))
        .route("/api/v1/casos/export", get(export_cases_handler::<R, N>))
        .with_state(service)
}

pub(crate) fn error_response(error: CaseServiceError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        warn!(error = %error, "case request failed");
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn download(file_name: &str, mime: &'static str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

fn text_download(document: TextDocument) -> Response {
    download(&document.file_name, document.mime, document.body)
}

fn csv_download(document: CsvDocument) -> Response {
    download(&document.file_name, document.mime, document.body)
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    axum::Json(submission): axum::Json<SolicitationSubmission>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.submit(submission).await {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_solicitations_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Query(query): Query<ListQuery<SolicitationStatus>>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.list_solicitations(&query) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn solicitation_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.get_solicitation(&RecordId(id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.approve(&RecordId(id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn convert_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.convert_to_process(&RecordId(id)) {
        Ok(process) => (StatusCode::CREATED, axum::Json(process)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn analysis_report_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.get_solicitation(&RecordId(id)) {
        Ok(record) => text_download(render_analysis_report(&record, Utc::now())),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn document_request_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.get_solicitation(&RecordId(id)) {
        Ok(record) => text_download(render_document_request(&record, Utc::now())),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_processes_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Query(query): Query<ListQuery<ProcessStatus>>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.list_processes(&query) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_process_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    axum::Json(import): axum::Json<ProcessImport>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.register_process(import) {
        Ok(process) => (StatusCode::CREATED, axum::Json(process)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn process_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.get_process(&RecordId(id)) {
        Ok(process) => (StatusCode::OK, axum::Json(process)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn process_report_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.get_process(&RecordId(id)) {
        Ok(process) => text_download(render_process_report(&process, Utc::now())),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_processes_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Query(query): Query<ListQuery<ProcessStatus>>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    let records = match service.matching_processes(&query) {
        Ok(records) => records,
        Err(error) => return error_response(error),
    };
    match export_processes_csv(&records, Utc::now().date_naive()) {
        Ok(document) => csv_download(document),
        Err(error) => {
            warn!(error = %error, "csv export failed");
            AppError::from(error).into_response()
        }
    }
}

pub(crate) async fn list_cases_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Query(query): Query<ListQuery<CaseStatus>>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.list_cases(&query) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_cases_handler<R, N>(
    State(service): State<Arc<CaseService<R, N>>>,
    Query(query): Query<ListQuery<CaseStatus>>,
) -> Response
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    let records = match service.matching_cases(&query) {
        Ok(records) => records,
        Err(error) => return error_response(error),
    };
    match export_cases_csv(&records, Utc::now().date_naive()) {
        Ok(document) => csv_download(document),
        Err(error) => {
            warn!(error = %error, "csv export failed");
            AppError::from(error).into_response()
        }
    }
}
