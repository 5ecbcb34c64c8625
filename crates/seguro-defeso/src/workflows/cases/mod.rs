//! Solicitations, judicial processes and the combined case overview.

pub mod domain;
pub mod export;
pub mod listing;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Case, CaseStatus, Claimant, CourtDetails, DocumentRecord, DocumentStatus, Priority, Process,
    ProcessImport, ProcessNumberIssuer, ProcessStatus, RecordId, Solicitation,
    SolicitationStatus, SolicitationSubmission, SubmittedDocument,
};
pub use export::{export_cases_csv, export_processes_csv, CsvDocument, ExportError};
pub use listing::{ListQuery, ListState, Listable, Page, SortField, SortOrder, PAGE_SIZE};
pub use report::{
    render_analysis_report, render_document_request, render_process_report, TextDocument,
};
pub use repository::{CaseRepository, NotificationError, NotificationSink, RepositoryError};
pub use router::case_router;
pub use service::{derive_status, CaseService, CaseServiceError};
