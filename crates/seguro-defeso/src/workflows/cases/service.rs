use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use tracing::{info, warn};

use super::domain::{
    Case, CaseStatus, Claimant, DocumentRecord, DocumentStatus, Priority, Process, ProcessImport,
    ProcessNumberIssuer, ProcessStatus, RecordId, Solicitation, SolicitationStatus,
    SolicitationSubmission,
};
use super::listing::{ListQuery, Page};
use super::repository::{CaseRepository, NotificationError, NotificationSink, RepositoryError};
use crate::notifications::{Notification, NotificationKind, NotificationPriority};
use crate::workflows::eligibility::{EligibilityEngine, EligibilityResult};

pub const DEFAULT_TRIBUNAL: &str = "TJSP";
pub const DEFAULT_COURT_BODY: &str = "Vara Cível";
pub const DEFAULT_PROCEDURAL_CLASS: &str = "Procedimento Comum Cível";
pub const DEFAULT_SUBJECT: &str = "Seguro-Defeso";
pub const DEFAULT_SITUATION: &str = "Distribuído";

static SOLICITATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PROCESS_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DOCUMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(sequence: &AtomicU64, prefix: &str) -> RecordId {
    let id = sequence.fetch_add(1, Ordering::Relaxed);
    RecordId(format!("{prefix}-{id:06}"))
}

/// Status a freshly analysed solicitation lands in.
pub fn derive_status(analysis: Option<&EligibilityResult>, threshold: u8) -> SolicitationStatus {
    match analysis {
        None => SolicitationStatus::Pendente,
        Some(result) if result.score >= threshold => SolicitationStatus::Aprovada,
        Some(result) if !result.missing_categories.is_empty() => {
            SolicitationStatus::DocumentacaoIncompleta
        }
        Some(_) => SolicitationStatus::EmAnalise,
    }
}

/// Service composing the repository, the eligibility engine and notification hooks.
pub struct CaseService<R, N> {
    repository: Arc<R>,
    notifications: Arc<N>,
    engine: Arc<EligibilityEngine>,
    issuer: Arc<ProcessNumberIssuer>,
    /// Held across fetch, check and write of a status transition.
    transitions: Arc<Mutex<()>>,
}

impl<R, N> CaseService<R, N>
where
    R: CaseRepository + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(repository: Arc<R>, notifications: Arc<N>, engine: EligibilityEngine) -> Self {
        Self {
            repository,
            notifications,
            engine: Arc::new(engine),
            issuer: Arc::new(ProcessNumberIssuer::default()),
            transitions: Arc::new(Mutex::new(())),
        }
    }

    fn lock_transitions(&self) -> MutexGuard<'_, ()> {
        self.transitions
            .lock()
            .expect("transition mutex poisoned")
    }

    pub fn with_issuer(mut self, issuer: ProcessNumberIssuer) -> Self {
        self.issuer = Arc::new(issuer);
        self
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    /// File a new solicitation, scoring it when at least one document was attached.
    pub async fn submit(
        &self,
        submission: SolicitationSubmission,
    ) -> Result<Solicitation, CaseServiceError> {
        if submission.claimant.name.trim().is_empty() {
            return Err(CaseServiceError::EmptyClaimant);
        }

        let now = Utc::now();
        let documents: Vec<DocumentRecord> = submission
            .documents
            .iter()
            .map(|document| DocumentRecord {
                id: next_id(&DOCUMENT_SEQUENCE, "doc"),
                category: document.category,
                name: document.file_name.clone(),
                url: format!("/uploads/{}", document.file_name),
                uploaded_at: now,
                status: DocumentStatus::Presente,
                expires_on: None,
            })
            .collect();

        let categories: Vec<_> = documents.iter().map(|document| document.category).collect();
        let analysis = if categories.is_empty() {
            None
        } else {
            Some(self.engine.analyze(&categories).await)
        };
        let status = derive_status(analysis.as_ref(), self.engine.approval_threshold());

        let record = Solicitation {
            id: next_id(&SOLICITATION_SEQUENCE, "sol"),
            claimant: submission.claimant,
            status,
            documents,
            analysis,
            created_at: now,
            updated_at: now,
            lawyer_notes: submission.lawyer_notes,
            priority: submission.priority,
            process_id: None,
        };

        let stored = self.repository.insert_solicitation(record)?;
        info!(
            solicitation = %stored.id,
            status = stored.status.code(),
            documents = stored.documents.len(),
            "solicitation submitted"
        );

        self.notifications.publish(
            Notification::new(
                NotificationKind::CaseCreated,
                NotificationPriority::Medium,
                "Nova Solicitação",
                format!("Solicitação de {} cadastrada", stored.claimant.name),
            )
            .for_case(stored.id.0.clone()),
        )?;

        if let Some(analysis) = &stored.analysis {
            let notification = if stored.status == SolicitationStatus::DocumentacaoIncompleta {
                let missing: Vec<&str> = analysis
                    .missing_categories
                    .iter()
                    .map(|category| category.label())
                    .collect();
                Notification::new(
                    NotificationKind::DocumentMissing,
                    NotificationPriority::Medium,
                    "Documentos Faltantes",
                    format!(
                        "A solicitação de {} está com documentação incompleta. Faltam: {}",
                        stored.claimant.name,
                        missing.join(", ")
                    ),
                )
            } else {
                Notification::new(
                    NotificationKind::AnalysisComplete,
                    NotificationPriority::High,
                    "Análise Concluída",
                    format!(
                        "A análise de {} foi concluída com score de {}%",
                        stored.claimant.name, analysis.score
                    ),
                )
            };
            self.notifications
                .publish(notification.for_case(stored.id.0.clone()))?;
        }

        Ok(stored)
    }

    pub fn approve(&self, id: &RecordId) -> Result<Solicitation, CaseServiceError> {
        let record = {
            let _transition = self.lock_transitions();
            let mut record = self.get_solicitation(id)?;
            if !record.status.is_open() {
                warn!(solicitation = %id, status = record.status.code(), "approve rejected");
                return Err(CaseServiceError::InvalidTransition {
                    from: record.status.code(),
                    action: "approve",
                });
            }

            record.status = SolicitationStatus::Aprovada;
            record.updated_at = Utc::now();
            self.repository.update_solicitation(record.clone())?;
            record
        };
        info!(solicitation = %id, "solicitation approved");

        self.notifications.publish(
            Notification::new(
                NotificationKind::StatusChange,
                NotificationPriority::Medium,
                "Solicitação Aprovada",
                format!(
                    "A solicitação de {} foi aprovada e pode virar processo",
                    record.claimant.name
                ),
            )
            .for_case(id.0.clone()),
        )?;

        Ok(record)
    }

    /// Open a judicial process from an approved solicitation. Each solicitation converts once.
    pub fn convert_to_process(&self, id: &RecordId) -> Result<Process, CaseServiceError> {
        let transition = self.lock_transitions();
        let mut solicitation = self.get_solicitation(id)?;
        if solicitation.status != SolicitationStatus::Aprovada || solicitation.process_id.is_some()
        {
            return Err(CaseServiceError::InvalidTransition {
                from: solicitation.status.code(),
                action: "convert_to_process",
            });
        }

        let now = Utc::now();
        let today = now.date_naive();
        let score = solicitation
            .analysis
            .as_ref()
            .map(|analysis| analysis.score.to_string())
            .unwrap_or_else(|| "-".to_string());

        let process = Process {
            id: next_id(&PROCESS_SEQUENCE, "proc"),
            claimant: solicitation.claimant.clone(),
            status: ProcessStatus::EmAndamento,
            documents: solicitation.documents.clone(),
            process_number: self.issuer.issue(today.year()),
            tribunal: DEFAULT_TRIBUNAL.to_string(),
            court_body: Some(DEFAULT_COURT_BODY.to_string()),
            procedural_class: Some(DEFAULT_PROCEDURAL_CLASS.to_string()),
            subject: Some(DEFAULT_SUBJECT.to_string()),
            situation: Some(DEFAULT_SITUATION.to_string()),
            filed_on: today,
            movements: Some(1),
            last_movement: Some(today),
            created_at: now,
            updated_at: now,
            lawyer_notes: Some(format!(
                "Processo originado da solicitação #{}. Score IA: {score}%",
                solicitation.id
            )),
            priority: solicitation.priority,
            solicitation_id: Some(solicitation.id.clone()),
        };

        let stored = self.repository.insert_process(process)?;
        solicitation.process_id = Some(stored.id.clone());
        solicitation.updated_at = now;
        self.repository.update_solicitation(solicitation)?;
        drop(transition);
        info!(
            solicitation = %id,
            process = %stored.id,
            number = %stored.process_number,
            "solicitation converted to process"
        );

        self.notifications.publish(
            Notification::new(
                NotificationKind::StatusChange,
                NotificationPriority::High,
                "Processo Criado",
                format!("Processo {} criado com sucesso!", stored.process_number),
            )
            .for_case(stored.id.0.clone()),
        )?;

        Ok(stored)
    }

    /// Register a process located by number on a court portal.
    pub fn register_process(&self, import: ProcessImport) -> Result<Process, CaseServiceError> {
        if import.claimant_name.trim().is_empty() {
            return Err(CaseServiceError::EmptyClaimant);
        }
        if import.process_number.trim().is_empty() {
            return Err(CaseServiceError::InvalidInput(
                "process number is required".to_string(),
            ));
        }

        let now = Utc::now();
        let today = now.date_naive();
        let process = Process {
            id: next_id(&PROCESS_SEQUENCE, "proc"),
            claimant: Claimant {
                name: import.claimant_name,
                cpf: import.claimant_cpf,
                ..Claimant::default()
            },
            status: ProcessStatus::EmAndamento,
            documents: Vec::new(),
            process_number: import.process_number.trim().to_string(),
            tribunal: import.tribunal,
            court_body: import.court_body,
            procedural_class: import.procedural_class,
            subject: import.subject,
            situation: import.situation,
            filed_on: import.filed_on.unwrap_or(today),
            movements: import.movements,
            last_movement: import.last_movement,
            created_at: now,
            updated_at: now,
            lawyer_notes: Some(format!(
                "Processo importado automaticamente em {}",
                today.format("%d/%m/%Y")
            )),
            priority: Priority::Media,
            solicitation_id: None,
        };

        let stored = self.repository.insert_process(process)?;
        info!(process = %stored.id, number = %stored.process_number, "process registered");
        Ok(stored)
    }

    pub fn record_case(&self, case: Case) -> Result<Case, CaseServiceError> {
        Ok(self.repository.insert_case(case)?)
    }

    pub fn get_solicitation(&self, id: &RecordId) -> Result<Solicitation, CaseServiceError> {
        let record = self
            .repository
            .fetch_solicitation(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn get_process(&self, id: &RecordId) -> Result<Process, CaseServiceError> {
        let record = self
            .repository
            .fetch_process(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list_solicitations(
        &self,
        query: &ListQuery<SolicitationStatus>,
    ) -> Result<Page<Solicitation>, CaseServiceError> {
        Ok(query.apply(&self.repository.solicitations()?))
    }

    pub fn list_processes(
        &self,
        query: &ListQuery<ProcessStatus>,
    ) -> Result<Page<Process>, CaseServiceError> {
        Ok(query.apply(&self.repository.processes()?))
    }

    pub fn list_cases(
        &self,
        query: &ListQuery<CaseStatus>,
    ) -> Result<Page<Case>, CaseServiceError> {
        Ok(query.apply(&self.repository.cases()?))
    }

    /// Filtered and sorted, but not paginated; used by exports.
    pub fn matching_processes(
        &self,
        query: &ListQuery<ProcessStatus>,
    ) -> Result<Vec<Process>, CaseServiceError> {
        let records = self.repository.processes()?;
        Ok(query.sorted(&records).into_iter().cloned().collect())
    }

    pub fn matching_cases(
        &self,
        query: &ListQuery<CaseStatus>,
    ) -> Result<Vec<Case>, CaseServiceError> {
        let records = self.repository.cases()?;
        Ok(query.sorted(&records).into_iter().cloned().collect())
    }
}

/// Error raised by the case service.
#[derive(Debug, thiserror::Error)]
pub enum CaseServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error("cannot {action} a record in status '{from}'")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
    #[error("claimant name is required")]
    EmptyClaimant,
    #[error("{0}")]
    InvalidInput(String),
}

impl CaseServiceError {
    /// HTTP status shared by the case routes and `AppError`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CaseServiceError::InvalidTransition { .. }
            | CaseServiceError::EmptyClaimant
            | CaseServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CaseServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            CaseServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            CaseServiceError::Repository(RepositoryError::Unavailable(_))
            | CaseServiceError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
