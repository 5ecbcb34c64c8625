use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::notifications::Notification;
use crate::workflows::cases::domain::{
    Case, CaseStatus, Claimant, CourtDetails, Priority, Process, RecordId, Solicitation,
    SolicitationSubmission, SubmittedDocument,
};
use crate::workflows::cases::repository::{
    CaseRepository, NotificationError, NotificationSink, RepositoryError,
};
use crate::workflows::cases::{case_router, CaseService};
use crate::workflows::eligibility::EligibilityEngine;
use crate::workflows::intake::DocumentCategory;

pub(super) fn claimant(name: &str) -> Claimant {
    Claimant {
        name: name.to_string(),
        cpf: "12345678901".to_string(),
        rg: "123456789".to_string(),
        address: "Rua do Porto, 12 - Santos/SP".to_string(),
        colony: "Colônia Z-1".to_string(),
        rgp_number: Some("SP-000123".to_string()),
        phone: "(13) 98888-7777".to_string(),
        ..Claimant::default()
    }
}

pub(super) fn submission(name: &str, categories: &[DocumentCategory]) -> SolicitationSubmission {
    SolicitationSubmission {
        claimant: claimant(name),
        documents: categories
            .iter()
            .map(|category| SubmittedDocument {
                category: *category,
                file_name: format!("{}.pdf", category.code()),
            })
            .collect(),
        priority: Priority::Media,
        lawyer_notes: None,
    }
}

pub(super) fn complete_submission(name: &str) -> SolicitationSubmission {
    use DocumentCategory::*;
    submission(name, &[Rg, Cpf, Rgp, DeclaracaoColonia, ComprovanteVenda])
}

pub(super) fn base_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
        .single()
        .expect("valid instant")
}

/// Case `index` is created `index` days after the base instant.
pub(super) fn case(index: u32, name: &str, status: CaseStatus) -> Case {
    let created_at = base_instant() + Duration::days(i64::from(index));
    Case {
        id: RecordId(format!("case-{index:03}")),
        claimant: claimant(name),
        status,
        documents: Vec::new(),
        analysis: None,
        created_at,
        updated_at: created_at,
        lawyer_notes: None,
        priority: Priority::Media,
        court: CourtDetails::default(),
    }
}

pub(super) fn filed_case(index: u32, name: &str, number: &str, tribunal: &str) -> Case {
    let mut record = case(index, name, CaseStatus::EmAnalise);
    record.court = CourtDetails {
        process_number: Some(number.to_string()),
        tribunal: Some(tribunal.to_string()),
        court_body: Some("1ª Vara Cível".to_string()),
        filed_on: NaiveDate::from_ymd_opt(2024, 3, 10),
        movements: Some(4),
        ..CourtDetails::default()
    };
    record
}

pub(super) fn build_service() -> (
    CaseService<MemoryRepository, MemoryNotifications>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifications>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = CaseService::new(
        repository.clone(),
        notifications.clone(),
        EligibilityEngine::default(),
    );
    (service, repository, notifications)
}

pub(super) fn case_router_with_service(
    service: CaseService<MemoryRepository, MemoryNotifications>,
) -> axum::Router {
    case_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    solicitations: Arc<Mutex<Vec<Solicitation>>>,
    processes: Arc<Mutex<Vec<Process>>>,
    cases: Arc<Mutex<Vec<Case>>>,
}

impl CaseRepository for MemoryRepository {
    fn insert_solicitation(&self, record: Solicitation) -> Result<Solicitation, RepositoryError> {
        let mut guard = self.solicitations.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn update_solicitation(&self, record: Solicitation) -> Result<(), RepositoryError> {
        let mut guard = self.solicitations.lock().expect("repository mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = record;
        Ok(())
    }

    fn fetch_solicitation(&self, id: &RecordId) -> Result<Option<Solicitation>, RepositoryError> {
        let guard = self.solicitations.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn solicitations(&self) -> Result<Vec<Solicitation>, RepositoryError> {
        Ok(self.solicitations.lock().expect("repository mutex poisoned").clone())
    }

    fn insert_process(&self, record: Process) -> Result<Process, RepositoryError> {
        let mut guard = self.processes.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch_process(&self, id: &RecordId) -> Result<Option<Process>, RepositoryError> {
        let guard = self.processes.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn processes(&self) -> Result<Vec<Process>, RepositoryError> {
        Ok(self.processes.lock().expect("repository mutex poisoned").clone())
    }

    fn insert_case(&self, record: Case) -> Result<Case, RepositoryError> {
        let mut guard = self.cases.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn cases(&self) -> Result<Vec<Case>, RepositoryError> {
        Ok(self.cases.lock().expect("repository mutex poisoned").clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

impl NotificationSink for MemoryNotifications {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Memory store whose solicitation reads stall, so concurrent transitions overlap.
#[derive(Default, Clone)]
pub(super) struct SlowReadRepository {
    pub(super) inner: MemoryRepository,
}

impl CaseRepository for SlowReadRepository {
    fn insert_solicitation(&self, record: Solicitation) -> Result<Solicitation, RepositoryError> {
        self.inner.insert_solicitation(record)
    }

    fn update_solicitation(&self, record: Solicitation) -> Result<(), RepositoryError> {
        self.inner.update_solicitation(record)
    }

    fn fetch_solicitation(&self, id: &RecordId) -> Result<Option<Solicitation>, RepositoryError> {
        let record = self.inner.fetch_solicitation(id);
        std::thread::sleep(std::time::Duration::from_millis(50));
        record
    }

    fn solicitations(&self) -> Result<Vec<Solicitation>, RepositoryError> {
        self.inner.solicitations()
    }

    fn insert_process(&self, record: Process) -> Result<Process, RepositoryError> {
        self.inner.insert_process(record)
    }

    fn fetch_process(&self, id: &RecordId) -> Result<Option<Process>, RepositoryError> {
        self.inner.fetch_process(id)
    }

    fn processes(&self) -> Result<Vec<Process>, RepositoryError> {
        self.inner.processes()
    }

    fn insert_case(&self, record: Case) -> Result<Case, RepositoryError> {
        self.inner.insert_case(record)
    }

    fn cases(&self) -> Result<Vec<Case>, RepositoryError> {
        self.inner.cases()
    }
}

pub(super) struct OfflineNotifications;

impl NotificationSink for OfflineNotifications {
    fn publish(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl CaseRepository for UnavailableRepository {
    fn insert_solicitation(&self, _record: Solicitation) -> Result<Solicitation, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_solicitation(&self, _record: Solicitation) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_solicitation(&self, _id: &RecordId) -> Result<Option<Solicitation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn solicitations(&self) -> Result<Vec<Solicitation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_process(&self, _record: Process) -> Result<Process, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_process(&self, _id: &RecordId) -> Result<Option<Process>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn processes(&self) -> Result<Vec<Process>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_case(&self, _record: Case) -> Result<Case, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn cases(&self) -> Result<Vec<Case>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}
