use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use seguro_defeso::notifications::Notification;
use seguro_defeso::workflows::cases::{
    Case, CaseRepository, NotificationError, NotificationSink, Process, RecordId,
    RepositoryError, Solicitation, SortField, SortOrder,
};
use seguro_defeso::workflows::intake::IntakeProfile;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store. Records keep insertion order so list ties stay stable.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCaseRepository {
    solicitations: Arc<Mutex<Vec<Solicitation>>>,
    processes: Arc<Mutex<Vec<Process>>>,
    cases: Arc<Mutex<Vec<Case>>>,
}

impl CaseRepository for InMemoryCaseRepository {
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
        match guard.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_solicitation(&self, id: &RecordId) -> Result<Option<Solicitation>, RepositoryError> {
        let guard = self.solicitations.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn solicitations(&self) -> Result<Vec<Solicitation>, RepositoryError> {
        Ok(self
            .solicitations
            .lock()
            .expect("repository mutex poisoned")
            .clone())
    }

    fn insert_process(&self, record: Process) -> Result<Process, RepositoryError> {
        let mut guard = self.processes.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| {
            existing.id == record.id || existing.process_number == record.process_number
        }) {
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
pub(crate) struct InMemoryNotificationSink {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationSink for InMemoryNotificationSink {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        let mut guard = self.events.lock().expect("notification mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationSink {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_profile(raw: &str) -> Result<IntakeProfile, String> {
    IntakeProfile::parse(raw)
        .ok_or_else(|| format!("unknown intake profile '{raw}' (expected standard or pesqbrasil)"))
}

pub(crate) fn parse_sort_field(raw: &str) -> Result<SortField, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_lowercase()))
        .map_err(|_| format!("unknown sort field '{raw}'"))
}

pub(crate) fn parse_sort_order(raw: &str) -> Result<SortOrder, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        _ => Err(format!("unknown sort order '{raw}' (expected asc or desc)")),
    }
}
