use super::domain::{Case, Process, RecordId, Solicitation};
use crate::notifications::Notification;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait CaseRepository: Send + Sync {
    fn insert_solicitation(&self, record: Solicitation) -> Result<Solicitation, RepositoryError>;
    fn update_solicitation(&self, record: Solicitation) -> Result<(), RepositoryError>;
    fn fetch_solicitation(&self, id: &RecordId) -> Result<Option<Solicitation>, RepositoryError>;
    fn solicitations(&self) -> Result<Vec<Solicitation>, RepositoryError>;

    fn insert_process(&self, record: Process) -> Result<Process, RepositoryError>;
    fn fetch_process(&self, id: &RecordId) -> Result<Option<Process>, RepositoryError>;
    fn processes(&self) -> Result<Vec<Process>, RepositoryError>;

    fn insert_case(&self, record: Case) -> Result<Case, RepositoryError>;
    fn cases(&self) -> Result<Vec<Case>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for in-app notifications (bell menu, e-mail digests).
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
