use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CaseCreated,
    AnalysisComplete,
    StatusChange,
    DocumentMissing,
    DeadlineApproaching,
    System,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
}

/// In-app notification shown in the bell menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub case_id: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub priority: NotificationPriority,
}

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl Notification {
    pub fn new(
        kind: NotificationKind,
        priority: NotificationPriority,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("n{id}"),
            kind,
            title: title.into(),
            message: message.into(),
            case_id: None,
            is_read: false,
            created_at: Utc::now(),
            priority,
        }
    }

    pub fn for_case(mut self, case_id: impl Into<String>) -> Self {
        self.case_id = Some(case_id.into());
        self
    }
}
