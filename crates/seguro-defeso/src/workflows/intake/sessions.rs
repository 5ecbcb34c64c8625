use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::classifier::KeywordClassifier;
use super::domain::{ClassifiedDocument, DocumentSlot, IntakeProfile};
use super::orchestrator::UploadOrchestrator;
use crate::config::IntakeConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntakeSessionId(pub String);

static INTAKE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> IntakeSessionId {
    let id = INTAKE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    IntakeSessionId(format!("intake-{id:06}"))
}

/// One open upload form. The orchestrator sits behind an async mutex so concurrent requests
/// against the same form queue up instead of racing for the first empty slot.
pub struct IntakeSession {
    pub id: IntakeSessionId,
    pub profile: IntakeProfile,
    pub orchestrator: tokio::sync::Mutex<UploadOrchestrator<KeywordClassifier>>,
}

impl IntakeSession {
    pub async fn view(&self) -> IntakeSessionView {
        let orchestrator = self.orchestrator.lock().await;
        IntakeSessionView::from_orchestrator(&self.id, self.profile, &orchestrator)
    }
}

pub const DEFAULT_MAX_OPEN_SESSIONS: usize = 256;
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct SessionEntry {
    session: Arc<IntakeSession>,
    last_seen: Instant,
    touched: u64,
}

#[derive(Default)]
struct SessionTable {
    entries: HashMap<IntakeSessionId, SessionEntry>,
    clock: u64,
}

impl SessionTable {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_idle(&mut self, ttl: Duration) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, "idle intake sessions dropped");
        }
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.touched)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            self.entries.remove(&id);
            debug!(session = %id.0, "intake session dropped to make room");
        }
    }
}

/// Registry of open intake forms, keyed by session id. Forms idle longer than the TTL are
/// dropped, and opening past the cap drops the least recently used form.
pub struct IntakeSessions {
    config: IntakeConfig,
    max_open: usize,
    idle_ttl: Duration,
    sessions: Mutex<SessionTable>,
}

impl IntakeSessions {
    pub fn new(config: IntakeConfig) -> Self {
        Self {
            config,
            max_open: DEFAULT_MAX_OPEN_SESSIONS,
            idle_ttl: DEFAULT_SESSION_IDLE_TTL,
            sessions: Mutex::new(SessionTable::default()),
        }
    }

    pub fn with_limits(mut self, max_open: usize, idle_ttl: Duration) -> Self {
        self.max_open = max_open.max(1);
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn default_profile(&self) -> IntakeProfile {
        self.config.profile
    }

    pub fn open(&self, profile: Option<IntakeProfile>) -> Arc<IntakeSession> {
        let profile = profile.unwrap_or(self.config.profile);
        let classifier = KeywordClassifier::configured(profile, self.config.simulate_latency);
        let session = Arc::new(IntakeSession {
            id: next_session_id(),
            profile,
            orchestrator: tokio::sync::Mutex::new(UploadOrchestrator::new(profile, classifier)),
        });

        let mut guard = self.sessions.lock().expect("intake session mutex poisoned");
        guard.evict_idle(self.idle_ttl);
        while guard.entries.len() >= self.max_open {
            guard.evict_least_recent();
        }
        let touched = guard.tick();
        guard.entries.insert(
            session.id.clone(),
            SessionEntry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
                touched,
            },
        );
        info!(session = %session.id.0, profile = profile.label(), "intake session opened");
        session
    }

    /// Looking a session up counts as activity.
    pub fn get(&self, id: &IntakeSessionId) -> Option<Arc<IntakeSession>> {
        let mut guard = self.sessions.lock().expect("intake session mutex poisoned");
        guard.evict_idle(self.idle_ttl);
        let touched = guard.tick();
        let entry = guard.entries.get_mut(id)?;
        entry.last_seen = Instant::now();
        entry.touched = touched;
        Some(Arc::clone(&entry.session))
    }

    pub fn close(&self, id: &IntakeSessionId) -> bool {
        let mut guard = self.sessions.lock().expect("intake session mutex poisoned");
        guard.entries.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        let guard = self.sessions.lock().expect("intake session mutex poisoned");
        guard.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// JSON shape of an intake form for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeSessionView {
    pub session_id: IntakeSessionId,
    pub profile: IntakeProfile,
    pub slots: Vec<DocumentSlot>,
    pub documents: Vec<ClassifiedDocument>,
    pub filled_required: usize,
    pub total_required: usize,
    pub complete: bool,
}

impl IntakeSessionView {
    pub fn from_orchestrator(
        id: &IntakeSessionId,
        profile: IntakeProfile,
        orchestrator: &UploadOrchestrator<KeywordClassifier>,
    ) -> Self {
        let registry = orchestrator.registry();
        Self {
            session_id: id.clone(),
            profile,
            slots: registry.slots().to_vec(),
            documents: registry.classified_documents(),
            filled_required: registry.count_filled(true),
            total_required: registry.total_required(),
            complete: registry.is_complete(),
        }
    }
}
