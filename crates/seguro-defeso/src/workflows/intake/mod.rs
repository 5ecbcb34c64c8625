//! Document intake: slot registry, filename classifier and the sequential upload orchestrator.

pub mod classifier;
pub mod domain;
pub mod orchestrator;
pub mod registry;
pub mod router;
pub mod sessions;

pub use classifier::{Classification, DocumentClassifier, KeywordClassifier, KeywordRule, LatencyModel};
pub use domain::{
    ClassifiedDocument, DocumentCategory, DocumentSlot, IntakeProfile, SlotDefinition, SlotPhase,
    SlotSnapshot, SlotState, SlotView, UploadedFile,
};
pub use orchestrator::{
    BatchSummary, IntakeLog, IntakeNotice, IntakeObserver, NoticeSeverity, UploadOrchestrator,
    PROCESSING_FAILED_MESSAGE, UNIDENTIFIED_MESSAGE,
};
pub use registry::SlotRegistry;
pub use router::intake_router;
pub use sessions::{IntakeSession, IntakeSessionId, IntakeSessionView, IntakeSessions};
