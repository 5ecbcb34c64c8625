use serde::Serialize;
use tracing::{debug, info, warn};

use super::classifier::{Classification, DocumentClassifier};
use super::domain::{ClassifiedDocument, DocumentCategory, IntakeProfile, UploadedFile};
use super::registry::SlotRegistry;

pub const UNIDENTIFIED_MESSAGE: &str = "Não foi possível identificar o tipo do documento";
pub const PROCESSING_FAILED_MESSAGE: &str = "Erro ao processar documento";

/// User-visible event raised while a batch is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntakeNotice {
    Identifying {
        file_name: String,
    },
    Identified {
        file_name: String,
        category: DocumentCategory,
        label: &'static str,
    },
    Replacing {
        category: DocumentCategory,
        label: &'static str,
        previous_file_name: String,
    },
    Unidentified {
        file_name: String,
    },
    ProcessingFailed {
        file_name: String,
        reason: String,
    },
    SlotsFull {
        file_name: String,
    },
    Rejected {
        file_name: String,
        media_type: Option<String>,
    },
    Removed {
        category: DocumentCategory,
    },
}

impl IntakeNotice {
    pub fn severity(&self) -> NoticeSeverity {
        match self {
            Self::Identifying { .. } | Self::Removed { .. } => NoticeSeverity::Info,
            Self::Identified { .. } => NoticeSeverity::Success,
            Self::Replacing { .. } | Self::SlotsFull { .. } => NoticeSeverity::Warning,
            Self::Unidentified { .. } | Self::ProcessingFailed { .. } | Self::Rejected { .. } => {
                NoticeSeverity::Error
            }
        }
    }

    /// Toast text shown to the operator.
    pub fn message(&self) -> String {
        match self {
            Self::Identifying { file_name } => format!("Analisando: {file_name}..."),
            Self::Identified { label, .. } => format!("✓ {label} identificado"),
            Self::Replacing { label, .. } => format!("Substituindo documento em: {label}"),
            Self::Unidentified { file_name } => {
                format!("Não foi possível identificar: {file_name}")
            }
            Self::ProcessingFailed { file_name, .. } => format!("Erro ao processar: {file_name}"),
            Self::SlotsFull { .. } => "Todos os slots de documentos já estão preenchidos".to_string(),
            Self::Rejected { file_name, .. } => {
                format!("Arquivo {file_name} tem formato inválido. Use PDF, JPG ou PNG.")
            }
            Self::Removed { .. } => "Documento removido".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// Parent-form side of the upload widget.
pub trait IntakeObserver: Send {
    /// Receives the full classified-document list after every slot mutation.
    fn on_documents_change(&mut self, documents: &[ClassifiedDocument]);

    fn on_notice(&mut self, notice: &IntakeNotice);
}

/// Observer that records everything it is told, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntakeLog {
    pub notices: Vec<IntakeNotice>,
    pub emissions: Vec<Vec<ClassifiedDocument>>,
}

impl IntakeLog {
    pub fn latest_documents(&self) -> Option<&[ClassifiedDocument]> {
        self.emissions.last().map(Vec::as_slice)
    }
}

impl IntakeObserver for IntakeLog {
    fn on_documents_change(&mut self, documents: &[ClassifiedDocument]) {
        self.emissions.push(documents.to_vec());
    }

    fn on_notice(&mut self, notice: &IntakeNotice) {
        self.notices.push(notice.clone());
    }
}

/// Per-batch tally returned by [`UploadOrchestrator::process_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub submitted: usize,
    pub classified: usize,
    pub replaced: usize,
    pub failed: usize,
    pub skipped: usize,
    pub rejected: usize,
}

/// Owns the slot registry and feeds uploads through the classifier one at a time.
///
/// `process_batch` takes `&mut self`, so a second batch cannot start until the first has
/// committed every slot transition. Callers sharing one orchestrator across tasks wrap it in
/// a `tokio::sync::Mutex`.
pub struct UploadOrchestrator<C> {
    registry: SlotRegistry,
    classifier: C,
    accepted_media_types: Option<&'static [&'static str]>,
}

impl<C> UploadOrchestrator<C>
where
    C: DocumentClassifier,
{
    pub fn new(profile: IntakeProfile, classifier: C) -> Self {
        Self {
            registry: SlotRegistry::for_profile(profile),
            classifier,
            accepted_media_types: profile.accepted_media_types(),
        }
    }

    pub fn with_registry(registry: SlotRegistry, classifier: C) -> Self {
        Self {
            registry,
            classifier,
            accepted_media_types: None,
        }
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn classified_documents(&self) -> Vec<ClassifiedDocument> {
        self.registry.classified_documents()
    }

    pub fn is_complete(&self) -> bool {
        self.registry.is_complete()
    }

    /// Process every file in submission order. A failure only affects its own file.
    pub async fn process_batch<O>(
        &mut self,
        files: Vec<UploadedFile>,
        observer: &mut O,
    ) -> BatchSummary
    where
        O: IntakeObserver + ?Sized,
    {
        let mut summary = BatchSummary {
            submitted: files.len(),
            ..BatchSummary::default()
        };

        for file in files {
            self.process_file(file, observer, &mut summary).await;
        }

        info!(
            submitted = summary.submitted,
            classified = summary.classified,
            failed = summary.failed,
            skipped = summary.skipped + summary.rejected,
            "upload batch processed"
        );
        summary
    }

    async fn process_file<O>(
        &mut self,
        file: UploadedFile,
        observer: &mut O,
        summary: &mut BatchSummary,
    ) where
        O: IntakeObserver + ?Sized,
    {
        if !self.accepts(&file) {
            warn!(file = %file.name, "upload rejected: unsupported media type");
            summary.rejected += 1;
            observer.on_notice(&IntakeNotice::Rejected {
                media_type: file.media_type().map(|mime| mime.essence_str().to_string()),
                file_name: file.name,
            });
            return;
        }

        // Taken before the anchor is marked so the anchor still counts as empty for fallback.
        let snapshot = self.registry.snapshot();
        let Some(anchor) = self.registry.first_empty() else {
            warn!(file = %file.name, "no empty slot left for upload");
            summary.skipped += 1;
            observer.on_notice(&IntakeNotice::SlotsFull {
                file_name: file.name,
            });
            return;
        };

        self.registry.begin_identifying(anchor, &file.name);
        debug!(file = %file.name, ?anchor, "slot identifying");
        observer.on_notice(&IntakeNotice::Identifying {
            file_name: file.name.clone(),
        });

        let outcome = self.classifier.classify(&file, &snapshot).await;

        match outcome {
            Classification::Classified(category) if self.registry.slot(category).is_none() => {
                warn!(file = %file.name, ?category, "classifier returned a category outside this form");
                let reason = format!("categoria {category:?} fora do formulário");
                self.fail(anchor, file.name, reason, observer, summary);
            }
            Classification::Classified(category) => {
                self.registry.release(anchor);

                let file_name = file.name.clone();
                if let Some(previous) = self.registry.bind(category, file).ok().flatten() {
                    summary.replaced += 1;
                    warn!(?category, previous = %previous.name, "replacing filled slot");
                    observer.on_notice(&IntakeNotice::Replacing {
                        category,
                        label: category.label(),
                        previous_file_name: previous.name,
                    });
                }

                summary.classified += 1;
                info!(file = %file_name, ?category, "document classified");
                self.publish(observer);
                observer.on_notice(&IntakeNotice::Identified {
                    file_name,
                    category,
                    label: category.label(),
                });
            }
            Classification::Unclassifiable => {
                summary.failed += 1;
                self.registry.fail(anchor, UNIDENTIFIED_MESSAGE);
                warn!(file = %file.name, "document could not be identified");
                observer.on_notice(&IntakeNotice::Unidentified {
                    file_name: file.name,
                });
                self.publish(observer);
            }
            Classification::Fault(reason) => {
                warn!(file = %file.name, %reason, "classifier fault");
                self.fail(anchor, file.name, reason, observer, summary);
            }
        }
    }

    fn fail<O>(
        &mut self,
        anchor: DocumentCategory,
        file_name: String,
        reason: String,
        observer: &mut O,
        summary: &mut BatchSummary,
    ) where
        O: IntakeObserver + ?Sized,
    {
        summary.failed += 1;
        self.registry.fail(anchor, PROCESSING_FAILED_MESSAGE);
        observer.on_notice(&IntakeNotice::ProcessingFailed { file_name, reason });
        self.publish(observer);
    }

    /// Clear a filled (or failed) slot. Returns `false` when there was nothing to remove.
    pub fn remove_document<O>(&mut self, category: DocumentCategory, observer: &mut O) -> bool
    where
        O: IntakeObserver + ?Sized,
    {
        if self.registry.slot(category).is_none() || !self.registry.reset(category) {
            return false;
        }

        info!(?category, "document removed");
        self.publish(observer);
        observer.on_notice(&IntakeNotice::Removed { category });
        true
    }

    fn accepts(&self, file: &UploadedFile) -> bool {
        let Some(accepted) = self.accepted_media_types else {
            return true;
        };

        file.media_type()
            .map(|mime| accepted.contains(&mime.essence_str()))
            .unwrap_or(false)
    }

    fn publish<O>(&self, observer: &mut O)
    where
        O: IntakeObserver + ?Sized,
    {
        observer.on_documents_change(&self.registry.classified_documents());
    }
}
