use tracing::debug;

use super::domain::{
    ClassifiedDocument, DocumentCategory, DocumentSlot, IntakeProfile, SlotDefinition,
    SlotSnapshot, SlotState, SlotView, UploadedFile,
};

/// Ordered, fixed-size set of document slots for one intake session.
///
/// Only the upload orchestrator mutates slot state; everything else observes it through
/// [`SlotRegistry::slots`], [`SlotRegistry::snapshot`] or the derived classified-document list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRegistry {
    slots: Vec<DocumentSlot>,
}

impl SlotRegistry {
    pub fn initialize(definitions: &[SlotDefinition]) -> Self {
        debug_assert!(
            definitions.iter().enumerate().all(|(index, definition)| definitions[..index]
                .iter()
                .all(|earlier| earlier.category != definition.category)),
            "slot definitions must not repeat a category"
        );

        let slots = definitions
            .iter()
            .map(|definition| DocumentSlot {
                category: definition.category,
                label: definition.label,
                required: definition.required,
                state: SlotState::Empty,
            })
            .collect();

        Self { slots }
    }

    pub fn for_profile(profile: IntakeProfile) -> Self {
        Self::initialize(profile.definitions())
    }

    pub fn slots(&self) -> &[DocumentSlot] {
        &self.slots
    }

    pub fn slot(&self, category: DocumentCategory) -> Option<&DocumentSlot> {
        self.slots.iter().find(|slot| slot.category == category)
    }

    pub fn count_filled(&self, required_only: bool) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.is_filled() && (!required_only || slot.required))
            .count()
    }

    pub fn total_required(&self) -> usize {
        self.slots.iter().filter(|slot| slot.required).count()
    }

    /// Submit gating: every required slot holds a file.
    pub fn is_complete(&self) -> bool {
        self.count_filled(true) == self.total_required()
    }

    pub fn first_empty(&self) -> Option<DocumentCategory> {
        self.slots
            .iter()
            .find(|slot| slot.is_empty())
            .map(|slot| slot.category)
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            slots: self
                .slots
                .iter()
                .map(|slot| SlotView {
                    category: slot.category,
                    required: slot.required,
                    phase: slot.state.phase(),
                })
                .collect(),
        }
    }

    /// Every filled slot, in slot order.
    pub fn classified_documents(&self) -> Vec<ClassifiedDocument> {
        self.slots
            .iter()
            .filter_map(|slot| {
                slot.bound_file().map(|file| ClassifiedDocument {
                    category: slot.category,
                    file_name: file.name.clone(),
                    file: file.clone(),
                })
            })
            .collect()
    }

    /// Return a filled or failed slot to `Empty`. Empty and identifying slots are left alone
    /// because an in-flight classification cannot be cancelled.
    pub fn reset(&mut self, category: DocumentCategory) -> bool {
        let Some(slot) = self.slot_mut(category) else {
            return false;
        };

        match slot.state {
            SlotState::Filled { .. } | SlotState::Error { .. } => {
                slot.state = SlotState::Empty;
                debug!(?category, "slot reset");
                true
            }
            SlotState::Empty | SlotState::Identifying { .. } => false,
        }
    }

    pub(crate) fn begin_identifying(&mut self, category: DocumentCategory, file_name: &str) {
        if let Some(slot) = self.slot_mut(category) {
            slot.state = SlotState::Identifying {
                pending_file_name: file_name.to_string(),
            };
        }
    }

    /// Drop the in-progress marker without touching slots that moved on meanwhile.
    pub(crate) fn release(&mut self, category: DocumentCategory) {
        if let Some(slot) = self.slot_mut(category) {
            if matches!(slot.state, SlotState::Identifying { .. }) {
                slot.state = SlotState::Empty;
            }
        }
    }

    pub(crate) fn fail(&mut self, category: DocumentCategory, message: &str) {
        if let Some(slot) = self.slot_mut(category) {
            if matches!(slot.state, SlotState::Identifying { .. }) {
                slot.state = SlotState::Error {
                    message: message.to_string(),
                };
            }
        }
    }

    /// Bind `file` to the slot for `category`, returning the file it replaced.
    pub(crate) fn bind(
        &mut self,
        category: DocumentCategory,
        file: UploadedFile,
    ) -> Result<Option<UploadedFile>, UploadedFile> {
        let Some(slot) = self.slot_mut(category) else {
            return Err(file);
        };

        let previous = std::mem::replace(&mut slot.state, SlotState::Filled { file });
        match previous {
            SlotState::Filled { file } => Ok(Some(file)),
            _ => Ok(None),
        }
    }

    fn slot_mut(&mut self, category: DocumentCategory) -> Option<&mut DocumentSlot> {
        let slot = self.slots.iter_mut().find(|slot| slot.category == category);
        debug_assert!(
            slot.is_some(),
            "category {category:?} is not part of this intake form"
        );
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::domain::SlotPhase;

    fn registry() -> SlotRegistry {
        SlotRegistry::for_profile(IntakeProfile::Standard)
    }

    #[test]
    fn initialize_starts_every_slot_empty() {
        let registry = registry();
        assert_eq!(registry.slots().len(), 7);
        assert!(registry.slots().iter().all(DocumentSlot::is_empty));
        assert_eq!(registry.total_required(), 5);
        assert_eq!(registry.count_filled(false), 0);
        assert_eq!(registry.first_empty(), Some(DocumentCategory::Rg));
    }

    #[test]
    fn completion_tracks_required_slots_only() {
        let mut registry = registry();
        for category in [
            DocumentCategory::Rg,
            DocumentCategory::Cpf,
            DocumentCategory::Rgp,
            DocumentCategory::ComprovanteResidencia,
        ] {
            registry
                .bind(category, UploadedFile::named(format!("{category:?}.pdf")))
                .expect("known slot");
        }
        registry
            .bind(DocumentCategory::ComprovanteVenda, UploadedFile::named("venda.pdf"))
            .expect("known slot");

        assert_eq!(registry.count_filled(true), 4);
        assert_eq!(registry.count_filled(false), 5);
        assert!(!registry.is_complete());

        registry
            .bind(DocumentCategory::DeclaracaoColonia, UploadedFile::named("colonia.pdf"))
            .expect("known slot");
        assert!(registry.is_complete());
    }

    #[test]
    fn bind_replaces_instead_of_duplicating() {
        let mut registry = registry();
        let first = registry
            .bind(DocumentCategory::Rg, UploadedFile::named("rg_antigo.pdf"))
            .expect("known slot");
        assert!(first.is_none());

        let replaced = registry
            .bind(DocumentCategory::Rg, UploadedFile::named("rg_novo.pdf"))
            .expect("known slot");
        assert_eq!(replaced.map(|file| file.name), Some("rg_antigo.pdf".to_string()));

        let documents = registry.classified_documents();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file_name, "rg_novo.pdf");
    }

    #[test]
    fn reset_clears_filled_and_failed_slots_only() {
        let mut registry = registry();
        registry
            .bind(DocumentCategory::Cpf, UploadedFile::named("cpf.pdf"))
            .expect("known slot");
        registry.begin_identifying(DocumentCategory::Rg, "scan.pdf");

        assert!(registry.reset(DocumentCategory::Cpf));
        assert!(!registry.reset(DocumentCategory::Cpf));
        assert!(!registry.reset(DocumentCategory::Rg));
        assert_eq!(
            registry.slot(DocumentCategory::Rg).map(|slot| slot.state.phase()),
            Some(SlotPhase::Identifying)
        );

        registry.fail(DocumentCategory::Rg, "Não identificado");
        assert!(registry.reset(DocumentCategory::Rg));
        assert!(registry.slots().iter().all(DocumentSlot::is_empty));
    }

    #[test]
    fn release_and_fail_ignore_slots_that_are_not_identifying() {
        let mut registry = registry();
        registry
            .bind(DocumentCategory::Rg, UploadedFile::named("rg.pdf"))
            .expect("known slot");

        registry.release(DocumentCategory::Rg);
        registry.fail(DocumentCategory::Rg, "boom");
        assert!(registry.slot(DocumentCategory::Rg).expect("slot").is_filled());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not part of this intake form")]
    fn unknown_category_is_a_precondition_violation_in_debug_builds() {
        let mut registry = registry();
        registry.reset(DocumentCategory::CnisMeuInss);
    }
}
