use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::domain::{DocumentCategory, IntakeProfile, SlotSnapshot, UploadedFile};

/// Outcome of classifying a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Classified(DocumentCategory),
    Unclassifiable,
    Fault(String),
}

/// Assigns an upload to exactly one document category.
///
/// Implementations may suspend (network OCR, model inference); the orchestrator awaits the
/// result before touching any other file in the batch.
#[async_trait]
pub trait DocumentClassifier: Send + Sync {
    async fn classify(&self, file: &UploadedFile, slots: &SlotSnapshot) -> Classification;
}

/// One keyword predicate: every `all_of` term present and no `none_of` term present.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub all_of: &'static [&'static str],
    pub none_of: &'static [&'static str],
    pub category: DocumentCategory,
}

impl KeywordRule {
    const fn when(all_of: &'static [&'static str], category: DocumentCategory) -> Self {
        Self {
            all_of,
            none_of: &[],
            category,
        }
    }

    const fn unless(mut self, none_of: &'static [&'static str]) -> Self {
        self.none_of = none_of;
        self
    }

    fn matches(&self, lowered: &str) -> bool {
        self.all_of.iter().all(|term| lowered.contains(term))
            && !self.none_of.iter().any(|term| lowered.contains(term))
    }
}

const STANDARD_RULES: &[KeywordRule] = &[
    KeywordRule::when(&["rg"], DocumentCategory::Rg).unless(&["rgp"]),
    KeywordRule::when(&["cpf"], DocumentCategory::Cpf),
    KeywordRule::when(&["rgp"], DocumentCategory::Rgp),
    KeywordRule::when(&["pesca"], DocumentCategory::Rgp),
    KeywordRule::when(&["residencia"], DocumentCategory::ComprovanteResidencia),
    KeywordRule::when(&["comprovante"], DocumentCategory::ComprovanteResidencia),
    KeywordRule::when(&["colonia"], DocumentCategory::DeclaracaoColonia),
    KeywordRule::when(&["declaracao"], DocumentCategory::DeclaracaoColonia),
    KeywordRule::when(&["venda"], DocumentCategory::ComprovanteVenda),
    KeywordRule::when(&["pescado"], DocumentCategory::ComprovanteVenda),
    KeywordRule::when(&["carteira"], DocumentCategory::CarteiraTrabalho),
    KeywordRule::when(&["trabalho"], DocumentCategory::CarteiraTrabalho),
    KeywordRule::when(&["ctps"], DocumentCategory::CarteiraTrabalho),
];

const PESQBRASIL_RULES: &[KeywordRule] = &[
    KeywordRule::when(
        &["certificado", "regularidade"],
        DocumentCategory::CertificadoRegularidadePesqbrasil,
    ),
    KeywordRule::when(
        &["pesqbrasil", "certificado"],
        DocumentCategory::CertificadoRegularidadePesqbrasil,
    ),
    KeywordRule::when(&["caepf"], DocumentCategory::CaepfEcac),
    KeywordRule::when(&["ecac"], DocumentCategory::CaepfEcac),
    KeywordRule::when(&["declaracao", "residencia"], DocumentCategory::DeclaracaoResidencia),
    KeywordRule::when(&["residencia", "assinado"], DocumentCategory::DeclaracaoResidencia),
    KeywordRule::when(&["cnis"], DocumentCategory::CnisMeuInss),
    KeywordRule::when(&["inss"], DocumentCategory::CnisMeuInss),
    KeywordRule::when(
        &["termo", "representacao"],
        DocumentCategory::TermoRepresentacaoProcuracao,
    ),
    KeywordRule::when(&["procuracao"], DocumentCategory::TermoRepresentacaoProcuracao),
    KeywordRule::when(&["gps"], DocumentCategory::GpsComprovanteEsocial),
    KeywordRule::when(&["esocial"], DocumentCategory::GpsComprovanteEsocial),
    KeywordRule::when(&["biometria"], DocumentCategory::BiometriaTse),
    KeywordRule::when(&["tse"], DocumentCategory::BiometriaTse),
    KeywordRule::when(&["cin"], DocumentCategory::NovoCinCpf),
    KeywordRule::when(&["identidade", "cpf"], DocumentCategory::NovoCinCpf),
    KeywordRule::when(&["oab"], DocumentCategory::OabAdvogados),
    KeywordRule::when(&["reap"], DocumentCategory::Reap20212024),
    KeywordRule::when(&["relatorio", "atividade"], DocumentCategory::Reap20212024),
];

/// Simulated processing delay, drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyModel {
    pub min: Duration,
    pub max: Duration,
}

impl LatencyModel {
    pub const fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub const fn between_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    pub const fn for_profile(profile: IntakeProfile) -> Self {
        match profile {
            IntakeProfile::Standard => Self::between_millis(1_000, 3_000),
            IntakeProfile::PesqBrasil => Self::between_millis(500, 1_500),
        }
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        // v4 UUIDs carry 122 random bits; the upper half is plenty for jitter.
        let entropy = (uuid::Uuid::new_v4().as_u128() >> 64) as u64;
        let unit = entropy as f64 / u64::MAX as f64;
        self.min + (self.max - self.min).mul_f64(unit)
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Filename-keyword classifier standing in for a content-based OCR service.
///
/// Rules are checked in order against the lower-cased name and the first match wins. With
/// no match the file goes to the first empty required slot, then the first empty slot of
/// any kind. When nothing is empty the file is unclassifiable; the last required slot is
/// never silently overwritten.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: &'static [KeywordRule],
    latency: LatencyModel,
}

impl KeywordClassifier {
    pub fn for_profile(profile: IntakeProfile) -> Self {
        let rules = match profile {
            IntakeProfile::Standard => STANDARD_RULES,
            IntakeProfile::PesqBrasil => PESQBRASIL_RULES,
        };

        Self {
            rules,
            latency: LatencyModel::for_profile(profile),
        }
    }

    /// Classifier for `profile`, with simulated latency only when `simulate_latency` is set.
    pub fn configured(profile: IntakeProfile, simulate_latency: bool) -> Self {
        let classifier = Self::for_profile(profile);
        if simulate_latency {
            classifier
        } else {
            classifier.without_latency()
        }
    }

    pub fn with_latency(mut self, latency: LatencyModel) -> Self {
        self.latency = latency;
        self
    }

    pub fn without_latency(self) -> Self {
        self.with_latency(LatencyModel::none())
    }

    pub fn latency(&self) -> LatencyModel {
        self.latency
    }

    /// Deterministic part of the classifier: same name and snapshot, same answer.
    pub fn identify(&self, file_name: &str, slots: &SlotSnapshot) -> Option<DocumentCategory> {
        let lowered = file_name.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(&lowered)) {
            return Some(rule.category);
        }

        slots.fallback_category()
    }
}

#[async_trait]
impl DocumentClassifier for KeywordClassifier {
    async fn classify(&self, file: &UploadedFile, slots: &SlotSnapshot) -> Classification {
        self.latency.wait().await;

        match self.identify(&file.name, slots) {
            Some(category) => {
                debug!(file = %file.name, ?category, "keyword classifier resolved upload");
                Classification::Classified(category)
            }
            None => Classification::Unclassifiable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::domain::{SlotPhase, SlotView};
    use crate::workflows::intake::registry::SlotRegistry;

    fn standard() -> KeywordClassifier {
        KeywordClassifier::for_profile(IntakeProfile::Standard).without_latency()
    }

    fn empty_standard_snapshot() -> SlotSnapshot {
        SlotRegistry::for_profile(IntakeProfile::Standard).snapshot()
    }

    #[test]
    fn first_matching_rule_wins() {
        let classifier = standard();
        let snapshot = empty_standard_snapshot();

        assert_eq!(
            classifier.identify("rg_joao.pdf", &snapshot),
            Some(DocumentCategory::Rg)
        );
        assert_eq!(
            classifier.identify("RGP-2024.pdf", &snapshot),
            Some(DocumentCategory::Rgp)
        );
        assert_eq!(
            classifier.identify("Carteira_CTPS.jpg", &snapshot),
            Some(DocumentCategory::CarteiraTrabalho)
        );
        assert_eq!(
            classifier.identify("declaracao_colonia_z3.pdf", &snapshot),
            Some(DocumentCategory::DeclaracaoColonia)
        );
    }

    #[test]
    fn pesqbrasil_rules_require_every_term() {
        let classifier = KeywordClassifier::for_profile(IntakeProfile::PesqBrasil).without_latency();
        let snapshot = SlotRegistry::for_profile(IntakeProfile::PesqBrasil).snapshot();

        assert_eq!(
            classifier.identify("Termo_Representacao.pdf", &snapshot),
            Some(DocumentCategory::TermoRepresentacaoProcuracao)
        );
        assert_eq!(
            classifier.identify("relatorio_atividade_2023.pdf", &snapshot),
            Some(DocumentCategory::Reap20212024)
        );
        // "certificado" alone matches neither certificate rule, so fallback applies.
        assert_eq!(
            classifier.identify("certificado.pdf", &snapshot),
            Some(DocumentCategory::CertificadoRegularidadePesqbrasil)
        );
    }

    #[test]
    fn unmatched_names_fall_back_to_empty_required_slots() {
        let classifier = standard();
        let snapshot = SlotSnapshot {
            slots: vec![
                SlotView {
                    category: DocumentCategory::Rg,
                    required: true,
                    phase: SlotPhase::Filled,
                },
                SlotView {
                    category: DocumentCategory::ComprovanteVenda,
                    required: false,
                    phase: SlotPhase::Empty,
                },
                SlotView {
                    category: DocumentCategory::DeclaracaoColonia,
                    required: true,
                    phase: SlotPhase::Empty,
                },
            ],
        };

        assert_eq!(
            classifier.identify("IMG_0042.jpg", &snapshot),
            Some(DocumentCategory::DeclaracaoColonia)
        );
    }

    #[test]
    fn unmatched_names_are_unclassifiable_when_nothing_is_empty() {
        let classifier = standard();
        let snapshot = SlotSnapshot {
            slots: vec![SlotView {
                category: DocumentCategory::Rg,
                required: true,
                phase: SlotPhase::Filled,
            }],
        };

        assert_eq!(classifier.identify("IMG_0042.jpg", &snapshot), None);
    }

    #[test]
    fn identify_is_deterministic() {
        let classifier = standard();
        let snapshot = empty_standard_snapshot();
        let first = classifier.identify("documento_escaneado.pdf", &snapshot);
        for _ in 0..16 {
            assert_eq!(classifier.identify("documento_escaneado.pdf", &snapshot), first);
        }
    }

    #[test]
    fn latency_samples_stay_in_range() {
        let model = LatencyModel::between_millis(500, 1_500);
        for _ in 0..64 {
            let delay = model.sample();
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1_500));
        }
        assert_eq!(LatencyModel::none().sample(), Duration::ZERO);
    }

    #[tokio::test]
    async fn classify_reports_unclassifiable_without_empty_slots() {
        let classifier = standard();
        let outcome = classifier
            .classify(&UploadedFile::named("foto.png"), &SlotSnapshot::default())
            .await;
        assert_eq!(outcome, Classification::Unclassifiable);
    }
}
