//! Eligibility scoring over the set of classified document categories.

mod rubric;
mod rules;

pub use rubric::{CategoryWeight, CheckRule, EligibilityRubric};

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::workflows::intake::{DocumentCategory, IntakeProfile};
use rules::apply_rubric;

/// Simulated round trip of the remote analysis service.
pub const SIMULATED_ANALYSIS_LATENCY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Approved,
    Rejected,
    Warning,
    Pending,
}

impl CheckStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "Aprovado",
            Self::Rejected => "Reprovado",
            Self::Warning => "Atenção",
            Self::Pending => "Pendente",
        }
    }

    /// Marker used in plain-text reports.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Approved => "✓",
            Self::Rejected => "✗",
            Self::Warning => "⚠",
            Self::Pending => "○",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityCheck {
    pub criterion: String,
    pub status: CheckStatus,
    pub detail: String,
}

/// Immutable analysis snapshot attached to a solicitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub score: u8,
    pub checks: Vec<EligibilityCheck>,
    pub missing_categories: Vec<DocumentCategory>,
    pub notes: Vec<String>,
    pub recommendations: Vec<String>,
    pub confidence: u8,
    pub computed_at: DateTime<Utc>,
}

/// Stateless evaluator that applies the rubric to a document set.
#[derive(Debug, Clone)]
pub struct EligibilityEngine {
    rubric: EligibilityRubric,
    latency: Duration,
}

impl EligibilityEngine {
    pub fn new(rubric: EligibilityRubric) -> Self {
        Self {
            rubric,
            latency: Duration::ZERO,
        }
    }

    pub fn for_profile(profile: IntakeProfile, simulate_latency: bool) -> Self {
        let engine = Self::new(EligibilityRubric::for_profile(profile));
        if simulate_latency {
            engine.with_latency(SIMULATED_ANALYSIS_LATENCY)
        } else {
            engine
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn rubric(&self) -> &EligibilityRubric {
        &self.rubric
    }

    pub fn approval_threshold(&self) -> u8 {
        self.rubric.approval_threshold
    }

    /// Pure scoring: identical document sets yield identical results apart from `computed_at`.
    pub fn evaluate(
        &self,
        documents: &[DocumentCategory],
        computed_at: DateTime<Utc>,
    ) -> EligibilityResult {
        let outcome = apply_rubric(documents, &self.rubric);

        EligibilityResult {
            score: outcome.score,
            checks: outcome.checks,
            missing_categories: outcome.missing_categories,
            notes: outcome.notes,
            recommendations: outcome.recommendations,
            confidence: outcome.confidence,
            computed_at,
        }
    }

    pub async fn analyze(&self, documents: &[DocumentCategory]) -> EligibilityResult {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = self.evaluate(documents, Utc::now());
        info!(
            documents = documents.len(),
            score = result.score,
            missing = result.missing_categories.len(),
            "eligibility analysis complete"
        );
        result
    }
}

impl Default for EligibilityEngine {
    fn default() -> Self {
        Self::new(EligibilityRubric::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::workflows::intake::DocumentCategory::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid timestamp")
    }

    #[test]
    fn core_and_supporting_documents_reach_the_threshold() {
        let engine = EligibilityEngine::default();
        let result = engine.evaluate(&[Rgp, DeclaracaoColonia, ComprovanteVenda], at());

        assert_eq!(result.score, 80);
        assert!(result.score >= engine.approval_threshold());
        // Every weighted category counts toward missing, so an approved result still lists
        // RG and CPF.
        assert_eq!(result.missing_categories, vec![Rg, Cpf]);
        assert_eq!(
            result.recommendations,
            vec!["Documentação adequada", "Prosseguir com o pedido"]
        );
        assert_eq!(result.notes, vec!["Poucos documentos apresentados"]);
        assert_eq!(result.confidence, 75);
    }

    #[test]
    fn full_standard_set_scores_one_hundred() {
        let engine = EligibilityEngine::default();
        let result = engine.evaluate(
            &[
                Rg,
                Cpf,
                Rgp,
                ComprovanteResidencia,
                DeclaracaoColonia,
                ComprovanteVenda,
                CarteiraTrabalho,
            ],
            at(),
        );

        assert_eq!(result.score, 100);
        assert!(result.missing_categories.is_empty());
        assert!(result.notes.is_empty());
        assert_eq!(result.confidence, 95);
        assert!(result
            .checks
            .iter()
            .all(|check| check.status == CheckStatus::Approved));
    }

    #[test]
    fn missing_colony_declaration_is_only_a_warning() {
        let engine = EligibilityEngine::default();
        let result = engine.evaluate(&[Rg, Cpf], at());

        assert_eq!(result.score, 50);
        let statuses: Vec<(&str, CheckStatus)> = result
            .checks
            .iter()
            .map(|check| (check.criterion.as_str(), check.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("Documentos básicos apresentados", CheckStatus::Approved),
                ("RGP válido", CheckStatus::Rejected),
                ("Comprovação de atividade pesqueira", CheckStatus::Rejected),
                ("Vínculo com Colônia", CheckStatus::Warning),
            ]
        );
        assert_eq!(
            result.recommendations,
            vec!["Solicitar documentos faltantes", "Revisar informações"]
        );
    }

    #[test]
    fn scores_are_clamped_to_the_percent_range() {
        let mut rubric = EligibilityRubric::standard();
        rubric.base_score = 90;
        let high = EligibilityEngine::new(rubric.clone()).evaluate(&[Rg, Cpf, Rgp], at());
        assert_eq!(high.score, 100);
        assert!(rubric.maximum_score() > 100);

        rubric.base_score = -80;
        let low = EligibilityEngine::new(rubric).evaluate(&[Rg], at());
        assert_eq!(low.score, 0);
    }

    #[test]
    fn evaluation_is_a_pure_function_of_the_document_set() {
        let engine = EligibilityEngine::default();
        let documents = [Cpf, Rgp, ComprovanteVenda];
        let first = engine.evaluate(&documents, at());
        let second = engine.evaluate(&documents, at());
        assert_eq!(first, second);
    }

    #[test]
    fn pesqbrasil_rubric_weights_reach_one_hundred() {
        let rubric = EligibilityRubric::pesqbrasil();
        assert_eq!(rubric.maximum_score(), 100);

        let engine = EligibilityEngine::new(rubric);
        let result = engine.evaluate(&[CertificadoRegularidadePesqbrasil, NovoCinCpf], at());
        assert_eq!(result.score, 50);
        assert_eq!(
            result.missing_categories,
            vec![Reap20212024, CnisMeuInss, CaepfEcac, TermoRepresentacaoProcuracao]
        );
    }

    #[tokio::test]
    async fn analyze_stamps_the_current_time() {
        let engine = EligibilityEngine::default();
        let before = Utc::now();
        let result = engine.analyze(&[Rg]).await;
        assert!(result.computed_at >= before);
        assert_eq!(result.score, 40);
    }
}
