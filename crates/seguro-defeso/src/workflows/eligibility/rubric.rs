use serde::{Deserialize, Serialize};

use super::CheckStatus;
use crate::workflows::intake::{DocumentCategory, IntakeProfile};

/// Points awarded when a category is present. Order also fixes the order of the
/// missing-category list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub category: DocumentCategory,
    pub points: i16,
}

/// A pass/fail criterion over the presence of one or more categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRule {
    pub criterion: String,
    pub requires: Vec<DocumentCategory>,
    pub present_detail: String,
    pub missing_detail: String,
    pub missing_status: CheckStatus,
}

/// Rubric configuration describing the eligibility scoring weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRubric {
    pub base_score: i16,
    pub weights: Vec<CategoryWeight>,
    pub checks: Vec<CheckRule>,
    pub minimum_documents: usize,
    pub few_documents_note: String,
    pub approval_threshold: u8,
    pub adequate_recommendations: Vec<String>,
    pub inadequate_recommendations: Vec<String>,
}

fn weight(category: DocumentCategory, points: i16) -> CategoryWeight {
    CategoryWeight { category, points }
}

fn check(
    criterion: &str,
    requires: &[DocumentCategory],
    present_detail: &str,
    missing_detail: &str,
    missing_status: CheckStatus,
) -> CheckRule {
    CheckRule {
        criterion: criterion.to_string(),
        requires: requires.to_vec(),
        present_detail: present_detail.to_string(),
        missing_detail: missing_detail.to_string(),
        missing_status,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl EligibilityRubric {
    pub fn standard() -> Self {
        use DocumentCategory::*;

        Self {
            base_score: 30,
            weights: vec![
                weight(Rgp, 20),
                weight(DeclaracaoColonia, 15),
                weight(ComprovanteVenda, 15),
                weight(Rg, 10),
                weight(Cpf, 10),
            ],
            checks: vec![
                check(
                    "Documentos básicos apresentados",
                    &[Rg, Cpf],
                    "RG e CPF presentes",
                    "Faltam documentos básicos",
                    CheckStatus::Rejected,
                ),
                check(
                    "RGP válido",
                    &[Rgp],
                    "RGP apresentado",
                    "RGP não apresentado",
                    CheckStatus::Rejected,
                ),
                check(
                    "Comprovação de atividade pesqueira",
                    &[ComprovanteVenda],
                    "Comprovantes de venda apresentados",
                    "Sem comprovação de vendas",
                    CheckStatus::Rejected,
                ),
                check(
                    "Vínculo com Colônia",
                    &[DeclaracaoColonia],
                    "Declaração da Colônia apresentada",
                    "Falta declaração da Colônia",
                    CheckStatus::Warning,
                ),
            ],
            minimum_documents: 5,
            few_documents_note: "Poucos documentos apresentados".to_string(),
            approval_threshold: 70,
            adequate_recommendations: strings(&["Documentação adequada", "Prosseguir com o pedido"]),
            inadequate_recommendations: strings(&[
                "Solicitar documentos faltantes",
                "Revisar informações",
            ]),
        }
    }

    pub fn pesqbrasil() -> Self {
        use DocumentCategory::*;

        Self {
            base_score: 20,
            weights: vec![
                weight(CertificadoRegularidadePesqbrasil, 20),
                weight(Reap20212024, 15),
                weight(CnisMeuInss, 15),
                weight(CaepfEcac, 10),
                weight(NovoCinCpf, 10),
                weight(TermoRepresentacaoProcuracao, 10),
            ],
            checks: vec![
                check(
                    "Documentos de identificação apresentados",
                    &[NovoCinCpf],
                    "CIN e CPF presentes",
                    "Faltam documentos de identificação",
                    CheckStatus::Rejected,
                ),
                check(
                    "Regularidade no PesqBrasil",
                    &[CertificadoRegularidadePesqbrasil],
                    "Certificado de regularidade apresentado",
                    "Certificado de regularidade não apresentado",
                    CheckStatus::Rejected,
                ),
                check(
                    "Comprovação de atividade pesqueira",
                    &[Reap20212024],
                    "REAP 2021-2024 apresentado",
                    "Sem relatório de atividade pesqueira",
                    CheckStatus::Rejected,
                ),
                check(
                    "Situação previdenciária",
                    &[CnisMeuInss, GpsComprovanteEsocial],
                    "CNIS e GPS apresentados",
                    "Falta CNIS ou comprovante de GPS",
                    CheckStatus::Warning,
                ),
                check(
                    "Representação processual",
                    &[TermoRepresentacaoProcuracao],
                    "Termo de representação assinado",
                    "Falta termo de representação",
                    CheckStatus::Warning,
                ),
            ],
            minimum_documents: 8,
            few_documents_note: "Poucos documentos apresentados".to_string(),
            approval_threshold: 70,
            adequate_recommendations: strings(&["Documentação adequada", "Prosseguir com o pedido"]),
            inadequate_recommendations: strings(&[
                "Solicitar documentos faltantes",
                "Revisar informações",
            ]),
        }
    }

    pub fn for_profile(profile: IntakeProfile) -> Self {
        match profile {
            IntakeProfile::Standard => Self::standard(),
            IntakeProfile::PesqBrasil => Self::pesqbrasil(),
        }
    }

    /// Sum of base score and every weight, before clamping.
    pub fn maximum_score(&self) -> i16 {
        self.base_score + self.weights.iter().map(|weight| weight.points).sum::<i16>()
    }
}

impl Default for EligibilityRubric {
    fn default() -> Self {
        Self::standard()
    }
}
