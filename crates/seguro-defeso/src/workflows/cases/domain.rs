use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::eligibility::EligibilityResult;
use crate::workflows::intake::{ClassifiedDocument, DocumentCategory};

/// Identifier shared by cases, solicitations, processes and their documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fisher filing the claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claimant {
    pub name: String,
    pub cpf: String,
    #[serde(default)]
    pub rg: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub colony: String,
    #[serde(default)]
    pub rgp_number: Option<String>,
    #[serde(default)]
    pub rgp_issued_on: Option<NaiveDate>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Presente,
    Ausente,
    Invalido,
    Vencido,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Presente => "Presente",
            Self::Ausente => "Ausente",
            Self::Invalido => "Inválido",
            Self::Vencido => "Vencido",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: RecordId,
    pub category: DocumentCategory,
    pub name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: DocumentStatus,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Baixa,
    #[default]
    Media,
    Alta,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Baixa => "Baixa",
            Self::Media => "Média",
            Self::Alta => "Alta",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pendente,
    EmAnalise,
    Aprovado,
    Negado,
    DocumentacaoIncompleta,
}

impl CaseStatus {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::EmAnalise => "em_analise",
            Self::Aprovado => "aprovado",
            Self::Negado => "negado",
            Self::DocumentacaoIncompleta => "documentacao_incompleta",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendente => "Pendente",
            Self::EmAnalise => "Em Análise",
            Self::Aprovado => "Aprovado",
            Self::Negado => "Negado",
            Self::DocumentacaoIncompleta => "Doc. Incompleta",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolicitationStatus {
    Pendente,
    EmAnalise,
    Aprovada,
    Reprovada,
    DocumentacaoIncompleta,
}

impl SolicitationStatus {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::EmAnalise => "em_analise",
            Self::Aprovada => "aprovada",
            Self::Reprovada => "reprovada",
            Self::DocumentacaoIncompleta => "documentacao_incompleta",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendente => "Pendente",
            Self::EmAnalise => "Em Análise",
            Self::Aprovada => "Aprovada",
            Self::Reprovada => "Reprovada",
            Self::DocumentacaoIncompleta => "Doc. Incompleta",
        }
    }

    /// Whether a reviewer may still approve the solicitation.
    pub const fn is_open(self) -> bool {
        matches!(
            self,
            Self::Pendente | Self::EmAnalise | Self::DocumentacaoIncompleta
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    EmAndamento,
    AguardandoDocumentos,
    Deferido,
    Indeferido,
    Arquivado,
}

impl ProcessStatus {
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmAndamento => "em_andamento",
            Self::AguardandoDocumentos => "aguardando_documentos",
            Self::Deferido => "deferido",
            Self::Indeferido => "indeferido",
            Self::Arquivado => "arquivado",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EmAndamento => "Em Andamento",
            Self::AguardandoDocumentos => "Aguardando Documentos",
            Self::Deferido => "Deferido",
            Self::Indeferido => "Indeferido",
            Self::Arquivado => "Arquivado",
        }
    }
}

/// Court-side fields tracked for a filed claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtDetails {
    #[serde(default)]
    pub process_number: Option<String>,
    #[serde(default)]
    pub tribunal: Option<String>,
    #[serde(default)]
    pub court_body: Option<String>,
    #[serde(default)]
    pub procedural_class: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub situation: Option<String>,
    #[serde(default)]
    pub filed_on: Option<NaiveDate>,
    #[serde(default)]
    pub movements: Option<u32>,
    #[serde(default)]
    pub last_movement: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: RecordId,
    pub claimant: Claimant,
    pub status: CaseStatus,
    pub documents: Vec<DocumentRecord>,
    pub analysis: Option<EligibilityResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lawyer_notes: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub court: CourtDetails,
}

/// Pre-filing review of a claimant's documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solicitation {
    pub id: RecordId,
    pub claimant: Claimant,
    pub status: SolicitationStatus,
    pub documents: Vec<DocumentRecord>,
    pub analysis: Option<EligibilityResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lawyer_notes: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub process_id: Option<RecordId>,
}

impl Solicitation {
    pub fn categories(&self) -> Vec<DocumentCategory> {
        self.documents.iter().map(|document| document.category).collect()
    }
}

/// Judicial case record, optionally derived from an approved solicitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: RecordId,
    pub claimant: Claimant,
    pub status: ProcessStatus,
    pub documents: Vec<DocumentRecord>,
    pub process_number: String,
    pub tribunal: String,
    pub court_body: Option<String>,
    pub procedural_class: Option<String>,
    pub subject: Option<String>,
    pub situation: Option<String>,
    pub filed_on: NaiveDate,
    pub movements: Option<u32>,
    pub last_movement: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lawyer_notes: Option<String>,
    pub priority: Priority,
    pub solicitation_id: Option<RecordId>,
}

/// Document reference handed over by the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedDocument {
    pub category: DocumentCategory,
    pub file_name: String,
}

impl From<&ClassifiedDocument> for SubmittedDocument {
    fn from(document: &ClassifiedDocument) -> Self {
        Self {
            category: document.category,
            file_name: document.file_name.clone(),
        }
    }
}

/// Payload accepted when a new solicitation is filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolicitationSubmission {
    pub claimant: Claimant,
    #[serde(default)]
    pub documents: Vec<SubmittedDocument>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub lawyer_notes: Option<String>,
}

/// A process found on a court portal and registered by number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessImport {
    pub process_number: String,
    pub claimant_name: String,
    #[serde(default)]
    pub claimant_cpf: String,
    pub tribunal: String,
    #[serde(default)]
    pub court_body: Option<String>,
    #[serde(default)]
    pub procedural_class: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub situation: Option<String>,
    #[serde(default)]
    pub filed_on: Option<NaiveDate>,
    #[serde(default)]
    pub movements: Option<u32>,
    #[serde(default)]
    pub last_movement: Option<NaiveDate>,
}

/// Allocates process numbers in the CNJ unified layout `NNNNNNN-DD.AAAA.J.TR.OOOO`.
#[derive(Debug)]
pub struct ProcessNumberIssuer {
    next: AtomicU64,
    justice: u8,
    tribunal: u8,
    origin: u16,
}

pub const STATE_JUSTICE_SEGMENT: u8 = 8;
pub const SAO_PAULO_TRIBUNAL: u8 = 26;
pub const DEFAULT_ORIGIN: u16 = 100;

impl ProcessNumberIssuer {
    pub fn new(justice: u8, tribunal: u8, origin: u16) -> Self {
        Self {
            next: AtomicU64::new(1),
            justice,
            tribunal,
            origin,
        }
    }

    pub fn issue(&self, year: i32) -> String {
        let sequence = self.next.fetch_add(1, Ordering::Relaxed) % 10_000_000;
        format_process_number(sequence, year, self.justice, self.tribunal, self.origin)
    }
}

impl Default for ProcessNumberIssuer {
    fn default() -> Self {
        Self::new(STATE_JUSTICE_SEGMENT, SAO_PAULO_TRIBUNAL, DEFAULT_ORIGIN)
    }
}

/// Mod-97 check digits (ISO 7064) over `NNNNNNN AAAA J TR OOOO`.
pub fn check_digits(sequence: u64, year: i32, justice: u8, tribunal: u8, origin: u16) -> u8 {
    let digits = format!("{sequence:07}{year:04}{justice}{tribunal:02}{origin:04}00");
    let remainder = digits
        .bytes()
        .fold(0u128, |acc, byte| (acc * 10 + u128::from(byte - b'0')) % 97);
    (98 - remainder) as u8
}

pub fn format_process_number(
    sequence: u64,
    year: i32,
    justice: u8,
    tribunal: u8,
    origin: u16,
) -> String {
    let digits = check_digits(sequence, year, justice, tribunal, origin);
    format!("{sequence:07}-{digits:02}.{year:04}.{justice}.{tribunal:02}.{origin:04}")
}

/// Validate a formatted CNJ number, including its check digits.
pub fn is_valid_process_number(number: &str) -> bool {
    let Some((sequence, rest)) = number.split_once('-') else {
        return false;
    };
    let parts: Vec<&str> = rest.split('.').collect();
    let &[digits, year, justice, tribunal, origin] = parts.as_slice() else {
        return false;
    };

    let widths = [
        (sequence, 7),
        (digits, 2),
        (year, 4),
        (justice, 1),
        (tribunal, 2),
        (origin, 4),
    ];
    if widths
        .iter()
        .any(|(part, width)| part.len() != *width || !part.bytes().all(|byte| byte.is_ascii_digit()))
    {
        return false;
    }

    let parsed = (
        sequence.parse::<u64>(),
        digits.parse::<u8>(),
        year.parse::<i32>(),
        justice.parse::<u8>(),
        tribunal.parse::<u8>(),
        origin.parse::<u16>(),
    );
    match parsed {
        (Ok(sequence), Ok(digits), Ok(year), Ok(justice), Ok(tribunal), Ok(origin)) => {
            check_digits(sequence, year, justice, tribunal, origin) == digits
        }
        _ => false,
    }
}
