use serde::{Deserialize, Serialize};

/// Every document kind the office knows how to file. The first block belongs to the
/// `standard` intake form, the second to the PesqBrasil checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Rg,
    Cpf,
    Rgp,
    ComprovanteResidencia,
    DeclaracaoColonia,
    ComprovanteVenda,
    CarteiraTrabalho,
    CertificadoRegularidadePesqbrasil,
    CaepfEcac,
    DeclaracaoResidencia,
    CnisMeuInss,
    TermoRepresentacaoProcuracao,
    GpsComprovanteEsocial,
    BiometriaTse,
    NovoCinCpf,
    OabAdvogados,
    #[serde(rename = "reap_2021_2024")]
    Reap20212024,
    Outros,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 18] = [
        Self::Rg,
        Self::Cpf,
        Self::Rgp,
        Self::ComprovanteResidencia,
        Self::DeclaracaoColonia,
        Self::ComprovanteVenda,
        Self::CarteiraTrabalho,
        Self::CertificadoRegularidadePesqbrasil,
        Self::CaepfEcac,
        Self::DeclaracaoResidencia,
        Self::CnisMeuInss,
        Self::TermoRepresentacaoProcuracao,
        Self::GpsComprovanteEsocial,
        Self::BiometriaTse,
        Self::NovoCinCpf,
        Self::OabAdvogados,
        Self::Reap20212024,
        Self::Outros,
    ];

    /// Wire name, identical to the serde representation.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Rg => "rg",
            Self::Cpf => "cpf",
            Self::Rgp => "rgp",
            Self::ComprovanteResidencia => "comprovante_residencia",
            Self::DeclaracaoColonia => "declaracao_colonia",
            Self::ComprovanteVenda => "comprovante_venda",
            Self::CarteiraTrabalho => "carteira_trabalho",
            Self::CertificadoRegularidadePesqbrasil => "certificado_regularidade_pesqbrasil",
            Self::CaepfEcac => "caepf_ecac",
            Self::DeclaracaoResidencia => "declaracao_residencia",
            Self::CnisMeuInss => "cnis_meu_inss",
            Self::TermoRepresentacaoProcuracao => "termo_representacao_procuracao",
            Self::GpsComprovanteEsocial => "gps_comprovante_esocial",
            Self::BiometriaTse => "biometria_tse",
            Self::NovoCinCpf => "novo_cin_cpf",
            Self::OabAdvogados => "oab_advogados",
            Self::Reap20212024 => "reap_2021_2024",
            Self::Outros => "outros",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|category| category.code() == raw)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rg => "RG (Registro Geral)",
            Self::Cpf => "CPF",
            Self::Rgp => "Registro Geral da Pesca (RGP)",
            Self::ComprovanteResidencia => "Comprovante de Residência",
            Self::DeclaracaoColonia => "Declaração da Colônia",
            Self::ComprovanteVenda => "Comprovante de Venda de Pescado",
            Self::CarteiraTrabalho => "Carteira de Trabalho",
            Self::CertificadoRegularidadePesqbrasil => "Certificado de Regularidade – PesqBrasil",
            Self::CaepfEcac => "CAEPF – E-CAC",
            Self::DeclaracaoResidencia => "Declaração de Residência (Assinado pelo Pescador)",
            Self::CnisMeuInss => "CNIS – Meu INSS",
            Self::TermoRepresentacaoProcuracao => "Termo de Representação e Procuração (Assinado)",
            Self::GpsComprovanteEsocial => "GPS e Comprovante de GPS – E-Social",
            Self::BiometriaTse => "Biometria – Site TSE",
            Self::NovoCinCpf => "Novo CIN (Identidade) e CPF",
            Self::OabAdvogados => "OAB Advogados (Responsabilidade do Escritório)",
            Self::Reap20212024 => "REAP 2021-2024 – PesqBrasil",
            Self::Outros => "Outros Documentos",
        }
    }
}

/// Static description of one slot on an intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDefinition {
    pub category: DocumentCategory,
    pub label: &'static str,
    pub required: bool,
}

const fn slot(category: DocumentCategory, required: bool) -> SlotDefinition {
    SlotDefinition {
        category,
        label: category.label(),
        required,
    }
}

const STANDARD_SLOTS: &[SlotDefinition] = &[
    slot(DocumentCategory::Rg, true),
    slot(DocumentCategory::Cpf, true),
    slot(DocumentCategory::Rgp, true),
    slot(DocumentCategory::ComprovanteResidencia, true),
    slot(DocumentCategory::DeclaracaoColonia, true),
    slot(DocumentCategory::ComprovanteVenda, false),
    slot(DocumentCategory::CarteiraTrabalho, false),
];

const PESQBRASIL_SLOTS: &[SlotDefinition] = &[
    slot(DocumentCategory::CertificadoRegularidadePesqbrasil, true),
    slot(DocumentCategory::CaepfEcac, true),
    slot(DocumentCategory::DeclaracaoResidencia, true),
    slot(DocumentCategory::CnisMeuInss, true),
    slot(DocumentCategory::TermoRepresentacaoProcuracao, true),
    slot(DocumentCategory::GpsComprovanteEsocial, true),
    slot(DocumentCategory::BiometriaTse, true),
    slot(DocumentCategory::NovoCinCpf, true),
    slot(DocumentCategory::OabAdvogados, false),
    slot(DocumentCategory::Reap20212024, true),
];

const STANDARD_MEDIA_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// Which intake form is presented to the office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeProfile {
    #[default]
    Standard,
    #[serde(rename = "pesqbrasil")]
    PesqBrasil,
}

impl IntakeProfile {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" | "padrao" => Some(Self::Standard),
            "pesqbrasil" | "pesq_brasil" => Some(Self::PesqBrasil),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::PesqBrasil => "pesqbrasil",
        }
    }

    pub const fn definitions(self) -> &'static [SlotDefinition] {
        match self {
            Self::Standard => STANDARD_SLOTS,
            Self::PesqBrasil => PESQBRASIL_SLOTS,
        }
    }

    /// MIME essences accepted by the upload widget; `None` accepts anything.
    pub const fn accepted_media_types(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Standard => Some(STANDARD_MEDIA_TYPES),
            Self::PesqBrasil => None,
        }
    }
}

/// A file handed to the intake widget. Content is never inspected by the stub classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
}

impl UploadedFile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            size_bytes: 0,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Declared content type, or one guessed from the file extension.
    pub fn media_type(&self) -> Option<mime::Mime> {
        match &self.content_type {
            Some(raw) => raw.parse().ok(),
            None => mime_guess::from_path(&self.name).first(),
        }
    }
}

/// Per-slot state. Payloads only exist in the states that own them, so a slot can never
/// carry a bound file while empty or an error message while filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlotState {
    Empty,
    Identifying { pending_file_name: String },
    Filled { file: UploadedFile },
    Error { message: String },
}

impl SlotState {
    pub fn phase(&self) -> SlotPhase {
        match self {
            Self::Empty => SlotPhase::Empty,
            Self::Identifying { .. } => SlotPhase::Identifying,
            Self::Filled { .. } => SlotPhase::Filled,
            Self::Error { .. } => SlotPhase::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPhase {
    Empty,
    Identifying,
    Filled,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSlot {
    pub category: DocumentCategory,
    pub label: &'static str,
    pub required: bool,
    pub state: SlotState,
}

impl DocumentSlot {
    pub fn is_empty(&self) -> bool {
        self.state == SlotState::Empty
    }

    pub fn is_filled(&self) -> bool {
        matches!(self.state, SlotState::Filled { .. })
    }

    pub fn bound_file(&self) -> Option<&UploadedFile> {
        match &self.state {
            SlotState::Filled { file } => Some(file),
            _ => None,
        }
    }
}

/// Output unit handed to the parent form after every slot mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedDocument {
    pub category: DocumentCategory,
    pub file_name: String,
    pub file: UploadedFile,
}

/// Read-only view of one slot, as seen by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotView {
    pub category: DocumentCategory,
    pub required: bool,
    pub phase: SlotPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotSnapshot {
    pub slots: Vec<SlotView>,
}

impl SlotSnapshot {
    /// First empty slot, preferring required ones.
    pub fn fallback_category(&self) -> Option<DocumentCategory> {
        let empty: Vec<&SlotView> = self
            .slots
            .iter()
            .filter(|view| view.phase == SlotPhase::Empty)
            .collect();
        empty
            .iter()
            .find(|view| view.required)
            .or_else(|| empty.first())
            .map(|view| view.category)
    }
}
