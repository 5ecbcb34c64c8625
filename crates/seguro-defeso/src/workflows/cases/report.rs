//! Plain-text documents handed to the reviewer as downloads.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{
    Claimant, DocumentRecord, DocumentStatus, Process, ProcessStatus, Solicitation,
    SolicitationStatus,
};
use crate::workflows::eligibility::CheckStatus;

pub const TEXT_MIME: &str = "text/plain; charset=utf-8";

const HEAVY_RULE: &str =
    "═══════════════════════════════════════════════════════════════════";
const LIGHT_RULE: &str =
    "─────────────────────────────────────────────────────────────────";

const DISCLAIMER: &[&str] = &[
    "Este relatório foi gerado automaticamente por sistema de análise",
    "com auxílio de Inteligência Artificial. A análise final e a",
    "responsabilidade pela verificação dos documentos e elegibilidade",
    "são do profissional jurídico responsável.",
    "",
    "A IA é uma ferramenta de auxílio e não substitui a análise",
    "jurídica humana especializada.",
];

/// Days the claimant has to hand in missing documents.
pub const DOCUMENT_REQUEST_DEADLINE_DAYS: u32 = 15;

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Rendered download: file name, MIME type and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextDocument {
    pub file_name: String,
    pub mime: &'static str,
    pub body: String,
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `16 de outubro de 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{:02} de {month} de {}", date.day(), date.year())
}

/// `12345678901` → `123.456.789-01`; anything that is not 11 digits is returned unchanged.
pub fn format_cpf(cpf: &str) -> String {
    match digits_only(cpf, 11) {
        Some(d) => format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]),
        None => cpf.to_string(),
    }
}

/// `123456789` → `12.345.678-9`; anything that is not 9 digits is returned unchanged.
pub fn format_rg(rg: &str) -> String {
    match digits_only(rg, 9) {
        Some(d) => format!("{}.{}.{}-{}", &d[0..2], &d[2..5], &d[5..8], &d[8..9]),
        None => rg.to_string(),
    }
}

fn digits_only(raw: &str, len: usize) -> Option<&str> {
    (raw.len() == len && raw.bytes().all(|byte| byte.is_ascii_digit())).then_some(raw)
}

fn file_stem(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Upper-case status code with its first underscore spaced out, e.g. `EM ANALISE`.
fn shout(code: &str) -> String {
    code.to_uppercase().replacen('_', " ", 1)
}

fn document_status_mark(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Presente => "✓ Presente",
        DocumentStatus::Invalido => "✗ Inválido",
        DocumentStatus::Vencido => "✗ Vencido",
        DocumentStatus::Ausente => "- Ausente",
    }
}

fn check_mark(status: CheckStatus) -> String {
    format!("{} {}", status.symbol(), status.label().to_uppercase())
}

/// Line accumulator for the report templates.
#[derive(Default)]
struct Sheet {
    lines: Vec<String>,
}

impl Sheet {
    fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    fn optional(&mut self, label: &str, value: Option<impl AsRef<str>>) -> &mut Self {
        if let Some(value) = value {
            if !value.as_ref().is_empty() {
                self.line(format!("{label}: {}", value.as_ref()));
            }
        }
        self
    }

    fn banner(&mut self, title: &str) -> &mut Self {
        self.line(HEAVY_RULE).line(format!("  {title}")).line(HEAVY_RULE).blank()
    }

    fn section(&mut self, title: &str) -> &mut Self {
        self.line(LIGHT_RULE).blank().line(title).line(LIGHT_RULE)
    }

    fn numbered<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (index, item) in items.into_iter().enumerate() {
            self.line(format!("{}. {}", index + 1, item.as_ref()));
        }
        self
    }

    fn claimant(&mut self, claimant: &Claimant) -> &mut Self {
        self.line(format!("Nome Completo: {}", claimant.name))
            .line(format!("CPF: {}", format_cpf(&claimant.cpf)))
            .line(format!("RG: {}", format_rg(&claimant.rg)))
            .line(format!("Endereço: {}", claimant.address))
            .line(format!("Colônia de Pescadores: {}", claimant.colony))
            .optional("RGP", claimant.rgp_number.as_deref())
            .optional("Data de Emissão RGP", claimant.rgp_issued_on.map(format_date))
            .line(format!("Telefone: {}", claimant.phone))
            .optional("E-mail", claimant.email.as_deref())
            .blank()
    }

    fn documents(
        &mut self,
        documents: &[DocumentRecord],
        uploaded_label: &str,
        with_status: bool,
    ) -> &mut Self {
        for (index, document) in documents.iter().enumerate() {
            self.line(format!("{}. {}", index + 1, document.category.label()))
                .line(format!("   Arquivo: {}", document.name));
            if with_status {
                self.line(format!("   Status: {}", document_status_mark(document.status)));
            }
            self.line(format!(
                "   {uploaded_label}: {}",
                format_date(document.uploaded_at.date_naive())
            ));
        }
        self.blank()
    }

    fn footer(&mut self, generated_on: NaiveDate) -> &mut Self {
        self.section("DISCLAIMER");
        for line in DISCLAIMER {
            self.line(*line);
        }
        self.blank()
            .line(HEAVY_RULE)
            .line(format!("  Relatório gerado em {}", format_date(generated_on)))
            .line(HEAVY_RULE)
    }

    fn finish(&self) -> String {
        let mut body = self.lines.join("\n");
        body.push('\n');
        body
    }
}

/// Full analysis report for one solicitation.
pub fn render_analysis_report(record: &Solicitation, now: DateTime<Utc>) -> TextDocument {
    let mut sheet = Sheet::default();
    sheet
        .banner("RELATÓRIO DE ANÁLISE DE SOLICITAÇÃO - SEGURO-DEFESO")
        .line("DADOS DO PESCADOR")
        .line(LIGHT_RULE)
        .claimant(&record.claimant)
        .section("RESULTADO DA ANÁLISE IA");

    match &record.analysis {
        Some(analysis) => {
            sheet
                .line(format!("Score de Aprovação: {}%", analysis.score))
                .line(format!("Confiança da IA: {}%", analysis.confidence))
                .line(format!(
                    "Data da Análise: {}",
                    format_date(analysis.computed_at.date_naive())
                ));
        }
        None => {
            sheet.line("Data da Análise: Aguardando análise");
        }
    }

    sheet
        .blank()
        .line(format!("Status da Solicitação: {}", shout(record.status.code())))
        .line(format!("Prioridade: {}", shout(record.priority.label())))
        .blank()
        .section("CRITÉRIOS DE ELEGIBILIDADE");

    match record.analysis.as_ref().filter(|analysis| !analysis.checks.is_empty()) {
        Some(analysis) => {
            for (index, check) in analysis.checks.iter().enumerate() {
                sheet
                    .line(format!("{}. {}", index + 1, check.criterion))
                    .line(format!("   Status: {}", check_mark(check.status)))
                    .line(format!("   Detalhes: {}", check.detail));
            }
        }
        None => {
            sheet.line("Nenhuma análise disponível");
        }
    }

    sheet
        .blank()
        .section(&format!("DOCUMENTOS APRESENTADOS ({})", record.documents.len()))
        .documents(&record.documents, "Data de Upload", true);

    if let Some(analysis) = &record.analysis {
        if !analysis.missing_categories.is_empty() {
            sheet
                .section(&format!(
                    "DOCUMENTOS FALTANTES ({})",
                    analysis.missing_categories.len()
                ))
                .numbered(analysis.missing_categories.iter().map(|category| category.label()))
                .blank();
        }
        if !analysis.notes.is_empty() {
            sheet
                .section(&format!("OBSERVAÇÕES DA ANÁLISE ({})", analysis.notes.len()))
                .numbered(&analysis.notes)
                .blank();
        }
        if !analysis.recommendations.is_empty() {
            sheet
                .section("RECOMENDAÇÕES")
                .numbered(&analysis.recommendations)
                .blank();
        }
    }

    if let Some(notes) = record.lawyer_notes.as_deref().filter(|notes| !notes.is_empty()) {
        sheet.section("OBSERVAÇÕES DO ADVOGADO").line(notes).blank();
    }

    sheet.section("PRÓXIMOS PASSOS");
    match record.status {
        SolicitationStatus::Aprovada => sheet
            .line("✓ Solicitação APROVADA para abertura de processo judicial.")
            .line("  Recomenda-se prosseguir com a ação judicial."),
        SolicitationStatus::DocumentacaoIncompleta => sheet
            .line("⚠ Documentação INCOMPLETA.")
            .line("  Solicitar documentos faltantes ao cliente antes de prosseguir."),
        SolicitationStatus::Reprovada => sheet
            .line("✗ Solicitação REPROVADA.")
            .line("  Informar cliente sobre inelegibilidade e motivos."),
        SolicitationStatus::Pendente | SolicitationStatus::EmAnalise => {
            sheet.line("→ Análise em andamento. Aguardar conclusão.")
        }
    };

    sheet
        .blank()
        .section("INFORMAÇÕES DO RELATÓRIO")
        .line(format!("ID da Solicitação: {}", record.id))
        .line(format!("Data de Criação: {}", format_date(record.created_at.date_naive())))
        .line(format!(
            "Última Atualização: {}",
            format_date(record.updated_at.date_naive())
        ))
        .blank()
        .footer(now.date_naive());

    TextDocument {
        file_name: format!(
            "relatorio_{}_{}.txt",
            file_stem(&record.claimant.name),
            now.timestamp_millis()
        ),
        mime: TEXT_MIME,
        body: sheet.finish(),
    }
}

/// Letter asking the claimant for the documents the analysis found missing.
pub fn render_document_request(record: &Solicitation, now: DateTime<Utc>) -> TextDocument {
    let today = now.date_naive();
    let missing: Vec<&str> = record
        .analysis
        .iter()
        .flat_map(|analysis| analysis.missing_categories.iter())
        .map(|category| category.label())
        .collect();
    let notes: Vec<&str> = record
        .analysis
        .iter()
        .flat_map(|analysis| analysis.notes.iter())
        .map(String::as_str)
        .collect();

    let mut sheet = Sheet::default();
    sheet
        .banner("SOLICITAÇÃO DE DOCUMENTOS COMPLEMENTARES")
        .line(format_long_date(today))
        .blank()
        .line(format!("Prezado(a) {},", record.claimant.name))
        .blank()
        .line("Em análise ao seu processo de solicitação do benefício Seguro-Defeso,")
        .line("identificamos a necessidade de apresentação dos seguintes documentos")
        .line("complementares:")
        .blank()
        .line("DOCUMENTOS SOLICITADOS:")
        .line(LIGHT_RULE);

    if missing.is_empty() {
        sheet.line("Nenhum documento faltante");
    } else {
        sheet.numbered(&missing);
    }

    sheet.blank().line(LIGHT_RULE).blank().line("OBSERVAÇÕES IMPORTANTES:");
    if notes.is_empty() {
        sheet.line("Nenhuma observação adicional");
    } else {
        sheet.numbered(&notes);
    }

    let deadline = today + chrono::Days::new(u64::from(DOCUMENT_REQUEST_DEADLINE_DAYS));
    sheet
        .blank()
        .line(LIGHT_RULE)
        .blank()
        .line("PRAZO PARA APRESENTAÇÃO:")
        .line(format!(
            "Os documentos deverão ser apresentados no prazo de {DOCUMENT_REQUEST_DEADLINE_DAYS} (quinze) dias"
        ))
        .line(format!(
            "corridos a partir do recebimento desta solicitação (até {}).",
            format_date(deadline)
        ))
        .blank()
        .line("FORMA DE APRESENTAÇÃO:")
        .line("Os documentos podem ser enviados:")
        .line("- Pessoalmente em nosso escritório")
        .line("- Por e-mail")
        .line("- Via WhatsApp")
        .blank()
        .line("Permanecemos à disposição para quaisquer esclarecimentos.")
        .blank()
        .line("Atenciosamente,")
        .blank()
        .line("_________________________________")
        .line("Escritório de Advocacia")
        .blank()
        .line(HEAVY_RULE);

    TextDocument {
        file_name: format!(
            "solicitacao_documentos_{}_{}.txt",
            file_stem(&record.claimant.name),
            now.timestamp_millis()
        ),
        mime: TEXT_MIME,
        body: sheet.finish(),
    }
}

/// Court-side summary of a process.
pub fn render_process_report(record: &Process, now: DateTime<Utc>) -> TextDocument {
    let today = now.date_naive();
    let mut sheet = Sheet::default();
    sheet
        .banner("RELATÓRIO DE PROCESSO JUDICIAL - SEGURO-DEFESO")
        .line("INFORMAÇÕES PROCESSUAIS")
        .line(LIGHT_RULE)
        .line(format!("Número do Processo: {}", record.process_number))
        .line(format!("Tribunal: {}", record.tribunal))
        .optional("Órgão Julgador", record.court_body.as_deref())
        .optional("Classe Processual", record.procedural_class.as_deref())
        .optional("Assunto", record.subject.as_deref())
        .blank()
        .line(format!("Status do Processo: {}", shout(record.status.code())))
        .optional("Situação Atual", record.situation.as_deref())
        .blank()
        .line(format!("Data de Ajuizamento: {}", format_date(record.filed_on)))
        .optional("Última Movimentação", record.last_movement.map(format_date))
        .line(format!("Movimentações: {}", record.movements.unwrap_or(0)))
        .blank()
        .section("DADOS DO PESCADOR (AUTOR)")
        .claimant(&record.claimant)
        .section(&format!("DOCUMENTOS DO PROCESSO ({})", record.documents.len()))
        .documents(&record.documents, "Data de Juntada", false)
        .section("ANÁLISE DO PROCESSO")
        .line(format!(
            "Tempo em Tramitação: {} dias",
            (today - record.filed_on).num_days().max(0)
        ))
        .line(format!("Prioridade: {}", shout(record.priority.label())))
        .blank();

    match record.status {
        ProcessStatus::Deferido => sheet
            .line("✓ PROCESSO DEFERIDO")
            .line("  Sentença favorável. Cliente pode receber o benefício do Seguro-Defeso."),
        ProcessStatus::Indeferido => sheet
            .line("✗ PROCESSO INDEFERIDO")
            .line("  Avaliar possibilidade de recurso com o cliente."),
        ProcessStatus::AguardandoDocumentos => sheet
            .line("⚠ AGUARDANDO DOCUMENTOS")
            .line("  Providenciar documentação complementar solicitada pelo tribunal."),
        ProcessStatus::EmAndamento | ProcessStatus::Arquivado => {
            sheet.line("→ Processo em andamento normal.")
        }
    };
    sheet.blank();

    if let Some(notes) = record.lawyer_notes.as_deref().filter(|notes| !notes.is_empty()) {
        sheet.section("OBSERVAÇÕES DO ADVOGADO").line(notes).blank();
    }
    if let Some(origin) = &record.solicitation_id {
        sheet
            .section("ORIGEM")
            .line(format!("Este processo foi originado da Solicitação #{origin}"))
            .blank();
    }
    sheet.footer(today);

    let number: String = record
        .process_number
        .chars()
        .map(|ch| if ch.is_ascii_digit() { ch } else { '_' })
        .collect();

    TextDocument {
        file_name: format!("processo_{number}_{}.txt", now.timestamp_millis()),
        mime: TEXT_MIME,
        body: sheet.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_brazilian_identifiers() {
        assert_eq!(format_cpf("12345678901"), "123.456.789-01");
        assert_eq!(format_cpf("123.456.789-01"), "123.456.789-01");
        assert_eq!(format_rg("123456789"), "12.345.678-9");
        assert_eq!(format_rg("MG-12"), "MG-12");
    }

    #[test]
    fn long_dates_use_portuguese_month_names() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date");
        assert_eq!(format_long_date(date), "05 de março de 2026");
        assert_eq!(format_date(date), "05/03/2026");
    }

    #[test]
    fn status_codes_shout_with_first_underscore_spaced() {
        assert_eq!(shout("em_analise"), "EM ANALISE");
        assert_eq!(shout("aguardando_documentos"), "AGUARDANDO DOCUMENTOS");
        assert_eq!(shout("Média"), "MÉDIA");
    }

    #[test]
    fn file_stems_collapse_whitespace() {
        assert_eq!(file_stem("João  da Silva"), "João_da_Silva");
    }
}
