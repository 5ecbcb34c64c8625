use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Case, Process};
use super::listing::Listable;
use super::report::format_date;

pub const CSV_MIME: &str = "text/csv";

const HEADERS: [&str; 14] = [
    "Nome",
    "CPF",
    "Status",
    "Documentos",
    "Criado em",
    "Número Processo",
    "Tribunal",
    "Órgão Julgador",
    "Classe Processual",
    "Assunto",
    "Situação",
    "Data Ajuizamento",
    "Movimentações",
    "Última Movimentação",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV export is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Downloadable CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvDocument {
    pub file_name: String,
    pub mime: &'static str,
    pub body: String,
}

/// One export row; absent court fields are written as `-`.
trait ExportRow: Listable {
    fn status_label(&self) -> &'static str;
    fn court_body(&self) -> Option<&str>;
    fn procedural_class(&self) -> Option<&str>;
    fn subject(&self) -> Option<&str>;
    fn situation(&self) -> Option<&str>;

    fn row(&self) -> [String; 14] {
        let dash = |value: Option<&str>| value.unwrap_or("-").to_string();
        let date = |value: Option<NaiveDate>| value.map(format_date).unwrap_or_else(|| "-".into());
        [
            self.claimant().name.clone(),
            self.claimant().cpf.clone(),
            self.status_label().to_string(),
            self.document_count().to_string(),
            format_date(self.created_at().date_naive()),
            dash(self.process_number()),
            dash(self.tribunal()),
            dash(self.court_body()),
            dash(self.procedural_class()),
            dash(self.subject()),
            dash(self.situation()),
            date(self.filed_on()),
            self.movements().unwrap_or(0).to_string(),
            date(self.last_movement()),
        ]
    }
}

impl ExportRow for Case {
    fn status_label(&self) -> &'static str {
        self.status.label()
    }

    fn court_body(&self) -> Option<&str> {
        self.court.court_body.as_deref()
    }

    fn procedural_class(&self) -> Option<&str> {
        self.court.procedural_class.as_deref()
    }

    fn subject(&self) -> Option<&str> {
        self.court.subject.as_deref()
    }

    fn situation(&self) -> Option<&str> {
        self.court.situation.as_deref()
    }
}

impl ExportRow for Process {
    fn status_label(&self) -> &'static str {
        self.status.label()
    }

    fn court_body(&self) -> Option<&str> {
        self.court_body.as_deref()
    }

    fn procedural_class(&self) -> Option<&str> {
        self.procedural_class.as_deref()
    }

    fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    fn situation(&self) -> Option<&str> {
        self.situation.as_deref()
    }
}

fn write_rows<T: ExportRow>(records: &[T]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record(record.row())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.into_error().into()))?;
    String::from_utf8(bytes).map_err(|err| ExportError::Encoding(err.to_string()))
}

/// Export the given (already filtered and sorted) cases.
pub fn export_cases_csv(records: &[Case], today: NaiveDate) -> Result<CsvDocument, ExportError> {
    Ok(CsvDocument {
        file_name: format!("casos-seguro-defeso-{}.csv", today.format("%Y-%m-%d")),
        mime: CSV_MIME,
        body: write_rows(records)?,
    })
}

pub fn export_processes_csv(
    records: &[Process],
    today: NaiveDate,
) -> Result<CsvDocument, ExportError> {
    Ok(CsvDocument {
        file_name: format!("processos-seguro-defeso-{}.csv", today.format("%Y-%m-%d")),
        mime: CSV_MIME,
        body: write_rows(records)?,
    })
}
