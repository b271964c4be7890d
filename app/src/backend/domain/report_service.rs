use anyhow::Result;
use chrono::NaiveDate;
use log::info;

use crate::backend::domain::models::document::{Block, PrintableDocument, TableBlock};
use crate::backend::domain::models::export::ExportFormat;
use crate::backend::domain::models::validation::DATE_FORMAT;
use crate::backend::storage::{DbConnection, ReportRepository};
use shared::{ReportKind, ReportTable, NO_RECORDS};

/// Service producing the fixed tabular reports
#[derive(Clone)]
pub struct ReportService {
    reports: ReportRepository,
}

impl ReportService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            reports: ReportRepository::new(db),
        }
    }

    pub async fn table(&self, kind: ReportKind) -> Result<ReportTable> {
        let rows = self.reports.rows(kind).await?;
        info!("📋 Loaded {} report with {} rows", kind, rows.len());
        Ok(ReportTable::new(kind, rows))
    }
}

/// `<slug>_<YYYY-MM-DD>.<ext>`
pub fn default_report_file_name(kind: ReportKind, format: ExportFormat, today: NaiveDate) -> String {
    format!("{}_{}.{}", kind.slug(), today.format(DATE_FORMAT), format.extension())
}

/// Printable version of a report: title, generation date, table and footer
pub fn report_document(table: &ReportTable, today: NaiveDate) -> PrintableDocument {
    let mut document = PrintableDocument::new(format!("{} Report", table.kind.label()))
        .subtitle(format!("Generated: {}", today.format(DATE_FORMAT)))
        .footer(format!("Shelter Records - {} - {}", table.kind.label(), today.format(DATE_FORMAT)));

    document.push(Block::Table(TableBlock {
        columns: table.columns.clone(),
        rows: table
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
        empty_message: NO_RECORDS.to_string(),
    }));

    if !table.is_empty() {
        document.push(Block::Note(format!("{} record(s)", table.rows.len())));
    }

    document
}
