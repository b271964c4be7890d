use std::path::PathBuf;

use crate::backend::domain::models::document::PrintableDocument;

/// Output formats offered for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("An export to {0} is already running")]
    TargetBusy(PathBuf),
    #[error("Could not generate PDF: {0}")]
    AllBackendsFailed(String),
    #[error("CSV encoding failed: {0}")]
    Csv(String),
    #[error("Spreadsheet encoding failed: {0}")]
    Spreadsheet(String),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Export worker stopped unexpectedly: {0}")]
    Worker(String),
}

/// A way of turning a printable document into PDF bytes
pub trait PdfBackend: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, document: &PrintableDocument) -> anyhow::Result<Vec<u8>>;
}

/// Receives progress while an export runs on a worker thread
pub trait ProgressReporter: Send {
    fn start(&mut self, message: &str);

    /// Called on every poll while the worker is still busy
    fn tick(&mut self);

    fn finish(&mut self, success: bool);
}

/// A successfully written export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub bytes_written: usize,
}
