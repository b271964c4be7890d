pub mod document;
pub mod export;
pub mod validation;

pub use document::{Block, PrintableDocument, TableBlock};
pub use export::{ExportError, ExportFormat, ExportOutcome, PdfBackend, ProgressReporter};
pub use validation::ValidationError;
