//! Byte encoders for exports: CSV, xlsx, print HTML and PDF.

pub mod csv_export;
pub mod html;
pub mod pdf;
pub mod spreadsheet;

pub use csv_export::report_to_csv;
pub use html::render_html;
pub use pdf::{pdf_pipeline, GenpdfBackend, WkhtmltopdfBackend};
pub use spreadsheet::report_to_xlsx;
