use anyhow::Result;
use chrono::NaiveDate;
use serde_json::json;
use std::path::PathBuf;

use crate::backend::domain::models::{ExportError, ExportFormat};
use crate::backend::domain::{default_report_file_name, report_document};
use crate::backend::io::cli::output::Output;
use crate::backend::io::render::{report_to_csv, report_to_xlsx};
use crate::backend::AppState;
use shared::ReportKind;

type RenderJob = Box<dyn FnOnce() -> Result<Vec<u8>, ExportError> + Send>;

/// Run a render job through the export service with a spinner
pub(super) async fn export_to(state: &AppState, out: &Output, target: PathBuf, render: RenderJob) -> Result<()> {
    let mut spinner = out.spinner();
    let outcome = state.export_service.run(&target, render, &mut spinner).await?;

    if out.is_json() {
        return out.print_json(&json!({
            "path": outcome.path,
            "bytes_written": outcome.bytes_written,
        }));
    }
    out.done(&format!(
        "Exported {} bytes to {}",
        outcome.bytes_written,
        outcome.path.display()
    ));
    Ok(())
}

pub async fn cmd_report(
    state: &AppState,
    out: &Output,
    kind: ReportKind,
    export: Option<ExportFormat>,
    output: Option<PathBuf>,
    today: NaiveDate,
) -> Result<()> {
    // Read on this task; only encoding and the write go to the worker
    let table = state.report_service.table(kind).await?;

    let Some(format) = export else {
        let headers: Vec<&str> = table.columns.iter().map(String::as_str).collect();
        let rows = table
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        if !out.is_json() {
            println!("{} Report ({} record(s))", kind.label(), table.rows.len());
            println!();
        }
        return out.list(&table, &headers, rows);
    };

    let target = output.unwrap_or_else(|| state.export_dir().join(default_report_file_name(kind, format, today)));

    let render: RenderJob = match format {
        ExportFormat::Csv => Box::new(move || report_to_csv(&table)),
        ExportFormat::Xlsx => Box::new(move || report_to_xlsx(&table)),
        ExportFormat::Pdf => {
            let document = report_document(&table, today);
            let pdf = state.pdf_pipeline.clone();
            Box::new(move || pdf.render(&document))
        }
    };

    export_to(state, out, target, render).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::initialize_backend;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_csv_export_lands_in_export_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let state = initialize_backend(temp_dir.path()).await.expect("init");
        state.animal_service.create_type("Dog").await.expect("type");
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let out = Output::new(false, true);
        cmd_report(&state, &out, ReportKind::AnimalTypes, Some(ExportFormat::Csv), None, today)
            .await
            .expect("export");

        let path = temp_dir.path().join("exports").join("animal_types_2024-06-10.csv");
        let content = std::fs::read_to_string(path).expect("read");
        assert!(content.contains("ID,Name"));
        assert!(content.contains("Dog"));
    }

    #[tokio::test]
    async fn test_explicit_output_path_is_used() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let state = initialize_backend(temp_dir.path()).await.expect("init");
        let target = temp_dir.path().join("out").join("sponsors.xlsx");
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let out = Output::new(false, true);
        cmd_report(&state, &out, ReportKind::Sponsors, Some(ExportFormat::Xlsx), Some(target.clone()), today)
            .await
            .expect("export");

        assert!(std::fs::read(target).expect("read").starts_with(b"PK"));
    }
}
