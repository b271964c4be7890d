//! Runs exports off the interactive task.
//!
//! Rendering and the file write happen on a blocking worker. The calling task
//! polls the worker every [`POLL_INTERVAL`] and drives a [`ProgressReporter`]
//! until it finishes. Output is fully rendered in memory first, then written
//! to a hidden sibling file and renamed into place, so a failed export never
//! leaves a partial file behind.

use log::{error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::backend::domain::models::document::PrintableDocument;
use crate::backend::domain::models::export::{ExportError, ExportOutcome, PdfBackend, ProgressReporter};

pub const POLL_INTERVAL: Duration = Duration::from_millis(60);

/// Ordered list of PDF backends; later ones are fallbacks
#[derive(Clone)]
pub struct PdfPipeline {
    backends: Vec<Arc<dyn PdfBackend>>,
}

impl PdfPipeline {
    pub fn new(backends: Vec<Arc<dyn PdfBackend>>) -> Self {
        Self { backends }
    }

    /// Render with the first backend that succeeds
    pub fn render(&self, document: &PrintableDocument) -> Result<Vec<u8>, ExportError> {
        let mut failures = Vec::new();

        for backend in &self.backends {
            match backend.render(document) {
                Ok(bytes) => {
                    info!("PDF rendered by {} ({} bytes)", backend.name(), bytes.len());
                    return Ok(bytes);
                }
                Err(e) => {
                    warn!("PDF backend {} failed: {:#}", backend.name(), e);
                    failures.push(format!("{}: {:#}", backend.name(), e));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no PDF backend configured".to_string());
        }
        Err(ExportError::AllBackendsFailed(failures.join("; ")))
    }
}

/// Write `bytes` to `path` via a temporary sibling and a rename
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "export".to_string());
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&temp_path, bytes).map_err(io_err)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_err(e));
    }
    Ok(())
}

/// Releases its target path when dropped
struct TargetLease {
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
    target: PathBuf,
}

impl Drop for TargetLease {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        in_flight.remove(&self.target);
    }
}

/// Service running export jobs, at most one per target file
#[derive(Clone)]
pub struct ExportService {
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
    poll_interval: Duration,
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportService {
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            poll_interval: POLL_INTERVAL,
        }
    }

    fn acquire(&self, target: &Path) -> Result<TargetLease, ExportError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if !in_flight.insert(target.to_path_buf()) {
            return Err(ExportError::TargetBusy(target.to_path_buf()));
        }
        Ok(TargetLease {
            in_flight: Arc::clone(&self.in_flight),
            target: target.to_path_buf(),
        })
    }

    /// Render on a blocking worker and write the result to `target`
    pub async fn run<F>(
        &self,
        target: &Path,
        render: F,
        progress: &mut dyn ProgressReporter,
    ) -> Result<ExportOutcome, ExportError>
    where
        F: FnOnce() -> Result<Vec<u8>, ExportError> + Send + 'static,
    {
        let _lease = self.acquire(target)?;
        info!("📤 Exporting to {}", target.display());
        progress.start(&format!("Exporting {}", target.display()));

        let path = target.to_path_buf();
        let handle = tokio::task::spawn_blocking(move || {
            let bytes = render()?;
            write_atomically(&path, &bytes)?;
            Ok::<usize, ExportError>(bytes.len())
        });

        let mut ticker = tokio::time::interval(self.poll_interval);
        while !handle.is_finished() {
            ticker.tick().await;
            progress.tick();
        }

        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(ExportError::Worker(join_error.to_string())),
        };
        progress.finish(result.is_ok());

        match result {
            Ok(bytes_written) => {
                info!("✅ Export written to {} ({} bytes)", target.display(), bytes_written);
                Ok(ExportOutcome {
                    path: target.to_path_buf(),
                    bytes_written,
                })
            }
            Err(e) => {
                error!("❌ Export to {} failed: {}", target.display(), e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FakeBackend {
        name: &'static str,
        output: Option<&'static [u8]>,
    }

    impl PdfBackend for FakeBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn render(&self, _document: &PrintableDocument) -> anyhow::Result<Vec<u8>> {
            match self.output {
                Some(bytes) => Ok(bytes.to_vec()),
                None => anyhow::bail!("{} is not installed", self.name),
            }
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        started: bool,
        ticks: usize,
        finished: Option<bool>,
    }

    impl ProgressReporter for RecordingProgress {
        fn start(&mut self, _message: &str) {
            self.started = true;
        }

        fn tick(&mut self) {
            self.ticks += 1;
        }

        fn finish(&mut self, success: bool) {
            self.finished = Some(success);
        }
    }

    fn pipeline(primary: Option<&'static [u8]>, fallback: Option<&'static [u8]>) -> PdfPipeline {
        PdfPipeline::new(vec![
            Arc::new(FakeBackend { name: "primary", output: primary }) as Arc<dyn PdfBackend>,
            Arc::new(FakeBackend { name: "fallback", output: fallback }),
        ])
    }

    #[test]
    fn test_pipeline_prefers_primary() {
        let document = PrintableDocument::new("Doc");
        let bytes = pipeline(Some(&b"one"[..]), Some(&b"two"[..])).render(&document).expect("render");
        assert_eq!(bytes, b"one");
    }

    #[test]
    fn test_pipeline_falls_back() {
        let document = PrintableDocument::new("Doc");
        let bytes = pipeline(None, Some(&b"two"[..])).render(&document).expect("render");
        assert_eq!(bytes, b"two");
    }

    #[test]
    fn test_pipeline_reports_every_failure() {
        let document = PrintableDocument::new("Doc");
        match pipeline(None, None).render(&document) {
            Err(ExportError::AllBackendsFailed(message)) => {
                assert!(message.contains("primary"));
                assert!(message.contains("fallback"));
            }
            other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
        }
    }

    #[tokio::test]
    async fn test_run_writes_file_and_reports_progress() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("nested").join("report.csv");
        let service = ExportService::new();
        let mut progress = RecordingProgress::default();

        let outcome = service
            .run(
                &target,
                || {
                    std::thread::sleep(Duration::from_millis(150));
                    Ok(b"a,b\n".to_vec())
                },
                &mut progress,
            )
            .await
            .expect("export");

        assert_eq!(outcome.bytes_written, 4);
        assert_eq!(fs::read(&target).expect("read"), b"a,b\n");
        assert!(progress.started);
        assert!(progress.ticks >= 1);
        assert_eq!(progress.finished, Some(true));
        assert!(!target.with_file_name(".report.csv.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_pdf_leaves_no_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("profile.pdf");
        let service = ExportService::new();
        let mut progress = RecordingProgress::default();
        let pdf = pipeline(None, None);

        let result = service
            .run(
                &target,
                move || pdf.render(&PrintableDocument::new("Luna")),
                &mut progress,
            )
            .await;

        assert!(matches!(result, Err(ExportError::AllBackendsFailed(_))));
        assert_eq!(progress.finished, Some(false));
        assert!(!target.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn test_same_target_cannot_run_twice() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("animals.xlsx");
        let service = ExportService::new();
        let mut first_progress = RecordingProgress::default();
        let mut second_progress = RecordingProgress::default();

        let (first, second) = tokio::join!(
            service.run(
                &target,
                || {
                    std::thread::sleep(Duration::from_millis(200));
                    Ok(b"first".to_vec())
                },
                &mut first_progress,
            ),
            service.run(&target, || Ok(b"second".to_vec()), &mut second_progress),
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(ExportError::TargetBusy(_))));
        assert!(!second_progress.started);
        assert_eq!(fs::read(&target).expect("read"), b"first");

        // The lease is released once the first export finishes
        let third = service
            .run(&target, || Ok(b"third".to_vec()), &mut RecordingProgress::default())
            .await;
        assert!(third.is_ok());
    }
}
