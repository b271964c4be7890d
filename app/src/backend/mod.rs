//! # Backend Module
//!
//! Contains all non-UI logic for the shelter records application.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: Validation, reminders, dashboard aggregation, reports and exports
//! - **Storage**: The SQLite database and per-entity repositories
//! - **IO**: The command-line interface and document renderers
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (CLI, CSV/xlsx/HTML/PDF renderers)
//!     ↓
//! Domain Layer (Business logic, services)
//!     ↓
//! Storage Layer (SQLite, repositories)
//! ```

pub mod config;
pub mod storage;
pub mod domain;
pub mod io;

use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::config::AppConfig;
use crate::backend::domain::{
    AdoptionService, AnimalService, DashboardService, DonationService, ExportService,
    HealthService, PdfPipeline, ProfileService, ReportService, SponsorService,
};
use crate::backend::io::render::pdf::pdf_pipeline;
use crate::backend::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub animal_service: AnimalService,
    pub sponsor_service: SponsorService,
    pub donation_service: DonationService,
    pub health_service: HealthService,
    pub adoption_service: AdoptionService,
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
    pub profile_service: ProfileService,
    pub export_service: ExportService,
    pub pdf_pipeline: PdfPipeline,
}

impl AppState {
    /// Build every service on top of an already open database
    pub fn new(data_dir: PathBuf, config: AppConfig, db_conn: DbConnection) -> Self {
        let pdf_pipeline = pdf_pipeline(&config.pdf);

        Self {
            data_dir,
            config,
            animal_service: AnimalService::new(db_conn.clone()),
            sponsor_service: SponsorService::new(db_conn.clone()),
            donation_service: DonationService::new(db_conn.clone()),
            health_service: HealthService::new(db_conn.clone()),
            adoption_service: AdoptionService::new(db_conn.clone()),
            dashboard_service: DashboardService::new(db_conn.clone()),
            report_service: ReportService::new(db_conn.clone()),
            profile_service: ProfileService::new(db_conn),
            export_service: ExportService::new(),
            pdf_pipeline,
        }
    }

    /// Directory used for exports without an explicit output path
    pub fn export_dir(&self) -> PathBuf {
        self.config.export_dir(&self.data_dir)
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(data_dir: &Path) -> Result<AppState> {
    info!("Setting up data directory at {}", data_dir.display());
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let config = AppConfig::load_or_create(data_dir)?;

    info!("Setting up database");
    let db_conn = DbConnection::open(&config.database_path(data_dir)).await?;

    info!("Setting up application state");
    Ok(AppState::new(data_dir.to_path_buf(), config, db_conn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::CONFIG_FILE_NAME;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initialize_backend_creates_config_and_database() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("Shelter Records");

        let state = initialize_backend(&data_dir).await.expect("Failed to initialize");

        assert!(data_dir.join(CONFIG_FILE_NAME).exists());
        assert!(data_dir.join("shelter.db").exists());
        assert_eq!(state.export_dir(), data_dir.join("exports"));
        assert!(state.animal_service.list_types().await.expect("list").is_empty());
    }
}
