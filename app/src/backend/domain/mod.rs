//! # Domain Module
//!
//! Contains all business logic for the shelter records application.
//!
//! Services validate input, call into the storage repositories, and derive
//! the values shown to the user. They never talk to the terminal or to a
//! file format directly; rendering lives in `io::render`.
//!
//! ## Module Organization
//!
//! - **animal_service**: Animal types and animals
//! - **sponsor_service**: Sponsors
//! - **donation_service**: Donations linked to a sponsor and optionally an animal
//! - **health_service**: Vaccines, dewormings and the upcoming-reminder filter
//! - **adoption_service**: Adopters, adoptions and the available-animal lookup
//! - **dashboard_service**: KPI counts and the monthly donation series
//! - **report_service**: The six tabular reports
//! - **profile_service**: Per-animal profile sheets
//! - **export_service**: Background export jobs and the PDF fallback chain
//!
//! ## Business Rules
//!
//! - Required text fields must be non-blank, dates are `YYYY-MM-DD`
//! - Donation amounts and animal ages are never negative
//! - Referenced rows must exist when a record is written
//! - An adoption marked ADOPTED without an exit date is dated today
//! - Deleting a parent row leaves children with a dangling reference

pub mod adoption_service;
pub mod animal_service;
pub mod dashboard_service;
pub mod donation_service;
pub mod export_service;
pub mod health_service;
pub mod models;
pub mod profile_service;
pub mod report_service;
pub mod sponsor_service;

pub use adoption_service::AdoptionService;
pub use animal_service::AnimalService;
pub use dashboard_service::DashboardService;
pub use donation_service::DonationService;
pub use export_service::{ExportService, PdfPipeline};
pub use health_service::{soon_notice, upcoming_reminders, HealthNotice, HealthService};
pub use profile_service::{default_profile_file_name, profile_document, ProfileService};
pub use report_service::{default_report_file_name, report_document, ReportService};
pub use sponsor_service::SponsorService;
