//! # Storage Module
//!
//! Handles all data persistence for the shelter records application.
//!
//! Everything lives in a single SQLite database opened once per process and
//! shared through a cloneable [`DbConnection`]. Each entity group has its own
//! repository struct that turns rows into the display-ready records defined in
//! the `shared` crate.
//!
//! ## Key Responsibilities
//!
//! - **Schema Setup**: Idempotent `CREATE TABLE IF NOT EXISTS` on every start
//! - **Migrations**: Adding columns that older databases lack
//! - **CRUD**: Insert, full-row update and hard delete per entity
//! - **Lookups**: Joined list queries with optional filters
//! - **Aggregates**: Counts and sums used by the dashboard and reports
//!
//! ## Referential Policy
//!
//! Foreign-key enforcement is switched off on the connection. Deleting a
//! parent row (animal, sponsor, adopter, type) never cascades; children keep
//! their dangling id and joins render the missing name as empty text.

pub mod connection;
pub mod repositories;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use repositories::{
    AdopterRepository,
    AdoptionRepository,
    AnimalRepository,
    AnimalTypeRepository,
    DonationRepository,
    HealthRepository,
    ReportRepository,
    SponsorRepository,
};
