//! # IO Module
//!
//! Provides the interface layer between the user and the domain logic.
//!
//! ## Key Responsibilities
//!
//! - **Command Line**: `clap` subcommands for every entity group plus the
//!   dashboard, reminders, reports and profile sheets (`cli`)
//! - **Output**: Plain-text tables on stdout, or JSON with `--json`
//! - **Rendering**: Turning report tables and printable documents into
//!   CSV, xlsx, HTML and PDF bytes (`render`)
//! - **Error Translation**: Validation errors are printed as-is, everything
//!   else is reported with its context chain
//!
//! The IO layer only calls into the domain layer. The domain layer never
//! imports anything from here; PDF backends are handed to it as trait
//! objects.

pub mod cli;
pub mod render;
