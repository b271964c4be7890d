//! Shelter Records: animal shelter record keeping backed by SQLite.

pub mod backend;
