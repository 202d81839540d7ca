#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database connections and canonical data paths.
//!
//! Two stores back the SIF map: the `PostGIS` sounding database reached
//! through `switchy_database`, and a local boundaries `DuckDB` holding
//! administrative polygons as `GeoJSON` TEXT. This crate owns opening
//! both, plus the canonical `data/` directory layout.

pub mod boundaries_db;
pub mod db;
pub mod paths;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Boundaries `DuckDB` error.
    #[error("DuckDB error: {0}")]
    Duckdb(#[from] duckdb::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
