#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic layers over the SIF study area.
//!
//! A layer partitions the study area into regions and answers the same
//! four questions regardless of variant: its date bounds, its map
//! geometry and names, the mean value per region over a range, and the
//! daily series for one region. State and county layers load
//! administrative boundaries from the `DuckDB` boundaries database; the
//! world-grid layer synthesizes its 2° cells. Building layers is
//! expensive, so the built set persists as a stamped snapshot and later
//! runs deserialize it directly.

pub mod boundaries;
pub mod cache;
pub mod grid;
pub mod layer;

pub use cache::{LayerSet, load_or_build};
pub use layer::Layer;

use thiserror::Error;

/// Errors that can occur while building or loading layers.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Boundaries database error.
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    /// Sounding-store query error.
    #[error("Query error: {0}")]
    Query(#[from] sif_map_analytics::QueryError),

    /// Snapshot file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be decoded.
    #[error("Snapshot decode error: {0}")]
    SnapshotDecode(#[from] rmp_serde::decode::Error),

    /// Snapshot could not be encoded.
    #[error("Snapshot encode error: {0}")]
    SnapshotEncode(#[from] rmp_serde::encode::Error),
}
