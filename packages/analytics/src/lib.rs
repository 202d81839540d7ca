#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spatiotemporal aggregation against the SIF sounding store.
//!
//! Builds and executes the two query shapes the map needs: mean value per
//! region over a date range, and a full-history daily mean series inside
//! one polygon. `PostGIS` spatial predicates run as raw SQL via
//! `query_raw_params()`; the [`SifStore`] trait sits above the database
//! handle so the viewer can be exercised against a stub store.

pub mod sql;
pub mod store;

pub use store::{PostgisSifStore, SifStore};

use thiserror::Error;

/// Errors that can occur while querying the sounding store.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// A result row could not be decoded.
    #[error("Row decode error: {message}")]
    Decode {
        /// Description of what went wrong.
        message: String,
    },
}
