#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Projection math and polygon text serialization.
//!
//! The map view works in spherical-Mercator meters while the sounding
//! store's spatial predicates work in degrees, so everything that crosses
//! that boundary goes through this crate: the forward/inverse projection,
//! WKT literal construction, and the translation of freehand lasso
//! selections into store-ready polygon predicates.

pub mod mercator;
pub mod selection;
pub mod wkt;

use thiserror::Error;

/// Error returned when a ring or selection has too few distinct vertices
/// to describe an area.
///
/// Recovered locally by callers: a degenerate freehand selection is
/// dropped, never escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("degenerate geometry: {distinct} distinct vertices, need at least 3")]
pub struct DegenerateGeometryError {
    /// Number of distinct vertices that were supplied.
    pub distinct: usize,
}
