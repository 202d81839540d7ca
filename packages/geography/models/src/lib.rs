#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Layer, region, and date-range types shared across the SIF map system.
//!
//! Everything here is plain data: built once by the geography crate,
//! serialized into the layer snapshot, and read by the query and viewer
//! crates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The available geographic partitionings of the study area.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerKind {
    /// US state boundaries.
    State,
    /// US county boundaries.
    County,
    /// Synthetic 2-degree grid cells covering the study extent.
    WorldGrid,
}

impl LayerKind {
    /// All layer kinds, in selector order.
    pub const ALL: [Self; 3] = [Self::State, Self::County, Self::WorldGrid];

    /// Human-readable selector label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::State => "US States",
            Self::County => "US Counties",
            Self::WorldGrid => "World Grid (2°)",
        }
    }
}

/// An inclusive calendar date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds a range, swapping the endpoints if given in reverse order.
    #[must_use]
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// First day of the range.
    #[must_use]
    pub const fn start(self) -> NaiveDate {
        self.start
    }

    /// Last day of the range, inclusive.
    #[must_use]
    pub const fn end(self) -> NaiveDate {
        self.end
    }

    /// Clamps both endpoints into `bounds`.
    ///
    /// A range entirely outside `bounds` collapses onto the nearest
    /// boundary day.
    #[must_use]
    pub fn clamp_to(self, bounds: Self) -> Self {
        Self::new(
            self.start.clamp(bounds.start, bounds.end),
            self.end.clamp(bounds.start, bounds.end),
        )
    }

    /// Store timestamp for the start of the range (midnight).
    #[must_use]
    pub fn start_timestamp(self) -> NaiveDateTime {
        self.start.and_hms_opt(0, 0, 0).unwrap_or_default()
    }

    /// Store timestamp for the end of the range.
    ///
    /// The end date is inclusive, so this is the last second of that day;
    /// `BETWEEN` then captures the full final day.
    #[must_use]
    pub fn end_timestamp(self) -> NaiveDateTime {
        self.end.and_hms_opt(23, 59, 59).unwrap_or_default()
    }
}

/// One closed boundary ring in projected map coordinates.
///
/// Stored as parallel coordinate runs, the shape the rendering layer's
/// patch sources consume directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRing {
    /// Projected x coordinates.
    pub xs: Vec<f64>,
    /// Projected y coordinates.
    pub ys: Vec<f64>,
}

impl ProjectedRing {
    /// Builds a ring from (x, y) vertex pairs.
    #[must_use]
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            xs: points.iter().map(|p| p.0).collect(),
            ys: points.iter().map(|p| p.1).collect(),
        }
    }

    /// Iterates the ring's (x, y) vertices.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}

/// One partition cell of a layer: a state, a county, or a grid cell.
///
/// Immutable once constructed. Carries both coordinate spaces: projected
/// rings for display and hit-testing, and the geographic polygon text
/// used in store containment predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicRegion {
    /// Stable identifier (FIPS/GEOID for administrative units, synthetic
    /// id for grid cells).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Exterior rings in projected coordinates, one per polygon part.
    pub rings: Vec<ProjectedRing>,
    /// Geographic-coordinate WKT polygon literal for store predicates.
    pub wkt: String,
}

/// Fact-table column mapping a layer aggregates against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SifTable {
    /// Fact table name.
    pub table: String,
    /// Measured value column.
    pub value_column: String,
    /// Timestamp column.
    pub time_column: String,
    /// Geographic point column.
    pub point_column: String,
}

impl Default for SifTable {
    fn default() -> Self {
        Self {
            table: "tropomi_sif".to_string(),
            value_column: "sif".to_string(),
            time_column: "time".to_string(),
            point_column: "center_pt".to_string(),
        }
    }
}

/// One day of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Calendar day.
    pub day: NaiveDate,
    /// Mean value over that day.
    pub value: f64,
}

/// A tap event resolved against the active layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionRef {
    /// Already-resolved region index in the layer's enumeration order.
    Index(usize),
    /// A raw tap location in projected coordinates, to be hit-tested.
    ProjectedPoint {
        /// Projected x coordinate.
        x: f64,
        /// Projected y coordinate.
        y: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn range_normalizes_reversed_endpoints() {
        let range = DateRange::new(d("2019-05-01"), d("2018-09-01"));
        assert_eq!(range.start(), d("2018-09-01"));
        assert_eq!(range.end(), d("2019-05-01"));
    }

    #[test]
    fn clamp_pulls_range_into_bounds() {
        let bounds = DateRange::new(d("2018-05-01"), d("2019-05-01"));
        let clamped = DateRange::new(d("2018-01-01"), d("2019-12-01")).clamp_to(bounds);
        assert_eq!(clamped, bounds);
    }

    #[test]
    fn clamp_collapses_disjoint_range() {
        let bounds = DateRange::new(d("2018-05-01"), d("2019-05-01"));
        let clamped = DateRange::new(d("2020-01-01"), d("2020-02-01")).clamp_to(bounds);
        assert_eq!(clamped.start(), d("2019-05-01"));
        assert_eq!(clamped.end(), d("2019-05-01"));
    }

    #[test]
    fn end_timestamp_covers_full_day() {
        let range = DateRange::new(d("2018-09-01"), d("2018-09-11"));
        assert_eq!(range.start_timestamp().to_string(), "2018-09-01 00:00:00");
        assert_eq!(range.end_timestamp().to_string(), "2018-09-11 23:59:59");
    }

    #[test]
    fn layer_kind_round_trips_through_strum() {
        use std::str::FromStr as _;
        for kind in LayerKind::ALL {
            assert_eq!(LayerKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }
}
