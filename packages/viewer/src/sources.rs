//! Reactive view-data sources.
//!
//! `tokio::sync::watch` channels hold the last published value; the
//! rendering layer keeps the receivers and observes changes. The
//! controller only ever sends complete values, so observers never see a
//! partially-updated source.

use serde::Serialize;
use sif_map_geography_models::{DateRange, ProjectedRing, SeriesPoint};
use tokio::sync::watch;

/// One map row: a region's display geometry, name, and aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRegion {
    /// Projected boundary rings.
    pub rings: Vec<ProjectedRing>,
    /// Display name.
    pub name: String,
    /// Mean value over the current range; `None` means no data, which
    /// is distinct from a true zero average.
    pub value: Option<f64>,
}

/// The map-mode data source: one row per region of the active layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    /// Plot title reflecting the layer and range.
    pub title: String,
    /// The active layer's valid date range, for bounding date controls.
    pub bounds: Option<DateRange>,
    /// Region rows in the layer's enumeration order.
    pub regions: Vec<MapRegion>,
}

/// The time-series data source: one row per day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    /// Series title (region name, or a generic freehand label).
    pub title: String,
    /// Daily means, ascending by day.
    pub points: Vec<SeriesPoint>,
}

/// The receivers handed to the rendering layer.
#[derive(Debug, Clone)]
pub struct ViewSources {
    /// Map-mode source.
    pub map: watch::Receiver<MapData>,
    /// Time-series source.
    pub series: watch::Receiver<SeriesData>,
}
