//! The view synchronization controller.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sif_map_analytics::SifStore;
use sif_map_geography::LayerSet;
use sif_map_geography_models::{DateRange, LayerKind, RegionRef, SeriesPoint};
use sif_map_geometry::selection::{self, LassoSelection};
use tokio::sync::watch;

use crate::events::ViewEvent;
use crate::sources::{MapData, MapRegion, SeriesData, ViewSources};
use crate::throttle::Throttle;

/// Layer shown before the user picks one.
pub const DEFAULT_LAYER: LayerKind = LayerKind::County;

/// Minimum spacing between applied date-range changes.
const DATE_THROTTLE: Duration = Duration::from_millis(200);

/// The date window shown on startup.
fn default_range() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2018, 9, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2018, 9, 11).unwrap_or_default(),
    )
}

/// Owns the interactive view state and keeps the two data sources
/// consistent with it.
///
/// Lives for the session; processes one event at a time. Store failures
/// never propagate out of an event — they are logged and the sources are
/// left at their last known-good value.
pub struct ViewController {
    layers: Arc<LayerSet>,
    store: Arc<dyn SifStore>,
    active: LayerKind,
    range: DateRange,
    throttle: Throttle,
    pending_range: Option<DateRange>,
    map_tx: watch::Sender<MapData>,
    series_tx: watch::Sender<SeriesData>,
}

impl ViewController {
    /// Creates a controller and the source receivers for the rendering
    /// layer. Call [`Self::refresh`] once to publish the initial view.
    #[must_use]
    pub fn new(layers: Arc<LayerSet>, store: Arc<dyn SifStore>) -> (Self, ViewSources) {
        let (map_tx, map_rx) = watch::channel(MapData::default());
        let (series_tx, series_rx) = watch::channel(SeriesData::default());

        let controller = Self {
            layers,
            store,
            active: DEFAULT_LAYER,
            range: default_range(),
            throttle: Throttle::new(DATE_THROTTLE),
            pending_range: None,
            map_tx,
            series_tx,
        };
        let sources = ViewSources {
            map: map_rx,
            series: series_rx,
        };
        (controller, sources)
    }

    /// Replaces the date-change throttle interval.
    #[must_use]
    pub fn with_throttle_interval(mut self, interval: Duration) -> Self {
        self.throttle = Throttle::new(interval);
        self
    }

    /// The currently active layer.
    #[must_use]
    pub const fn active_layer(&self) -> LayerKind {
        self.active
    }

    /// The current date window.
    #[must_use]
    pub const fn date_range(&self) -> DateRange {
        self.range
    }

    /// The active layer's valid date bounds, for date controls.
    #[must_use]
    pub fn layer_date_bounds(&self) -> DateRange {
        self.layers.get(self.active).date_range()
    }

    /// Recomputes and republishes the map source for the current state.
    pub async fn refresh(&mut self) {
        self.publish_map().await;
    }

    /// Processes one user event to completion.
    pub async fn handle_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::LayerChanged(kind) => self.on_layer_changed(kind).await,
            ViewEvent::DateRangeChanged(range) => self.on_date_range_changed(range).await,
            ViewEvent::RegionTapped(region_ref) => self.on_region_tapped(region_ref).await,
            ViewEvent::SelectionCompleted(selection) => {
                self.on_selection_completed(&selection).await;
            }
        }
    }

    /// Applies a date range parked by the throttle, if one is pending.
    pub async fn flush(&mut self) {
        if let Some(range) = self.pending_range.take() {
            self.apply_range(range).await;
        }
    }

    async fn on_layer_changed(&mut self, kind: LayerKind) {
        // A parked date change is still the user's latest chosen window;
        // fold it in before switching so it is not lost.
        if let Some(pending) = self.pending_range.take() {
            self.range = pending;
        }
        self.active = kind;
        self.range = self.range.clamp_to(self.layer_date_bounds());
        self.publish_map().await;
    }

    async fn on_date_range_changed(&mut self, range: DateRange) {
        if self.throttle.accept() {
            self.pending_range = None;
            self.apply_range(range).await;
        } else {
            self.pending_range = Some(range);
        }
    }

    async fn apply_range(&mut self, range: DateRange) {
        self.range = range.clamp_to(self.layer_date_bounds());
        self.publish_map().await;
    }

    async fn publish_map(&mut self) {
        let layer = self.layers.get(self.active);

        let values = match layer
            .aggregate_for_date_range(self.store.as_ref(), self.range)
            .await
        {
            Ok(values) => values,
            Err(e) => {
                log::warn!("map aggregation failed, keeping last view: {e}");
                return;
            }
        };

        let (rings, names) = layer.map_details();
        let regions: Vec<MapRegion> = rings
            .into_iter()
            .zip(names)
            .zip(values)
            .map(|((rings, name), value)| MapRegion { rings, name, value })
            .collect();

        let data = MapData {
            title: format!(
                "SIF average by {}: {} to {}",
                layer.kind().label(),
                self.range.start(),
                self.range.end()
            ),
            bounds: Some(layer.date_range()),
            regions,
        };

        // send() only fails when every receiver is gone; the view may
        // legitimately not be attached yet.
        let _ = self.map_tx.send(data);
    }

    async fn on_region_tapped(&mut self, region_ref: RegionRef) {
        let layer = self.layers.get(self.active);

        let Some(index) = layer.resolve(region_ref) else {
            log::debug!("tap did not resolve to a region of the {} layer", self.active);
            return;
        };
        let Some(region) = layer.region(index) else {
            return;
        };

        match layer
            .time_series_for_region(self.store.as_ref(), region)
            .await
        {
            Ok((title, series)) => self.publish_series(title, series),
            Err(e) => log::warn!("region series query failed, keeping last view: {e}"),
        }
    }

    async fn on_selection_completed(&mut self, selection: &LassoSelection) {
        let polygon = match selection::translate(selection) {
            Ok(polygon) => polygon,
            Err(e) => {
                log::debug!("freehand selection ignored: {e}");
                return;
            }
        };

        let layer = self.layers.get(self.active);
        match self.store.daily_series(layer.table(), &polygon).await {
            Ok(series) => self.publish_series("Freehand selection".to_string(), series),
            Err(e) => log::warn!("selection series query failed, keeping last view: {e}"),
        }
    }

    fn publish_series(&mut self, title: String, series: Vec<SeriesPoint>) {
        // Fewer than two days is not a series; keep what is displayed.
        if series.len() < 2 {
            log::debug!("insufficient data for '{title}', keeping last series");
            return;
        }
        let _ = self.series_tx.send(SeriesData {
            title,
            points: series,
        });
    }
}
