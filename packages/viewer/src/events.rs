//! User events delivered by the widget layer.

use sif_map_geography_models::{DateRange, LayerKind, RegionRef};
use sif_map_geometry::selection::LassoSelection;

/// An interaction forwarded from the (external) widget layer.
///
/// Events are handled one at a time in arrival order, which is what
/// keeps stale results from ever reaching the view sources.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// A different layer was picked in the selector.
    LayerChanged(LayerKind),
    /// The date control settled on a new range.
    DateRangeChanged(DateRange),
    /// The map was tapped on (or resolved to) a region.
    RegionTapped(RegionRef),
    /// A freehand lasso selection finished.
    SelectionCompleted(LassoSelection),
}
