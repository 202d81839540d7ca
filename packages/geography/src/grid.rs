//! The synthetic 2-degree world-grid layer.
//!
//! Unlike the administrative layers, grid cells are not loaded from
//! anywhere: they are generated procedurally over the study extent,
//! west to east then south to north.

use sif_map_analytics::SifStore;
use sif_map_geography_models::{GeographicRegion, LayerKind, ProjectedRing, SifTable};
use sif_map_geometry::{mercator, wkt};

use crate::{GeoError, Layer};

/// Study extent, generously covering the continental US.
const LON_MIN: f64 = -126.0;
const LON_MAX: f64 = -66.0;
const LAT_MIN: f64 = 24.0;
const LAT_MAX: f64 = 50.0;

/// Grid cell edge length in degrees.
const CELL_DEGREES: f64 = 2.0;

impl Layer {
    /// Builds the 2° world-grid layer.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the date-bounds query fails.
    pub async fn world_grid(store: &dyn SifStore) -> Result<Self, GeoError> {
        let regions = synthesize_cells();
        log::info!("synthesized {} grid cells", regions.len());

        let table = SifTable::default();
        let bounds = store.date_bounds(&table).await?;
        Ok(Self::from_parts(LayerKind::WorldGrid, regions, bounds, table))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn synthesize_cells() -> Vec<GeographicRegion> {
    let cols = ((LON_MAX - LON_MIN) / CELL_DEGREES) as usize;
    let rows = ((LAT_MAX - LAT_MIN) / CELL_DEGREES) as usize;

    let mut regions = Vec::with_capacity(cols * rows);

    for row in 0..rows {
        #[allow(clippy::cast_precision_loss)]
        let lat0 = (row as f64).mul_add(CELL_DEGREES, LAT_MIN);
        let lat1 = lat0 + CELL_DEGREES;

        for col in 0..cols {
            #[allow(clippy::cast_precision_loss)]
            let lon0 = (col as f64).mul_add(CELL_DEGREES, LON_MIN);
            let lon1 = lon0 + CELL_DEGREES;

            let corners = [(lon0, lat0), (lon1, lat0), (lon1, lat1), (lon0, lat1)];
            let Ok(cell_wkt) = wkt::polygon_wkt(&corners) else {
                continue;
            };

            let projected: Vec<(f64, f64)> = corners
                .iter()
                .chain(std::iter::once(&corners[0]))
                .map(|&(lon, lat)| mercator::to_projected(lon, lat))
                .collect();

            regions.push(GeographicRegion {
                id: format!("cell_{lon0}_{lat0}"),
                name: format!("2° cell ({lon0}° to {lon1}°, {lat0}° to {lat1}°)"),
                rings: vec![ProjectedRing::from_points(&projected)],
                wkt: cell_wkt,
            });
        }
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_the_study_extent() {
        let cells = synthesize_cells();
        assert_eq!(cells.len(), 30 * 13);
        assert_eq!(cells[0].id, "cell_-126_24");
        assert_eq!(cells.last().unwrap().id, "cell_-68_48");
    }

    #[test]
    fn cells_enumerate_west_to_east_then_south_to_north() {
        let cells = synthesize_cells();
        assert_eq!(cells[1].id, "cell_-124_24");
        assert_eq!(cells[30].id, "cell_-126_26");
    }

    #[test]
    fn cell_geometry_is_closed_in_both_spaces() {
        let cells = synthesize_cells();
        let cell = &cells[0];

        // 4 corners plus the closing repeat
        assert_eq!(cell.wkt.matches(',').count(), 4);
        assert!(cell.wkt.starts_with("POLYGON(("));

        let ring = &cell.rings[0];
        assert_eq!(ring.xs.len(), 5);
        assert_eq!(ring.xs[0], ring.xs[4]);
        assert_eq!(ring.ys[0], ring.ys[4]);
    }
}
