//! Administrative layers built from the boundaries database.
//!
//! Loads state and county polygons stored as `GeoJSON` TEXT, converts
//! each to the two coordinate spaces a region carries (geographic WKT
//! for store predicates, projected rings for display), and captures the
//! sounding date bounds from the store.

use duckdb::Connection;
use geo::MultiPolygon;
use geojson::GeoJson;
use sif_map_analytics::SifStore;
use sif_map_geography_models::{GeographicRegion, LayerKind, ProjectedRing, SifTable};
use sif_map_geometry::{mercator, wkt};

use crate::{GeoError, Layer};

/// Boundary rows for the state layer, ordered for deterministic region
/// enumeration.
const STATES_SQL: &str = "SELECT fips, name, boundary_geojson \
     FROM census_states WHERE boundary_geojson IS NOT NULL ORDER BY fips";

/// Boundary rows for the county layer.
const COUNTIES_SQL: &str = "SELECT geoid, COALESCE(full_name, name), boundary_geojson \
     FROM census_counties WHERE boundary_geojson IS NOT NULL ORDER BY geoid";

impl Layer {
    /// Builds the US state layer from the boundaries database.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the boundary query or the date-bounds
    /// query fails.
    pub async fn states(conn: &Connection, store: &dyn SifStore) -> Result<Self, GeoError> {
        let regions = load_regions(conn, STATES_SQL)?;
        log::info!("loaded {} state boundaries", regions.len());

        let table = SifTable::default();
        let bounds = store.date_bounds(&table).await?;
        Ok(Self::from_parts(LayerKind::State, regions, bounds, table))
    }

    /// Builds the US county layer from the boundaries database.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the boundary query or the date-bounds
    /// query fails.
    pub async fn counties(conn: &Connection, store: &dyn SifStore) -> Result<Self, GeoError> {
        let regions = load_regions(conn, COUNTIES_SQL)?;
        log::info!("loaded {} county boundaries", regions.len());

        let table = SifTable::default();
        let bounds = store.date_bounds(&table).await?;
        Ok(Self::from_parts(LayerKind::County, regions, bounds, table))
    }
}

fn load_regions(conn: &Connection, query: &str) -> Result<Vec<GeographicRegion>, GeoError> {
    let mut stmt = conn.prepare(query)?;
    let mut rows = stmt.query([])?;
    let mut regions = Vec::new();

    while let Some(row) = rows.next()? {
        let id: String = row.get(0)?;
        let name: String = row.get(1)?;
        let geojson_str: String = row.get(2)?;

        if id.is_empty() || geojson_str.is_empty() {
            continue;
        }

        let Some(region) = region_from_geojson(&id, &name, &geojson_str) else {
            log::warn!("Failed to parse GeoJSON for boundary {id}");
            continue;
        };

        regions.push(region);
    }

    Ok(regions)
}

/// Converts one boundary row into a region, or `None` if the geometry
/// cannot be parsed or is degenerate.
pub(crate) fn region_from_geojson(
    id: &str,
    name: &str,
    geojson_str: &str,
) -> Option<GeographicRegion> {
    let multi_polygon = parse_geojson_to_multipolygon(geojson_str)?;

    // Geographic WKT keeps every ring, holes included, so containment
    // predicates stay exact.
    let ring_sets: Vec<Vec<Vec<(f64, f64)>>> = multi_polygon
        .0
        .iter()
        .map(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors().iter())
                .map(|ring| ring.coords().map(|c| (c.x, c.y)).collect())
                .collect()
        })
        .collect();
    let wkt = wkt::multipolygon_wkt(&ring_sets).ok()?;

    // Display rings are exteriors only, projected to map space.
    let rings: Vec<ProjectedRing> = multi_polygon
        .0
        .iter()
        .map(|polygon| {
            let points: Vec<(f64, f64)> = polygon
                .exterior()
                .coords()
                .map(|c| mercator::to_projected(c.x, c.y))
                .collect();
            ProjectedRing::from_points(&points)
        })
        .collect();

    Some(GeographicRegion {
        id: id.to_string(),
        name: name.to_string(),
        rings,
        wkt,
    })
}

/// Parses a `GeoJSON` string into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn parse_geojson_to_multipolygon(geojson_str: &str) -> Option<MultiPolygon<f64>> {
    let geojson: GeoJson = geojson_str.parse().ok()?;
    if let GeoJson::Geometry(geom) = geojson {
        let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
        match geo_geom {
            geo::Geometry::MultiPolygon(mp) => Some(mp),
            geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
            _ => None,
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[-100.0,40.0],[-99.0,40.0],[-99.0,41.0],[-100.0,41.0],[-100.0,40.0]]]}"#;

    #[test]
    fn region_carries_both_coordinate_spaces() {
        let region = region_from_geojson("08", "Colorado", SQUARE).unwrap();

        assert!(region.wkt.starts_with("MULTIPOLYGON((("));
        assert!(region.wkt.contains("-100 40"));

        // Projected coordinates are meters, far outside degree range.
        assert_eq!(region.rings.len(), 1);
        assert!(region.rings[0].xs.iter().all(|x| x.abs() > 1_000_000.0));
    }

    #[test]
    fn malformed_geojson_is_skipped() {
        assert!(region_from_geojson("08", "Colorado", "{not geojson").is_none());
        assert!(
            region_from_geojson(
                "08",
                "Colorado",
                r#"{"type":"Point","coordinates":[-100.0,40.0]}"#
            )
            .is_none()
        );
    }
}
