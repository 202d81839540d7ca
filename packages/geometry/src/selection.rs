//! Freehand selection translation.
//!
//! A lasso gesture arrives as parallel x/y vertex runs in projected
//! meters, usually unclosed. Translation reprojects every vertex to
//! degrees and serializes the closed ring as a store-ready polygon
//! predicate.

use crate::{DegenerateGeometryError, mercator, wkt};

/// A freehand-drawn selection in projected map coordinates.
///
/// Mirrors the drawing event's geometry payload: parallel coordinate
/// runs, first vertex not required to equal the last.
#[derive(Debug, Clone, PartialEq)]
pub struct LassoSelection {
    /// Projected x coordinates, in draw order.
    pub xs: Vec<f64>,
    /// Projected y coordinates, in draw order.
    pub ys: Vec<f64>,
}

impl LassoSelection {
    /// Builds a selection from (x, y) vertex pairs.
    #[must_use]
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            xs: points.iter().map(|p| p.0).collect(),
            ys: points.iter().map(|p| p.1).collect(),
        }
    }

    /// Iterates the selection's (x, y) vertices.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}

/// Translates a lasso selection into a geographic `POLYGON((…))` literal.
///
/// # Errors
///
/// Returns [`DegenerateGeometryError`] if the selection has fewer than 3
/// distinct vertices; callers treat that as "selection ignored".
pub fn translate(selection: &LassoSelection) -> Result<String, DegenerateGeometryError> {
    let vertices: Vec<(f64, f64)> = selection
        .points()
        .map(|(x, y)| mercator::to_lon_lat(x, y))
        .collect();
    wkt::polygon_wkt(&vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_point_selection_is_ignored() {
        let selection = LassoSelection::from_points(&[(0.0, 0.0), (1000.0, 1000.0)]);
        let err = translate(&selection).unwrap_err();
        assert_eq!(err.distinct, 2);
    }

    #[test]
    fn triangle_selection_produces_closed_polygon() {
        let selection = LassoSelection::from_points(&[
            (-11_000_000.0, 4_800_000.0),
            (-10_900_000.0, 4_800_000.0),
            (-10_950_000.0, 4_900_000.0),
        ]);
        let text = translate(&selection).unwrap();
        assert!(text.starts_with("POLYGON(("));
        // 3 distinct vertices plus the closing repeat
        assert_eq!(text.matches(',').count(), 3);
    }

    #[test]
    fn vertices_are_reprojected_to_degrees() {
        let selection = LassoSelection::from_points(&[
            (-11_718_545.3, 4_865_942.1),
            (-11_600_000.0, 4_865_942.1),
            (-11_650_000.0, 4_950_000.0),
        ]);
        let text = translate(&selection).unwrap();
        // Degrees, not meters: every coordinate magnitude is under 180.
        let inner = text
            .trim_start_matches("POLYGON((")
            .trim_end_matches("))");
        for pair in inner.split(", ") {
            let mut nums = pair.split(' ');
            let lon: f64 = nums.next().unwrap().parse().unwrap();
            let lat: f64 = nums.next().unwrap().parse().unwrap();
            assert!(lon.abs() <= 180.0);
            assert!(lat.abs() <= 90.0);
        }
    }
}
