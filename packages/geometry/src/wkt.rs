//! WKT polygon literal construction.
//!
//! The sounding store only needs standard `POLYGON((lon lat, …))` and
//! `MULTIPOLYGON(((…)))` text literals, so this is a serializer, not a
//! full WKT implementation. Rings are closed here so callers can hand in
//! raw vertex runs straight from a drawing event.

use std::collections::HashSet;

use crate::DegenerateGeometryError;

/// Closes a ring, appending the first vertex when the last differs.
///
/// # Errors
///
/// Returns [`DegenerateGeometryError`] if fewer than 3 distinct vertices
/// are supplied.
pub fn close_ring(vertices: &[(f64, f64)]) -> Result<Vec<(f64, f64)>, DegenerateGeometryError> {
    let distinct: HashSet<(u64, u64)> = vertices
        .iter()
        .map(|&(x, y)| (x.to_bits(), y.to_bits()))
        .collect();

    if distinct.len() < 3 {
        return Err(DegenerateGeometryError {
            distinct: distinct.len(),
        });
    }

    let mut closed = vertices.to_vec();
    if closed.first() != closed.last() {
        closed.push(closed[0]);
    }
    Ok(closed)
}

/// Serializes a ring as a `(lon lat, lon lat, …)` literal, closing it
/// first. Idempotent on already-closed rings.
///
/// # Errors
///
/// Returns [`DegenerateGeometryError`] if fewer than 3 distinct vertices
/// are supplied.
pub fn ring_wkt(vertices: &[(f64, f64)]) -> Result<String, DegenerateGeometryError> {
    let closed = close_ring(vertices)?;
    let coords: Vec<String> = closed
        .iter()
        .map(|(lon, lat)| format!("{lon} {lat}"))
        .collect();
    Ok(format!("({})", coords.join(", ")))
}

/// Serializes a single-ring polygon as a `POLYGON((…))` literal.
///
/// # Errors
///
/// Returns [`DegenerateGeometryError`] if fewer than 3 distinct vertices
/// are supplied.
pub fn polygon_wkt(vertices: &[(f64, f64)]) -> Result<String, DegenerateGeometryError> {
    Ok(format!("POLYGON({})", ring_wkt(vertices)?))
}

/// Serializes a multipolygon as a `MULTIPOLYGON(((…)))` literal.
///
/// Each entry is one polygon given as its rings, exterior first and any
/// holes after.
///
/// # Errors
///
/// Returns [`DegenerateGeometryError`] if any ring has fewer than 3
/// distinct vertices.
pub fn multipolygon_wkt(
    polygons: &[Vec<Vec<(f64, f64)>>],
) -> Result<String, DegenerateGeometryError> {
    let mut parts = Vec::with_capacity(polygons.len());
    for rings in polygons {
        let ring_texts: Vec<String> = rings
            .iter()
            .map(|ring| ring_wkt(ring))
            .collect::<Result<_, _>>()?;
        parts.push(format!("({})", ring_texts.join(", ")));
    }
    Ok(format!("MULTIPOLYGON({})", parts.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: [(f64, f64); 3] = [(-100.0, 40.0), (-99.0, 40.0), (-99.5, 41.0)];

    #[test]
    fn triangle_closes_to_four_pairs() {
        let text = ring_wkt(&TRIANGLE).unwrap();
        assert_eq!(text.matches(',').count(), 3);
        assert!(text.starts_with("(-100 40, "));
        assert!(text.ends_with("-100 40)"));
    }

    #[test]
    fn closing_is_idempotent() {
        let closed = close_ring(&TRIANGLE).unwrap();
        assert_eq!(ring_wkt(&TRIANGLE).unwrap(), ring_wkt(&closed).unwrap());
    }

    #[test]
    fn two_distinct_vertices_are_degenerate() {
        let err = ring_wkt(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]).unwrap_err();
        assert_eq!(err.distinct, 2);
    }

    #[test]
    fn empty_input_is_degenerate() {
        assert_eq!(close_ring(&[]).unwrap_err().distinct, 0);
    }

    #[test]
    fn polygon_literal_shape() {
        let text = polygon_wkt(&TRIANGLE).unwrap();
        assert!(text.starts_with("POLYGON(("));
        assert!(text.ends_with("))"));
    }

    #[test]
    fn multipolygon_literal_shape() {
        let square = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let text = multipolygon_wkt(&[vec![square.clone()], vec![square]]).unwrap();
        assert!(text.starts_with("MULTIPOLYGON((("));
        assert!(text.contains(")), (("));
    }
}
