//! Spherical-Mercator (EPSG:3857) forward and inverse projection.
//!
//! The map tiles and every interactive event use projected meters; the
//! sounding store uses degrees. Both directions must agree numerically or
//! containment queries built from on-screen shapes silently miss data, so
//! the inverse here is the exact analytical inverse of the forward form.

/// WGS84 equatorial radius in meters, the sphere radius EPSG:3857 uses.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Converts projected Mercator meters to geographic degrees.
///
/// Defined for all finite inputs away from the poles; the study area never
/// approaches latitudes where the projection degenerates.
#[must_use]
pub fn to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// Converts geographic degrees to projected Mercator meters.
#[must_use]
pub fn to_projected(lon: f64, lat: f64) -> (f64, f64) {
    let x = lon.to_radians() * EARTH_RADIUS_M;
    let y = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
        .tan()
        .ln()
        * EARTH_RADIUS_M;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_origin() {
        let (lon, lat) = to_lon_lat(0.0, 0.0);
        assert!(lon.abs() < 1e-12);
        assert!(lat.abs() < 1e-12);
    }

    #[test]
    fn known_points() {
        // x is linear in longitude: one degree is 111319.490793 m.
        let (x, y) = to_projected(-90.0, 0.0);
        assert!((x - -10_018_754.17).abs() < 0.01);
        assert!(y.abs() < 1e-9);

        // Reference value for the 40th parallel in EPSG:3857.
        let (_, y) = to_projected(0.0, 40.0);
        assert!((y - 4_865_942.28).abs() < 0.5);
    }

    #[test]
    fn round_trip_within_tolerance() {
        for &(x, y) in &[
            (-11_718_545.3, 4_865_942.1),
            (-8_237_642.0, 4_970_241.0),
            (0.0, 0.0),
            (-14_026_255.8, 2_875_744.6),
        ] {
            let (lon, lat) = to_lon_lat(x, y);
            let (x2, y2) = to_projected(lon, lat);
            assert!((x - x2).abs() < 1e-6, "x drifted: {x} -> {x2}");
            assert!((y - y2).abs() < 1e-6, "y drifted: {y} -> {y2}");
        }
    }
}
