//! Great-circle distance on a spherical Earth.

use crate::coordinate::Coordinate;

/// Whole meters. Distances, radii and intervals all use this unit.
pub type Meters = u32;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in (fractional) meters.
///
/// Out-of-range input is not checked and yields a meaningless value.
#[must_use]
pub fn haversine_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let sin_dlat = (delta_lat / 2.0).sin();
    let sin_dlon = (delta_lon / 2.0).sin();
    // Rounding can push h just past 1 for near-antipodal points.
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Distance between two coordinates rounded to the nearest meter.
///
/// This is the value every threshold comparison uses. A non-finite result
/// (from NaN input) maps to `Meters::MAX`, so the sample reads as outside
/// any zone.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn distance(a: &Coordinate, b: &Coordinate) -> Meters {
    let meters = haversine_meters(a, b);
    if meters.is_finite() {
        meters.round() as Meters
    } else {
        Meters::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new_unchecked(lat, lon)
    }

    #[test]
    fn test_zero_for_same_point() {
        let p = c(-23.55, -46.63);
        assert_eq!(distance(&p, &p), 0);
        assert!(haversine_meters(&p, &p).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_latitude() {
        // ~111.2 km per degree of latitude on a 6371 km sphere
        let d = distance(&c(35.0, 139.0), &c(36.0, 139.0));
        assert!((111_000..112_000).contains(&d), "got {d}");
    }

    #[test]
    fn test_symmetric() {
        let a = c(48.8566, 2.3522);
        let b = c(51.5074, -0.1278);
        assert_eq!(distance(&a, &b), distance(&b, &a));
        // Paris - London is about 344 km
        assert!((340_000..350_000).contains(&distance(&a, &b)));
    }

    #[test]
    fn test_antipodal() {
        let d = haversine_meters(&c(0.0, 0.0), &c(0.0, 180.0));
        assert!((d - EARTH_RADIUS_M * std::f64::consts::PI).abs() < 1.0);
    }

    #[test]
    fn test_rounds_to_nearest_meter() {
        // 480.4 m due north of the origin
        let lat = (480.4 / EARTH_RADIUS_M).to_degrees();
        assert_eq!(distance(&c(0.0, 0.0), &c(lat, 0.0)), 480);
        let lat = (480.6 / EARTH_RADIUS_M).to_degrees();
        assert_eq!(distance(&c(0.0, 0.0), &c(lat, 0.0)), 481);
    }

    #[test]
    fn test_nan_reads_as_unreachable() {
        assert_eq!(distance(&c(f64::NAN, 0.0), &c(0.0, 0.0)), Meters::MAX);
        assert_eq!(distance(&c(0.0, 0.0), &c(0.0, f64::NAN)), Meters::MAX);
    }

    #[test]
    fn test_near_antipodal_is_half_circumference() {
        let half = EARTH_RADIUS_M * std::f64::consts::PI;
        let mut lat = -89.99;
        while lat <= 89.99 {
            let d = haversine_meters(&c(lat, 10.0), &c(-lat, -170.0));
            assert!(d.is_finite(), "NaN at lat {lat}");
            assert!((d - half).abs() < 1.0, "lat {lat}: {d}");
            lat += 0.01;
        }
        let d = distance(&c(-89.33, 10.0), &c(89.33, -170.0));
        assert!((20_015_000..=20_015_100).contains(&d), "got {d}");
    }
}
