//! Property tests for distance and the detector's firing rules.

use proptest::prelude::*;

use zonewatch::{
    distance, Coordinate, ProximityConfig, ProximityDetector, ProximityEvent, EARTH_RADIUS_M,
};

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| Coordinate::new_unchecked(lat, lng))
}

/// A point `meters` due north of the origin.
fn at(meters: u32) -> Coordinate {
    Coordinate::new_unchecked((f64::from(meters) / EARTH_RADIUS_M).to_degrees(), 0.0)
}

proptest! {
    #[test]
    fn test_distance_symmetric(a in coordinate(), b in coordinate()) {
        prop_assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn test_distance_to_self_is_zero(a in coordinate()) {
        prop_assert_eq!(distance(&a, &a), 0);
    }

    #[test]
    fn test_distinct_latitudes_are_apart(a in coordinate(), b in coordinate()) {
        // A latitude gap of 0.001 degrees is already over 100 m of arc.
        prop_assume!((a.latitude - b.latitude).abs() > 0.001);
        prop_assert!(distance(&a, &b) > 100);
    }

    #[test]
    fn test_antipode_is_half_circumference(a in coordinate()) {
        let lng = if a.longitude <= 0.0 { a.longitude + 180.0 } else { a.longitude - 180.0 };
        let antipode = Coordinate::new_unchecked(-a.latitude, lng);
        let half = std::f64::consts::PI * EARTH_RADIUS_M;
        let d = f64::from(distance(&a, &antipode));
        prop_assert!((d - half).abs() <= 2.0, "{:?} -> {}", a, d);
    }

    #[test]
    fn test_distance_bounded_by_half_circumference(a in coordinate(), b in coordinate()) {
        let half = (std::f64::consts::PI * EARTH_RADIUS_M).ceil() as u32;
        prop_assert!(distance(&a, &b) <= half);
    }

    #[test]
    fn test_detector_firing_rules(
        radius in 50u32..1_000,
        interval in 1u32..300,
        walk in prop::collection::vec(0u32..2_000, 1..60),
    ) {
        let config = ProximityConfig::new(Coordinate::new_unchecked(0.0, 0.0), radius, interval).unwrap();
        let mut detector = ProximityDetector::new();

        for meters in walk {
            let before = detector.snapshot();
            let outcome = detector.check_position(&at(meters), &config);
            let after = detector.snapshot();

            prop_assert_eq!(outcome.distance, meters);
            prop_assert_eq!(after.is_inside_zone(), after.last_alert_distance().is_some());
            prop_assert_eq!(after.is_inside_zone(), meters <= radius);

            match outcome.event {
                Some(ProximityEvent::ZoneEntered { distance }) => {
                    prop_assert!(!before.is_inside_zone());
                    prop_assert_eq!(after.last_alert_distance(), Some(distance));
                }
                Some(ProximityEvent::IntervalCrossed { distance, delta }) => {
                    prop_assert!(before.is_inside_zone());
                    prop_assert!(delta >= interval);
                    prop_assert_eq!(before.last_alert_distance(), Some(distance + delta));
                    prop_assert_eq!(after.last_alert_distance(), Some(distance));
                }
                Some(ProximityEvent::ZoneExited) => {
                    prop_assert!(before.is_inside_zone());
                    prop_assert!(!after.is_inside_zone());
                }
                None => {
                    // Silent samples never move the baseline.
                    if before.is_inside_zone() && after.is_inside_zone() {
                        prop_assert_eq!(before, after);
                    }
                    prop_assert_eq!(before.is_inside_zone(), after.is_inside_zone());
                }
            }
        }
    }
}
