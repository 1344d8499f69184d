//! Single-target proximity state machine.
//!
//! The detector has two states, outside and inside the zone. Each call to
//! [`ProximityDetector::check_position`] classifies one position sample and
//! emits at most one [`ProximityEvent`]:
//!
//! ```text
//!            distance <= radius / ZoneEntered
//!   OUTSIDE ─────────────────────────────────▶ INSIDE ──┐ approached >= interval
//!      ▲                                          │     │ / IntervalCrossed
//!      └──────────────────────────────────────────┘ ◀───┘
//!            distance > radius / ZoneExited
//! ```
//!
//! The state is a plain value so it can be persisted by one execution context
//! and picked up by another (see [`crate::persistence`]).

use serde::{Deserialize, Serialize};

use crate::config::ProximityConfig;
use crate::coordinate::Coordinate;
use crate::distance::{distance, Meters};

/// Snapshot of the detector's memory of the previous classification.
///
/// `last_alert_distance` is present exactly when the observer is inside the
/// zone. Deserializing a record that breaks this rule fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StateRecord")]
pub struct ProximityState {
    is_inside_zone: bool,
    last_alert_distance: Option<Meters>,
}

impl ProximityState {
    /// The initial state: outside, no alert baseline.
    #[must_use]
    pub const fn outside() -> Self {
        Self {
            is_inside_zone: false,
            last_alert_distance: None,
        }
    }

    /// Inside the zone with the given alert baseline.
    #[must_use]
    pub const fn inside(last_alert_distance: Meters) -> Self {
        Self {
            is_inside_zone: true,
            last_alert_distance: Some(last_alert_distance),
        }
    }

    /// Whether the last classification placed the observer inside the zone.
    #[must_use]
    pub const fn is_inside_zone(&self) -> bool {
        self.is_inside_zone
    }

    /// Distance at the last alert, while inside the zone.
    #[must_use]
    pub const fn last_alert_distance(&self) -> Option<Meters> {
        self.last_alert_distance
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateRecord {
    is_inside_zone: bool,
    last_alert_distance: Option<Meters>,
}

impl TryFrom<StateRecord> for ProximityState {
    type Error = String;

    fn try_from(record: StateRecord) -> Result<Self, Self::Error> {
        match (record.is_inside_zone, record.last_alert_distance) {
            (false, None) => Ok(Self::outside()),
            (true, Some(d)) => Ok(Self::inside(d)),
            (inside, last) => Err(format!(
                "inconsistent proximity state: isInsideZone={inside} lastAlertDistance={last:?}"
            )),
        }
    }
}

/// A classified proximity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProximityEvent {
    /// First sample at or inside the radius.
    ZoneEntered {
        /// Rounded distance to the target.
        distance: Meters,
    },

    /// Approached by at least one interval since the last alert.
    IntervalCrossed {
        /// Rounded distance to the target.
        distance: Meters,
        /// How far the observer approached since the last alert.
        delta: Meters,
    },

    /// First sample outside the radius after being inside.
    ZoneExited,
}

impl ProximityEvent {
    /// Stable name of the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ZoneEntered { .. } => "ZONE_ENTERED",
            Self::IntervalCrossed { .. } => "INTERVAL_CROSSED",
            Self::ZoneExited => "ZONE_EXITED",
        }
    }
}

/// Result of classifying one position sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Rounded distance from the sample to the target.
    pub distance: Meters,

    /// The transition, if any. `None` is the common case.
    pub event: Option<ProximityEvent>,
}

/// Proximity detector for one target.
///
/// # Examples
///
/// ```
/// use zonewatch::{Coordinate, ProximityConfig, ProximityDetector, ProximityEvent};
///
/// let target = Coordinate::new(0.0, 0.0).unwrap();
/// let config = ProximityConfig::new(target, 500, 100).unwrap();
///
/// let mut detector = ProximityDetector::new();
/// let outcome = detector.check_position(&target, &config);
/// assert_eq!(outcome.event, Some(ProximityEvent::ZoneEntered { distance: 0 }));
/// assert!(detector.snapshot().is_inside_zone());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProximityDetector {
    state: ProximityState,
}

impl ProximityDetector {
    /// Creates a detector in the initial (outside) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detector that continues from a persisted snapshot.
    #[must_use]
    pub const fn from_snapshot(state: ProximityState) -> Self {
        Self { state }
    }

    /// Replaces the current state with a persisted snapshot.
    pub fn hydrate(&mut self, state: ProximityState) {
        self.state = state;
    }

    /// Copies out the current state for persisting.
    #[must_use]
    pub const fn snapshot(&self) -> ProximityState {
        self.state
    }

    /// Returns to the initial state.
    ///
    /// Call when the target changes, monitoring stops, or a persisted state
    /// is known to be stale.
    pub fn reset(&mut self) {
        self.state = ProximityState::outside();
    }

    /// Classifies one position sample against `config`.
    ///
    /// The branch order is part of the contract: inside-zone checks come
    /// first, entry wins over interval, and exit is only reported once.
    pub fn check_position(
        &mut self,
        current: &Coordinate,
        config: &ProximityConfig,
    ) -> CheckOutcome {
        let distance = distance(current, &config.target_coords);

        let event = if distance <= config.radius {
            match self.state.last_alert_distance {
                Some(last) if self.state.is_inside_zone => {
                    // A retreat inside the zone leaves the baseline alone.
                    match last.checked_sub(distance) {
                        Some(delta) if delta >= config.interval => {
                            self.state = ProximityState::inside(distance);
                            Some(ProximityEvent::IntervalCrossed { distance, delta })
                        }
                        _ => None,
                    }
                }
                _ => {
                    self.state = ProximityState::inside(distance);
                    Some(ProximityEvent::ZoneEntered { distance })
                }
            }
        } else if self.state.is_inside_zone {
            self.state = ProximityState::outside();
            Some(ProximityEvent::ZoneExited)
        } else {
            None
        };

        CheckOutcome { distance, event }
    }
}
