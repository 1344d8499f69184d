//! Proximity configuration: the target point and its thresholds.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::distance::Meters;
use crate::error::ValidationError;

/// Radius used when the radius input does not parse to a positive integer.
pub const DEFAULT_RADIUS_M: Meters = 500;

/// Interval used when the interval input does not parse to a positive integer.
pub const DEFAULT_INTERVAL_M: Meters = 100;

/// The single active monitoring target.
///
/// Persisted with the field names `targetCoords`, `radius` and `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityConfig {
    /// Center of the zone.
    pub target_coords: Coordinate,

    /// Distance at or below which the observer is inside the zone.
    pub radius: Meters,

    /// Additional approach, while inside the zone, needed for a repeat alert.
    pub interval: Meters,
}

impl ProximityConfig {
    /// Creates a validated config.
    ///
    /// # Errors
    ///
    /// Returns a range error for the target, or `NonPositiveDistance` if
    /// `radius` or `interval` is zero.
    pub fn new(
        target_coords: Coordinate,
        radius: Meters,
        interval: Meters,
    ) -> Result<Self, ValidationError> {
        let config = Self {
            target_coords,
            radius,
            interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from raw text inputs, falling back to the defaults
    /// for anything that is not a positive integer.
    ///
    /// # Errors
    ///
    /// Only the target is validated; the thresholds never fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use zonewatch::{Coordinate, ProximityConfig};
    ///
    /// let target = Coordinate::new(0.0, 0.0).unwrap();
    /// let config = ProximityConfig::from_inputs(target, "750", "abc").unwrap();
    /// assert_eq!(config.radius, 750);
    /// assert_eq!(config.interval, 100);
    /// ```
    pub fn from_inputs(
        target_coords: Coordinate,
        radius_input: &str,
        interval_input: &str,
    ) -> Result<Self, ValidationError> {
        Self::new(
            target_coords,
            parse_meters(radius_input, DEFAULT_RADIUS_M),
            parse_meters(interval_input, DEFAULT_INTERVAL_M),
        )
    }

    /// Checks the target range and that both thresholds are positive.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.target_coords.validate()?;
        if self.radius == 0 {
            return Err(ValidationError::NonPositiveDistance { field: "radius" });
        }
        if self.interval == 0 {
            return Err(ValidationError::NonPositiveDistance { field: "interval" });
        }
        Ok(())
    }

    /// Returns a copy with a different radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: Meters) -> Self {
        self.radius = radius;
        self
    }

    /// Returns a copy with a different interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Meters) -> Self {
        self.interval = interval;
        self
    }

    /// Returns true if `other` points at the same target.
    ///
    /// Radius and interval edits keep the target; moving the target does not.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        self.target_coords == other.target_coords
    }
}

/// Parses the leading integer of `input` as meters.
///
/// Leading whitespace and a `+` sign are allowed and trailing text is
/// ignored (`"500m"` parses as 500). Empty, negative, zero or overflowing
/// input yields `default`.
#[must_use]
pub fn parse_meters(input: &str, default: Meters) -> Meters {
    let trimmed = input.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_len = unsigned
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(unsigned.len());

    match unsigned[..digits_len].parse::<Meters>() {
        Ok(value) if value > 0 => value,
        _ => default,
    }
}
