//! Geographic coordinates.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A latitude/longitude pair in decimal degrees.
///
/// The persisted form uses the field names `latitude` and `longitude`.
///
/// # Examples
///
/// ```
/// use zonewatch::Coordinate;
///
/// let c = Coordinate::new(-23.5505, -46.6333).unwrap();
/// assert_eq!(c.latitude, -23.5505);
/// assert!(Coordinate::new(95.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, `[-90, 90]`.
    pub latitude: f64,

    /// Longitude in degrees, `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting out-of-range or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::LatitudeOutOfRange` or
    /// `ValidationError::LongitudeOutOfRange`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let coord = Self {
            latitude,
            longitude,
        };
        coord.validate()?;
        Ok(coord)
    }

    /// Creates a coordinate without range checks.
    ///
    /// Position samples from the host positioning subsystem are taken as-is.
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks that both components are finite and in range.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range component.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::LatitudeOutOfRange {
                value: self.latitude,
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::LongitudeOutOfRange {
                value: self.longitude,
            });
        }
        Ok(())
    }

    /// Returns true if both components are in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Parses a `"latitude, longitude"` search query.
    ///
    /// Anything else (an address, a place name) is left to an external
    /// geocoder and reported as `InvalidCoordinateQuery`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinateQuery` if the input is not two decimal numbers
    /// separated by a comma, or a range error if they are out of range.
    pub fn parse_query(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCoordinateQuery {
            input: input.to_string(),
        };

        let caps = query_pattern().captures(input).ok_or_else(invalid)?;
        let latitude: f64 = caps[1].parse().map_err(|_| invalid())?;
        let longitude: f64 = caps[2].parse().map_err(|_| invalid())?;

        Self::new(latitude, longitude)
    }
}

fn query_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([+-]?\d+(?:\.\d+)?)\s*,\s*([+-]?\d+(?:\.\d+)?)\s*$")
            .expect("coordinate query pattern is a valid regex")
    })
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}
