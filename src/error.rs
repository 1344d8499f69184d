//! Error types for zonewatch.
//!
//! Classification itself never fails. Errors only arise at the edges:
//! validating user input, talking to a storage backend, and handing alerts
//! to a presentation channel.

use thiserror::Error;

use crate::alert::AlertError;
use crate::storage::StorageError;

/// Validation errors that occur while building inputs for the detector.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Latitude {value} is out of range [-90, 90]")]
    LatitudeOutOfRange {
        value: f64,
    },

    #[error("Longitude {value} is out of range [-180, 180]")]
    LongitudeOutOfRange {
        value: f64,
    },

    #[error("Field '{field}' must be a positive number of meters")]
    NonPositiveDistance {
        field: &'static str,
    },

    #[error("Cannot parse '{input}' as 'latitude, longitude'")]
    InvalidCoordinateQuery {
        input: String,
    },

    #[error("No target selected")]
    NoTarget,
}

/// Top-level error type for zonewatch.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Alert delivery failed.
    ///
    /// The execution contexts log failed deliveries and carry on, so they
    /// never return this. It exists for callers that drive their own
    /// [`AlertChannel`](crate::alert::AlertChannel) and want `?` to work.
    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),
}

impl ZoneError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this is an alert delivery error. See [`ZoneError::Alert`].
    #[must_use]
    pub const fn is_alert(&self) -> bool {
        matches!(self, Self::Alert(_))
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::Storage(e) => matches!(e, StorageError::BackendError(_) | StorageError::Io(_)),
            Self::Alert(e) => matches!(e, AlertError::Rejected { .. }),
        }
    }
}

/// Result type alias for zonewatch operations.
pub type ZoneResult<T> = Result<T, ZoneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_latitude() {
        let err = ValidationError::LatitudeOutOfRange { value: 91.5 };
        let msg = format!("{err}");
        assert!(msg.contains("91.5"));
        assert!(msg.contains("out of range"));
    }

    #[test]
    fn test_validation_error_distance_field() {
        let err = ValidationError::NonPositiveDistance { field: "radius" };
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn test_zone_error_from_validation() {
        let err: ZoneError = ValidationError::NoTarget.into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("No target"));
    }

    #[test]
    fn test_zone_error_from_storage() {
        let err: ZoneError = StorageError::BackendError("disk busy".to_string()).into();
        assert!(err.is_storage());
        assert!(err.is_retryable());

        let err: ZoneError = StorageError::SerializationError("bad json".to_string()).into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_zone_error_from_alert() {
        let err: ZoneError = AlertError::Disconnected {
            channel: "queue".to_string(),
        }
        .into();
        assert!(err.is_alert());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_zone_error_has_three_kinds() {
        let errors: [ZoneError; 3] = [
            ValidationError::NoTarget.into(),
            StorageError::InvalidKey("a/b".to_string()).into(),
            AlertError::Rejected {
                channel: "queue".to_string(),
                reason: "full".to_string(),
            }
            .into(),
        ];
        for err in &errors {
            let kinds = match err {
                ZoneError::Validation(_) | ZoneError::Storage(_) | ZoneError::Alert(_) => {
                    [err.is_validation(), err.is_storage(), err.is_alert()]
                }
            };
            assert_eq!(kinds.iter().filter(|k| **k).count(), 1, "{err}");
        }
        assert!(errors[2].is_retryable());
    }
}
