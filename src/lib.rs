//! # zonewatch - Proximity alerting core
//!
//! zonewatch decides, for every position update of a moving observer, whether
//! to raise a "zone entered" alert, a "getting closer" alert, or silently note
//! that the observer left the zone around a fixed target. It never double-fires
//! and keeps no history beyond a two-field state.
//!
//! ## Core Concepts
//!
//! - **Coordinate**: latitude/longitude in decimal degrees
//! - **ProximityConfig**: the target plus `radius` (zone size) and `interval`
//!   (approach needed for a repeat alert), in meters
//! - **ProximityDetector**: the OUTSIDE/INSIDE state machine
//! - **ProximityStore**: durable config and state records, the only link
//!   between the interactive session and the background task
//!
//! ## Usage
//!
//! ```rust
//! use zonewatch::{Coordinate, ProximityConfig, ProximityDetector, ProximityEvent};
//!
//! let target = Coordinate::new(-23.5505, -46.6333)?;
//! let config = ProximityConfig::from_inputs(target, "500", "100")?;
//!
//! let mut detector = ProximityDetector::new();
//! let outcome = detector.check_position(&Coordinate::new(-23.5520, -46.6333)?, &config);
//! assert!(matches!(outcome.event, Some(ProximityEvent::ZoneEntered { .. })));
//! # Ok::<(), zonewatch::ValidationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Classification core
pub mod config;
pub mod coordinate;
pub mod detector;
pub mod distance;
pub mod error;

// Persistence and execution contexts
pub mod alert;
pub mod monitor;
pub mod persistence;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use config::{parse_meters, ProximityConfig, DEFAULT_INTERVAL_M, DEFAULT_RADIUS_M};
pub use coordinate::Coordinate;
pub use detector::{CheckOutcome, ProximityDetector, ProximityEvent, ProximityState};
pub use distance::{distance, haversine_meters, Meters, EARTH_RADIUS_M};
pub use error::{ValidationError, ZoneError, ZoneResult};

pub use alert::{Alert, AlertChannel, AlertError, ExecutionContext};
pub use monitor::{BackgroundTask, MonitoringSession, SessionId};
pub use persistence::{ProximityStore, CONFIG_KEY, STATE_KEY};
pub use storage::{InMemoryKeyValueStore, KeyValueStore, StorageError};
