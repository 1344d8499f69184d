//! Execution contexts that drive the detector.
//!
//! Two call sites share one logical detector without sharing memory:
//!
//! - [`MonitoringSession`]: the interactive loop, fed by the live position
//!   stream while the app is in the foreground.
//! - [`BackgroundTask`]: a platform-scheduled invocation that starts from
//!   nothing but the persisted records.
//!
//! Both follow the same per-sample cycle: load state, classify, dispatch,
//! save state. The records in [`crate::persistence`] are the only thing
//! that links them.

/// Platform-scheduled background invocation.
pub mod background;
/// Interactive monitoring session.
pub mod session;

pub use background::BackgroundTask;
pub use session::MonitoringSession;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::alert::{Alert, AlertChannel, ExecutionContext};
use crate::config::ProximityConfig;
use crate::coordinate::Coordinate;
use crate::detector::{CheckOutcome, ProximityDetector, ProximityState};
use crate::persistence::ProximityStore;
use crate::storage::{KeyValueStore, StorageError};

/// Identifies a monitoring session or a background invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Reads the persisted state, tolerating a damaged record.
///
/// A record that fails to decode is replaced on the next save anyway, so it
/// is logged and treated as absent. Backend failures are returned.
pub(crate) fn load_state_tolerant<S: KeyValueStore>(
    store: &ProximityStore<S>,
    context: ExecutionContext,
) -> Result<Option<ProximityState>, StorageError> {
    match store.load_state() {
        Ok(state) => Ok(state),
        Err(StorageError::SerializationError(reason) | StorageError::Corrupted { reason, .. }) => {
            warn!(%context, %reason, "discarding unreadable proximity state");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// One sample through the cycle: classify, dispatch, persist.
///
/// A failed dispatch is logged and does not stop the state from being saved.
pub(crate) fn process_sample<S: KeyValueStore, C: AlertChannel>(
    detector: &mut ProximityDetector,
    store: &ProximityStore<S>,
    channel: &C,
    origin: SessionId,
    context: ExecutionContext,
    position: &Coordinate,
    config: &ProximityConfig,
) -> Result<CheckOutcome, StorageError> {
    let outcome = detector.check_position(position, config);
    debug!(
        %origin,
        %context,
        distance = outcome.distance,
        event = outcome.event.as_ref().map_or("none", |e| e.kind()),
        "classified position"
    );

    if let Some(event) = outcome.event {
        info!(%origin, %context, event = event.kind(), distance = outcome.distance, "proximity event");
        let alert = Alert::new(origin, context, event, outcome.distance);
        if let Err(e) = channel.dispatch(&alert) {
            warn!(%origin, %context, error = %e, "alert delivery failed");
        }
    }

    store.save_state(&detector.snapshot())?;
    Ok(outcome)
}
