//! The periodic (background) context.
//!
//! The host wakes the task with a batch of location samples. Nothing
//! survives between invocations except the persisted records, so each call
//! rebuilds the detector from storage, classifies the batch in arrival
//! order and writes the state back after every sample.

use tracing::{debug, info, warn};

use crate::alert::{AlertChannel, ExecutionContext};
use crate::coordinate::Coordinate;
use crate::detector::{CheckOutcome, ProximityDetector};
use crate::error::ZoneResult;
use crate::persistence::ProximityStore;
use crate::storage::KeyValueStore;

use super::{load_state_tolerant, process_sample, SessionId};

const CONTEXT: ExecutionContext = ExecutionContext::Background;

/// Handler for platform-scheduled location batches.
#[derive(Debug)]
pub struct BackgroundTask<S, C> {
    id: SessionId,
    store: ProximityStore<S>,
    channel: C,
}

impl<S: KeyValueStore, C: AlertChannel> BackgroundTask<S, C> {
    /// Creates a handler. Every instance gets its own invocation id.
    pub fn new(store: S, channel: C) -> Self {
        Self {
            id: SessionId::new(),
            store: ProximityStore::new(store),
            channel,
        }
    }

    /// Invocation id, attached to every alert raised here.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Record access.
    pub const fn store(&self) -> &ProximityStore<S> {
        &self.store
    }

    /// Processes one batch of location samples.
    ///
    /// An empty batch or a missing config record is a no-op. Returns one
    /// outcome per classified sample.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the config cannot be read or a state write
    /// fails. Samples classified before the failure have already been
    /// persisted and dispatched.
    pub fn handle_locations(&self, samples: &[Coordinate]) -> ZoneResult<Vec<CheckOutcome>> {
        if samples.is_empty() {
            warn!(invocation = %self.id, "empty location batch");
            return Ok(Vec::new());
        }

        let Some(config) = self.store.load_config()? else {
            info!(invocation = %self.id, "no target configured, skipping");
            return Ok(Vec::new());
        };

        let state = load_state_tolerant(&self.store, CONTEXT)?.unwrap_or_default();
        let mut detector = ProximityDetector::from_snapshot(state);
        debug!(
            invocation = %self.id,
            samples = samples.len(),
            inside = state.is_inside_zone(),
            "processing location batch"
        );

        let mut outcomes = Vec::with_capacity(samples.len());
        for sample in samples {
            let outcome = process_sample(
                &mut detector,
                &self.store,
                &self.channel,
                self.id,
                CONTEXT,
                sample,
                &config,
            )?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Processes a single location sample.
    ///
    /// # Errors
    ///
    /// Same as [`handle_locations`](Self::handle_locations).
    pub fn handle_location(&self, sample: &Coordinate) -> ZoneResult<Option<CheckOutcome>> {
        Ok(self
            .handle_locations(std::slice::from_ref(sample))?
            .into_iter()
            .next())
    }
}
