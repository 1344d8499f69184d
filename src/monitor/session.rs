//! The interactive (foreground) context.
//!
//! A session owns the target the user picked and a detector for it. While
//! monitoring is active every position sample goes through the persisted
//! state, so anything the background task recorded in the meantime is
//! honored, and everything recorded here is visible to the next background
//! invocation.

use tracing::{debug, info};

use crate::alert::{AlertChannel, ExecutionContext};
use crate::config::ProximityConfig;
use crate::coordinate::Coordinate;
use crate::detector::{CheckOutcome, ProximityDetector, ProximityState};
use crate::distance::Meters;
use crate::error::{ValidationError, ZoneResult};
use crate::persistence::ProximityStore;
use crate::storage::KeyValueStore;

use super::{load_state_tolerant, process_sample, SessionId};

const CONTEXT: ExecutionContext = ExecutionContext::Foreground;

/// Foreground monitoring session for a single target.
///
/// # Examples
///
/// ```
/// use zonewatch::alert::LoggingAlertChannel;
/// use zonewatch::storage::InMemoryKeyValueStore;
/// use zonewatch::{Coordinate, MonitoringSession, ProximityConfig, ProximityEvent};
///
/// let target = Coordinate::new(0.0, 0.0).unwrap();
/// let mut session = MonitoringSession::new(InMemoryKeyValueStore::new(), LoggingAlertChannel);
/// session.set_target(ProximityConfig::new(target, 500, 100)?)?;
/// session.start()?;
///
/// let outcome = session.on_position(&target)?.unwrap();
/// assert_eq!(outcome.event, Some(ProximityEvent::ZoneEntered { distance: 0 }));
/// # Ok::<(), zonewatch::ZoneError>(())
/// ```
#[derive(Debug)]
pub struct MonitoringSession<S, C> {
    id: SessionId,
    store: ProximityStore<S>,
    channel: C,
    detector: ProximityDetector,
    config: Option<ProximityConfig>,
    monitoring: bool,
    last_distance: Option<Meters>,
}

impl<S: KeyValueStore, C: AlertChannel> MonitoringSession<S, C> {
    /// Creates an idle session with no target.
    pub fn new(store: S, channel: C) -> Self {
        Self {
            id: SessionId::new(),
            store: ProximityStore::new(store),
            channel,
            detector: ProximityDetector::new(),
            config: None,
            monitoring: false,
            last_distance: None,
        }
    }

    /// Session id, attached to every alert raised here.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The active target, if one was set.
    pub const fn config(&self) -> Option<&ProximityConfig> {
        self.config.as_ref()
    }

    /// Whether position samples are currently being classified.
    pub const fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    /// Distance from the most recent classified sample.
    pub const fn last_distance(&self) -> Option<Meters> {
        self.last_distance
    }

    /// Current detector state.
    pub const fn state(&self) -> ProximityState {
        self.detector.snapshot()
    }

    /// Record access, shared with the background task.
    pub const fn store(&self) -> &ProximityStore<S> {
        &self.store
    }

    /// Sets or edits the target.
    ///
    /// Moving the target resets the detector. Editing only the radius or
    /// interval keeps the current state. While monitoring the records are
    /// updated immediately.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid config, or a storage error
    /// if the records cannot be written.
    pub fn set_target(&mut self, config: ProximityConfig) -> ZoneResult<()> {
        config.validate()?;

        let target_changed = self
            .config
            .as_ref()
            .map_or(true, |current| !current.same_target(&config));

        if target_changed {
            info!(session = %self.id, target = %config.target_coords, "target changed");
            self.detector.reset();
            self.last_distance = None;
        } else {
            debug!(
                session = %self.id,
                radius = config.radius,
                interval = config.interval,
                "thresholds updated"
            );
        }
        self.config = Some(config);

        if self.monitoring {
            self.store.save_config(&config)?;
            if target_changed {
                self.store.save_state(&self.detector.snapshot())?;
            }
        }
        Ok(())
    }

    /// Starts monitoring the current target and publishes it for the
    /// background task.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoTarget` without a target, or a storage
    /// error if the records cannot be written.
    pub fn start(&mut self) -> ZoneResult<()> {
        let config = self.config.ok_or(ValidationError::NoTarget)?;

        self.store.save_config(&config)?;
        self.store.save_state(&self.detector.snapshot())?;
        self.monitoring = true;
        info!(session = %self.id, target = %config.target_coords, "monitoring started");
        Ok(())
    }

    /// Stops monitoring.
    ///
    /// The detector is reset and both records are removed before this
    /// returns, so no later alert can be attributed to the old target.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the records cannot be removed. The
    /// in-memory session is stopped regardless.
    pub fn stop(&mut self) -> ZoneResult<()> {
        self.monitoring = false;
        self.detector.reset();
        self.store.clear()?;
        info!(session = %self.id, "monitoring stopped");
        Ok(())
    }

    /// Forgets the target entirely, stopping monitoring first.
    ///
    /// # Errors
    ///
    /// Same as [`stop`](Self::stop).
    pub fn clear_target(&mut self) -> ZoneResult<()> {
        self.config = None;
        self.last_distance = None;
        self.stop()
    }

    /// Re-reads the records when the app returns to the foreground.
    ///
    /// A stored config resumes monitoring with the state the background task
    /// left behind. No stored config means nothing is being monitored.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    pub fn resume(&mut self) -> ZoneResult<()> {
        match self.store.load_config()? {
            Some(config) => {
                let state = load_state_tolerant(&self.store, CONTEXT)?.unwrap_or_default();
                self.detector.hydrate(state);
                self.config = Some(config);
                self.monitoring = true;
                info!(
                    session = %self.id,
                    target = %config.target_coords,
                    inside = state.is_inside_zone(),
                    "monitoring resumed"
                );
            }
            None => {
                self.monitoring = false;
                self.detector.reset();
                debug!(session = %self.id, "no stored target to resume");
            }
        }
        Ok(())
    }

    /// Classifies a live position sample.
    ///
    /// Returns `None` when not monitoring. Otherwise the detector is synced
    /// from the state record, the sample is classified, any event goes to
    /// the foreground channel and the new state is written back.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the state cannot be read or written.
    pub fn on_position(&mut self, position: &Coordinate) -> ZoneResult<Option<CheckOutcome>> {
        if !self.monitoring {
            return Ok(None);
        }
        let Some(config) = self.config else {
            return Ok(None);
        };

        match load_state_tolerant(&self.store, CONTEXT)? {
            Some(state) => self.detector.hydrate(state),
            None => self.detector.reset(),
        }

        let outcome = process_sample(
            &mut self.detector,
            &self.store,
            &self.channel,
            self.id,
            CONTEXT,
            position,
            &config,
        )?;
        self.last_distance = Some(outcome.distance);
        Ok(Some(outcome))
    }
}
