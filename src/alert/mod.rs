//! Alert dispatch boundary.
//!
//! The detector produces a [`ProximityEvent`]; an execution context wraps it
//! in an [`Alert`] and hands it to an [`AlertChannel`]. How the alert is
//! rendered (alarm sound, vibration, push notification) is up to the
//! channel. The content contract is the same in every context: event kind
//! plus rounded distance.

mod content;
mod queue;

pub use content::{AlertTone, Notification, NotificationPriority};
pub use queue::{AlertReceiver, QueuedAlertChannel, QueuedAlertChannelConfig};

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::detector::ProximityEvent;
use crate::distance::Meters;
use crate::monitor::SessionId;

/// Errors returned by alert channels.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The receiving side is gone.
    #[error("Alert channel '{channel}' is disconnected")]
    Disconnected {
        /// Channel name.
        channel: String,
    },

    /// The channel refused the alert (full queue, muted output, ...).
    #[error("Alert rejected by '{channel}': {reason}")]
    Rejected {
        /// Channel name.
        channel: String,
        /// Why it was refused.
        reason: String,
    },
}

/// Which execution context observed the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// Interactive loop driven by the live position stream.
    Foreground,
    /// Platform-scheduled task with no memory of previous invocations.
    Background,
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Foreground => f.write_str("foreground"),
            Self::Background => f.write_str("background"),
        }
    }
}

/// A proximity event ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Session or invocation that produced the alert.
    pub origin: SessionId,
    /// Context that observed the sample.
    pub context: ExecutionContext,
    /// The classified transition.
    pub event: ProximityEvent,
    /// Rounded distance to the target when the event fired.
    pub distance: Meters,
    /// When the alert was raised.
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    /// Creates an alert stamped with the current time.
    #[must_use]
    pub fn new(
        origin: SessionId,
        context: ExecutionContext,
        event: ProximityEvent,
        distance: Meters,
    ) -> Self {
        Self {
            origin,
            context,
            event,
            distance,
            raised_at: Utc::now(),
        }
    }

    /// Push-notification content for this alert.
    #[must_use]
    pub fn notification(&self) -> Notification {
        Notification::for_event(&self.event, self.distance)
    }

    /// Foreground tone for this alert, if the event has one.
    #[must_use]
    pub fn tone(&self) -> Option<AlertTone> {
        AlertTone::for_event(&self.event)
    }
}

/// Receives alerts from an execution context.
pub trait AlertChannel {
    /// Presents (or enqueues) one alert.
    ///
    /// # Errors
    ///
    /// Returns an `AlertError` if the alert could not be delivered. Callers
    /// log the failure and carry on; classification state is unaffected.
    fn dispatch(&self, alert: &Alert) -> Result<(), AlertError>;
}

impl<T: AlertChannel + ?Sized> AlertChannel for &T {
    fn dispatch(&self, alert: &Alert) -> Result<(), AlertError> {
        (**self).dispatch(alert)
    }
}

impl<T: AlertChannel + ?Sized> AlertChannel for Arc<T> {
    fn dispatch(&self, alert: &Alert) -> Result<(), AlertError> {
        (**self).dispatch(alert)
    }
}

impl<T: AlertChannel + ?Sized> AlertChannel for Box<T> {
    fn dispatch(&self, alert: &Alert) -> Result<(), AlertError> {
        (**self).dispatch(alert)
    }
}

/// Channel that writes every alert to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAlertChannel;

impl AlertChannel for LoggingAlertChannel {
    fn dispatch(&self, alert: &Alert) -> Result<(), AlertError> {
        let notification = alert.notification();
        info!(
            origin = %alert.origin,
            context = %alert.context,
            event = alert.event.kind(),
            distance = alert.distance,
            tone = ?alert.tone(),
            "{}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_content_helpers() {
        let alert = Alert::new(
            SessionId::new(),
            ExecutionContext::Background,
            ProximityEvent::ZoneEntered { distance: 480 },
            480,
        );
        assert!(alert.notification().body.contains("480m"));
        assert_eq!(alert.tone(), Some(AlertTone::Alarm));
    }

    #[test]
    fn test_logging_channel_accepts_everything() {
        let alert = Alert::new(
            SessionId::new(),
            ExecutionContext::Foreground,
            ProximityEvent::ZoneExited,
            612,
        );
        assert!(LoggingAlertChannel.dispatch(&alert).is_ok());
        assert!((&LoggingAlertChannel).dispatch(&alert).is_ok());
    }

    #[test]
    fn test_execution_context_serde() {
        let json = serde_json::to_string(&ExecutionContext::Background).unwrap();
        assert_eq!(json, "\"background\"");
        assert_eq!(ExecutionContext::Foreground.to_string(), "foreground");
    }

    #[test]
    fn test_alert_error_display() {
        let err = AlertError::Rejected {
            channel: "queue".to_string(),
            reason: "full".to_string(),
        };
        assert!(err.to_string().contains("full"));
    }
}
