//! What an alert looks and sounds like, per event kind.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detector::ProximityEvent;
use crate::distance::Meters;

/// Delivery priority of a push notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Shown without interrupting.
    Default,
    /// Heads-up display, sound and vibration.
    High,
}

/// Push-notification content used by the background context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Vibration pattern in milliseconds (wait, buzz, wait, buzz, ...).
    pub vibration_ms: Vec<u64>,
    /// Delivery priority.
    pub priority: NotificationPriority,
}

impl Notification {
    const VIBRATION_MS: [u64; 4] = [0, 500, 200, 500];

    /// Builds the notification for an event.
    #[must_use]
    pub fn for_event(event: &ProximityEvent, distance: Meters) -> Self {
        let (title, body) = match event {
            ProximityEvent::ZoneEntered { .. } => (
                "You have arrived!".to_string(),
                format!("You entered the alert zone! Distance: {distance}m"),
            ),
            ProximityEvent::IntervalCrossed { .. } => (
                "Getting closer".to_string(),
                format!("You are {distance}m from your destination!"),
            ),
            ProximityEvent::ZoneExited => (
                "Left the zone".to_string(),
                "You left the monitored area".to_string(),
            ),
        };

        Self {
            title,
            body,
            vibration_ms: Self::VIBRATION_MS.to_vec(),
            priority: NotificationPriority::High,
        }
    }
}

/// Audible alert used by the foreground context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTone {
    /// Long alarm for arriving in the zone.
    Alarm,
    /// Short chime for each interval of approach.
    Chime,
}

impl AlertTone {
    /// Tone for an event. Leaving the zone is silent.
    #[must_use]
    pub const fn for_event(event: &ProximityEvent) -> Option<Self> {
        match event {
            ProximityEvent::ZoneEntered { .. } => Some(Self::Alarm),
            ProximityEvent::IntervalCrossed { .. } => Some(Self::Chime),
            ProximityEvent::ZoneExited => None,
        }
    }

    /// How long the sound plays before it is stopped.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::Alarm => Duration::from_secs(8),
            Self::Chime => Duration::from_secs(3),
        }
    }

    /// Vibration pattern in milliseconds played alongside the sound.
    #[must_use]
    pub const fn vibration_ms(self) -> &'static [u64] {
        match self {
            Self::Alarm => &[0, 1000, 500, 1000, 500, 1000],
            Self::Chime => &[0, 200, 100, 200],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_per_event() {
        let n = Notification::for_event(&ProximityEvent::ZoneEntered { distance: 480 }, 480);
        assert_eq!(n.title, "You have arrived!");
        assert!(n.body.ends_with("Distance: 480m"));
        assert_eq!(n.priority, NotificationPriority::High);

        let n = Notification::for_event(
            &ProximityEvent::IntervalCrossed {
                distance: 370,
                delta: 110,
            },
            370,
        );
        assert_eq!(n.body, "You are 370m from your destination!");

        let n = Notification::for_event(&ProximityEvent::ZoneExited, 600);
        assert!(!n.body.contains("600"));
        assert_eq!(n.vibration_ms, vec![0, 500, 200, 500]);
    }

    #[test]
    fn test_tone_per_event() {
        assert_eq!(
            AlertTone::for_event(&ProximityEvent::ZoneEntered { distance: 1 }),
            Some(AlertTone::Alarm)
        );
        assert_eq!(
            AlertTone::for_event(&ProximityEvent::IntervalCrossed {
                distance: 1,
                delta: 1
            }),
            Some(AlertTone::Chime)
        );
        assert_eq!(AlertTone::for_event(&ProximityEvent::ZoneExited), None);
    }

    #[test]
    fn test_tone_timing() {
        assert_eq!(AlertTone::Alarm.duration(), Duration::from_secs(8));
        assert_eq!(AlertTone::Chime.duration(), Duration::from_secs(3));
        assert_eq!(AlertTone::Chime.vibration_ms(), &[0, 200, 100, 200]);
    }
}
