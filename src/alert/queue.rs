//! Bounded hand-off of alerts to a presentation thread.
//!
//! Classification runs on whatever thread delivers position samples; sound
//! playback and notification posting happen elsewhere. Dispatch never
//! blocks: when the queue is full the alert is counted as dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};

use super::{Alert, AlertChannel, AlertError};

const CHANNEL_NAME: &str = "alert_queue";

/// Sizing for a [`QueuedAlertChannel`].
#[derive(Debug, Clone)]
pub struct QueuedAlertChannelConfig {
    /// Max alerts waiting for the presentation side.
    pub capacity: usize,
}

impl Default for QueuedAlertChannelConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// Sending half: an [`AlertChannel`] backed by a bounded queue.
#[derive(Debug, Clone)]
pub struct QueuedAlertChannel {
    tx: Sender<Alert>,
    dropped: Arc<AtomicU64>,
}

/// Receiving half, owned by the presentation side.
#[derive(Debug)]
pub struct AlertReceiver {
    rx: Receiver<Alert>,
}

impl QueuedAlertChannel {
    /// Creates a connected channel/receiver pair.
    #[must_use]
    pub fn new(cfg: &QueuedAlertChannelConfig) -> (Self, AlertReceiver) {
        let (tx, rx) = bounded::<Alert>(cfg.capacity.max(1));
        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            AlertReceiver { rx },
        )
    }

    /// Alerts discarded because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl AlertChannel for QueuedAlertChannel {
    fn dispatch(&self, alert: &Alert) -> Result<(), AlertError> {
        match self.tx.try_send(alert.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(AlertError::Rejected {
                    channel: CHANNEL_NAME.to_string(),
                    reason: "queue full".to_string(),
                })
            }
            Err(TrySendError::Disconnected(_)) => Err(AlertError::Disconnected {
                channel: CHANNEL_NAME.to_string(),
            }),
        }
    }
}

impl AlertReceiver {
    /// Receive the next alert (blocking).
    ///
    /// # Errors
    ///
    /// Returns `Disconnected` once every sender is dropped and the queue is empty.
    pub fn recv(&self) -> Result<Alert, AlertError> {
        self.rx.recv().map_err(|_| AlertError::Disconnected {
            channel: CHANNEL_NAME.to_string(),
        })
    }

    /// Receive the next alert with a timeout. `Ok(None)` on timeout.
    ///
    /// # Errors
    ///
    /// Returns `Disconnected` once every sender is dropped and the queue is empty.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Alert>, AlertError> {
        match self.rx.recv_timeout(timeout) {
            Ok(alert) => Ok(Some(alert)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(AlertError::Disconnected {
                channel: CHANNEL_NAME.to_string(),
            }),
        }
    }

    /// Takes an alert if one is waiting.
    #[must_use]
    pub fn try_recv(&self) -> Option<Alert> {
        match self.rx.try_recv() {
            Ok(alert) => Some(alert),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Takes every alert currently waiting, in dispatch order.
    #[must_use]
    pub fn drain(&self) -> Vec<Alert> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::alert::ExecutionContext;
    use crate::detector::ProximityEvent;
    use crate::monitor::SessionId;

    fn alert(distance: u32) -> Alert {
        Alert::new(
            SessionId::new(),
            ExecutionContext::Foreground,
            ProximityEvent::ZoneEntered { distance },
            distance,
        )
    }

    #[test]
    fn test_delivers_in_order() {
        let (channel, receiver) = QueuedAlertChannel::new(&QueuedAlertChannelConfig::default());
        channel.dispatch(&alert(3)).unwrap();
        channel.dispatch(&alert(2)).unwrap();

        let distances: Vec<u32> = receiver.drain().iter().map(|a| a.distance).collect();
        assert_eq!(distances, vec![3, 2]);
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_full_queue_drops() {
        let (channel, receiver) = QueuedAlertChannel::new(&QueuedAlertChannelConfig { capacity: 1 });
        channel.dispatch(&alert(1)).unwrap();

        let err = channel.dispatch(&alert(2)).unwrap_err();
        assert!(matches!(err, AlertError::Rejected { .. }));
        assert_eq!(channel.dropped(), 1);
        assert_eq!(receiver.recv().unwrap().distance, 1);
    }

    #[test]
    fn test_disconnected_receiver() {
        let (channel, receiver) = QueuedAlertChannel::new(&QueuedAlertChannelConfig::default());
        drop(receiver);
        assert!(matches!(
            channel.dispatch(&alert(1)),
            Err(AlertError::Disconnected { .. })
        ));
    }

    #[test]
    fn test_recv_timeout_empty() {
        let (_channel, receiver) = QueuedAlertChannel::new(&QueuedAlertChannelConfig::default());
        let got = receiver.recv_timeout(Duration::from_millis(10)).unwrap();
        assert!(got.is_none());
    }
}
