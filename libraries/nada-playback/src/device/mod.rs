//! Playback device abstraction
//!
//! The device is the one platform primitive that actually plays audio: a
//! browser `HTMLAudioElement`, or the simulated device used by the console
//! host and the tests. Commands go in through [`PlaybackDevice`] and return
//! immediately; outcomes come back later as [`DeviceEvent`]s on the channel
//! handed over in [`PlaybackDevice::subscribe`].
//!
//! Every event is tagged with the [`LoadId`] or [`PlayAttemptId`] it belongs
//! to so the session can drop events for a source it has already replaced.

mod simulated;

pub use simulated::{DeviceCall, SimulatedDevice, SimulatedDeviceHandle};

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Tag for one `load` call on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoadId(u64);

impl LoadId {
    /// Create a load ID from its raw value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    pub fn value(self) -> u64 {
        self.0
    }

    /// The ID following this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

/// Tag for one `play` call on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayAttemptId(u64);

impl PlayAttemptId {
    /// Create an attempt ID from its raw value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    pub fn value(self) -> u64 {
        self.0
    }

    /// The ID following this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for PlayAttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "play#{}", self.0)
    }
}

/// Why the device refused to start playback
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlayRejection {
    /// Platform policy blocked unsolicited playback
    #[error("Playback not allowed without user activation")]
    NotAllowed,

    /// Attempt was interrupted by a pause or a new source
    #[error("Play request aborted")]
    Aborted,

    /// Source is missing or cannot be decoded
    #[error("Source error: {0}")]
    Source(String),
}

/// Events emitted by a playback device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// Playback position moved
    TimeUpdate {
        /// Load the position belongs to
        load: LoadId,
        /// Position in seconds
        position: f64,
    },

    /// Source metadata is available
    MetadataLoaded {
        /// Load the metadata belongs to
        load: LoadId,
        /// Track length in seconds
        duration: f64,
    },

    /// Source played to the end
    Ended {
        /// Load that ended
        load: LoadId,
    },

    /// A play request settled
    PlayResolved {
        /// Attempt that settled
        attempt: PlayAttemptId,
        /// Outcome of the attempt
        result: Result<(), PlayRejection>,
    },
}

impl DeviceEvent {
    /// Load this event is tagged with, if any
    pub fn load(&self) -> Option<LoadId> {
        match self {
            Self::TimeUpdate { load, .. }
            | Self::MetadataLoaded { load, .. }
            | Self::Ended { load } => Some(*load),
            Self::PlayResolved { .. } => None,
        }
    }
}

/// Sending half of the device event channel
///
/// Cheap to clone; devices keep one and hand copies to their callbacks.
#[derive(Debug, Clone)]
pub struct DeviceEventSender {
    inner: Sender<DeviceEvent>,
}

impl DeviceEventSender {
    /// Send an event to the session
    ///
    /// Events sent after the session is gone are discarded.
    pub fn send(&self, event: DeviceEvent) {
        if self.inner.send(event).is_err() {
            tracing::trace!("Device event dropped: session is gone");
        }
    }
}

/// Create the device event channel
///
/// The channel is unbounded: devices never block on the session.
pub fn device_channel() -> (DeviceEventSender, Receiver<DeviceEvent>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (DeviceEventSender { inner: tx }, rx)
}

/// Platform playback device
///
/// Implementations must not call back into the session; every outcome goes
/// through the event channel. All commands are fire-and-forget.
pub trait PlaybackDevice {
    /// Start delivering events on `events`
    ///
    /// Replaces any previous subscription.
    fn subscribe(&mut self, events: DeviceEventSender);

    /// Stop delivering events
    fn unsubscribe(&mut self);

    /// Replace the current source and rewind to 0
    ///
    /// Aborts any unsettled play request. Events for this source carry `load`.
    fn load(&mut self, load: LoadId, source: &str);

    /// Drop the current source
    fn unload(&mut self);

    /// Request playback of the current source
    ///
    /// The outcome arrives as [`DeviceEvent::PlayResolved`] for `attempt`.
    fn play(&mut self, attempt: PlayAttemptId);

    /// Stop playback, keeping the position
    fn pause(&mut self);

    /// Move the playback position (seconds)
    ///
    /// The device clamps to `[0, duration]`.
    fn set_position(&mut self, seconds: f64);

    /// Set output gain (0.0-1.0)
    fn set_volume(&mut self, volume: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase() {
        let load = LoadId::new(1);
        assert!(load.next() > load);
        assert_eq!(load.next().value(), 2);
        assert_eq!(PlayAttemptId::new(7).next(), PlayAttemptId::new(8));
    }

    #[test]
    fn channel_delivers_in_order() {
        let (tx, rx) = device_channel();
        tx.send(DeviceEvent::Ended { load: LoadId::new(1) });
        tx.send(DeviceEvent::Ended { load: LoadId::new(2) });

        let loads: Vec<_> = rx.try_iter().filter_map(|e| e.load()).collect();
        assert_eq!(loads, vec![LoadId::new(1), LoadId::new(2)]);
    }

    #[test]
    fn send_after_receiver_dropped_is_silent() {
        let (tx, rx) = device_channel();
        drop(rx);
        tx.send(DeviceEvent::Ended { load: LoadId::new(1) });
    }

    #[test]
    fn play_resolution_has_no_load() {
        let event = DeviceEvent::PlayResolved {
            attempt: PlayAttemptId::new(1),
            result: Err(PlayRejection::NotAllowed),
        };
        assert_eq!(event.load(), None);
    }
}
