//! Session Events
//!
//! Notifications for the surfaces that render the session. Events are
//! queued on every state transition and drained by the host:
//! - Queue replaced or cleared
//! - Current track changed (set_queue, jump, next/prev, auto-advance)
//! - Play/pause state changed
//! - Progress reported by the device
//! - Volume changed
//! - Manual refresh requested

use crate::types::SessionState;
use nada_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// Queue was replaced or cleared
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Current track changed and the device was reloaded
    ///
    /// Also emitted when the current track is restarted by jumping to it.
    TrackChanged {
        /// Index of the new current track
        index: usize,
        /// ID of the new current track
        track_id: TrackId,
        /// ID of the previous current track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Session state changed (empty, paused, playing)
    StateChanged {
        /// The new state
        state: SessionState,
    },

    /// Device reported a new position or duration
    Progress {
        /// Elapsed seconds
        elapsed: f64,
        /// Track length in seconds (0 while unknown)
        duration: f64,
    },

    /// Output gain changed
    VolumeChanged {
        /// New gain (0.0-1.0)
        volume: f32,
    },

    /// Consumers should re-fetch their lists
    Refreshed {
        /// New refresh revision
        key: u64,
    },
}

impl SessionEvent {
    /// Whether this event changes what a surface shows for the current track
    pub fn affects_current_track(&self) -> bool {
        matches!(
            self,
            Self::QueueChanged { .. } | Self::TrackChanged { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = SessionEvent::TrackChanged {
            index: 2,
            track_id: TrackId::new("b"),
            previous_track_id: Some(TrackId::new("a")),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "trackChanged");
        assert_eq!(json["index"], 2);
        assert_eq!(json["track_id"], "b");
    }

    #[test]
    fn state_event_uses_lowercase_state() {
        let event = SessionEvent::StateChanged {
            state: SessionState::Playing,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["state"], "playing");
    }

    #[test]
    fn current_track_events() {
        assert!(SessionEvent::QueueChanged { length: 0 }.affects_current_track());
        assert!(!SessionEvent::VolumeChanged { volume: 0.5 }.affects_current_track());
        assert!(!SessionEvent::Refreshed { key: 1 }.affects_current_track());
    }
}
