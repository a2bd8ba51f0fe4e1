//! Core types for the playback session

use serde::{Deserialize, Serialize};

/// Default output gain for a new session
pub const DEFAULT_VOLUME: f32 = 0.8;

/// Default storage key for the queue snapshot
pub const DEFAULT_STORAGE_KEY: &str = "music_queue";

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No queue; every transport operation is a no-op
    Empty,

    /// A track is loaded but the device is not playing
    Paused,

    /// A track is loaded and the device accepted playback
    Playing,
}

impl SessionState {
    /// Lowercase name, as shown by surfaces and the JS bindings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Paused => "paused",
            Self::Playing => "playing",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transport readout for the current track
///
/// `elapsed` and `duration` come from the device and are zeroed whenever
/// the current track changes. Only `volume` survives a track change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    /// Whether the device is playing
    pub playing: bool,

    /// Position in seconds, within `[0, duration]` once duration is known
    pub elapsed: f64,

    /// Track length in seconds, 0 while unknown
    pub duration: f64,

    /// Output gain in `[0.0, 1.0]`
    pub volume: f32,
}

impl Transport {
    /// Create a stopped transport at the given volume
    pub fn new(volume: f32) -> Self {
        Self {
            playing: false,
            elapsed: 0.0,
            duration: 0.0,
            volume: clamp_volume(volume),
        }
    }

    /// Zero the device-derived fields
    pub fn reset_progress(&mut self) {
        self.elapsed = 0.0;
        self.duration = 0.0;
    }

    /// Clamp a position to what this transport can represent
    pub fn clamp_position(&self, seconds: f64) -> f64 {
        let seconds = seconds.max(0.0);
        if self.duration > 0.0 {
            seconds.min(self.duration)
        } else {
            seconds
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

/// Clamp a gain value to `[0.0, 1.0]`
pub(crate) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        DEFAULT_VOLUME
    }
}

/// Configuration for the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial output gain (0.0-1.0, default: 0.8)
    pub initial_volume: f32,

    /// Key the queue snapshot is stored under (default: "music_queue")
    pub storage_key: String,

    /// Start playing whenever the current track changes (default: true)
    pub autoplay: bool,

    /// Attempt playback of a restored queue at startup, like any other
    /// track change; only applies with `autoplay` (default: true)
    pub resume_on_restore: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_volume: DEFAULT_VOLUME,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autoplay: true,
            resume_on_restore: true,
        }
    }
}
