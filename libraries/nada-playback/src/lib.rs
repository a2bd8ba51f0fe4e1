//! Nada - Playback Session
//!
//! Queue and transport management for the Nada player.
//!
//! This crate provides:
//! - One playback session per process, shared by every surface
//! - Play queue with atomic replace and bounded navigation
//! - Transport readout (playing, elapsed, duration, volume)
//! - Auto-advance when a track ends
//! - Queue persistence across restarts (`{queue, currentIndex}` snapshot)
//! - Stale device event guarding via load and play-attempt tags
//!
//! # Architecture
//!
//! `nada-playback` does not play audio itself. The platform primitive sits
//! behind [`PlaybackDevice`]; durable storage sits behind [`KeyValueStore`].
//! Device outcomes (progress, metadata, end of track, play results) arrive
//! asynchronously on a channel and are applied by [`PlaybackSession::pump`].
//!
//! Implementations shipped here:
//! - [`SimulatedDevice`] - virtual clock, for hosts without audio and tests
//! - [`MemoryStore`] / [`FileStore`]
//! - `HtmlAudioDevice` / `LocalStorageStore` (feature `wasm`)
//!
//! # Example: Start From a List
//!
//! ```rust
//! use nada_core::{parse_catalog, TrackId};
//! use nada_playback::{MemoryStore, PlaybackConfig, PlaybackSession, SimulatedDevice};
//!
//! let rows = r#"[
//!     {"id": 1, "title": "Senja", "artist": "Nadin", "audio_url": "https://cdn/1.mp3"},
//!     {"id": 2, "title": "Fajar", "artist": "Nadin", "audio": "https://cdn/2.mp3"}
//! ]"#;
//! let tracks = parse_catalog(rows).unwrap();
//!
//! let device = SimulatedDevice::new(180.0);
//! let clock = device.handle();
//! let mut session = PlaybackSession::new(PlaybackConfig::default(), device, MemoryStore::new());
//!
//! session.play_from(tracks, &TrackId::new("2"));
//! session.pump();
//! assert_eq!(session.current_index(), 1);
//! assert!(session.is_playing());
//!
//! clock.advance(12.0);
//! session.pump();
//! assert_eq!(session.elapsed(), 12.0);
//! ```
//!
//! # Example: Restart
//!
//! ```rust
//! use nada_core::TrackRef;
//! use nada_playback::{MemoryStore, PlaybackConfig, PlaybackSession, SimulatedDevice};
//!
//! let mut session =
//!     PlaybackSession::new(PlaybackConfig::default(), SimulatedDevice::default(), MemoryStore::new());
//! session.set_queue(
//!     vec![
//!         TrackRef::new("a", "A", "X", "https://cdn/a.mp3"),
//!         TrackRef::new("b", "B", "X", "https://cdn/b.mp3"),
//!     ],
//!     1,
//! );
//! let store = session.store().clone();
//! drop(session);
//!
//! let restored = PlaybackSession::new(PlaybackConfig::default(), SimulatedDevice::default(), store);
//! assert_eq!(restored.current_index(), 1);
//! assert!(!restored.is_playing());
//! ```

mod device;
mod error;
mod events;
mod queue;
mod session;
pub mod snapshot;
mod store;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use device::{
    device_channel, DeviceCall, DeviceEvent, DeviceEventSender, LoadId, PlayAttemptId,
    PlayRejection, PlaybackDevice, SimulatedDevice, SimulatedDeviceHandle,
};
pub use error::{Result, StoreError};
pub use events::SessionEvent;
pub use queue::Queue;
pub use session::PlaybackSession;
pub use snapshot::QueueSnapshot;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use types::{PlaybackConfig, SessionState, Transport};
