//! Playback session - core orchestration
//!
//! Owns the queue, the transport readout and the one playback device.
//! Surfaces read through accessors and mutate only through the operations
//! below; the device reports back through its event channel.

use crate::{
    device::{device_channel, DeviceEvent, LoadId, PlayAttemptId, PlaybackDevice},
    events::SessionEvent,
    queue::Queue,
    snapshot,
    store::KeyValueStore,
    types::{clamp_volume, PlaybackConfig, SessionState, Transport},
};
use crossbeam_channel::Receiver;
use nada_core::{position_of, TrackId, TrackRef};
use tracing::{debug, trace};

/// Playback session
///
/// One per process. Construct it once at startup and hand `&mut` access to
/// whichever surface is handling input.
///
/// ```rust
/// use nada_core::TrackRef;
/// use nada_playback::{MemoryStore, PlaybackConfig, PlaybackSession, SimulatedDevice};
///
/// let device = SimulatedDevice::new(180.0);
/// let mut session = PlaybackSession::new(PlaybackConfig::default(), device, MemoryStore::new());
///
/// session.set_queue(
///     vec![
///         TrackRef::new("1", "One", "Artist", "https://cdn/1.mp3"),
///         TrackRef::new("2", "Two", "Artist", "https://cdn/2.mp3"),
///     ],
///     0,
/// );
/// session.pump();
///
/// assert!(session.is_playing());
/// assert!(session.has_next());
/// ```
pub struct PlaybackSession<D: PlaybackDevice, S: KeyValueStore> {
    config: PlaybackConfig,
    device: D,
    store: S,
    device_events: Receiver<DeviceEvent>,

    queue: Queue,
    transport: Transport,

    /// Load the device is currently playing from (None when empty)
    current_load: Option<LoadId>,
    last_load: LoadId,

    /// Play request still waiting for the device
    pending_play: Option<PlayAttemptId>,
    last_attempt: PlayAttemptId,

    refresh_key: u64,

    /// State last reported to consumers
    reported_state: SessionState,

    pending_events: Vec<SessionEvent>,
}

impl<D: PlaybackDevice, S: KeyValueStore> PlaybackSession<D, S> {
    /// Create the session
    ///
    /// Subscribes to `device` and restores the saved queue from `store`.
    /// A restored queue has its current track loaded and gets the same
    /// play attempt as a track change, unless `autoplay` or
    /// `resume_on_restore` is off. A refused attempt leaves it paused.
    pub fn new(config: PlaybackConfig, mut device: D, store: S) -> Self {
        let (events_tx, device_events) = device_channel();
        device.subscribe(events_tx);

        let transport = Transport::new(config.initial_volume);
        device.set_volume(transport.volume);

        let queue = snapshot::restore(&store, &config.storage_key);

        let mut session = Self {
            config,
            device,
            store,
            device_events,
            queue,
            transport,
            current_load: None,
            last_load: LoadId::new(0),
            pending_play: None,
            last_attempt: PlayAttemptId::new(0),
            refresh_key: 0,
            reported_state: SessionState::Empty,
            pending_events: Vec::new(),
        };

        if !session.queue.is_empty() {
            debug!(
                "Restored queue of {} tracks at index {}",
                session.queue.len(),
                session.queue.current_index()
            );
            session.emit_queue_changed();
            session.load_current(None);
            if session.config.autoplay && session.config.resume_on_restore {
                session.request_play();
            }
            session.sync_state();
        }

        session
    }

    // ===== Queue Management =====

    /// Replace the queue and start from `start_index`
    ///
    /// The index is clamped to the last track. An empty list closes the
    /// player.
    pub fn set_queue(&mut self, tracks: Vec<TrackRef>, start_index: usize) {
        if tracks.is_empty() {
            self.close();
            return;
        }

        let previous = self.current_track_id();
        let index = self.queue.replace(tracks, start_index);
        debug!("Queue replaced: {} tracks, starting at {}", self.queue.len(), index);

        self.persist();
        self.emit_queue_changed();
        self.change_track(previous);
    }

    /// Replace the queue and start from the track with `track_id`
    ///
    /// Starts from the first track when the id is not in the list.
    pub fn play_from(&mut self, tracks: Vec<TrackRef>, track_id: &TrackId) {
        let index = position_of(&tracks, track_id).unwrap_or(0);
        self.set_queue(tracks, index);
    }

    /// Make `index` the current track and reload the device
    ///
    /// No-op when the index is out of bounds. Jumping to the current index
    /// restarts the track.
    pub fn jump_to(&mut self, index: usize) {
        let previous = self.current_track_id();
        if !self.queue.set_index(index) {
            trace!("Ignoring jump to {} in a queue of {}", index, self.queue.len());
            return;
        }

        self.persist();
        self.change_track(previous);
    }

    /// Advance to the next track, if any
    pub fn next(&mut self) {
        if self.queue.has_next() {
            self.jump_to(self.queue.current_index() + 1);
        }
    }

    /// Go back to the previous track, if any
    pub fn prev(&mut self) {
        if self.queue.has_prev() {
            self.jump_to(self.queue.current_index() - 1);
        }
    }

    /// Stop playback and clear the queue
    pub fn close(&mut self) {
        self.pending_play = None;
        if self.current_load.take().is_some() {
            self.device.pause();
            self.device.unload();
        }

        self.queue.clear();
        self.transport.playing = false;
        self.transport.reset_progress();
        debug!("Player closed");

        self.persist();
        self.emit_queue_changed();
        self.sync_state();
    }

    // ===== Playback Control =====

    /// Ask the device to start playing
    ///
    /// A refusal leaves the session paused; nothing is reported.
    pub fn play(&mut self) {
        if self.current_load.is_none() || self.transport.playing {
            return;
        }
        self.request_play();
    }

    /// Stop the device, keeping the position
    pub fn pause(&mut self) {
        if self.current_load.is_none() {
            return;
        }

        self.pending_play = None;
        self.device.pause();
        self.transport.playing = false;
        self.sync_state();
    }

    /// Pause if playing, otherwise play
    pub fn toggle(&mut self) {
        if self.transport.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    // ===== Seek =====

    /// Move to `seconds` without changing play/pause state
    ///
    /// Clamped to the track length once it is known. Negative or
    /// non-finite positions are ignored.
    pub fn seek(&mut self, seconds: f64) {
        if self.current_load.is_none() || !seconds.is_finite() || seconds < 0.0 {
            return;
        }

        let position = self.transport.clamp_position(seconds);
        self.device.set_position(position);
        self.transport.elapsed = position;
        self.emit_progress();
    }

    // ===== Volume =====

    /// Set output gain (0.0-1.0), clamped
    ///
    /// Works with or without a queue. Non-finite values are ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }

        let volume = clamp_volume(volume);
        self.device.set_volume(volume);
        if (self.transport.volume - volume).abs() > f32::EPSILON {
            self.transport.volume = volume;
            self.pending_events.push(SessionEvent::VolumeChanged { volume });
        }
    }

    // ===== Device Events =====

    /// Apply every device event received so far
    ///
    /// Returns the number of events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.device_events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Apply one device event
    ///
    /// Events tagged with a load or play attempt that has since been
    /// replaced are dropped.
    pub fn handle_event(&mut self, event: DeviceEvent) {
        if let Some(load) = event.load() {
            if self.current_load != Some(load) {
                trace!("Dropping stale device event for {}: {:?}", load, event);
                return;
            }
        }

        match event {
            DeviceEvent::TimeUpdate { position, .. } => {
                if !position.is_finite() {
                    return;
                }
                self.transport.elapsed = self.transport.clamp_position(position);
                self.emit_progress();
            }
            DeviceEvent::MetadataLoaded { duration, .. } => {
                if !duration.is_finite() || duration < 0.0 {
                    return;
                }
                self.transport.duration = duration;
                self.transport.elapsed = self.transport.clamp_position(self.transport.elapsed);
                self.emit_progress();
            }
            DeviceEvent::Ended { .. } => self.on_ended(),
            DeviceEvent::PlayResolved { attempt, result } => {
                if self.pending_play != Some(attempt) {
                    trace!("Dropping superseded {}", attempt);
                    return;
                }
                self.pending_play = None;

                match result {
                    Ok(()) => self.transport.playing = true,
                    Err(reason) => {
                        debug!("Play {} refused: {}", attempt, reason);
                        self.transport.playing = false;
                    }
                }
                self.sync_state();
            }
        }
    }

    fn on_ended(&mut self) {
        self.pending_play = None;
        self.transport.playing = false;

        if self.queue.has_next() {
            debug!("Track ended, advancing");
            self.next();
        } else {
            debug!("Track ended, end of queue");
            self.transport.elapsed = self.transport.duration;
            self.emit_progress();
            self.sync_state();
        }
    }

    // ===== Refresh =====

    /// Ask consumers to re-fetch their lists
    ///
    /// Returns the new refresh key. Playback is not affected.
    pub fn trigger_refresh(&mut self) -> u64 {
        self.refresh_key = self.refresh_key.wrapping_add(1);
        self.pending_events.push(SessionEvent::Refreshed {
            key: self.refresh_key,
        });
        self.refresh_key
    }

    /// Current refresh revision
    pub fn refresh_key(&self) -> u64 {
        self.refresh_key
    }

    // ===== State Queries =====

    /// Current state
    pub fn state(&self) -> SessionState {
        if self.queue.is_empty() {
            SessionState::Empty
        } else if self.transport.playing {
            SessionState::Playing
        } else {
            SessionState::Paused
        }
    }

    /// Tracks in play order
    pub fn queue(&self) -> &[TrackRef] {
        self.queue.tracks()
    }

    /// Current track, if any
    pub fn current_track(&self) -> Option<&TrackRef> {
        self.queue.current()
    }

    /// Current index (0 when empty)
    pub fn current_index(&self) -> usize {
        self.queue.current_index()
    }

    /// Whether a track follows the current one
    pub fn has_next(&self) -> bool {
        self.queue.has_next()
    }

    /// Whether a track precedes the current one
    pub fn has_prev(&self) -> bool {
        self.queue.has_prev()
    }

    /// Whether the device accepted playback
    pub fn is_playing(&self) -> bool {
        self.transport.playing
    }

    /// Whether a play request is still waiting for the device
    pub fn is_play_pending(&self) -> bool {
        self.pending_play.is_some()
    }

    /// Elapsed seconds of the current track
    pub fn elapsed(&self) -> f64 {
        self.transport.elapsed
    }

    /// Length of the current track in seconds (0 while unknown)
    pub fn duration(&self) -> f64 {
        self.transport.duration
    }

    /// Output gain
    pub fn volume(&self) -> f32 {
        self.transport.volume
    }

    /// Full transport readout
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Load the device is playing from
    pub fn current_load(&self) -> Option<LoadId> {
        self.current_load
    }

    /// Session configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Playback device (read-only)
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Backing store (read-only)
    pub fn store(&self) -> &S {
        &self.store
    }

    // ===== Events =====

    /// Take all events emitted since the last call
    ///
    /// Hosts should drain after every operation and every [`pump`](Self::pump);
    /// undrained events accumulate. Progress reports in a row are kept as one.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if events are waiting to be drained
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn current_track_id(&self) -> Option<TrackId> {
        self.queue.current().map(|t| t.id.clone())
    }

    /// Reset progress, reload the device with the current track and
    /// autoplay if configured
    fn change_track(&mut self, previous: Option<TrackId>) {
        self.pending_play = None;
        self.transport.playing = false;
        self.load_current(previous);
        if self.config.autoplay {
            self.request_play();
        }
        self.sync_state();
    }

    fn load_current(&mut self, previous: Option<TrackId>) {
        let Some(track) = self.queue.current() else {
            return;
        };
        let index = self.queue.current_index();
        let track_id = track.id.clone();
        let source = track.audio.clone();

        self.transport.reset_progress();
        self.emit_progress();

        self.last_load = self.last_load.next();
        self.current_load = Some(self.last_load);
        debug!("Loading track {} ({}) as {}", track_id, index, self.last_load);
        self.device.load(self.last_load, &source);

        self.pending_events.push(SessionEvent::TrackChanged {
            index,
            track_id,
            previous_track_id: previous,
        });
    }

    fn request_play(&mut self) {
        self.last_attempt = self.last_attempt.next();
        self.pending_play = Some(self.last_attempt);
        self.device.play(self.last_attempt);
    }

    fn persist(&mut self) {
        snapshot::save(&mut self.store, &self.config.storage_key, &self.queue);
    }

    fn sync_state(&mut self) {
        let state = self.state();
        if state != self.reported_state {
            self.reported_state = state;
            self.pending_events.push(SessionEvent::StateChanged { state });
        }
    }

    /// Back-to-back progress reports collapse into the latest one
    fn emit_progress(&mut self) {
        let progress = SessionEvent::Progress {
            elapsed: self.transport.elapsed,
            duration: self.transport.duration,
        };
        if let Some(last) = self.pending_events.last_mut() {
            if matches!(last, SessionEvent::Progress { .. }) {
                *last = progress;
                return;
            }
        }
        self.pending_events.push(progress);
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(SessionEvent::QueueChanged {
            length: self.queue.len(),
        });
    }
}

impl<D: PlaybackDevice, S: KeyValueStore> Drop for PlaybackSession<D, S> {
    fn drop(&mut self) {
        self.device.unsubscribe();
    }
}

impl<D: PlaybackDevice, S: KeyValueStore> std::fmt::Debug for PlaybackSession<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("state", &self.state())
            .field("queue_len", &self.queue.len())
            .field("current_index", &self.queue.current_index())
            .field("transport", &self.transport)
            .field("current_load", &self.current_load)
            .field("pending_play", &self.pending_play)
            .finish_non_exhaustive()
    }
}
