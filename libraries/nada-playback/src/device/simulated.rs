//! Deterministic in-process playback device
//!
//! Nothing is decoded. The device keeps a virtual clock that only moves when
//! the host calls [`SimulatedDeviceHandle::advance`], which makes it usable
//! both by the console host and by tests that need exact event ordering.

use super::{DeviceEvent, DeviceEventSender, LoadId, PlayAttemptId, PlayRejection, PlaybackDevice};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Default track length for sources without a configured duration
const DEFAULT_DURATION_SECS: f64 = 180.0;

/// A command received by the simulated device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// `subscribe`
    Subscribe,
    /// `unsubscribe`
    Unsubscribe,
    /// `load`
    Load {
        /// Load tag
        load: LoadId,
        /// Source URL
        source: String,
    },
    /// `unload`
    Unload,
    /// `play`
    Play {
        /// Attempt tag
        attempt: PlayAttemptId,
    },
    /// `pause`
    Pause,
    /// `set_position`
    SetPosition(f64),
    /// `set_volume`
    SetVolume(f32),
}

#[derive(Debug)]
struct SimState {
    events: Option<DeviceEventSender>,
    load: Option<LoadId>,
    source: Option<String>,
    duration: f64,
    position: f64,
    playing: bool,
    volume: f32,

    default_duration: f64,
    durations: HashMap<String, f64>,
    broken_sources: HashSet<String>,

    defer_play: bool,
    deferred: Vec<PlayAttemptId>,
    block_autoplay: bool,
    activated: bool,

    calls: Vec<DeviceCall>,
}

impl SimState {
    fn emit(&self, event: DeviceEvent) {
        if let Some(events) = &self.events {
            events.send(event);
        }
    }

    fn settle(&mut self, attempt: PlayAttemptId, result: Result<(), PlayRejection>) {
        if result.is_ok() {
            self.playing = true;

            // Playing an ended source starts it over
            if let Some(load) = self.load {
                if self.duration > 0.0 && self.position >= self.duration {
                    self.position = 0.0;
                    self.emit(DeviceEvent::TimeUpdate { load, position: 0.0 });
                }
            }
        }
        self.emit(DeviceEvent::PlayResolved { attempt, result });
    }

    fn abort_deferred(&mut self) {
        for attempt in std::mem::take(&mut self.deferred) {
            self.emit(DeviceEvent::PlayResolved {
                attempt,
                result: Err(PlayRejection::Aborted),
            });
        }
    }
}

/// Simulated playback device
///
/// Owned by the session. Use [`SimulatedDevice::handle`] to keep a second
/// view for driving the clock and inspecting what the session asked for.
#[derive(Debug)]
pub struct SimulatedDevice {
    state: Rc<RefCell<SimState>>,
}

/// Host-side view of a [`SimulatedDevice`]
#[derive(Debug, Clone)]
pub struct SimulatedDeviceHandle {
    state: Rc<RefCell<SimState>>,
}

impl SimulatedDevice {
    /// Create a device whose sources all last `default_duration` seconds
    pub fn new(default_duration: f64) -> Self {
        let default_duration = if default_duration.is_finite() && default_duration > 0.0 {
            default_duration
        } else {
            DEFAULT_DURATION_SECS
        };

        Self {
            state: Rc::new(RefCell::new(SimState {
                events: None,
                load: None,
                source: None,
                duration: 0.0,
                position: 0.0,
                playing: false,
                volume: 1.0,
                default_duration,
                durations: HashMap::new(),
                broken_sources: HashSet::new(),
                defer_play: false,
                deferred: Vec::new(),
                block_autoplay: false,
                activated: false,
                calls: Vec::new(),
            })),
        }
    }

    /// Get a handle sharing this device's state
    pub fn handle(&self) -> SimulatedDeviceHandle {
        SimulatedDeviceHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl PlaybackDevice for SimulatedDevice {
    fn subscribe(&mut self, events: DeviceEventSender) {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::Subscribe);
        state.events = Some(events);
    }

    fn unsubscribe(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::Unsubscribe);
        state.events = None;
    }

    fn load(&mut self, load: LoadId, source: &str) {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::Load {
            load,
            source: source.to_string(),
        });

        state.abort_deferred();
        state.playing = false;
        state.position = 0.0;
        state.load = Some(load);
        state.source = Some(source.to_string());

        if state.broken_sources.contains(source) {
            state.duration = 0.0;
            return;
        }

        state.duration = state
            .durations
            .get(source)
            .copied()
            .unwrap_or(state.default_duration);
        let duration = state.duration;
        state.emit(DeviceEvent::MetadataLoaded { load, duration });
    }

    fn unload(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::Unload);

        state.abort_deferred();
        state.playing = false;
        state.position = 0.0;
        state.duration = 0.0;
        state.load = None;
        state.source = None;
    }

    fn play(&mut self, attempt: PlayAttemptId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::Play { attempt });

        let rejection = match &state.source {
            None => Some(PlayRejection::Source("no source loaded".to_string())),
            Some(source) if state.broken_sources.contains(source) => {
                Some(PlayRejection::Source(format!("cannot decode {}", source)))
            }
            Some(_) if state.block_autoplay && !state.activated => Some(PlayRejection::NotAllowed),
            Some(_) => None,
        };

        if let Some(rejection) = rejection {
            state.settle(attempt, Err(rejection));
        } else if state.defer_play {
            state.deferred.push(attempt);
        } else {
            state.settle(attempt, Ok(()));
        }
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::Pause);

        state.abort_deferred();
        state.playing = false;
    }

    fn set_position(&mut self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::SetPosition(seconds));

        let Some(load) = state.load else {
            return;
        };

        let mut position = seconds.max(0.0);
        if state.duration > 0.0 {
            position = position.min(state.duration);
        }
        state.position = position;
        state.emit(DeviceEvent::TimeUpdate { load, position });
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::SetVolume(volume));
        state.volume = volume;
    }
}

impl SimulatedDeviceHandle {
    // ===== Clock =====

    /// Move the virtual clock forward by `seconds`
    ///
    /// Emits a time update while playing, and an end event when the
    /// position reaches the duration.
    pub fn advance(&self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        let Some(load) = state.load else {
            return;
        };
        if !state.playing || !seconds.is_finite() || seconds <= 0.0 {
            return;
        }

        let position = (state.position + seconds).min(state.duration);
        state.position = position;
        state.emit(DeviceEvent::TimeUpdate { load, position });

        if position >= state.duration {
            state.playing = false;
            state.emit(DeviceEvent::Ended { load });
        }
    }

    // ===== Play Policy =====

    /// Hold play requests until [`resolve_deferred`](Self::resolve_deferred)
    pub fn set_defer_play(&self, defer: bool) {
        self.state.borrow_mut().defer_play = defer;
    }

    /// Settle every held play request
    pub fn resolve_deferred(&self, accept: bool) {
        let mut state = self.state.borrow_mut();
        for attempt in std::mem::take(&mut state.deferred) {
            let result = if accept {
                Ok(())
            } else {
                Err(PlayRejection::NotAllowed)
            };
            state.settle(attempt, result);
        }
    }

    /// Number of held play requests
    pub fn deferred_count(&self) -> usize {
        self.state.borrow().deferred.len()
    }

    /// Reject play requests until the user interacts
    pub fn set_block_autoplay(&self, block: bool) {
        self.state.borrow_mut().block_autoplay = block;
    }

    /// Record a user gesture; autoplay is allowed from now on
    pub fn activate(&self) {
        self.state.borrow_mut().activated = true;
    }

    // ===== Sources =====

    /// Set the length of one source
    pub fn set_duration(&self, source: impl Into<String>, seconds: f64) {
        self.state.borrow_mut().durations.insert(source.into(), seconds);
    }

    /// Make a source fail to load and play
    pub fn break_source(&self, source: impl Into<String>) {
        self.state.borrow_mut().broken_sources.insert(source.into());
    }

    // ===== Inspection =====

    /// Commands received so far
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.borrow().calls.clone()
    }

    /// Forget the recorded commands
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Sources loaded so far, in order
    pub fn loaded_sources(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Load { source, .. } => Some(source.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether the device is playing
    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    /// Current position in seconds
    pub fn position(&self) -> f64 {
        self.state.borrow().position
    }

    /// Currently loaded source
    pub fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    /// Current load tag
    pub fn current_load(&self) -> Option<LoadId> {
        self.state.borrow().load
    }

    /// Output gain
    pub fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    /// Whether a session is subscribed
    pub fn is_subscribed(&self) -> bool {
        self.state.borrow().events.is_some()
    }
}
