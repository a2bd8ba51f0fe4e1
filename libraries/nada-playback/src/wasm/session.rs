//! WASM-compatible PlaybackSession wrapper

use super::{HtmlAudioDevice, LocalStorageStore};
use crate::{PlaybackConfig, PlaybackSession};
use js_sys::Function;
use nada_core::{normalize_rows, CatalogRow, TrackId, TrackRef};
use wasm_bindgen::prelude::*;

/// WASM-compatible playback session
///
/// Wraps the core session with a JavaScript-friendly API. The page calls
/// `pump()` from its animation frame (or a timer) to apply audio element
/// events; every call that changes state reports through `onChange`.
#[wasm_bindgen]
pub struct WasmPlaybackSession {
    inner: PlaybackSession<HtmlAudioDevice, LocalStorageStore>,
    on_change: Option<Function>,
}

fn parse_tracks(tracks: JsValue) -> Result<Vec<TrackRef>, JsValue> {
    let rows: Vec<CatalogRow> = serde_wasm_bindgen::from_value(tracks)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {}", e)))?;
    Ok(normalize_rows(rows))
}

#[wasm_bindgen]
impl WasmPlaybackSession {
    /// Create the session; `config` may be omitted
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmPlaybackSession, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlaybackConfig = if config.is_undefined() || config.is_null() {
            PlaybackConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        let device = HtmlAudioDevice::new()?;
        let store = LocalStorageStore::open().map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self {
            inner: PlaybackSession::new(config, device, store),
            on_change: None,
        })
    }

    // ===== Queue Management =====

    /// Replace the queue with catalog rows, starting at `startIndex`
    #[wasm_bindgen(js_name = setQueue)]
    pub fn set_queue(&mut self, tracks: JsValue, start_index: usize) -> Result<(), JsValue> {
        let tracks = parse_tracks(tracks)?;
        self.inner.set_queue(tracks, start_index);
        self.notify();
        Ok(())
    }

    /// Replace the queue with catalog rows, starting at the row with `trackId`
    #[wasm_bindgen(js_name = playFrom)]
    pub fn play_from(&mut self, tracks: JsValue, track_id: String) -> Result<(), JsValue> {
        let tracks = parse_tracks(tracks)?;
        self.inner.play_from(tracks, &TrackId::new(track_id));
        self.notify();
        Ok(())
    }

    /// Jump to a queue position
    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&mut self, index: usize) {
        self.inner.jump_to(index);
        self.notify();
    }

    /// Skip to next track
    pub fn next(&mut self) {
        self.inner.next();
        self.notify();
    }

    /// Go to previous track
    pub fn prev(&mut self) {
        self.inner.prev();
        self.notify();
    }

    /// Stop and clear the queue
    pub fn close(&mut self) {
        self.inner.close();
        self.notify();
    }

    // ===== Playback Control =====

    /// Start or resume playback
    pub fn play(&mut self) {
        self.inner.play();
        self.notify();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.inner.pause();
        self.notify();
    }

    /// Play/pause
    pub fn toggle(&mut self) {
        self.inner.toggle();
        self.notify();
    }

    /// Seek to position in seconds
    pub fn seek(&mut self, seconds: f64) {
        self.inner.seek(seconds);
        self.notify();
    }

    /// Set volume (0.0 - 1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, volume: f32) {
        self.inner.set_volume(volume);
        self.notify();
    }

    /// Apply pending audio element events
    pub fn pump(&mut self) -> usize {
        let handled = self.inner.pump();
        self.notify();
        handled
    }

    /// Bump the refresh key so list views re-fetch
    #[wasm_bindgen(js_name = triggerRefresh)]
    pub fn trigger_refresh(&mut self) -> u64 {
        let key = self.inner.trigger_refresh();
        self.notify();
        key
    }

    // ===== State Queries =====

    /// Current state ("empty" | "paused" | "playing")
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.inner.state().as_str().to_string()
    }

    /// Current queue index
    #[wasm_bindgen(getter, js_name = currentIndex)]
    pub fn current_index(&self) -> usize {
        self.inner.current_index()
    }

    /// Current track, or null
    #[wasm_bindgen(getter, js_name = currentTrack)]
    pub fn current_track(&self) -> JsValue {
        self.inner
            .current_track()
            .and_then(|t| serde_wasm_bindgen::to_value(t).ok())
            .unwrap_or(JsValue::NULL)
    }

    /// All queued tracks
    #[wasm_bindgen(getter)]
    pub fn queue(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.queue()).unwrap_or(JsValue::NULL)
    }

    /// Whether audio is playing
    #[wasm_bindgen(getter, js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    /// Elapsed seconds
    #[wasm_bindgen(getter)]
    pub fn elapsed(&self) -> f64 {
        self.inner.elapsed()
    }

    /// Track length in seconds (0 while unknown)
    #[wasm_bindgen(getter)]
    pub fn duration(&self) -> f64 {
        self.inner.duration()
    }

    /// Output gain
    #[wasm_bindgen(getter)]
    pub fn volume(&self) -> f32 {
        self.inner.volume()
    }

    /// Check if there is a next track
    #[wasm_bindgen(getter, js_name = hasNext)]
    pub fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    /// Check if there is a previous track
    #[wasm_bindgen(getter, js_name = hasPrev)]
    pub fn has_prev(&self) -> bool {
        self.inner.has_prev()
    }

    /// Current refresh revision
    #[wasm_bindgen(getter, js_name = refreshKey)]
    pub fn refresh_key(&self) -> u64 {
        self.inner.refresh_key()
    }

    // ===== Event Listeners =====

    /// Register the change callback; it receives an array of events
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: Function) {
        self.on_change = Some(callback);
    }

    /// Take pending events (when no callback is registered)
    ///
    /// Without `onChange`, call this after `pump()`; undrained events pile up.
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.drain_events()).unwrap_or(JsValue::NULL)
    }

    fn notify(&mut self) {
        let Some(cb) = &self.on_change else {
            return;
        };
        if !self.inner.has_pending_events() {
            return;
        }

        let events = self.inner.drain_events();
        if let Ok(js_events) = serde_wasm_bindgen::to_value(&events) {
            cb.call1(&JsValue::NULL, &js_events).ok();
        }
    }
}

/// Format seconds as `m:ss`
#[wasm_bindgen(js_name = formatTime)]
pub fn format_time(seconds: f64) -> String {
    nada_core::format_time(seconds)
}
