//! Play queue
//!
//! Ordered track list plus the index of the current track. The list and
//! the index only change together, so the index never points into a list
//! it was not chosen for.

use nada_core::TrackRef;

/// Ordered tracks plus the current position
///
/// Invariant: `current_index < tracks.len()` whenever the queue is
/// non-empty; an empty queue always has index 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    tracks: Vec<TrackRef>,
    current_index: usize,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue, clamping `index` to the last track
    pub fn from_parts(tracks: Vec<TrackRef>, index: usize) -> Self {
        let mut queue = Self::new();
        queue.replace(tracks, index);
        queue
    }

    /// Replace tracks and index in one step
    ///
    /// An index past the end is clamped to the last track. Returns the index
    /// actually used.
    pub fn replace(&mut self, tracks: Vec<TrackRef>, index: usize) -> usize {
        self.current_index = index.min(tracks.len().saturating_sub(1));
        self.tracks = tracks;
        self.current_index
    }

    /// Move to `index`
    ///
    /// Returns false (and leaves the queue untouched) when `index` is out of
    /// bounds.
    pub fn set_index(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }
        self.current_index = index;
        true
    }

    /// Remove every track
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current_index = 0;
    }

    /// Current track, if any
    pub fn current(&self) -> Option<&TrackRef> {
        self.tracks.get(self.current_index)
    }

    /// Current index (0 when empty)
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// All tracks in play order
    pub fn tracks(&self) -> &[TrackRef] {
        &self.tracks
    }

    /// Whether a track follows the current one
    pub fn has_next(&self) -> bool {
        self.current_index + 1 < self.tracks.len()
    }

    /// Whether a track precedes the current one
    pub fn has_prev(&self) -> bool {
        !self.tracks.is_empty() && self.current_index > 0
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
