//! Queue snapshot persistence
//!
//! Snapshot format (JSON, one slot in the key-value store):
//!
//! ```text
//! { "queue": [ { "id": "...", "title": "...", "artist": "...",
//!                "cover": "...", "audio": "..." }, ... ],
//!   "currentIndex": 1 }
//! ```
//!
//! Missing or `null` fields read as an empty queue / index 0. Anything that
//! does not parse is discarded and the session starts empty.

use crate::queue::Queue;
use crate::store::KeyValueStore;
use nada_core::TrackRef;
use serde::{Deserialize, Deserializer, Serialize};

/// Persisted `{queue, currentIndex}` pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    /// Tracks in play order
    #[serde(default, deserialize_with = "null_as_default")]
    pub queue: Vec<TrackRef>,

    /// Index of the current track
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_index: usize,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl QueueSnapshot {
    /// Capture the persisted part of a queue
    pub fn capture(queue: &Queue) -> Self {
        Self {
            queue: queue.tracks().to_vec(),
            current_index: queue.current_index(),
        }
    }

    /// Serialize to the stored JSON form
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse the stored JSON form
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Turn the snapshot back into a queue
    ///
    /// An index outside the restored tracks is reset to 0.
    pub fn into_queue(self) -> Queue {
        let len = self.queue.len();
        let index = if self.current_index < len {
            self.current_index
        } else {
            if len > 0 {
                tracing::warn!(
                    "Restored index {} is outside a queue of {} tracks, starting at 0",
                    self.current_index,
                    len
                );
            }
            0
        };
        Queue::from_parts(self.queue, index)
    }
}

/// Read the snapshot under `key`
///
/// Never fails: a missing slot, a store error or an unparseable value all
/// yield an empty queue.
pub fn restore<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Queue {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!("No saved queue under {:?}", key);
            return Queue::new();
        }
        Err(e) => {
            tracing::warn!("Failed to read saved queue: {}", e);
            return Queue::new();
        }
    };

    match QueueSnapshot::from_json(&raw) {
        Ok(snapshot) => snapshot.into_queue(),
        Err(e) => {
            tracing::warn!("Discarding malformed saved queue: {}", e);
            Queue::new()
        }
    }
}

/// Write the snapshot of `queue` under `key`
///
/// Failures are logged and otherwise ignored.
pub fn save<S: KeyValueStore + ?Sized>(store: &mut S, key: &str, queue: &Queue) {
    let json = match QueueSnapshot::capture(queue).to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to serialize queue: {}", e);
            return;
        }
    };

    if let Err(e) = store.set(key, &json) {
        tracing::warn!("Failed to save queue: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn three_tracks() -> Vec<TrackRef> {
        vec![
            TrackRef::new("1", "One", "A", "https://cdn/1.mp3"),
            TrackRef::new("2", "Two", "A", "https://cdn/2.mp3").with_cover("https://cdn/2.jpg"),
            TrackRef::new("3", "Three", "B", "https://cdn/3.mp3"),
        ]
    }

    #[test]
    fn uses_camel_case_index() {
        let queue = Queue::from_parts(three_tracks(), 1);
        let json = QueueSnapshot::capture(&queue).to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["currentIndex"], 1);
        assert_eq!(value["queue"].as_array().unwrap().len(), 3);
        assert_eq!(value["queue"][1]["cover"], "https://cdn/2.jpg");
    }

    #[test]
    fn save_then_restore() {
        let mut store = MemoryStore::new();
        let queue = Queue::from_parts(three_tracks(), 2);

        save(&mut store, "music_queue", &queue);
        let restored = restore(&store, "music_queue");

        assert_eq!(restored, queue);
    }

    #[test]
    fn missing_fields_read_as_empty() {
        let snapshot = QueueSnapshot::from_json("{}").unwrap();
        assert!(snapshot.queue.is_empty());
        assert_eq!(snapshot.current_index, 0);

        let snapshot = QueueSnapshot::from_json(r#"{"queue": null, "currentIndex": null}"#).unwrap();
        assert_eq!(snapshot, QueueSnapshot::default());
    }

    #[test]
    fn accepts_raw_table_field_names() {
        let json = r#"{
            "queue": [{"id": 5, "title": "T", "artist": "A", "audio_url": "https://cdn/5.mp3"}],
            "currentIndex": 0
        }"#;

        let queue = QueueSnapshot::from_json(json).unwrap().into_queue();
        assert_eq!(queue.current().unwrap().audio, "https://cdn/5.mp3");
    }

    #[test]
    fn out_of_range_index_resets_to_zero() {
        let snapshot = QueueSnapshot {
            queue: three_tracks(),
            current_index: 9,
        };

        let queue = snapshot.into_queue();
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn malformed_values_restore_empty() {
        for raw in [
            "not json",
            "[]",
            r#"{"queue": "nope"}"#,
            r#"{"queue": [], "currentIndex": -1}"#,
            r#"{"queue": [{"id": 1, "title": "no audio"}], "currentIndex": 0}"#,
        ] {
            let store = MemoryStore::new().with_entry("music_queue", raw);
            let queue = restore(&store, "music_queue");
            assert!(queue.is_empty(), "expected empty queue for {}", raw);
            assert_eq!(queue.current_index(), 0);
        }
    }

    #[test]
    fn missing_slot_restores_empty() {
        let store = MemoryStore::new();
        assert!(restore(&store, "music_queue").is_empty());
    }
}
