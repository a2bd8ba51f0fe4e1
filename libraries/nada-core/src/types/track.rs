/// Track reference type
use crate::catalog::CatalogRow;
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Everything the player needs to show and play one song
///
/// Owned by whichever catalog list produced it; once placed in a queue it is
/// never mutated. Deserialization goes through [`CatalogRow`], so both the
/// raw table spelling (`cover_url`, `audio_url`) and the mapped spelling
/// (`cover`, `audio`) are accepted. Serialization always uses the mapped one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogRow")]
pub struct TrackRef {
    /// Catalog identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Cover image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,

    /// Audio source URL handed to the playback device
    pub audio: String,
}

impl TrackRef {
    /// Create a track reference with no cover image
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        audio: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            cover: None,
            audio: audio.into(),
        }
    }

    /// Attach a cover image URL
    #[must_use]
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_canonical_field_names() {
        let track = TrackRef::new("1", "Senja", "Nadin", "https://cdn/a.mp3")
            .with_cover("https://cdn/c.jpg");

        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["audio"], "https://cdn/a.mp3");
        assert_eq!(json["cover"], "https://cdn/c.jpg");
        assert!(json.get("audio_url").is_none());
        assert!(json.get("cover_url").is_none());
    }

    #[test]
    fn deserializes_raw_table_row() {
        let json = r#"{
            "id": 12,
            "title": "Senja",
            "artist": "Nadin",
            "cover_url": "https://cdn/c.jpg",
            "audio_url": "https://cdn/a.mp3",
            "created_at": "2024-01-01T00:00:00Z",
            "user_id": "u-1"
        }"#;

        let track: TrackRef = serde_json::from_str(json).unwrap();
        assert_eq!(track.id.as_str(), "12");
        assert_eq!(track.cover.as_deref(), Some("https://cdn/c.jpg"));
        assert_eq!(track.audio, "https://cdn/a.mp3");
    }

    #[test]
    fn survives_serialization_cycle() {
        let track = TrackRef::new("x", "Title", "Artist", "https://cdn/x.mp3");
        let json = serde_json::to_string(&track).unwrap();
        let back: TrackRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, track);
    }

    #[test]
    fn rejects_row_without_audio() {
        let json = r#"{"id": 1, "title": "Silent"}"#;
        assert!(serde_json::from_str::<TrackRef>(json).is_err());
    }
}
