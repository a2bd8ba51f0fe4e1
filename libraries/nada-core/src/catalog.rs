//! Catalog boundary
//!
//! Rows come from several remote list sources (catalog browse, playlist
//! tracks, favorites) and do not agree on field names: the tracks table uses
//! `cover_url` / `audio_url`, already-mapped lists use `cover` / `audio`, and
//! some rows carry both. Everything is normalized here, once, before a track
//! can reach a queue.

use crate::error::{CoreError, Result};
use crate::types::{TrackId, TrackRef};
use serde::Deserialize;

/// A track row as delivered by a remote list source
///
/// Unknown columns (`created_at`, `user_id`, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogRow {
    /// Row identifier (numeric or text)
    pub id: Option<TrackId>,
    /// Track title
    pub title: Option<String>,
    /// Artist name
    pub artist: Option<String>,
    /// Cover URL, mapped spelling
    pub cover: Option<String>,
    /// Cover URL, table spelling
    pub cover_url: Option<String>,
    /// Audio URL, mapped spelling
    pub audio: Option<String>,
    /// Audio URL, table spelling
    pub audio_url: Option<String>,
}

impl CatalogRow {
    /// Normalize this row into a track reference
    ///
    /// The mapped spelling wins over the table spelling when both are set.
    /// Empty strings count as missing.
    pub fn into_track(self) -> Result<TrackRef> {
        let id = self.id.ok_or(CoreError::MissingField("id"))?;

        let Some(audio) = first_present(self.audio, self.audio_url) else {
            return Err(CoreError::MissingAudio(id));
        };

        Ok(TrackRef {
            id,
            title: self.title.unwrap_or_default(),
            artist: self.artist.unwrap_or_default(),
            cover: first_present(self.cover, self.cover_url),
            audio,
        })
    }
}

impl TryFrom<CatalogRow> for TrackRef {
    type Error = CoreError;

    fn try_from(row: CatalogRow) -> Result<Self> {
        row.into_track()
    }
}

fn first_present(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    preferred
        .filter(|s| !s.trim().is_empty())
        .or_else(|| fallback.filter(|s| !s.trim().is_empty()))
}

/// Normalize a list of rows, dropping the ones that cannot be played
pub fn normalize_rows(rows: Vec<CatalogRow>) -> Vec<TrackRef> {
    rows.into_iter()
        .filter_map(|row| match row.into_track() {
            Ok(track) => Some(track),
            Err(e) => {
                tracing::warn!("Skipping catalog row: {}", e);
                None
            }
        })
        .collect()
}

/// Parse a JSON array of catalog rows into track references
pub fn parse_catalog(json: &str) -> Result<Vec<TrackRef>> {
    let rows: Vec<CatalogRow> = serde_json::from_str(json)?;
    Ok(normalize_rows(rows))
}

/// Position of a track in a list, by id
pub fn position_of(tracks: &[TrackRef], id: &TrackId) -> Option<usize> {
    tracks.iter().position(|t| &t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> CatalogRow {
        CatalogRow {
            id: Some(TrackId::new(id)),
            title: Some(format!("Track {}", id)),
            artist: Some("Artist".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn mapped_spelling_wins() {
        let track = CatalogRow {
            audio: Some("https://cdn/mapped.mp3".to_string()),
            audio_url: Some("https://cdn/raw.mp3".to_string()),
            cover_url: Some("https://cdn/raw.jpg".to_string()),
            ..row("1")
        }
        .into_track()
        .unwrap();

        assert_eq!(track.audio, "https://cdn/mapped.mp3");
        assert_eq!(track.cover.as_deref(), Some("https://cdn/raw.jpg"));
    }

    #[test]
    fn empty_mapped_value_falls_back_to_table_value() {
        let track = CatalogRow {
            audio: Some(String::new()),
            audio_url: Some("https://cdn/raw.mp3".to_string()),
            ..row("1")
        }
        .into_track()
        .unwrap();

        assert_eq!(track.audio, "https://cdn/raw.mp3");
    }

    #[test]
    fn missing_audio_is_rejected() {
        let err = row("9").into_track().unwrap_err();
        assert!(matches!(err, CoreError::MissingAudio(id) if id.as_str() == "9"));
    }

    #[test]
    fn missing_id_is_rejected() {
        let err = CatalogRow {
            audio: Some("https://cdn/a.mp3".to_string()),
            ..Default::default()
        }
        .into_track()
        .unwrap_err();

        assert!(matches!(err, CoreError::MissingField("id")));
    }

    #[test]
    fn normalize_skips_unplayable_rows() {
        let rows = vec![
            CatalogRow {
                audio_url: Some("https://cdn/1.mp3".to_string()),
                ..row("1")
            },
            row("2"),
            CatalogRow {
                audio: Some("https://cdn/3.mp3".to_string()),
                ..row("3")
            },
        ];

        let tracks = normalize_rows(rows);
        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn parse_catalog_rejects_non_array() {
        assert!(parse_catalog("{\"id\": 1}").is_err());
        assert!(parse_catalog("not json").is_err());
    }

    #[test]
    fn finds_position_by_id() {
        let tracks = vec![
            TrackRef::new("a", "A", "X", "https://cdn/a.mp3"),
            TrackRef::new("b", "B", "X", "https://cdn/b.mp3"),
        ];

        assert_eq!(position_of(&tracks, &TrackId::new("b")), Some(1));
        assert_eq!(position_of(&tracks, &TrackId::new("z")), None);
    }
}
