//! Nada Core
//!
//! Platform-agnostic track types shared by the playback session and the
//! surfaces that feed it.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackRef`, `TrackId`
//! - **Catalog Boundary**: normalization of rows coming from the remote
//!   catalog into `TrackRef` (field names differ between list sources)
//! - **Error Handling**: `CoreError` and `Result`
//! - **Display Helpers**: `format_time` for transport readouts
//!
//! # Example
//!
//! ```rust
//! use nada_core::catalog::parse_catalog;
//!
//! let rows = r#"[
//!     {"id": 7, "title": "Senja", "artist": "Nadin", "cover_url": "https://cdn/c.jpg", "audio_url": "https://cdn/a.mp3"},
//!     {"id": "8", "title": "Pagi", "artist": "Nadin", "audio": "https://cdn/b.mp3"}
//! ]"#;
//!
//! let tracks = parse_catalog(rows).unwrap();
//! assert_eq!(tracks.len(), 2);
//! assert_eq!(tracks[0].id.as_str(), "7");
//! assert_eq!(tracks[0].audio, "https://cdn/a.mp3");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used types
pub use catalog::{normalize_rows, parse_catalog, position_of, CatalogRow};
pub use error::{CoreError, Result};
pub use time::format_time;
pub use types::{TrackId, TrackRef};
