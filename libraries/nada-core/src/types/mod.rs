/// Domain types for Nada
mod ids;
mod track;

pub use ids::TrackId;
pub use track::TrackRef;
