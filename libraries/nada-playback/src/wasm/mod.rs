//! WASM bindings for nada-playback
//!
//! Browser implementations of the device and store seams, plus a
//! JavaScript-facing wrapper around the session.

mod device;
mod session;
mod storage;

pub use device::HtmlAudioDevice;
pub use session::{format_time, WasmPlaybackSession};
pub use storage::LocalStorageStore;
