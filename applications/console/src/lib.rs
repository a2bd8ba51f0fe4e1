/// Nada Console - terminal host for the playback session
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod surfaces;

pub use command::Command;
pub use config::ConsoleConfig;
pub use error::{ConsoleError, Result};
pub use host::{load_catalog, Console, Flow};
pub use surfaces::{DetailView, MiniPlayer};
