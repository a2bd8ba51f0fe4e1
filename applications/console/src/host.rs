/// Terminal host
///
/// Builds the one playback session, owns the two surfaces and feeds them
/// from a line-oriented command loop.
use crate::command::{Command, HELP};
use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::surfaces::{DetailView, MiniPlayer};
use nada_core::{parse_catalog, TrackId, TrackRef};
use nada_playback::{
    FileStore, KeyValueStore, PlaybackSession, SimulatedDevice, SimulatedDeviceHandle,
};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Read a catalog export (JSON array of track rows)
pub fn load_catalog(path: &Path) -> Result<Vec<TrackRef>> {
    let json = std::fs::read_to_string(path)?;
    let tracks = parse_catalog(&json)?;
    tracing::info!("Loaded {} playable tracks from {}", tracks.len(), path.display());
    Ok(tracks)
}

/// Whether the loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console<S: KeyValueStore> {
    session: PlaybackSession<SimulatedDevice, S>,
    clock: SimulatedDeviceHandle,
    mini: MiniPlayer,
    detail: DetailView,
    tick_secs: f64,
}

impl Console<FileStore> {
    /// Build the console from configuration, persisting under `data_dir`
    pub fn from_config(config: &ConsoleConfig) -> Self {
        let store = FileStore::new(&config.storage.data_dir);
        Self::with_store(config, store)
    }
}

impl<S: KeyValueStore> Console<S> {
    pub fn with_store(config: &ConsoleConfig, store: S) -> Self {
        let device = SimulatedDevice::new(config.simulation.default_duration_secs);
        let clock = device.handle();
        clock.set_block_autoplay(config.simulation.block_autoplay);

        let session = PlaybackSession::new(config.playback.clone(), device, store);
        let mut console = Self {
            session,
            clock,
            mini: MiniPlayer::default(),
            detail: DetailView::new(),
            tick_secs: config.simulation.tick_secs(),
        };
        console.settle();
        console
    }

    pub fn session(&self) -> &PlaybackSession<SimulatedDevice, S> {
        &self.session
    }

    pub fn clock(&self) -> &SimulatedDeviceHandle {
        &self.clock
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    // ===== Starting Playback =====

    /// Queue `tracks` and start from `track_id` (or the first track)
    pub fn start(&mut self, tracks: Vec<TrackRef>, track_id: Option<&TrackId>) {
        match track_id {
            Some(id) => self.session.play_from(tracks, id),
            None => self.session.set_queue(tracks, 0),
        }
        self.settle();
    }

    /// Continue the restored queue; returns false when there is none
    pub fn resume(&mut self) -> bool {
        if self.session.current_track().is_none() {
            return false;
        }
        self.clock.activate();
        self.session.play();
        self.settle();
        true
    }

    /// Close the player and forget the saved queue
    pub fn clear(&mut self) {
        self.session.close();
        self.settle();
    }

    // ===== Commands =====

    /// Run one command
    ///
    /// Typing counts as a user gesture, so autoplay is unblocked from the
    /// first command on.
    pub fn execute(&mut self, command: Command) -> Flow {
        self.clock.activate();

        match command {
            Command::Toggle => self.session.toggle(),
            Command::Next => self.session.next(),
            Command::Prev => self.session.prev(),
            Command::Jump(index) => self.session.jump_to(index),
            Command::Seek(seconds) => self.session.seek(seconds),
            Command::Volume(volume) => self.session.set_volume(volume),
            Command::Advance(seconds) => self.advance(seconds),
            Command::Refresh => {
                let key = self.session.trigger_refresh();
                tracing::info!("Refresh requested (key {})", key);
            }
            Command::Close => self.session.close(),
            Command::Help => {}
            Command::Quit => return Flow::Quit,
        }

        self.settle();
        Flow::Continue
    }

    /// Let `seconds` of playback time pass, one tick at a time
    fn advance(&mut self, seconds: f64) {
        if !seconds.is_finite() || seconds <= 0.0 {
            return;
        }

        let mut remaining = seconds;
        while remaining > 0.0 && self.session.is_playing() {
            let step = remaining.min(self.tick_secs);
            self.clock.advance(step);
            self.session.pump();
            remaining -= step;
        }
    }

    /// Apply device events and let the surfaces react
    fn settle(&mut self) {
        self.session.pump();
        let events = self.session.drain_events();
        for event in &events {
            tracing::debug!(?event, "Session event");
        }
        self.detail.follow(&self.session, &events);
    }

    // ===== Rendering =====

    pub fn render(&self) -> String {
        match self.mini.render(&self.session) {
            Some(mini) => format!("{}\n\n{}", self.detail.render(&self.session), mini),
            None => "Player closed".to_string(),
        }
    }

    /// Read commands from `input` until `q` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        writeln!(output, "{}\n", self.render())?;
        write!(output, "> ")?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                write!(output, "> ")?;
                output.flush()?;
                continue;
            }

            match line.parse::<Command>() {
                Ok(Command::Help) => writeln!(output, "{}", HELP)?,
                Ok(command) => {
                    if self.execute(command) == Flow::Quit {
                        break;
                    }
                    writeln!(output, "{}\n", self.render())?;
                }
                Err(e) => writeln!(output, "{}", e)?,
            }

            write!(output, "> ")?;
            output.flush()?;
        }

        Ok(())
    }
}
