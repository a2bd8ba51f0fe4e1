/// Text surfaces over the playback session
///
/// Both surfaces only read the session. Input goes through the host,
/// which calls session operations directly.
use nada_core::{format_time, TrackId};
use nada_playback::{KeyValueStore, PlaybackDevice, PlaybackSession, SessionEvent};
use std::fmt::Write;

fn progress_bar(elapsed: f64, duration: f64, width: usize) -> String {
    let filled = if duration > 0.0 {
        ((elapsed / duration).clamp(0.0, 1.0) * width as f64).round() as usize
    } else {
        0
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn progress_line<D: PlaybackDevice, S: KeyValueStore>(
    session: &PlaybackSession<D, S>,
    width: usize,
) -> String {
    format!(
        "{} {} {}",
        format_time(session.elapsed()),
        progress_bar(session.elapsed(), session.duration(), width),
        format_time(session.duration())
    )
}

/// Compact player shown whenever something is queued
#[derive(Debug, Clone)]
pub struct MiniPlayer {
    pub bar_width: usize,
}

impl Default for MiniPlayer {
    fn default() -> Self {
        Self { bar_width: 24 }
    }
}

impl MiniPlayer {
    /// Render the player, or `None` when nothing is queued
    pub fn render<D: PlaybackDevice, S: KeyValueStore>(
        &self,
        session: &PlaybackSession<D, S>,
    ) -> Option<String> {
        let track = session.current_track()?;

        let mut out = String::new();
        let _ = writeln!(out, "[{}] {} - {}", session.state(), track.title, track.artist);
        let _ = writeln!(out, "  {}", progress_line(session, self.bar_width));

        let prev = if session.has_prev() { "b:prev" } else { "      " };
        let next = if session.has_next() { "n:next" } else { "      " };
        let toggle = if session.is_playing() { "p:pause" } else { "p:play " };
        let _ = write!(
            out,
            "  {}  {}  {}  vol {:>3}%  c:close",
            prev,
            toggle,
            next,
            (session.volume() * 100.0).round() as u32
        );

        Some(out)
    }
}

/// Full view of one track
///
/// Follows the session: when the current track changes, the view switches
/// to it.
#[derive(Debug, Clone, Default)]
pub struct DetailView {
    shown: Option<TrackId>,
}

impl DetailView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a specific track
    pub fn open(&mut self, id: TrackId) {
        self.shown = Some(id);
    }

    /// Track currently shown
    pub fn shown(&self) -> Option<&TrackId> {
        self.shown.as_ref()
    }

    /// Switch to the current track if `events` moved it
    pub fn follow<D: PlaybackDevice, S: KeyValueStore>(
        &mut self,
        session: &PlaybackSession<D, S>,
        events: &[SessionEvent],
    ) {
        if !events.iter().any(SessionEvent::affects_current_track) {
            return;
        }
        if let Some(current) = session.current_track() {
            if self.shown.as_ref() != Some(&current.id) {
                tracing::debug!("Detail view follows track {}", current.id);
                self.shown = Some(current.id.clone());
            }
        }
    }

    pub fn render<D: PlaybackDevice, S: KeyValueStore>(
        &self,
        session: &PlaybackSession<D, S>,
    ) -> String {
        let Some(id) = &self.shown else {
            return "No track selected".to_string();
        };
        let Some(track) = session.queue().iter().find(|t| &t.id == id) else {
            return format!("Track {} is not in the queue", id);
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", track.title);
        let _ = writeln!(out, "{}", track.artist);
        if let Some(cover) = &track.cover {
            let _ = writeln!(out, "cover: {}", cover);
        }

        let is_current = session.current_track().map(|t| &t.id) == Some(id);
        if is_current {
            let _ = writeln!(out, "{}", progress_line(session, 40));
        }

        let _ = writeln!(
            out,
            "{}   {}",
            if session.has_prev() { "< prev" } else { "      " },
            if session.has_next() { "next >" } else { "" }
        );

        let _ = writeln!(out, "queue:");
        for (i, queued) in session.queue().iter().enumerate() {
            let marker = if i == session.current_index() { '>' } else { ' ' };
            let _ = writeln!(
                out,
                "{} {:>2}. {} - {}",
                marker,
                i + 1,
                queued.title,
                queued.artist
            );
        }

        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 0.0, 4), "[----]");
        assert_eq!(progress_bar(50.0, 100.0, 4), "[##--]");
        assert_eq!(progress_bar(100.0, 100.0, 4), "[####]");
        assert_eq!(progress_bar(500.0, 100.0, 4), "[####]");
    }
}
