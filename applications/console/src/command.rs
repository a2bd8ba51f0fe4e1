/// Interactive commands
///
/// Each input line is parsed with clap, the same way the binary parses its
/// own arguments.
use clap::{ColorChoice, Parser, Subcommand};
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  p          play / pause
  n          next track
  b          previous track
  j N        jump to track N (1-based)
  s SECS     seek to SECS
  v VOL      set volume (0.0 - 1.0)
  t SECS     let SECS of playback time pass
  r          refresh lists
  c          close the player
  h          show this help
  q          quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Toggle,
    Next,
    Prev,
    /// Zero-based queue position
    Jump(usize),
    Seek(f64),
    Volume(f32),
    Advance(f64),
    Refresh,
    Close,
    Help,
    Quit,
}

#[derive(Debug, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("{} (h for help)", summary(.0))]
    Invalid(#[from] clap::Error),
}

/// First line of a clap error, without the `error: ` prefix
fn summary(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

#[derive(Parser)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    color = ColorChoice::Never
)]
struct Line {
    #[command(subcommand)]
    input: Input,
}

#[derive(Subcommand)]
enum Input {
    #[command(name = "p", aliases = ["play", "pause"])]
    Toggle,

    #[command(name = "n", alias = "next")]
    Next,

    #[command(name = "b", alias = "prev")]
    Prev,

    #[command(name = "j", alias = "jump")]
    Jump {
        /// Track number, starting at 1
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        track: u64,
    },

    #[command(name = "s", alias = "seek")]
    Seek {
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },

    #[command(name = "v", aliases = ["vol", "volume"])]
    Volume {
        #[arg(allow_negative_numbers = true)]
        volume: f32,
    },

    #[command(name = "t", alias = "tick")]
    Advance { seconds: f64 },

    #[command(name = "r", alias = "refresh")]
    Refresh,

    #[command(name = "c", alias = "close")]
    Close,

    #[command(name = "h", aliases = ["help", "?"])]
    Help,

    #[command(name = "q", aliases = ["quit", "exit"])]
    Quit,
}

impl From<Input> for Command {
    fn from(input: Input) -> Self {
        match input {
            Input::Toggle => Command::Toggle,
            Input::Next => Command::Next,
            Input::Prev => Command::Prev,
            Input::Jump { track } => Command::Jump((track - 1) as usize),
            Input::Seek { seconds } => Command::Seek(seconds),
            Input::Volume { volume } => Command::Volume(volume),
            Input::Advance { seconds } => Command::Advance(seconds),
            Input::Refresh => Command::Refresh,
            Input::Close => Command::Close,
            Input::Help => Command::Help,
            Input::Quit => Command::Quit,
        }
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if line.trim().is_empty() {
            return Err(ParseCommandError::Empty);
        }
        let parsed = Line::try_parse_from(line.split_whitespace())?;
        Ok(parsed.input.into())
    }
}
