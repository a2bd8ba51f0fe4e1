/// Nada Console - play a catalog export in the terminal
use anyhow::Context;
use clap::{Parser, Subcommand};
use nada_console::{load_catalog, Console, ConsoleConfig};
use nada_core::TrackId;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nada-console")]
#[command(about = "Nada playback session in the terminal", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the saved queue
    #[arg(short, long, global = true, env = "NADA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a catalog export and start playing
    Play {
        /// JSON array of track rows
        catalog: PathBuf,
        /// Start from the track with this id
        #[arg(short, long)]
        track: Option<String>,
    },
    /// Continue the saved queue
    Resume,
    /// Show the saved queue
    Status,
    /// Close the player and clear the saved queue
    Clear,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nada_console=info,nada_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config =
        ConsoleConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    config.validate()?;

    tracing::debug!("Data directory: {}", config.storage.data_dir.display());

    match cli.command {
        Commands::Play { catalog, track } => {
            let tracks = load_catalog(&catalog)
                .with_context(|| format!("Failed to read catalog {}", catalog.display()))?;
            if tracks.is_empty() {
                anyhow::bail!("{} has no playable tracks", catalog.display());
            }

            let mut console = Console::from_config(&config);
            console.start(tracks, track.map(TrackId::new).as_ref());
            interactive(&mut console)?;
        }
        Commands::Resume => {
            let mut console = Console::from_config(&config);
            if !console.resume() {
                println!("Nothing to resume");
                return Ok(());
            }
            interactive(&mut console)?;
        }
        Commands::Status => {
            config.playback.resume_on_restore = false;
            let console = Console::from_config(&config);
            println!("{}", console.render());
        }
        Commands::Clear => {
            let mut console = Console::from_config(&config);
            console.clear();
            println!("Queue cleared");
        }
    }

    Ok(())
}

fn interactive<S: nada_playback::KeyValueStore>(console: &mut Console<S>) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    console
        .run(stdin.lock(), stdout.lock())
        .context("Terminal I/O failed")
}
