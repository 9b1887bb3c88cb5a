//! Reelsmith CLI: batch generation of captioned vertical short videos.
//!
//! Usage:
//!   reelsmith generate [--limit N]        Render every pending narration
//!   reelsmith captions <WORDS.json>       Write the two caption tracks only
//!   reelsmith check                       Check external tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reelsmith_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "reelsmith",
    about = "Captioned short videos from narration, screenshots and gameplay",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/reelsmith/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a video for every narration that has no output yet
    Generate {
        /// Render at most this many pending items
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Write the Top and Middle caption tracks for a transcript
    Captions {
        /// Whisper JSON output, or a JSON array of {text, start, end}
        words: PathBuf,

        /// Directory the .ass files are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Track boundary in seconds (defaults to the screenshot duration)
        #[arg(long)]
        boundary: Option<f64>,
    },

    /// Check that ffmpeg, ffprobe and whisper are installed
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    reelsmith_common::logging::init_logging(&config.logging);
    tracing::debug!(config_file = ?cli.config, level = %config.logging.level, "Configuration loaded");

    match cli.command {
        Commands::Generate { limit } => commands::generate::run(config, limit),
        Commands::Captions {
            words,
            out_dir,
            boundary,
        } => commands::captions::run(&config, words, out_dir, boundary),
        Commands::Check => commands::check::run(&config),
    }
}
