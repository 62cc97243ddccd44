use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::output::{CollisionPolicy, OutputFormat};

pub mod reporter;

pub use reporter::ConsoleReporter;

#[derive(Parser)]
#[command(
    name = "ytscribe",
    about = "yt-scribe - Download transcripts of YouTube videos and playlists",
    version,
    long_about = "Fetches the transcript of a single YouTube video or of every video in a playlist and saves each one as plain text, JSON, SRT or WebVTT. Requires yt-dlp on PATH."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file to use instead of the default location
    #[arg(short, long, global = true, value_name = "FILE", env = "YTSCRIBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Output options shared by `download` and `config`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Directory transcripts are saved into
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Transcript language as a two-letter code (e.g. en, de, fr)
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<String>,

    /// What to do when the transcript file already exists
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_conflict: Option<CollisionPolicy>,
}

impl From<OutputArgs> for Overrides {
    fn from(args: OutputArgs) -> Self {
        Self {
            save_directory: args.output_dir,
            output_format: args.format,
            language: args.language,
            collision_policy: args.on_conflict,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download transcripts for a video or playlist URL
    Download {
        /// YouTube video or playlist URL (youtube.com/watch, youtu.be, playlist?list=)
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show or change the saved defaults
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List or clear recently downloaded transcripts
    History {
        /// Remove all entries
        #[arg(long)]
        clear: bool,
    },
}
