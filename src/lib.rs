//! yt-scribe - download YouTube transcripts for single videos or whole playlists
//!
//! This library classifies a YouTube URL, expands playlists into their member videos,
//! fetches each transcript in the requested language and writes it to disk as plain
//! text, JSON, SRT or WebVTT while honoring a collision policy for existing files.

pub mod batch;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod history;
pub mod output;
pub mod utils;

pub use batch::{BatchNotice, BatchReporter, BatchRequest, BatchRunner, BatchSummary};
pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{Transcript, TranscriptProvider, TranscriptSegment, VideoRef};
pub use output::{CollisionPolicy, OutputFormat};

/// Result type used by the application layer (config, history, CLI)
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to transcript acquisition
#[derive(thiserror::Error, Debug)]
pub enum TranscriptorError {
    #[error("Invalid URL: {0}")]
    InvalidInput(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error(transparent)]
    TranscriptUnavailable(#[from] TranscriptUnavailable),

    #[error("File operation failed: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// The three ways a transcript can be missing for an otherwise valid video
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptUnavailable {
    #[error("transcripts are disabled for video {video_id}")]
    Disabled { video_id: String },

    #[error(
        "no transcript in language '{language}' for video {video_id} (available: {})",
        list_or_none(.available)
    )]
    NotInLanguage {
        video_id: String,
        language: String,
        available: Vec<String>,
    },

    #[error("no transcript available for video {video_id}")]
    NoneAvailable { video_id: String },
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
