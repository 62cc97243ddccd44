use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod links;
pub mod youtube;

use crate::TranscriptorError;

/// A video resolved from the upstream metadata service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    /// URL the video was resolved from
    pub url: String,

    /// Platform video id
    pub video_id: String,

    /// Video title as published; untrusted free text
    pub title: String,
}

impl VideoRef {
    /// Placeholder for a video whose metadata could not be resolved.
    ///
    /// The id is recovered from the URL when possible and the URL doubles as the title,
    /// so failed outcomes still identify the item they belong to.
    pub fn unresolved(url: &str) -> Self {
        Self {
            url: url.to_string(),
            video_id: links::video_id(url).unwrap_or_default(),
            title: url.to_string(),
        }
    }
}

/// Individual transcript segment with timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,

    /// Any further fields supplied by the upstream service
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
            extra: Map::new(),
        }
    }

    /// End time in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Transcript of one video in one language, segments in playback order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Language code the transcript was fetched in
    pub language: String,

    /// Whether the track was generated by automatic speech recognition
    pub is_generated: bool,

    pub segments: Vec<TranscriptSegment>,
}

/// Upstream capabilities the batch pipeline consumes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Resolve the metadata of a single video
    async fn resolve_video(&self, url: &str) -> Result<VideoRef, TranscriptorError>;

    /// Expand a playlist into its member video URLs, in playlist order
    async fn expand_playlist(&self, url: &str) -> Result<Vec<String>, TranscriptorError>;

    /// Fetch the transcript of a video in the given language
    async fn fetch_transcript(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Transcript, TranscriptorError>;

    /// Get the name of the backing service
    fn platform_name(&self) -> &'static str;
}
