use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::extractors::{TranscriptProvider, VideoRef};
use crate::output::{self, CollisionPolicy, OutputFormat};
use crate::utils::sanitize_title;
use crate::TranscriptorError;

/// Stem used when neither the title nor the video id survive sanitizing
const FALLBACK_STEM: &str = "transcript";

/// How processing a single video ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Transcript written to this path
    Success { path: PathBuf },
    /// Destination existed and the policy said to leave it
    Skipped { path: PathBuf },
    /// Something went wrong; the batch carries on
    Failed { reason: String },
}

/// Result of processing one video, handed to the reporter and then dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingOutcome {
    pub video: VideoRef,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ProcessingOutcome {
    fn failed(video: VideoRef, error: &TranscriptorError) -> Self {
        Self {
            video,
            status: OutcomeStatus::Failed {
                reason: error.to_string(),
            },
        }
    }
}

/// Per-run output settings shared by every video of a batch
#[derive(Debug, Clone, Copy)]
pub struct OutputSettings<'a> {
    pub format: OutputFormat,
    pub language: &'a str,
    pub directory: &'a Path,
    pub policy: CollisionPolicy,
}

/// Fetches, encodes and writes the transcript of one video
pub struct VideoProcessor<'a> {
    provider: &'a dyn TranscriptProvider,
}

impl<'a> VideoProcessor<'a> {
    pub fn new(provider: &'a dyn TranscriptProvider) -> Self {
        Self { provider }
    }

    /// Process one video. Every failure becomes a `Failed` outcome.
    pub async fn process_video(
        &self,
        video_url: &str,
        settings: &OutputSettings<'_>,
    ) -> ProcessingOutcome {
        let video = match self.provider.resolve_video(video_url).await {
            Ok(video) => video,
            Err(e) => {
                tracing::warn!("Could not resolve {}: {}", video_url, e);
                return ProcessingOutcome::failed(VideoRef::unresolved(video_url), &e);
            }
        };

        tracing::info!("Fetching transcript for: {}", video.title);

        match self.save_transcript(&video, settings).await {
            Ok(Some(path)) => {
                tracing::info!("Saved transcript to {}", path.display());
                ProcessingOutcome {
                    video,
                    status: OutcomeStatus::Success { path },
                }
            }
            Ok(None) => {
                let path = settings
                    .directory
                    .join(format!("{}.{}", file_stem(&video), settings.format.extension()));
                tracing::info!("Skipped {} (file already exists)", video.title);
                ProcessingOutcome {
                    video,
                    status: OutcomeStatus::Skipped { path },
                }
            }
            Err(e) => {
                tracing::warn!("Could not process {}: {}", video.url, e);
                ProcessingOutcome::failed(video, &e)
            }
        }
    }

    /// Returns the written path, or `None` when the collision policy skipped the write
    async fn save_transcript(
        &self,
        video: &VideoRef,
        settings: &OutputSettings<'_>,
    ) -> Result<Option<PathBuf>, TranscriptorError> {
        let transcript = self
            .provider
            .fetch_transcript(&video.video_id, settings.language)
            .await?;

        let stem = file_stem(video);

        fs_err::create_dir_all(settings.directory)?;

        let Some(path) = output::resolve_path(
            settings.directory,
            &stem,
            settings.format.extension(),
            settings.policy,
        ) else {
            return Ok(None);
        };

        output::save_to_file(&transcript, &path, settings.format)?;
        Ok(Some(path))
    }
}

/// File stem for a video: its sanitized title, else its id, else a fixed fallback
fn file_stem(video: &VideoRef) -> String {
    [sanitize_title(&video.title), sanitize_title(&video.video_id)]
        .into_iter()
        .find(|stem| !stem.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string())
}
