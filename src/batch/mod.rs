use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::extractors::links::{self, UrlKind};
use crate::extractors::TranscriptProvider;
use crate::output::{CollisionPolicy, OutputFormat};
use crate::TranscriptorError;

pub mod processor;

pub use processor::{OutcomeStatus, OutputSettings, ProcessingOutcome, VideoProcessor};

/// Everything one user-initiated run needs; fixed for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub source_url: String,
    pub output_format: OutputFormat,
    /// Two-letter language code
    pub language: String,
    pub save_directory: PathBuf,
    pub collision_policy: CollisionPolicy,
}

/// Batch-level events that are not tied to a single video outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchNotice {
    /// The source URL is neither a video nor a playlist; nothing was processed
    InvalidUrl(String),
    /// Playlist expansion is about to start
    ExpandingPlaylist(String),
    /// The batch is about to iterate this many videos
    Started { total: usize },
    /// A video is about to be processed (1-based index)
    Processing {
        index: usize,
        total: usize,
        url: String,
    },
    /// Cancellation was observed; remaining videos were not started
    Cancelled { completed: usize, total: usize },
    /// The batch aborted before any video was processed
    Failed(String),
}

/// Receives everything a batch reports, in order, from the worker running it
pub trait BatchReporter: Send {
    fn on_notice(&mut self, notice: &BatchNotice);

    fn on_outcome(&mut self, outcome: &ProcessingOutcome);

    /// Called after each processed video with its 1-based index
    fn on_progress(&mut self, index: usize, total: usize);
}

/// Aggregate counts for a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
    /// Set when the batch aborted before iterating (invalid URL, playlist expansion)
    pub aborted: Option<String>,
}

impl BatchSummary {
    fn aborted(reason: String) -> Self {
        Self {
            aborted: Some(reason),
            ..Self::default()
        }
    }

    fn record(&mut self, status: &OutcomeStatus) {
        match status {
            OutcomeStatus::Success { .. } => self.succeeded += 1,
            OutcomeStatus::Skipped { .. } => self.skipped += 1,
            OutcomeStatus::Failed { .. } => self.failed += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

/// Runs batches against a transcript provider.
///
/// Only one batch should be in flight per runner at a time; callers enforce this.
pub struct BatchRunner {
    provider: Arc<dyn TranscriptProvider>,
}

impl BatchRunner {
    pub fn new(provider: Arc<dyn TranscriptProvider>) -> Self {
        Self { provider }
    }

    /// Run one batch to completion, cancellation or abort.
    ///
    /// Videos are processed one after another in source order. The token is checked
    /// before each video; a video already in progress always finishes.
    pub async fn run_batch(
        &self,
        request: &BatchRequest,
        cancel: &CancellationToken,
        reporter: &mut dyn BatchReporter,
    ) -> BatchSummary {
        let video_urls = match self.collect_video_urls(&request.source_url, reporter).await {
            Ok(urls) => urls,
            Err(TranscriptorError::InvalidInput(url)) => {
                reporter.on_notice(&BatchNotice::InvalidUrl(url.clone()));
                return BatchSummary::aborted(TranscriptorError::InvalidInput(url).to_string());
            }
            Err(e) => {
                tracing::warn!("Playlist expansion failed: {}", e);
                let reason = format!("could not expand playlist: {}", e);
                reporter.on_notice(&BatchNotice::Failed(reason.clone()));
                return BatchSummary::aborted(reason);
            }
        };

        let total = video_urls.len();
        let settings = OutputSettings {
            format: request.output_format,
            language: &request.language,
            directory: &request.save_directory,
            policy: request.collision_policy,
        };
        let processor = VideoProcessor::new(self.provider.as_ref());
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };

        tracing::info!(
            "Processing {} video(s) as {} into {}",
            total,
            request.output_format,
            request.save_directory.display()
        );
        reporter.on_notice(&BatchNotice::Started { total });

        for (i, video_url) in video_urls.iter().enumerate() {
            let index = i + 1;
            if cancel.is_cancelled() {
                tracing::info!("Batch cancelled after {}/{} video(s)", i, total);
                summary.cancelled = true;
                reporter.on_notice(&BatchNotice::Cancelled {
                    completed: i,
                    total,
                });
                break;
            }

            reporter.on_notice(&BatchNotice::Processing {
                index,
                total,
                url: video_url.clone(),
            });
            tracing::info!("Processing video {}/{}: {}", index, total, video_url);

            let outcome = processor.process_video(video_url, &settings).await;
            summary.record(&outcome.status);
            reporter.on_outcome(&outcome);
            reporter.on_progress(index, total);
        }

        summary
    }

    /// Classify the source URL and turn it into the list of videos to process
    async fn collect_video_urls(
        &self,
        source_url: &str,
        reporter: &mut dyn BatchReporter,
    ) -> Result<Vec<String>, TranscriptorError> {
        match links::classify(source_url) {
            UrlKind::Invalid => {
                tracing::warn!("Rejected source URL: {}", source_url);
                Err(TranscriptorError::InvalidInput(source_url.to_string()))
            }
            UrlKind::Video => Ok(vec![links::normalize(source_url)]),
            UrlKind::Playlist => {
                let playlist_url = links::normalize(source_url);
                reporter.on_notice(&BatchNotice::ExpandingPlaylist(playlist_url.clone()));
                tracing::info!(
                    "Expanding playlist via {}: {}",
                    self.provider.platform_name(),
                    playlist_url
                );

                self.provider.expand_playlist(&playlist_url).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{Transcript, TranscriptSegment, VideoRef};
    use crate::{TranscriptUnavailable, TranscriptorError};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Provider serving a fixed playlist; titles are `Video <id>`
    struct FakeProvider {
        playlist: Result<Vec<&'static str>, &'static str>,
        disabled: HashSet<&'static str>,
        requested: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn new(ids: Vec<&'static str>) -> Self {
            Self {
                playlist: Ok(ids),
                disabled: HashSet::new(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TranscriptProvider for FakeProvider {
        async fn resolve_video(&self, url: &str) -> Result<VideoRef, TranscriptorError> {
            self.requested.lock().unwrap().push(url.to_string());
            let id = links::video_id(url).unwrap_or_default();
            Ok(VideoRef {
                url: url.to_string(),
                title: format!("Video {}", id),
                video_id: id,
            })
        }

        async fn expand_playlist(&self, _url: &str) -> Result<Vec<String>, TranscriptorError> {
            self.playlist
                .clone()
                .map(|ids| {
                    ids.into_iter()
                        .map(|id| format!("https://www.youtube.com/watch?v={}", id))
                        .collect()
                })
                .map_err(|e| TranscriptorError::Upstream(e.to_string()))
        }

        async fn fetch_transcript(
            &self,
            video_id: &str,
            language: &str,
        ) -> Result<Transcript, TranscriptorError> {
            if self.disabled.contains(video_id) {
                return Err(TranscriptUnavailable::Disabled {
                    video_id: video_id.to_string(),
                }
                .into());
            }
            Ok(Transcript {
                language: language.to_string(),
                is_generated: false,
                segments: vec![TranscriptSegment::new(format!("text of {}", video_id), 0.0, 1.0)],
            })
        }

        fn platform_name(&self) -> &'static str {
            "Fake"
        }
    }

    /// Records everything; optionally cancels once a given progress index is reported
    #[derive(Default)]
    struct RecordingReporter {
        notices: Vec<BatchNotice>,
        outcomes: Vec<ProcessingOutcome>,
        progress: Vec<(usize, usize)>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl BatchReporter for RecordingReporter {
        fn on_notice(&mut self, notice: &BatchNotice) {
            self.notices.push(notice.clone());
        }

        fn on_outcome(&mut self, outcome: &ProcessingOutcome) {
            self.outcomes.push(outcome.clone());
        }

        fn on_progress(&mut self, index: usize, total: usize) {
            self.progress.push((index, total));
            if let Some((at, token)) = &self.cancel_after {
                if *at == index {
                    token.cancel();
                }
            }
        }
    }

    fn request(source_url: &str, dir: &std::path::Path) -> BatchRequest {
        BatchRequest {
            source_url: source_url.to_string(),
            output_format: OutputFormat::Txt,
            language: "en".to_string(),
            save_directory: dir.to_path_buf(),
            collision_policy: CollisionPolicy::Append,
        }
    }

    const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PL1";

    #[tokio::test]
    async fn test_playlist_order_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(vec!["zz", "aa", "mm"]));
        let runner = BatchRunner::new(provider.clone());
        let mut reporter = RecordingReporter::default();

        let summary = runner
            .run_batch(&request(PLAYLIST_URL, dir.path()), &CancellationToken::new(), &mut reporter)
            .await;

        let ids: Vec<_> = reporter
            .outcomes
            .iter()
            .map(|o| o.video.video_id.as_str())
            .collect();
        assert_eq!(ids, vec!["zz", "aa", "mm"]);
        assert_eq!(reporter.progress, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(summary.succeeded, 3);
        assert!(dir.path().join("video_zz.txt").exists());
        assert_eq!(
            reporter.notices.first(),
            Some(&BatchNotice::ExpandingPlaylist(PLAYLIST_URL.to_string()))
        );
    }

    #[tokio::test]
    async fn test_cancellation_between_videos() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(vec!["v1", "v2", "v3"]));
        let runner = BatchRunner::new(provider.clone());
        let token = CancellationToken::new();
        let mut reporter = RecordingReporter {
            cancel_after: Some((1, token.clone())),
            ..RecordingReporter::default()
        };

        let summary = runner
            .run_batch(&request(PLAYLIST_URL, dir.path()), &token, &mut reporter)
            .await;

        assert_eq!(reporter.outcomes.len(), 1);
        assert_eq!(reporter.outcomes[0].video.video_id, "v1");
        assert_eq!(reporter.progress, vec![(1, 3)]);
        assert_eq!(provider.requested(), vec!["https://www.youtube.com/watch?v=v1"]);
        assert_eq!(
            reporter.notices.last(),
            Some(&BatchNotice::Cancelled { completed: 1, total: 3 })
        );
        assert!(summary.cancelled);
        assert_eq!(summary.processed(), 1);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut fake = FakeProvider::new(vec!["a", "b", "c", "d", "e"]);
        fake.disabled.insert("c");
        let provider = Arc::new(fake);
        let runner = BatchRunner::new(provider.clone());
        let mut reporter = RecordingReporter::default();

        let summary = runner
            .run_batch(&request(PLAYLIST_URL, dir.path()), &CancellationToken::new(), &mut reporter)
            .await;

        assert_eq!(provider.requested().len(), 5);
        assert_eq!(reporter.outcomes.len(), 5);
        let failed: Vec<_> = reporter
            .outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
            .map(|o| o.video.video_id.as_str())
            .collect();
        assert_eq!(failed, vec!["c"]);
        assert_eq!(summary.succeeded, 4);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_invalid_url_aborts_without_processing() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(vec![]));
        let runner = BatchRunner::new(provider.clone());
        let mut reporter = RecordingReporter::default();

        let summary = runner
            .run_batch(
                &request("https://example.com/nothing", dir.path()),
                &CancellationToken::new(),
                &mut reporter,
            )
            .await;

        assert_eq!(
            reporter.notices,
            vec![BatchNotice::InvalidUrl("https://example.com/nothing".to_string())]
        );
        assert!(reporter.outcomes.is_empty());
        assert!(provider.requested().is_empty());
        assert_eq!(
            summary.aborted.as_deref(),
            Some("Invalid URL: https://example.com/nothing")
        );
    }

    #[tokio::test]
    async fn test_playlist_expansion_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider {
            playlist: Err("This playlist is private"),
            disabled: HashSet::new(),
            requested: Mutex::new(Vec::new()),
        });
        let runner = BatchRunner::new(provider);
        let mut reporter = RecordingReporter::default();

        let summary = runner
            .run_batch(&request(PLAYLIST_URL, dir.path()), &CancellationToken::new(), &mut reporter)
            .await;

        assert!(reporter.outcomes.is_empty());
        assert!(matches!(reporter.notices.last(), Some(BatchNotice::Failed(reason)) if reason.contains("private")));
        assert_eq!(
            summary.aborted.as_deref(),
            Some("could not expand playlist: Upstream request failed: This playlist is private")
        );
    }

    #[tokio::test]
    async fn test_short_video_link_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(vec![]));
        let runner = BatchRunner::new(provider.clone());
        let mut reporter = RecordingReporter::default();

        let summary = runner
            .run_batch(
                &request("https://youtu.be/solo", dir.path()),
                &CancellationToken::new(),
                &mut reporter,
            )
            .await;

        assert_eq!(provider.requested(), vec!["https://www.youtube.com/watch?v=solo"]);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test]
    async fn test_duplicate_titles_in_one_batch_get_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(vec!["same", "same"]));
        let runner = BatchRunner::new(provider);
        let mut reporter = RecordingReporter::default();

        runner
            .run_batch(&request(PLAYLIST_URL, dir.path()), &CancellationToken::new(), &mut reporter)
            .await;

        let paths: Vec<_> = reporter
            .outcomes
            .iter()
            .map(|o| o.status.clone())
            .collect();
        assert_eq!(
            paths,
            vec![
                OutcomeStatus::Success { path: dir.path().join("video_same.txt") },
                OutcomeStatus::Success { path: dir.path().join("video_same_1.txt") },
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start_processes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(vec!["x"]));
        let runner = BatchRunner::new(provider.clone());
        let token = CancellationToken::new();
        token.cancel();
        let mut reporter = RecordingReporter::default();

        let summary = runner
            .run_batch(&request(PLAYLIST_URL, dir.path()), &token, &mut reporter)
            .await;

        assert!(provider.requested().is_empty());
        assert!(summary.cancelled);
        assert_eq!(
            reporter.notices.last(),
            Some(&BatchNotice::Cancelled { completed: 0, total: 1 })
        );
    }
}
