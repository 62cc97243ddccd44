use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;

use super::{Transcript, TranscriptProvider, TranscriptSegment, VideoRef};
use crate::{TranscriptUnavailable, TranscriptorError};

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";
const CAPTION_FORMAT: &str = "json3";

/// YouTube metadata and transcript provider using yt-dlp
pub struct YoutubeExtractor {
    yt_dlp_path: String,
    http: reqwest::Client,
    /// Video JSON from `resolve_video`, consumed by the following `fetch_transcript`
    info_cache: Mutex<HashMap<String, Value>>,
}

/// A caption track picked for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub url: String,
    pub is_generated: bool,
}

/// yt-dlp `json3` caption payload
#[derive(Debug, Deserialize)]
struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

impl YoutubeExtractor {
    pub fn new() -> Self {
        Self::with_binary("yt-dlp")
    }

    pub fn with_binary(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            http: reqwest::Client::new(),
            info_cache: Mutex::new(HashMap::new()),
        }
    }

    /// yt-dlp command in its own process group.
    ///
    /// A terminal Ctrl-C only reaches us and becomes a cancellation; the video in
    /// progress keeps its yt-dlp child.
    fn yt_dlp_command(&self) -> Command {
        let mut command = Command::new(&self.yt_dlp_path);
        #[cfg(unix)]
        command.process_group(0);
        command
    }

    /// Run yt-dlp and return its stdout
    async fn run_yt_dlp(&self, args: &[&str]) -> Result<String, TranscriptorError> {
        tracing::debug!("Running {} {}", self.yt_dlp_path, args.join(" "));

        let output = self
            .yt_dlp_command()
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                TranscriptorError::Upstream(format!(
                    "failed to run {}: {} (is yt-dlp installed?)",
                    self.yt_dlp_path, e
                ))
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptorError::Upstream(format!(
                "yt-dlp failed: {}",
                error.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| TranscriptorError::Upstream(format!("yt-dlp returned invalid UTF-8: {}", e)))
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value, TranscriptorError> {
        tracing::debug!("Extracting video info for: {}", url);

        let stdout = self
            .run_yt_dlp(&["--dump-json", "--no-playlist", "--skip-download", "--no-warnings", url])
            .await?;

        serde_json::from_str(&stdout)
            .map_err(|e| TranscriptorError::Upstream(format!("yt-dlp returned invalid JSON: {}", e)))
    }

    async fn download_captions(&self, url: &str) -> Result<String, TranscriptorError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TranscriptorError::Upstream(format!("caption download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(TranscriptorError::Upstream(format!(
                "caption download failed: HTTP {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TranscriptorError::Upstream(format!("caption download failed: {}", e)))
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeExtractor {
    async fn resolve_video(&self, url: &str) -> Result<VideoRef, TranscriptorError> {
        let info = self.get_video_info(url).await?;
        let video = parse_video_ref(&info, url)?;

        if let Ok(mut cache) = self.info_cache.lock() {
            cache.insert(video.video_id.clone(), info);
        }
        Ok(video)
    }

    async fn expand_playlist(&self, url: &str) -> Result<Vec<String>, TranscriptorError> {
        tracing::debug!("Expanding playlist: {}", url);

        let stdout = self
            .run_yt_dlp(&["--flat-playlist", "--dump-json", "--no-warnings", url])
            .await?;

        parse_playlist_entries(&stdout)
    }

    async fn fetch_transcript(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Transcript, TranscriptorError> {
        let cached = self
            .info_cache
            .lock()
            .ok()
            .and_then(|mut cache| cache.remove(video_id));
        let info = match cached {
            Some(info) => info,
            None => {
                self.get_video_info(&format!("{}{}", WATCH_URL_PREFIX, video_id))
                    .await?
            }
        };

        let track = select_caption_track(&info, video_id, language)?;
        tracing::debug!(
            "Downloading {} captions for {} (generated: {})",
            language,
            video_id,
            track.is_generated
        );

        let payload = self.download_captions(&track.url).await?;
        let segments = parse_json3(&payload)?;

        if segments.is_empty() {
            return Err(TranscriptUnavailable::NoneAvailable {
                video_id: video_id.to_string(),
            }
            .into());
        }

        Ok(Transcript {
            language: language.to_string(),
            is_generated: track.is_generated,
            segments,
        })
    }

    fn platform_name(&self) -> &'static str {
        "YouTube"
    }
}

impl Default for YoutubeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a `VideoRef` from yt-dlp's video JSON
pub fn parse_video_ref(info: &Value, url: &str) -> Result<VideoRef, TranscriptorError> {
    let video_id = info["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| TranscriptorError::Upstream(format!("no video id in metadata for {}", url)))?;

    let title = info["title"].as_str().unwrap_or(video_id);

    Ok(VideoRef {
        url: url.to_string(),
        video_id: video_id.to_string(),
        title: title.to_string(),
    })
}

/// Turn `--flat-playlist --dump-json` output (one object per line) into watch URLs
pub fn parse_playlist_entries(stdout: &str) -> Result<Vec<String>, TranscriptorError> {
    let mut urls = Vec::new();

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let entry: Value = serde_json::from_str(line).map_err(|e| {
            TranscriptorError::Upstream(format!("yt-dlp returned invalid playlist entry: {}", e))
        })?;

        match entry["id"].as_str().filter(|id| !id.is_empty()) {
            Some(id) => urls.push(format!("{}{}", WATCH_URL_PREFIX, id)),
            None => tracing::warn!("Skipping playlist entry without an id"),
        }
    }

    Ok(urls)
}

/// Pick the caption track for `language`, preferring manual subtitles over automatic ones
pub fn select_caption_track(
    info: &Value,
    video_id: &str,
    language: &str,
) -> Result<CaptionTrack, TranscriptorError> {
    let manual = info["subtitles"].as_object();
    let automatic = info["automatic_captions"].as_object();

    let has_tracks = |map: Option<&serde_json::Map<String, Value>>| {
        map.map(|m| !m.is_empty()).unwrap_or(false)
    };
    if !has_tracks(manual) && !has_tracks(automatic) {
        return Err(TranscriptUnavailable::Disabled {
            video_id: video_id.to_string(),
        }
        .into());
    }

    let candidates = [(manual, false), (automatic, true)];
    let chosen = candidates
        .iter()
        .find_map(|(map, generated)| map.and_then(|m| m.get(language)).map(|f| (f, *generated)));

    let Some((formats, is_generated)) = chosen else {
        let mut available: Vec<String> = candidates
            .iter()
            .filter_map(|(map, _)| *map)
            .flat_map(|m| m.keys().cloned())
            .collect();
        available.sort();
        available.dedup();

        return Err(TranscriptUnavailable::NotInLanguage {
            video_id: video_id.to_string(),
            language: language.to_string(),
            available,
        }
        .into());
    };

    formats
        .as_array()
        .into_iter()
        .flatten()
        .find(|f| f["ext"].as_str() == Some(CAPTION_FORMAT))
        .and_then(|f| f["url"].as_str())
        .map(|url| CaptionTrack {
            url: url.to_string(),
            is_generated,
        })
        .ok_or_else(|| {
            TranscriptUnavailable::NoneAvailable {
                video_id: video_id.to_string(),
            }
            .into()
        })
}

/// Convert a `json3` caption payload into transcript segments
pub fn parse_json3(payload: &str) -> Result<Vec<TranscriptSegment>, TranscriptorError> {
    let captions: Json3Captions = serde_json::from_str(payload)
        .map_err(|e| TranscriptorError::Upstream(format!("invalid caption payload: {}", e)))?;

    let segments = captions
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs?.into_iter().map(|s| s.utf8).collect();
            if text.trim().is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                text,
                event.start_ms as f64 / 1000.0,
                event.duration_ms as f64 / 1000.0,
            ))
        })
        .collect();

    Ok(segments)
}
