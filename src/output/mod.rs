use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::extractors::Transcript;
use crate::TranscriptorError;

pub mod collision;
pub mod formatters;

pub use collision::{resolve_path, CollisionPolicy};
pub use formatters::*;

/// Output encodings a batch can produce
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text
    #[default]
    Txt,
    /// JSON array of timed segments
    Json,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
}

impl OutputFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
        }
    }

    /// Encode a transcript in this format
    pub fn encode(&self, transcript: &Transcript) -> Result<String, TranscriptorError> {
        let segments = &transcript.segments;
        let content = match self {
            OutputFormat::Txt => format_as_text(segments),
            OutputFormat::Json => format_as_json(segments)?,
            OutputFormat::Srt => format_as_srt(segments),
            OutputFormat::Vtt => format_as_vtt(segments),
        };

        Ok(content)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encode a transcript and write it to `path`
pub fn save_to_file(
    transcript: &Transcript,
    path: &Path,
    format: OutputFormat,
) -> Result<(), TranscriptorError> {
    let content = format.encode(transcript)?;

    fs_err::write(path, content)?;
    tracing::debug!("Wrote {} transcript to {}", format, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::TranscriptSegment;

    #[test]
    fn test_save_to_file_writes_encoded_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.vtt");
        let transcript = Transcript {
            language: "en".to_string(),
            is_generated: false,
            segments: vec![TranscriptSegment::new("hi", 0.0, 1.0)],
        };

        save_to_file(&transcript, &path, OutputFormat::Vtt).unwrap();

        let written = fs_err::read_to_string(&path).unwrap();
        assert_eq!(written, "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nhi\n");
    }

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormat::Txt.extension(), "txt");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(
            OutputFormat::from_str("srt", true).unwrap(),
            OutputFormat::Srt
        );
    }
}
