use crate::extractors::TranscriptSegment;
use crate::TranscriptorError;

/// Split seconds into (hours, minutes, seconds, milliseconds), rounding to the millisecond
fn split_timestamp(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    (hours, minutes, secs, millis)
}

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`)
pub fn format_srt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_timestamp(seconds);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Format seconds as a WebVTT timestamp (`HH:MM:SS.mmm`)
pub fn format_vtt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_timestamp(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}

/// Cue payload: trimmed, without blank lines that would end the cue early
fn cue_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain text: all segment texts on one line, whitespace collapsed
pub fn format_as_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .flat_map(|segment| segment.text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pretty JSON array of segments, non-ASCII kept literal
pub fn format_as_json(segments: &[TranscriptSegment]) -> Result<String, TranscriptorError> {
    use serde::Serialize;

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    segments
        .serialize(&mut serializer)
        .map_err(|e| TranscriptorError::Encoding(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| TranscriptorError::Encoding(e.to_string()))
}

/// SubRip: numbered cues separated by a blank line
pub fn format_as_srt(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_srt_timestamp(segment.start),
                format_srt_timestamp(segment.end()),
                cue_text(&segment.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// WebVTT: `WEBVTT` header followed by unnumbered cues
pub fn format_as_vtt(segments: &[TranscriptSegment]) -> String {
    let mut output = String::from("WEBVTT\n");

    for segment in segments {
        output.push('\n');
        output.push_str(&format!(
            "{} --> {}\n{}\n",
            format_vtt_timestamp(segment.start),
            format_vtt_timestamp(segment.end()),
            cue_text(&segment.text)
        ));
    }

    output
}
