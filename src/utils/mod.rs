use anyhow::Result;

/// Characters no filesystem we target accepts in a file name
const RESERVED_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Turn a video title into a lowercase, underscore-delimited file stem.
///
/// Reserved path characters are dropped, then anything that is not a word character,
/// whitespace or a hyphen; runs of whitespace and hyphens become a single underscore.
/// Never fails: a title with nothing usable yields an empty string.
pub fn sanitize_title(title: &str) -> String {
    let lowered = title.to_lowercase();

    let kept = lowered
        .chars()
        .filter(|c| !RESERVED_CHARS.contains(c))
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace());

    let mut stem = String::with_capacity(lowered.len());
    let mut in_gap = false;
    for c in kept {
        if c == '-' || c.is_whitespace() {
            if !in_gap {
                stem.push('_');
                in_gap = true;
            }
        } else {
            stem.push(c);
            in_gap = false;
        }
    }

    stem.trim().to_string()
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Validate a two-letter language code and return it lowercased
pub fn normalize_language_code(lang: &str) -> Result<String> {
    let lang = lang.trim();
    if lang.len() != 2 || !lang.chars().all(|c| c.is_ascii_alphabetic()) {
        anyhow::bail!("Language must be a two-letter code such as 'en', got '{}'", lang);
    }

    Ok(lang.to_ascii_lowercase())
}

/// Shorten a title for list display
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }

    let keep = max_chars.saturating_sub(3);
    format!("{}...", title.chars().take(keep).collect::<String>())
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!(
            "{} - required for video metadata, playlists and captions",
            yt_dlp_path
        ));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
