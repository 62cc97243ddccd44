use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::batch::{OutcomeStatus, ProcessingOutcome};

/// One successfully downloaded transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub url: String,
    pub file_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_at: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    /// Build an entry from a successful outcome; other outcomes are not recorded
    pub fn from_outcome(outcome: &ProcessingOutcome) -> Option<Self> {
        match &outcome.status {
            OutcomeStatus::Success { path } => Some(Self {
                title: outcome.video.title.clone(),
                url: outcome.video.url.clone(),
                file_path: path.clone(),
                downloaded_at: Some(Utc::now()),
            }),
            _ => None,
        }
    }
}

/// Recent downloads, newest first, persisted as JSON
#[derive(Debug)]
pub struct History {
    path: PathBuf,
    limit: usize,
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Load history from `path`; a missing file is an empty history
    pub fn load(path: &Path, limit: usize) -> Result<Self> {
        let entries = if path.exists() {
            let content = fs_err::read_to_string(path)
                .context("Failed to read download history")?;
            serde_json::from_str(&content)
                .context("Failed to parse download history")?
        } else {
            Vec::new()
        };

        let mut history = Self {
            path: path.to_path_buf(),
            limit,
            entries,
        };
        history.entries.truncate(limit);
        Ok(history)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Add an entry at the front, dropping the oldest beyond the limit
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Save history to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize download history")?;

        fs_err::write(&self.path, content)
            .context("Failed to write download history")?;

        Ok(())
    }
}
