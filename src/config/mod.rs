use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::batch::BatchRequest;
use crate::output::{CollisionPolicy, OutputFormat};
use crate::utils::normalize_language_code;

const CONFIG_FILE: &str = "config.yaml";
const HISTORY_FILE: &str = "recent_downloads.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where and how transcripts are written
    #[serde(default)]
    pub downloads: DownloadConfig,

    /// External tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Download history settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// File this configuration was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

/// Missing keys fall back to `DownloadConfig::default()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory transcripts are saved into
    pub save_directory: PathBuf,

    /// Default output format
    pub output_format: OutputFormat,

    /// Default transcript language (two-letter code)
    pub language: String,

    /// What to do when a transcript file already exists
    pub collision_policy: CollisionPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// yt-dlp executable name or path
    pub yt_dlp_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of remembered downloads
    pub limit: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            save_directory: PathBuf::from("downloads"),
            output_format: OutputFormat::Txt,
            language: "en".to_string(),
            collision_policy: CollisionPolicy::Skip,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { limit: 100 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            downloads: DownloadConfig::default(),
            tools: ToolsConfig::default(),
            history: HistoryConfig::default(),
            path: PathBuf::from(CONFIG_FILE),
        }
    }
}

/// One-run overrides coming from the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub save_directory: Option<PathBuf>,
    pub output_format: Option<OutputFormat>,
    pub language: Option<String>,
    pub collision_policy: Option<CollisionPolicy>,
}

impl Config {
    /// Load configuration from `explicit`, the default location, or create default
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        Self::load_from(&config_path).await
    }

    /// Load configuration from a specific file, writing defaults if it does not exist
    pub async fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs_err::read_to_string(config_path)
                .context("Failed to read config file")?;

            let mut config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.path = config_path.to_path_buf();
            config.validate()?;
            Ok(config)
        } else {
            let config = Self {
                path: config_path.to_path_buf(),
                ..Self::default()
            };
            config.save().await?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&self.path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("yt-scribe").join(CONFIG_FILE))
    }

    /// Download history file, stored next to the configuration
    pub fn history_path(&self) -> PathBuf {
        self.path
            .parent()
            .map(|dir| dir.join(HISTORY_FILE))
            .unwrap_or_else(|| PathBuf::from(HISTORY_FILE))
    }

    /// Validate configuration
    fn validate(&mut self) -> Result<()> {
        self.downloads.language = normalize_language_code(&self.downloads.language)
            .context("Invalid downloads.language in config file")?;

        if self.downloads.save_directory.as_os_str().is_empty() {
            anyhow::bail!("downloads.save_directory must not be empty");
        }

        if self.history.limit == 0 {
            anyhow::bail!("history.limit must be greater than zero");
        }

        Ok(())
    }

    /// Apply command-line overrides and persist them as the new defaults
    pub fn update_defaults(&mut self, overrides: Overrides) -> Result<bool> {
        let before = self.downloads.clone();

        if let Some(dir) = overrides.save_directory {
            self.downloads.save_directory = dir;
        }
        if let Some(format) = overrides.output_format {
            self.downloads.output_format = format;
        }
        if let Some(language) = overrides.language {
            self.downloads.language = normalize_language_code(&language)?;
        }
        if let Some(policy) = overrides.collision_policy {
            self.downloads.collision_policy = policy;
        }

        Ok(before != self.downloads)
    }

    /// Build the immutable request for one batch run
    pub fn batch_request(&self, source_url: &str, overrides: Overrides) -> Result<BatchRequest> {
        let language = match overrides.language {
            Some(language) => normalize_language_code(&language)?,
            None => self.downloads.language.clone(),
        };

        Ok(BatchRequest {
            source_url: source_url.trim().to_string(),
            output_format: overrides
                .output_format
                .unwrap_or(self.downloads.output_format),
            language,
            save_directory: overrides
                .save_directory
                .unwrap_or_else(|| self.downloads.save_directory.clone()),
            collision_policy: overrides
                .collision_policy
                .unwrap_or(self.downloads.collision_policy),
        })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration ({}):", self.path.display());
        println!("  Save Directory: {}", self.downloads.save_directory.display());
        println!("  Output Format: {}", self.downloads.output_format);
        println!("  Language: {}", self.downloads.language);
        println!("  If File Exists: {}", self.downloads.collision_policy);
        println!("  yt-dlp: {}", self.tools.yt_dlp_path);
        println!("  History Limit: {}", self.history.limit);
    }
}
