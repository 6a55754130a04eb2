//! Configuration persistence
//!
//! Stores user preferences in `~/.config/escape-lens/config.yaml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::escape::EscapeStyle;
use crate::preview::PreviewOptions;

/// Configuration that persists across runs
///
/// Every field has a default, so a partial file (or none) is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensConfig {
    /// Style for special characters the original literal never escaped
    #[serde(default = "default_style")]
    pub default_style: EscapeStyle,

    #[serde(default)]
    pub hover: PreviewOptions,

    /// Tag decoded content with a detected language
    #[serde(default = "default_true")]
    pub detect_language: bool,

    #[serde(default)]
    pub scratch: ScratchConfig,

    /// Command used to open scratch files; falls back to $VISUAL, $EDITOR, vi
    #[serde(default)]
    pub editor: Option<String>,
}

/// Where scratch files go and whether leftovers are swept at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScratchConfig {
    /// Directory for scratch files (system temp dir when unset)
    #[serde(default)]
    pub directory: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub cleanup_on_startup: bool,

    /// Leftover scratch files younger than this are assumed to be in use
    #[serde(default = "default_stale_after_hours")]
    pub stale_after_hours: u64,
}

impl ScratchConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_hours.saturating_mul(60 * 60))
    }
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            directory: None,
            cleanup_on_startup: true,
            stale_after_hours: default_stale_after_hours(),
        }
    }
}

fn default_stale_after_hours() -> u64 {
    24
}

fn default_style() -> EscapeStyle {
    EscapeStyle::Single
}

fn default_true() -> bool {
    true
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            default_style: default_style(),
            hover: PreviewOptions::default(),
            detect_language: true,
            scratch: ScratchConfig::default(),
            editor: None,
        }
    }
}

impl LensConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, or return defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Command to open scratch files with
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .filter(|cmd| !cmd.trim().is_empty())
            .or_else(|| std::env::var("VISUAL").ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| std::env::var("EDITOR").ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }
}
