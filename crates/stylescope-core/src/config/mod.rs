//! Configuration management for Stylescope.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file only
//! overrides what it names.

mod types;
mod validate;

pub use types::*;

use crate::classify::vocabulary::LabelVocabulary;
use crate::error::{ClassifyError, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Stylescope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Embedding model settings
    pub model: ModelConfig,

    /// Similarity scoring settings
    pub scoring: ScoringConfig,

    /// Style labels
    pub vocabulary: VocabularyConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Mock classifier settings
    pub mock: MockConfig,

    /// Sample image acquisition
    pub fetch: FetchConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.stylescope.stylescope/config.toml
    /// - Linux: ~/.config/stylescope/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\stylescope\config\config.toml
    ///
    /// Falls back to ~/.stylescope/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stylescope", "stylescope")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".stylescope").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.general.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Directory holding the files of the configured model.
    pub fn model_files_dir(&self) -> PathBuf {
        self.model_dir().join(&self.model.name)
    }

    /// Build the configured label vocabulary.
    pub fn label_vocabulary(&self) -> Result<LabelVocabulary, ClassifyError> {
        LabelVocabulary::new(self.vocabulary.labels.iter().map(String::as_str))
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.image_size, 224);
        assert_eq!(config.scoring.logit_scale, 100.0);
        assert_eq!(config.vocabulary.labels.len(), 8);
        assert_eq!(config.fetch.output_prefix, "local_image");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[scoring]"));
        assert!(toml.contains("goth style"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[scoring]\nlogit_scale = 1.0\n\n[vocabulary]\nlabels = [\"goth style\"]\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.scoring.logit_scale, 1.0);
        assert_eq!(config.vocabulary.labels, vec!["goth style"]);
        assert_eq!(config.model.name, "clip-vit-base-patch32");
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring]\nlogit_scale = -3.0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("logit_scale"));
    }

    #[test]
    fn test_default_label_vocabulary() {
        let vocab = Config::default().label_vocabulary().unwrap();
        assert_eq!(vocab.len(), 8);
        assert_eq!(vocab.get(1).unwrap().as_str(), "goth style");
    }

    #[test]
    fn test_model_files_dir() {
        let mut config = Config::default();
        config.general.model_dir = PathBuf::from("/opt/models");
        assert_eq!(
            config.model_files_dir(),
            PathBuf::from("/opt/models/clip-vit-base-patch32")
        );
    }
}
