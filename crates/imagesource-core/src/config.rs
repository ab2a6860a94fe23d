//! Configuration for the shared execution context and thumbnail decoding.
//!
//! ```toml
//! [executor]
//! worker_threads = 4
//! thread_name = "imagesource-worker"
//!
//! [thumbnail]
//! fast_filter = "bilinear"
//! best_filter = "lanczos3"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{FilterPolicy, FilterType};

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub executor: ExecutorConfig,
    pub thumbnail: ThumbnailConfig,
}

/// Background worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Number of worker threads. 0 lets rayon pick one per CPU.
    pub worker_threads: usize,
    /// Prefix for worker thread names; the worker index is appended.
    pub thread_name: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            thread_name: "imagesource-worker".to_string(),
        }
    }
}

/// Resampling filters for thumbnails, per delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Used for `ImageDeliveryMode::Progressive`.
    pub fast_filter: FilterType,
    /// Used for `ImageDeliveryMode::Best`.
    pub best_filter: FilterType,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        let policy = FilterPolicy::default();
        Self {
            fast_filter: policy.progressive,
            best_filter: policy.best,
        }
    }
}

impl ThumbnailConfig {
    pub fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy {
            progressive: self.fast_filter,
            best: self.best_filter,
        }
    }
}

impl SourceConfig {
    /// Parse configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SourceConfig::from_toml_str("").unwrap();
        assert_eq!(config, SourceConfig::default());
        assert_eq!(config.executor.worker_threads, 0);
        assert_eq!(config.thumbnail.filter_policy(), FilterPolicy::default());
    }

    #[test]
    fn test_partial_config() {
        let config = SourceConfig::from_toml_str(
            r#"
            [executor]
            worker_threads = 3

            [thumbnail]
            best_filter = "nearest"
            "#,
        )
        .unwrap();

        assert_eq!(config.executor.worker_threads, 3);
        assert_eq!(config.executor.thread_name, "imagesource-worker");
        assert_eq!(config.thumbnail.fast_filter, FilterType::Bilinear);
        assert_eq!(config.thumbnail.best_filter, FilterType::Nearest);
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        let result = SourceConfig::from_toml_str("[thumbnail]\nfast_filter = \"cubic\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imagesource.toml");
        std::fs::write(&path, "[executor]\nthread_name = \"decode\"\n").unwrap();

        let config = SourceConfig::load(&path).unwrap();
        assert_eq!(config.executor.thread_name, "decode");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SourceConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
