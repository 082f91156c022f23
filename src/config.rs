//! Configuration management for changeview
//!
//! This module provides configuration structures and defaults for the
//! repository watcher, the diff cache and the filtered view.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::diff::{DiffAlgorithmType, DiffLimits};

/// Global configuration for changeview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeViewConfig {
    /// Repository watcher configuration
    pub watcher: WatcherConfig,
    /// Diff cache configuration
    pub cache: CacheConfig,
    /// Filtered view configuration
    pub view: ViewConfig,
}

/// Configuration for repository watching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Quiet period after the last filesystem event before a refresh
    pub event_debounce_ms: u64,
}

/// Configuration for diff computation and caching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Diffs above this size are flagged as large but still searchable
    pub large_diff_bytes: usize,
    /// Diffs above this size are not parsed at all
    pub max_diff_bytes: usize,
    /// Context lines around changes in generated diffs of untracked files
    pub context_lines: usize,
    /// Algorithm used for generated diffs of untracked files
    pub algorithm: DiffAlgorithmType,
}

/// Configuration for the filtered view and its output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Initial path filter
    pub path_filter: String,
    /// Initial diff content filter
    pub content_filter: String,
    /// Show each file's diff under it in text output (0 disables)
    pub diff_preview_lines: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            event_debounce_ms: 100,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        let limits = DiffLimits::default();
        Self {
            large_diff_bytes: limits.large_diff_bytes,
            max_diff_bytes: limits.max_diff_bytes,
            context_lines: 3,
            algorithm: DiffAlgorithmType::default(),
        }
    }
}

impl WatcherConfig {
    /// Get event debounce duration
    pub fn event_debounce_duration(&self) -> Duration {
        Duration::from_millis(self.event_debounce_ms)
    }
}

impl CacheConfig {
    pub fn diff_limits(&self) -> DiffLimits {
        DiffLimits {
            large_diff_bytes: self.large_diff_bytes,
            max_diff_bytes: self.max_diff_bytes,
        }
    }
}

/// Configuration loading and management
impl ChangeViewConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` when given, then apply environment overrides
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("CHANGEVIEW_EVENT_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.watcher.event_debounce_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("CHANGEVIEW_LARGE_DIFF_BYTES") {
            if let Ok(bytes) = val.parse::<usize>() {
                self.cache.large_diff_bytes = bytes;
            }
        }

        if let Ok(val) = std::env::var("CHANGEVIEW_MAX_DIFF_BYTES") {
            if let Ok(bytes) = val.parse::<usize>() {
                self.cache.max_diff_bytes = bytes;
            }
        }

        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.cache.max_diff_bytes == 0 {
            return Err("max_diff_bytes must be greater than 0".to_string());
        }

        if self.cache.large_diff_bytes > self.cache.max_diff_bytes {
            return Err("large_diff_bytes must not exceed max_diff_bytes".to_string());
        }

        Ok(())
    }
}
