//! Simulator configuration file handling

use anyhow::{Context, Result};
use inertia_scroll::{FlickTiming, ScrollConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level simulator configuration (inertia.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InertiaConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

/// Geometry of the simulated scroll axis
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_view_len")]
    pub view_len: f64,
    #[serde(default = "default_content_len")]
    pub content_len: f64,
    /// Offset the run starts at (clamped into range)
    #[serde(default)]
    pub initial_offset: f64,
}

fn default_view_len() -> f64 {
    100.0
}

fn default_content_len() -> f64 {
    1000.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            view_len: default_view_len(),
            content_len: default_content_len(),
            initial_offset: 0.0,
        }
    }
}

impl InertiaConfig {
    /// Load configuration from a file, or `inertia.toml` inside a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join("inertia.toml")
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            anyhow::bail!("No config found at {}", config_path.display());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: InertiaConfig = toml::from_str(input)?;
        config.scroll.validate()?;
        if !(config.viewport.view_len.is_finite() && config.viewport.view_len >= 0.0) {
            anyhow::bail!("viewport.view_len must not be negative");
        }
        if !(config.viewport.content_len.is_finite() && config.viewport.content_len >= 0.0) {
            anyhow::bail!("viewport.content_len must not be negative");
        }
        Ok(config)
    }

    /// Swap in the flick timing of a platform preset
    pub fn with_timing(mut self, timing: FlickTiming) -> Self {
        self.scroll.timing = timing;
        self
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = InertiaConfig::from_toml_str("").unwrap();
        assert_eq!(config.viewport.view_len, 100.0);
        assert_eq!(config.viewport.content_len, 1000.0);
        assert_eq!(config.scroll, ScrollConfig::default());
    }

    #[test]
    fn test_partial_tables() {
        let config = InertiaConfig::from_toml_str(
            r#"
            [viewport]
            content_len = 5000.0
            initial_offset = 250.0

            [scroll]
            use_bounce = false

            [scroll.timing]
            max_gesture_ms = 300.0
            "#,
        )
        .unwrap();

        assert_eq!(config.viewport.view_len, 100.0);
        assert_eq!(config.viewport.content_len, 5000.0);
        assert_eq!(config.viewport.initial_offset, 250.0);
        assert!(!config.scroll.use_bounce);
        assert_eq!(config.scroll.timing.max_gesture_ms, 300.0);
        assert_eq!(config.scroll.timing.sample_window_ms, 300.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(InertiaConfig::from_toml_str("[scroll]\nbounce_speed = 0.5").is_err());
        assert!(InertiaConfig::from_toml_str("[viewport]\nview_len = -1.0").is_err());
        assert!(InertiaConfig::from_toml_str("[viewport\n").is_err());
    }

    #[test]
    fn test_with_timing_keeps_geometry() {
        let config = InertiaConfig::default().with_timing(FlickTiming::ios());
        assert_eq!(config.scroll.timing, FlickTiming::ios());
        assert_eq!(config.viewport.content_len, 1000.0);
    }

    #[test]
    fn test_toml_output_reloads() {
        let mut config = InertiaConfig::default();
        config.viewport.initial_offset = 40.0;
        config.scroll.fps = 120.0;

        let text = config.to_toml().unwrap();
        let reloaded = InertiaConfig::from_toml_str(&text).unwrap();
        assert_eq!(reloaded.viewport.initial_offset, 40.0);
        assert_eq!(reloaded.scroll, config.scroll);
    }
}
