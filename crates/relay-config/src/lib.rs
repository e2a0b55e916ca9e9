//! Depth relay configuration system
//!
//! Centralized configuration for the relay demos, loaded from `relay.toml`
//! with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the relay demos
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Experiment variant settings
    pub experiment: ExperimentConfig,
    /// Relay (depth visualization) target settings
    pub relay: RelaySectionConfig,
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Framebuffer width in pixels
    pub width: u32,
    /// Framebuffer height in pixels
    pub height: u32,
}

/// Experiment variant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Variant to run (single-target, manual-split, depth-probe, layered)
    pub variant: Option<String>,
    /// Keep the window open after the first frame instead of exiting
    pub keep_open: bool,
}

/// Relay target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySectionConfig {
    /// Color component type of the relay target (unorm8, half-float, float32)
    pub component: Option<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 250, height: 250 }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self { variant: None, keep_open: false }
    }
}

impl Default for RelaySectionConfig {
    fn default() -> Self {
        Self { component: None }
    }
}

impl RelayConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from the default location (relay.toml in the current
    /// directory) or return default configuration if the file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("relay.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(variant) = std::env::var("RELAY_VARIANT") {
            self.experiment.variant = Some(variant);
        }
        if let Ok(val) = std::env::var("RELAY_KEEP_OPEN") {
            self.experiment.keep_open = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Ok(component) = std::env::var("RELAY_COMPONENT") {
            self.relay.component = Some(component);
        }
        if let Ok(val) = std::env::var("RELAY_WIDTH") {
            if let Ok(width) = val.parse::<u32>() {
                self.window.width = width;
            }
        }
        if let Ok(val) = std::env::var("RELAY_HEIGHT") {
            if let Ok(height) = val.parse::<u32>() {
                self.window.height = height;
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from relay.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
