//! # Application Configuration
//!
//! Top-level configuration files for programs built on the scene engine.
//! An [`ApplicationConfig`] pairs engine behaviour (logging, debug features)
//! with the initial [`SceneSettings`] of the display.
//!
//! Scene settings read from disk skip the validated setters, so loading
//! runs [`SceneSettings::validate`] and reports failures as
//! [`ConfigError::Invalid`].

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::render::Display;
use crate::scene::{SceneResult, SceneSettings};

/// # Engine Configuration
///
/// Logging and debug behaviour shared by the whole engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
        }
    }

    /// Set log level
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    #[must_use]
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Parsed log level filter
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// The main configuration structure applications should load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Initial scene settings
    pub scene: SceneSettings,
}

impl ApplicationConfig {
    /// Configuration with the given window title and defaults elsewhere
    pub fn new(title: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.scene.window_mut().title = title.into();
        config
    }

    /// Start the logger at the configured level
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        self.engine.level_filter()?;
        crate::foundation::logging::init_with_level(&self.engine.log_level);
        Ok(())
    }

    /// A hidden display using the configured scene settings
    pub fn display(&self) -> SceneResult<Display> {
        Display::with_settings(self.scene.clone())
    }
}

impl Config for ApplicationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.engine.level_filter()?;
        self.scene.validate()?;
        Ok(())
    }
}
