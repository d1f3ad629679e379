//! # Core Module
//!
//! Shared abstractions used to start a program on the scene engine.
//!
//! ## Organization
//!
//! - **Config**: application-level configuration files (engine and scene)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{ApplicationConfig, Config, ConfigError, EngineConfig};
