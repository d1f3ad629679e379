//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Vector and affine matrix math
//! - Logging bootstrap

pub mod math;
pub mod logging;
