//! # Render Module
//!
//! Turns a scene into backend commands each frame. The display owns the
//! object layers and the camera; the backend is an abstract immediate-mode
//! device that the host application provides.
//!
//! ## Frame Flow
//!
//! 1. Prune dropped objects and recompute the scene extent (once per frame)
//! 2. Plan the stereo eye passes for the active mode
//! 3. Per eye: derive the projection and modelview, draw the opaque layer,
//!    depth-sort and draw the translucent layer, then screen objects
//! 4. Query the backend for deferred errors
//!
//! Picking reuses the same per-eye transform with a pick-region prefix and
//! decodes the backend's selection buffer.

use thiserror::Error;

use crate::scene::SceneError;

pub mod backend;
pub mod camera;
pub mod display;
pub mod layers;
pub mod pick;
pub mod shapes;
pub mod stereo;

#[cfg(test)]
pub mod testing;

pub use backend::{
    BackendResult, ColorMask, DisplayList, DrawBuffer, LightSource, RenderBackend,
    SelectionBuffer, Viewport,
};
pub use camera::{tan_hfov, Camera, PickRegion, ViewTransform};
pub use display::Display;
pub use layers::Layers;
pub use pick::{HitRecord, PickEngine, PickResult};
pub use shapes::{DrawContext, ShapeKind, ShapeLibrary};
pub use stereo::{Clear, EyePass, StereoMode};

/// High-level rendering error types
///
/// Raised by the frame loop and by picking. Backend failures are carried
/// as strings so the core stays independent of any graphics API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The derived projection has no valid volume
    ///
    /// Occurs when the clip planes or field-of-view tangents come out
    /// non-positive or non-finite, typically because the scene scale
    /// overflowed. The frame is aborted without drawing.
    #[error(
        "Degenerate projection: near={near}, far={far}, tan_hfov=({tan_hfov_x}, {tan_hfov_y})"
    )]
    DegenerateProjection {
        /// Near clip distance
        near: f64,
        /// Far clip distance
        far: f64,
        /// Horizontal half-angle tangent
        tan_hfov_x: f64,
        /// Vertical half-angle tangent
        tan_hfov_y: f64,
    },

    /// The selection buffer was too small for the hits reported
    ///
    /// Returned instead of reading past the end of the buffer.
    #[error("Pick hit buffer of {capacity} words overflowed")]
    PickBufferOverflow {
        /// Words allocated for the pass
        capacity: usize,
    },

    /// Backend resource allocation failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend reported an error after a frame or pick
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Invalid scene configuration discovered while rendering
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
