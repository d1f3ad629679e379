//! # Scene Module
//!
//! Everything the application manipulates directly: the validated scene
//! configuration, the renderable objects and their shared base types, the
//! per-frame view snapshot handed to primitives, and the extent accumulator
//! used by autoscale/autocenter.
//!
//! ## Organization
//!
//! - **Settings**: configuration surface with validated setters
//! - **Renderable**: common base (colour, opacity, material, visibility)
//! - **Primitive**: position/axis/up plus the model-to-world transform
//! - **Shapes**: concrete primitives (sphere, box, cylinder, cone, ...)
//! - **Frame / Label / Light**: composites, screen-space text, light sources
//! - **View / LOD / Extent**: per-frame view state and the policies built on it

use thiserror::Error;

pub mod color;
pub mod extent;
pub mod frame;
pub mod label;
pub mod light;
pub mod lod;
pub mod primitive;
pub mod renderable;
pub mod settings;
pub mod shapes;
pub mod view;

pub use color::{Material, Rgb};
pub use extent::Extent;
pub use frame::Frame;
pub use label::{Label, ScreenObject};
pub use light::Light;
pub use lod::LodTable;
pub use primitive::{Orientation, Primitive, PrimitiveBase};
pub use renderable::{share, Renderable, RenderableCore, SharedRenderable, WeakRenderable};
pub use settings::{SceneSettings, WindowSettings};
pub use shapes::{Arrow, BoxShape, Cone, Cylinder, Ellipsoid, Pyramid, Ring, Sphere};
pub use view::ViewState;

/// Configuration errors raised synchronously by property setters
///
/// These are user-visible and fail fast: nothing is clamped silently
/// except where a setter documents it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A direction was given as the zero vector
    #[error("{property} must not be the zero vector")]
    ZeroVector {
        /// Name of the rejected property
        property: &'static str,
    },

    /// Field of view outside the open interval (0, π)
    #[error("fov must lie strictly between 0 and pi radians, got {0}")]
    FovOutOfRange(f64),

    /// Negative dimension on a primitive
    #[error("{property} cannot be negative, got {value}")]
    NegativeDimension {
        /// Name of the rejected dimension
        property: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Zero, negative or non-finite component in a scale or range vector
    #[error("{property} components must be positive and finite, got {value}")]
    InvalidComponent {
        /// Name of the rejected property
        property: &'static str,
        /// First offending component
        value: f64,
    },

    /// Unknown stereo mode name
    #[error("Invalid stereo mode: '{0}'")]
    InvalidStereoMode(String),

    /// LOD bias outside [-6, 0]
    #[error("lod_adjust must lie in [-6, 0], got {0}")]
    LodAdjustOutOfRange(i32),

    /// Any other out-of-range scalar (opacity, colour channel, user scale)
    #[error("Invalid {property}: {value}")]
    InvalidValue {
        /// Name of the rejected property
        property: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Window-bound property changed while the display is visible
    #[error("Cannot change {0} while the display is visible")]
    WindowPropertyLocked(&'static str),
}

/// Result type for scene configuration operations
pub type SceneResult<T> = Result<T, SceneError>;
