//! # Scene Engine
//!
//! A retained-mode scene layer over an immediate-mode graphics backend.
//!
//! ## Features
//!
//! - **Camera Derivation**: automatic range and centering, clip planes and
//!   stereo eye offsets computed from a logical scene description
//! - **Primitives**: spheres, boxes, cylinders, cones, rings, pyramids,
//!   ellipsoids, arrows, labels and composite frames
//! - **Level of Detail**: per-shape tessellation levels chosen from
//!   projected pixel coverage
//! - **Translucency**: stable back-to-front sorting of translucent objects
//! - **Picking**: selection-buffer decoding with nested frame names
//! - **Stereo**: active, anaglyph and side-by-side modes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn frame(backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
//!     let mut display = Display::new();
//!     let ball = share(Sphere::new(Vector::new(0.0, 0.0, 0.0), 1.0)?);
//!     display.add(&ball);
//!     display.show();
//!     display.render(backend)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::{ApplicationConfig, Config, ConfigError, EngineConfig},
        foundation::math::{Tmatrix, Vector, VectorExt},
        render::{
            Display, PickResult, RenderBackend, RenderError, RenderResult, StereoMode,
        },
        scene::{
            share, Arrow, BoxShape, Cone, Cylinder, Ellipsoid, Frame, Label, Light, Material,
            Pyramid, Renderable, Rgb, Ring, SceneError, SceneResult, SceneSettings,
            SharedRenderable, Sphere,
        },
    };
}
