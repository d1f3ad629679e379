//! Per-frame view snapshot
//!
//! Built by the display before each eye pass and handed to every renderable.
//! Holds the true (unscaled) camera position, the global scale factor and
//! the render-time flags primitives need for LOD and colour selection.

use super::color::Rgb;
use super::label::ScreenObject;
use crate::foundation::math::{Tmatrix, Vector, VectorExt};

/// Camera and frame parameters visible to renderables
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Camera position in world coordinates
    pub camera: Vector,
    /// Unit viewing direction
    pub forward: Vector,
    /// Scene center in world coordinates
    pub center: Vector,
    /// Up direction
    pub up: Vector,
    /// Eye viewport width in pixels
    pub view_width: f64,
    /// Eye viewport height in pixels
    pub view_height: f64,
    /// Global scale factor from world units to render units
    pub gcf: f64,
    /// Per-axis scale factors; equal to `gcf` on every axis when uniform
    pub gcfvec: Vector,
    /// LOD bias added to every selected level
    pub lod_adjust: i32,
    /// Draw in grey for two-colour anaglyph passes
    pub anaglyph: bool,
    /// With `anaglyph`, draw desaturated rather than grey
    pub coloranaglyph: bool,
    /// Tangent of the horizontal half field of view
    pub tan_hfov_x: f64,
    /// Tangent of the vertical half field of view
    pub tan_hfov_y: f64,
    /// Screen-space objects queued during this pass
    pub screen_objects: Vec<ScreenObject>,
}

impl ViewState {
    /// Snapshot with identity scaling and no stereo
    pub fn new(forward: Vector, center: Vector, up: Vector, view_width: f64, view_height: f64) -> Self {
        Self {
            camera: Vector::zeros(),
            forward: forward.unit_or_zero(),
            center,
            up,
            view_width,
            view_height,
            gcf: 1.0,
            gcfvec: Vector::repeat(1.0),
            lod_adjust: 0,
            anaglyph: false,
            coloranaglyph: false,
            tan_hfov_x: 1.0,
            tan_hfov_y: 1.0,
            screen_objects: Vec::new(),
        }
    }

    /// Projected size, in pixels, of a sphere of `radius` centered at `pos`
    ///
    /// Negative when the point is behind the camera.
    #[allow(clippy::float_cmp)]
    pub fn pixel_coverage(&self, pos: &Vector, radius: f64) -> f64 {
        let dist = (pos - self.camera).dot(&self.forward);
        let half_width = self.tan_hfov_x * dist;
        let fraction = if half_width == 0.0 {
            1.0
        } else {
            radius / half_width
        };
        fraction * self.view_width
    }

    /// Colour to draw with in the current pass
    pub fn effective_color(&self, color: Rgb) -> Rgb {
        match (self.anaglyph, self.coloranaglyph) {
            (false, _) => color,
            (true, false) => color.grayscale(),
            (true, true) => color.desaturate(),
        }
    }

    /// Queue a screen-space object for the end of the pass
    pub fn queue_screen_object(&mut self, object: ScreenObject) {
        self.screen_objects.push(object);
    }

    /// The same view expressed in the coordinate system of a child frame
    ///
    /// `world_to_local` maps world points into the frame's local space.
    pub fn localized(&self, world_to_local: &Tmatrix) -> Self {
        Self {
            camera: world_to_local.project(&self.camera),
            forward: world_to_local.times_v(&self.forward).unit_or_zero(),
            center: world_to_local.project(&self.center),
            up: world_to_local.times_v(&self.up),
            screen_objects: Vec::new(),
            ..self.clone()
        }
    }
}
