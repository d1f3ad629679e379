//! Scene configuration
//!
//! `SceneSettings` holds every user-tunable camera and display parameter.
//! Fields are private so that each change goes through a validated setter;
//! a whole settings value loaded from disk is checked with [`SceneSettings::validate`].
//!
//! Setting an explicit range switches autoscale off. Clearing the range (or
//! turning autoscale back on) returns to automatic sizing.

use serde::{Deserialize, Serialize};

use super::color::Rgb;
use super::{SceneError, SceneResult};
use crate::foundation::math::{constants::PI, Vector, VectorExt};
use crate::render::stereo::StereoMode;

/// Lowest accepted LOD bias
pub const MIN_LOD_ADJUST: i32 = -6;

/// Highest accepted LOD bias
pub const MAX_LOD_ADJUST: i32 = 0;

/// Window-bound display properties
///
/// These can only change while the display is hidden; see
/// [`crate::render::Display`] for the locking setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window title
    pub title: String,
    /// Window x position in pixels
    pub x: i32,
    /// Window y position in pixels
    pub y: i32,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Whether the window covers the whole screen
    pub fullscreen: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Scene".to_string(),
            x: 0,
            y: 0,
            width: 640,
            height: 480,
            fullscreen: false,
        }
    }
}

/// Camera, scaling and display configuration for one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    center: Vector,
    forward: Vector,
    up: Vector,
    fov: f64,
    range: Vector,
    autoscale: bool,
    autocenter: bool,
    uniform: bool,
    lod_adjust: i32,
    stereo_mode: StereoMode,
    stereo_depth: f64,
    background: Rgb,
    foreground: Rgb,
    ambient: Rgb,
    user_scale: f64,
    window: WindowSettings,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            center: Vector::zeros(),
            forward: Vector::new(0.0, 0.0, -1.0),
            up: Vector::new(0.0, 1.0, 0.0),
            fov: PI / 3.0,
            range: Vector::zeros(),
            autoscale: true,
            autocenter: false,
            uniform: true,
            lod_adjust: 0,
            stereo_mode: StereoMode::NoStereo,
            stereo_depth: 0.0,
            background: Rgb::BLACK,
            foreground: Rgb::WHITE,
            ambient: Rgb::gray(0.2),
            user_scale: 1.0,
            window: WindowSettings::default(),
        }
    }
}

fn nonzero_direction(value: Vector, property: &'static str) -> SceneResult<Vector> {
    if value == Vector::zeros() || !value.iter().all(|c| c.is_finite()) {
        return Err(SceneError::ZeroVector { property });
    }
    Ok(value)
}

fn positive_components(value: &Vector, property: &'static str) -> SceneResult<()> {
    match value.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
        Some(bad) => Err(SceneError::InvalidComponent {
            property,
            value: *bad,
        }),
        None => Ok(()),
    }
}

impl SceneSettings {
    /// Create settings with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the camera looks at
    pub const fn center(&self) -> Vector {
        self.center
    }

    /// Set the point the camera looks at
    pub fn set_center(&mut self, center: Vector) -> SceneResult<()> {
        if !center.iter().all(|c| c.is_finite()) {
            return Err(SceneError::InvalidValue {
                property: "center",
                value: center.x + center.y + center.z,
            });
        }
        log::trace!("Scene center set to {center:?}");
        self.center = center;
        Ok(())
    }

    /// Autocenter update; bypasses validation since the extent is always finite
    pub(crate) fn recenter(&mut self, center: Vector) {
        self.center = center;
    }

    /// Viewing direction
    pub const fn forward(&self) -> Vector {
        self.forward
    }

    /// Set the viewing direction; the zero vector is rejected
    pub fn set_forward(&mut self, forward: Vector) -> SceneResult<()> {
        self.forward = nonzero_direction(forward, "forward")?;
        Ok(())
    }

    /// Up direction
    pub const fn up(&self) -> Vector {
        self.up
    }

    /// Set the up direction; the zero vector is rejected
    pub fn set_up(&mut self, up: Vector) -> SceneResult<()> {
        self.up = nonzero_direction(up, "up")?;
        Ok(())
    }

    /// Field of view in radians
    pub const fn fov(&self) -> f64 {
        self.fov
    }

    /// Set the field of view; must lie strictly between 0 and π
    pub fn set_fov(&mut self, fov: f64) -> SceneResult<()> {
        if !(fov > 0.0 && fov < PI) {
            return Err(SceneError::FovOutOfRange(fov));
        }
        self.fov = fov;
        Ok(())
    }

    /// Explicit half-size of the visible region; zero means automatic
    pub const fn range(&self) -> Vector {
        self.range
    }

    /// Whether an explicit range is in effect
    pub fn has_explicit_range(&self) -> bool {
        self.range != Vector::zeros()
    }

    /// Set an explicit range and turn autoscale off
    ///
    /// The zero vector restores automatic sizing. Any other value must have
    /// every component positive.
    pub fn set_range(&mut self, range: Vector) -> SceneResult<()> {
        if range == Vector::zeros() {
            self.clear_range();
            return Ok(());
        }
        positive_components(&range, "range")?;
        log::debug!("Explicit range {range:?}, autoscale disabled");
        self.range = range;
        self.autoscale = false;
        Ok(())
    }

    /// Set the same explicit range on every axis
    pub fn set_range_uniform(&mut self, range: f64) -> SceneResult<()> {
        self.set_range(Vector::repeat(range))
    }

    /// Reciprocal of the range
    pub fn scale(&self) -> Vector {
        if self.has_explicit_range() {
            self.range.map(|r| 1.0 / r)
        } else {
            Vector::zeros()
        }
    }

    /// Set the range as its reciprocal; every component must be positive
    pub fn set_scale(&mut self, scale: Vector) -> SceneResult<()> {
        positive_components(&scale, "scale")?;
        self.set_range(scale.map(|s| 1.0 / s))
    }

    /// Return to automatic range selection
    pub fn clear_range(&mut self) {
        self.range = Vector::zeros();
        self.autoscale = true;
    }

    /// Whether the range tracks the scene extent
    pub const fn autoscale(&self) -> bool {
        self.autoscale
    }

    /// Enable or disable autoscale; enabling discards any explicit range
    pub fn set_autoscale(&mut self, autoscale: bool) {
        if autoscale {
            self.range = Vector::zeros();
        }
        self.autoscale = autoscale;
    }

    /// Whether the center tracks the scene extent
    pub const fn autocenter(&self) -> bool {
        self.autocenter
    }

    /// Enable or disable autocenter
    pub fn set_autocenter(&mut self, autocenter: bool) {
        self.autocenter = autocenter;
    }

    /// Whether all axes share one scale factor
    pub const fn uniform(&self) -> bool {
        self.uniform
    }

    /// Enable or disable uniform scaling
    pub fn set_uniform(&mut self, uniform: bool) {
        self.uniform = uniform;
    }

    /// LOD bias added to every selected level
    pub const fn lod_adjust(&self) -> i32 {
        self.lod_adjust
    }

    /// Set the LOD bias; accepted range is [-6, 0]
    pub fn set_lod_adjust(&mut self, lod_adjust: i32) -> SceneResult<()> {
        if !(MIN_LOD_ADJUST..=MAX_LOD_ADJUST).contains(&lod_adjust) {
            return Err(SceneError::LodAdjustOutOfRange(lod_adjust));
        }
        self.lod_adjust = lod_adjust;
        Ok(())
    }

    /// Active stereo mode
    pub const fn stereo_mode(&self) -> StereoMode {
        self.stereo_mode
    }

    /// Select a stereo mode
    pub fn set_stereo_mode(&mut self, mode: StereoMode) {
        log::info!("Stereo mode set to {mode}");
        self.stereo_mode = mode;
    }

    /// Select a stereo mode by name; unknown names are rejected
    pub fn set_stereo_mode_name(&mut self, name: &str) -> SceneResult<()> {
        let mode = name.parse()?;
        self.set_stereo_mode(mode);
        Ok(())
    }

    /// Extra focal distance for stereo separation
    pub const fn stereo_depth(&self) -> f64 {
        self.stereo_depth
    }

    /// Set the stereo depth; must be finite and non-negative
    pub fn set_stereo_depth(&mut self, depth: f64) -> SceneResult<()> {
        if !(depth.is_finite() && depth >= 0.0) {
            return Err(SceneError::InvalidValue {
                property: "stereo_depth",
                value: depth,
            });
        }
        self.stereo_depth = depth;
        Ok(())
    }

    /// Clear colour
    pub const fn background(&self) -> Rgb {
        self.background
    }

    /// Set the clear colour
    pub fn set_background(&mut self, color: Rgb) -> SceneResult<()> {
        color.validate("background")?;
        self.background = color;
        Ok(())
    }

    /// Default colour for new objects
    pub const fn foreground(&self) -> Rgb {
        self.foreground
    }

    /// Set the default object colour
    pub fn set_foreground(&mut self, color: Rgb) -> SceneResult<()> {
        color.validate("foreground")?;
        self.foreground = color;
        Ok(())
    }

    /// Ambient light colour
    pub const fn ambient(&self) -> Rgb {
        self.ambient
    }

    /// Set the ambient light colour
    pub fn set_ambient(&mut self, color: Rgb) -> SceneResult<()> {
        color.validate("ambient")?;
        self.ambient = color;
        Ok(())
    }

    /// Interactive zoom multiplier on the camera distance
    pub const fn user_scale(&self) -> f64 {
        self.user_scale
    }

    /// Set the zoom multiplier; must be finite and positive
    pub fn set_user_scale(&mut self, user_scale: f64) -> SceneResult<()> {
        if !(user_scale.is_finite() && user_scale > 0.0) {
            return Err(SceneError::InvalidValue {
                property: "user_scale",
                value: user_scale,
            });
        }
        self.user_scale = user_scale;
        Ok(())
    }

    /// Window-bound properties
    pub const fn window(&self) -> &WindowSettings {
        &self.window
    }

    pub(crate) fn window_mut(&mut self) -> &mut WindowSettings {
        &mut self.window
    }

    /// Check every field against its setter's rules
    ///
    /// Used after deserialization, which bypasses the setters.
    pub fn validate(&self) -> SceneResult<()> {
        if !self.center.iter().all(|c| c.is_finite()) {
            return Err(SceneError::InvalidValue {
                property: "center",
                value: self.center.mag(),
            });
        }
        nonzero_direction(self.forward, "forward")?;
        nonzero_direction(self.up, "up")?;
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(SceneError::FovOutOfRange(self.fov));
        }
        if self.has_explicit_range() {
            positive_components(&self.range, "range")?;
        }
        if !(MIN_LOD_ADJUST..=MAX_LOD_ADJUST).contains(&self.lod_adjust) {
            return Err(SceneError::LodAdjustOutOfRange(self.lod_adjust));
        }
        if !(self.stereo_depth.is_finite() && self.stereo_depth >= 0.0) {
            return Err(SceneError::InvalidValue {
                property: "stereo_depth",
                value: self.stereo_depth,
            });
        }
        self.background.validate("background")?;
        self.foreground.validate("foreground")?;
        self.ambient.validate("ambient")?;
        if !(self.user_scale.is_finite() && self.user_scale > 0.0) {
            return Err(SceneError::InvalidValue {
                property: "user_scale",
                value: self.user_scale,
            });
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(SceneError::InvalidValue {
                property: "window size",
                value: f64::from(self.window.width.min(self.window.height)),
            });
        }
        Ok(())
    }

    /// Builder-style center
    #[must_use]
    pub fn with_center(mut self, center: Vector) -> Self {
        self.center = center;
        self
    }

    /// Builder-style autocenter
    #[must_use]
    pub const fn with_autocenter(mut self, autocenter: bool) -> Self {
        self.autocenter = autocenter;
        self
    }

    /// Builder-style window size
    #[must_use]
    pub const fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Builder-style stereo mode
    #[must_use]
    pub const fn with_stereo_mode(mut self, mode: StereoMode) -> Self {
        self.stereo_mode = mode;
        self
    }
}
