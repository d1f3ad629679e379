//! Position/axis/up base shared by every positioned shape
//!
//! ## Design
//!
//! A primitive's local frame has its x axis along `axis`, its y axis as close
//! to the scene-supplied `up` as orthogonality allows, and z completing a
//! right-handed basis. `model_world_transform` builds that frame, places it
//! at `pos` and applies the shape's own scale, all multiplied by the global
//! scale factor so the result lands in render units.

use super::renderable::{Renderable, RenderableCore};
use super::view::ViewState;
use super::lod::LodTable;
use super::{SceneError, SceneResult};
use crate::foundation::math::{rotation_about, Tmatrix, Vector, VectorExt};

/// |cos| between axis and up beyond which `up` is replaced for the basis
const UP_PARALLEL_THRESHOLD: f64 = 0.98;

/// Resulting axis and up after an orientation change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// New axis
    pub axis: Vector,
    /// New up
    pub up: Vector,
}

/// Placement shared by positioned shapes
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveBase {
    /// Colour, opacity, material and visibility
    pub core: RenderableCore,
    pos: Vector,
    axis: Vector,
    up: Vector,
}

impl Default for PrimitiveBase {
    fn default() -> Self {
        Self {
            core: RenderableCore::default(),
            pos: Vector::zeros(),
            axis: Vector::new(1.0, 0.0, 0.0),
            up: Vector::new(0.0, 1.0, 0.0),
        }
    }
}

impl PrimitiveBase {
    /// Base at `pos` with the default axis and up
    pub fn at(pos: Vector) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }

    /// Position in world coordinates
    pub const fn pos(&self) -> Vector {
        self.pos
    }

    /// Move the primitive
    pub fn set_pos(&mut self, pos: Vector) {
        self.pos = pos;
    }

    /// Axis; its length is significant for some shapes
    pub const fn axis(&self) -> Vector {
        self.axis
    }

    /// Replace the axis without touching `up`
    ///
    /// A zero axis is accepted and makes axis-dependent shapes degenerate.
    pub fn set_axis(&mut self, axis: Vector) {
        self.axis = axis;
    }

    /// Up hint
    pub const fn up(&self) -> Vector {
        self.up
    }

    /// Set the up hint; the zero vector is rejected
    pub fn set_up(&mut self, up: Vector) -> SceneResult<()> {
        if up == Vector::zeros() {
            return Err(SceneError::ZeroVector { property: "up" });
        }
        self.up = up;
        Ok(())
    }

    /// Turn the axis toward `new_axis`, carrying `up` along
    ///
    /// The rotation is about `axis x new_axis` through `pos`. Parallel or
    /// anti-parallel axes just replace the axis. A zero `new_axis` is
    /// rejected.
    pub fn set_orientation(&mut self, new_axis: Vector) -> SceneResult<Orientation> {
        if new_axis == Vector::zeros() {
            return Err(SceneError::ZeroVector { property: "axis" });
        }
        let rotation_axis = self.axis.cross(&new_axis);
        if rotation_axis == Vector::zeros() {
            self.axis = new_axis;
        } else {
            let angle = new_axis.diff_angle(&self.axis);
            self.axis = new_axis;
            self.up = self.up.rotate(angle, &rotation_axis);
            if self.axis.cross(&self.up).mag2() < f64::EPSILON * self.axis.mag2() * self.up.mag2() {
                self.up = self.fallback_up();
            }
        }
        Ok(Orientation {
            axis: self.axis,
            up: self.up,
        })
    }

    fn fallback_up(&self) -> Vector {
        let candidate = Vector::new(1.0, 0.0, 0.0);
        if self.axis.cross(&candidate) == Vector::zeros() {
            Vector::new(0.0, 1.0, 0.0)
        } else {
            candidate
        }
    }

    /// Rotate the whole primitive by `angle` about `axis` through `origin`
    pub fn rotate(&mut self, angle: f64, axis: &Vector, origin: &Vector) -> SceneResult<()> {
        if *axis == Vector::zeros() {
            return Err(SceneError::ZeroVector {
                property: "rotation axis",
            });
        }
        let transform = rotation_about(angle, axis, origin);
        self.pos = transform.project(&self.pos);
        self.axis = transform.times_v(&self.axis);
        self.up = transform.times_v(&self.up);
        Ok(())
    }

    /// Model-to-world transform in render units
    ///
    /// `world_scale` is the global scale factor and `object_scale` the
    /// shape's own per-axis dimensions in world units.
    pub fn model_world_transform(&self, world_scale: f64, object_scale: &Vector) -> Tmatrix {
        let x_axis = if self.axis == Vector::zeros() {
            Vector::x()
        } else {
            self.axis.unit_or_zero()
        };
        let mut y_axis = self.up.unit_or_zero();

        let alignment = x_axis.dot(&y_axis).abs();
        if alignment > UP_PARALLEL_THRESHOLD || !alignment.is_finite() {
            let fallback = Vector::new(-1.0, 0.0, 0.0);
            y_axis = if x_axis.dot(&fallback).abs() > UP_PARALLEL_THRESHOLD {
                x_axis.cross(&Vector::z())
            } else {
                fallback
            };
        }

        let z_axis = x_axis.cross(&y_axis).unit_or_zero();
        let y_axis = z_axis.cross(&x_axis);

        let mut transform = Tmatrix::identity();
        transform.x_column(&x_axis);
        transform.y_column(&y_axis);
        transform.z_column(&z_axis);
        transform.w_column(&(self.pos * world_scale));
        transform.w_row();
        transform.scale(&(object_scale * world_scale));
        transform
    }
}

/// A renderable placed by a [`PrimitiveBase`] and drawn with a cached shape
pub trait Primitive: Renderable {
    /// Placement
    fn base(&self) -> &PrimitiveBase;

    /// Mutable placement
    fn base_mut(&mut self) -> &mut PrimitiveBase;

    /// Per-axis scale of the unit shape, in world units
    fn object_scale(&self) -> Vector;

    /// Coverage thresholds; flat-faceted shapes have none
    fn lod_table(&self) -> Option<&'static LodTable> {
        None
    }

    /// Radius used to estimate projected size
    fn lod_radius(&self) -> f64 {
        self.object_scale().max() / 2.0
    }

    /// Tessellation level for the current view
    fn select_lod(&self, view: &ViewState) -> usize {
        self.lod_table().map_or(0, |table| {
            let coverage = view.pixel_coverage(&self.base().pos(), self.lod_radius());
            table.select(coverage, view.lod_adjust)
        })
    }

    /// Model-to-world transform in render units
    fn model_world_transform(&self, gcf: f64) -> Tmatrix {
        self.base().model_world_transform(gcf, &self.object_scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_transform_maps_origin_to_pos() {
        let mut base = PrimitiveBase::at(Vector::new(1.0, 2.0, 3.0));
        base.set_axis(Vector::new(0.0, 0.0, 2.0));
        let transform = base.model_world_transform(1.0, &Vector::new(2.0, 1.0, 1.0));
        assert_relative_eq!(transform.project(&Vector::zeros()), Vector::new(1.0, 2.0, 3.0));
        // unit x lands at pos + axis
        assert_relative_eq!(
            transform.project(&Vector::x()),
            Vector::new(1.0, 2.0, 5.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_transform_applies_world_scale() {
        let base = PrimitiveBase::at(Vector::new(4.0, 0.0, 0.0));
        let transform = base.model_world_transform(0.5, &Vector::repeat(1.0));
        assert_relative_eq!(transform.project(&Vector::zeros()), Vector::new(2.0, 0.0, 0.0));
        assert_relative_eq!(transform.times_v(&Vector::y()).norm(), 0.5);
    }

    #[test]
    fn test_transform_with_axis_parallel_to_up() {
        let mut base = PrimitiveBase::default();
        base.set_axis(Vector::new(0.0, 3.0, 0.0));
        let transform = base.model_world_transform(1.0, &Vector::repeat(1.0));
        let x = transform.times_v(&Vector::x());
        let y = transform.times_v(&Vector::y());
        let z = transform.times_v(&Vector::z());
        assert_relative_eq!(x, Vector::y(), epsilon = 1e-12);
        assert_relative_eq!(x.dot(&y), 0.0, epsilon = 1e-12);
        assert_relative_eq!(x.cross(&y), z, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_with_axis_near_x_and_up_along_x() {
        let mut base = PrimitiveBase::default();
        base.set_up(Vector::x()).unwrap();
        base.set_axis(Vector::new(1.0, 0.05, 0.0));
        let transform = base.model_world_transform(1.0, &Vector::repeat(1.0));
        let x = transform.times_v(&Vector::x());
        let y = transform.times_v(&Vector::y());
        let z = transform.times_v(&Vector::z());
        assert_relative_eq!(x, Vector::new(1.0, 0.05, 0.0).normalize(), epsilon = 1e-12);
        assert_relative_eq!(y.mag(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(x.dot(&y), 0.0, epsilon = 1e-12);
        assert_relative_eq!(z, Vector::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_set_orientation_carries_up() {
        let mut base = PrimitiveBase::default();
        let orientation = base.set_orientation(Vector::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(orientation.axis, Vector::new(0.0, 1.0, 0.0));
        assert_relative_eq!(orientation.up, Vector::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_set_orientation_parallel_keeps_up() {
        let mut base = PrimitiveBase::default();
        let orientation = base.set_orientation(Vector::new(-2.0, 0.0, 0.0)).unwrap();
        assert_eq!(orientation.axis, Vector::new(-2.0, 0.0, 0.0));
        assert_eq!(orientation.up, Vector::new(0.0, 1.0, 0.0));
        assert!(base.set_orientation(Vector::zeros()).is_err());
    }

    #[test]
    fn test_rotate_about_origin() {
        let mut base = PrimitiveBase::at(Vector::new(1.0, 0.0, 0.0));
        base.rotate(FRAC_PI_2, &Vector::z(), &Vector::zeros()).unwrap();
        assert_relative_eq!(base.pos(), Vector::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(base.axis(), Vector::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(base.up(), Vector::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }
}
