//! Shapes of revolution about the axis: cylinders, cones and rings

use super::{non_negative, primitive_core};
use crate::foundation::math::{Vector, VectorExt};
use crate::render::shapes::{DrawContext, ShapeKind};
use crate::render::RenderResult;
use crate::scene::extent::Extent;
use crate::scene::lod::{self, LodTable};
use crate::scene::primitive::{Primitive, PrimitiveBase};
use crate::scene::renderable::Renderable;
use crate::scene::view::ViewState;
use crate::scene::SceneResult;

/// Ring tube radius, as a fraction of the ring radius, when none is set
const DEFAULT_RING_THICKNESS: f64 = 0.1;

fn with_axis(pos: Vector, axis: Vector) -> PrimitiveBase {
    let mut base = PrimitiveBase::at(pos);
    base.set_axis(axis);
    base
}

/// Cylinder from `pos` to `pos + axis`
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    base: PrimitiveBase,
    radius: f64,
}

impl Cylinder {
    /// Cylinder with its base at `pos`
    pub fn new(pos: Vector, axis: Vector, radius: f64) -> SceneResult<Self> {
        Ok(Self {
            base: with_axis(pos, axis),
            radius: non_negative("radius", radius)?,
        })
    }

    /// Radius in world units
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the radius
    pub fn set_radius(&mut self, radius: f64) -> SceneResult<()> {
        self.radius = non_negative("radius", radius)?;
        Ok(())
    }
}

impl Renderable for Cylinder {
    primitive_core!();

    fn center(&self) -> Vector {
        self.base.pos() + self.base.axis() * 0.5
    }

    #[allow(clippy::float_cmp)]
    fn is_degenerate(&self) -> bool {
        self.radius == 0.0 || self.base.axis().mag() == 0.0
    }

    fn grow_extent(&self, extent: &mut Extent) {
        let (pos, axis) = (self.base.pos(), self.base.axis());
        extent.add_circle(pos, axis, self.radius);
        extent.add_circle(pos + axis, axis, self.radius);
    }

    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let level = self.select_lod(view);
        let transform = self.model_world_transform(view.gcf);
        ctx.draw_shape(ShapeKind::Cylinder, level, &transform, self.core(), view)
    }
}

impl Primitive for Cylinder {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }

    fn object_scale(&self) -> Vector {
        Vector::new(self.base.axis().mag(), self.radius, self.radius)
    }

    fn lod_table(&self) -> Option<&'static LodTable> {
        Some(&lod::CYLINDER)
    }

    fn lod_radius(&self) -> f64 {
        self.radius
    }
}

/// Cone with its base circle at `pos` and apex at `pos + axis`
#[derive(Debug, Clone, PartialEq)]
pub struct Cone {
    base: PrimitiveBase,
    radius: f64,
}

impl Cone {
    /// Cone with base radius `radius`
    pub fn new(pos: Vector, axis: Vector, radius: f64) -> SceneResult<Self> {
        Ok(Self {
            base: with_axis(pos, axis),
            radius: non_negative("radius", radius)?,
        })
    }

    /// Base radius
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the base radius
    pub fn set_radius(&mut self, radius: f64) -> SceneResult<()> {
        self.radius = non_negative("radius", radius)?;
        Ok(())
    }
}

impl Renderable for Cone {
    primitive_core!();

    fn center(&self) -> Vector {
        self.base.pos() + self.base.axis() * 0.5
    }

    #[allow(clippy::float_cmp)]
    fn is_degenerate(&self) -> bool {
        self.radius == 0.0 || self.base.axis().mag() == 0.0
    }

    fn grow_extent(&self, extent: &mut Extent) {
        let (pos, axis) = (self.base.pos(), self.base.axis());
        extent.add_circle(pos, axis, self.radius);
        extent.add_point(pos + axis);
    }

    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let level = self.select_lod(view);
        let transform = self.model_world_transform(view.gcf);
        ctx.draw_shape(ShapeKind::Cone, level, &transform, self.core(), view)
    }
}

impl Primitive for Cone {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }

    fn object_scale(&self) -> Vector {
        Vector::new(self.base.axis().mag(), self.radius, self.radius)
    }

    fn lod_table(&self) -> Option<&'static LodTable> {
        Some(&lod::CONE)
    }

    fn lod_radius(&self) -> f64 {
        self.radius
    }
}

/// Torus centered on `pos` whose axis is the ring's normal
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    base: PrimitiveBase,
    radius: f64,
    thickness: f64,
}

impl Ring {
    /// Ring of the given radius; a zero thickness selects the default tube
    pub fn new(pos: Vector, axis: Vector, radius: f64, thickness: f64) -> SceneResult<Self> {
        Ok(Self {
            base: with_axis(pos, axis),
            radius: non_negative("radius", radius)?,
            thickness: non_negative("thickness", thickness)?,
        })
    }

    /// Major radius
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the major radius
    pub fn set_radius(&mut self, radius: f64) -> SceneResult<()> {
        self.radius = non_negative("radius", radius)?;
        Ok(())
    }

    /// Tube radius as set; zero means the default
    pub const fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Set the tube radius
    pub fn set_thickness(&mut self, thickness: f64) -> SceneResult<()> {
        self.thickness = non_negative("thickness", thickness)?;
        Ok(())
    }

    /// Tube radius actually drawn
    #[allow(clippy::float_cmp)]
    pub fn effective_thickness(&self) -> f64 {
        if self.thickness == 0.0 {
            self.radius * DEFAULT_RING_THICKNESS
        } else {
            self.thickness
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn shape(&self) -> ShapeKind {
        let ratio = self.effective_thickness() / self.radius;
        ShapeKind::Ring {
            thickness_permille: (ratio * 1000.0).round().clamp(1.0, f64::from(u16::MAX)) as u16,
        }
    }
}

impl Renderable for Ring {
    primitive_core!();

    fn center(&self) -> Vector {
        self.base.pos()
    }

    #[allow(clippy::float_cmp)]
    fn is_degenerate(&self) -> bool {
        self.radius == 0.0
    }

    fn grow_extent(&self, extent: &mut Extent) {
        let tube = self.effective_thickness();
        extent.add_circle(self.base.pos(), self.base.axis(), self.radius + tube);
        let offset = self.base.axis().unit_or_zero() * tube;
        extent.add_point(self.base.pos() + offset);
        extent.add_point(self.base.pos() - offset);
    }

    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let level = self.select_lod(view);
        let transform = self.model_world_transform(view.gcf);
        ctx.draw_shape(self.shape(), level, &transform, self.core(), view)
    }
}

impl Primitive for Ring {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }

    fn object_scale(&self) -> Vector {
        Vector::repeat(self.radius)
    }

    fn lod_table(&self) -> Option<&'static LodTable> {
        Some(&lod::RING)
    }

    fn lod_radius(&self) -> f64 {
        self.radius + self.effective_thickness()
    }
}
