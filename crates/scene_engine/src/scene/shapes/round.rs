//! Spheres and ellipsoids

use super::{non_negative, primitive_core, rescale_axis};
use crate::foundation::math::{Vector, VectorExt};
use crate::render::shapes::{DrawContext, ShapeKind};
use crate::render::RenderResult;
use crate::scene::extent::Extent;
use crate::scene::lod::{self, LodTable};
use crate::scene::primitive::{Primitive, PrimitiveBase};
use crate::scene::renderable::Renderable;
use crate::scene::view::ViewState;
use crate::scene::SceneResult;

/// Sphere centered on `pos`
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    base: PrimitiveBase,
    radius: f64,
}

impl Sphere {
    /// Sphere at `pos`; a negative radius is rejected
    pub fn new(pos: Vector, radius: f64) -> SceneResult<Self> {
        Ok(Self {
            base: PrimitiveBase::at(pos),
            radius: non_negative("radius", radius)?,
        })
    }

    /// Radius in world units
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the radius; zero makes the sphere degenerate
    pub fn set_radius(&mut self, radius: f64) -> SceneResult<()> {
        self.radius = non_negative("radius", radius)?;
        Ok(())
    }
}

impl Renderable for Sphere {
    primitive_core!();

    fn center(&self) -> Vector {
        self.base.pos()
    }

    #[allow(clippy::float_cmp)]
    fn is_degenerate(&self) -> bool {
        self.radius == 0.0
    }

    fn grow_extent(&self, extent: &mut Extent) {
        extent.add_sphere(self.base.pos(), self.radius);
    }

    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let level = self.select_lod(view);
        let transform = self.model_world_transform(view.gcf);
        ctx.draw_shape(ShapeKind::Sphere, level, &transform, self.core(), view)
    }
}

impl Primitive for Sphere {
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
        Some(&lod::SPHERE)
    }

    fn lod_radius(&self) -> f64 {
        self.radius
    }
}

/// Ellipsoid centered on `pos`; its length runs along the axis
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    base: PrimitiveBase,
    height: f64,
    width: f64,
}

impl Ellipsoid {
    /// Ellipsoid with the given full length, height and width
    pub fn new(pos: Vector, length: f64, height: f64, width: f64) -> SceneResult<Self> {
        let mut base = PrimitiveBase::at(pos);
        rescale_axis(&mut base, length)?;
        Ok(Self {
            base,
            height: non_negative("height", height)?,
            width: non_negative("width", width)?,
        })
    }

    /// Extent along the axis
    pub fn length(&self) -> f64 {
        self.base.axis().mag()
    }

    /// Rescale the axis to `length`, keeping its direction
    pub fn set_length(&mut self, length: f64) -> SceneResult<()> {
        rescale_axis(&mut self.base, length)
    }

    /// Extent along up
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Set the height
    pub fn set_height(&mut self, height: f64) -> SceneResult<()> {
        self.height = non_negative("height", height)?;
        Ok(())
    }

    /// Extent across
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Set the width
    pub fn set_width(&mut self, width: f64) -> SceneResult<()> {
        self.width = non_negative("width", width)?;
        Ok(())
    }
}

impl Renderable for Ellipsoid {
    primitive_core!();

    fn center(&self) -> Vector {
        self.base.pos()
    }

    #[allow(clippy::float_cmp)]
    fn is_degenerate(&self) -> bool {
        self.height == 0.0 || self.width == 0.0 || self.length() == 0.0
    }

    fn grow_extent(&self, extent: &mut Extent) {
        extent.add_sphere(self.base.pos(), self.lod_radius());
    }

    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let level = self.select_lod(view);
        let transform = self.model_world_transform(view.gcf);
        ctx.draw_shape(ShapeKind::Sphere, level, &transform, self.core(), view)
    }
}

impl Primitive for Ellipsoid {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }

    fn object_scale(&self) -> Vector {
        Vector::new(self.length(), self.height, self.width) * 0.5
    }

    fn lod_table(&self) -> Option<&'static LodTable> {
        Some(&lod::SPHERE)
    }

    fn lod_radius(&self) -> f64 {
        self.length().max(self.height).max(self.width) / 2.0
    }
}
