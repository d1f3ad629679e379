//! Flat-faceted shapes: boxes and pyramids
//!
//! Neither has more than one tessellation level.

use super::{non_negative, primitive_core, rescale_axis};
use crate::foundation::math::{Vector, VectorExt};
use crate::render::shapes::{DrawContext, ShapeKind};
use crate::render::RenderResult;
use crate::scene::extent::Extent;
use crate::scene::primitive::{Primitive, PrimitiveBase};
use crate::scene::renderable::Renderable;
use crate::scene::view::ViewState;
use crate::scene::SceneResult;

/// Rectangular box centered on `pos`
#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    base: PrimitiveBase,
    height: f64,
    width: f64,
}

impl BoxShape {
    /// Box with the given length (along the axis), height and width
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

    /// Rescale the axis to `length`
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

impl Renderable for BoxShape {
    primitive_core!();

    fn center(&self) -> Vector {
        self.base.pos()
    }

    #[allow(clippy::float_cmp)]
    fn is_degenerate(&self) -> bool {
        self.length() == 0.0 || self.height == 0.0 || self.width == 0.0
    }

    fn grow_extent(&self, extent: &mut Extent) {
        let transform = self.model_world_transform(1.0);
        extent.add_box(&transform, Vector::repeat(-0.5), Vector::repeat(0.5));
    }

    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let transform = self.model_world_transform(view.gcf);
        ctx.draw_shape(ShapeKind::Box, 0, &transform, self.core(), view)
    }
}

impl Primitive for BoxShape {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }

    fn object_scale(&self) -> Vector {
        Vector::new(self.length(), self.height, self.width)
    }
}

/// Square-based pyramid with its base centered on `pos`, apex at `pos + axis`
#[derive(Debug, Clone, PartialEq)]
pub struct Pyramid {
    base: PrimitiveBase,
    height: f64,
    width: f64,
}

impl Pyramid {
    /// Pyramid with the given length (base to apex), base height and width
    pub fn new(pos: Vector, length: f64, height: f64, width: f64) -> SceneResult<Self> {
        let mut base = PrimitiveBase::at(pos);
        rescale_axis(&mut base, length)?;
        Ok(Self {
            base,
            height: non_negative("height", height)?,
            width: non_negative("width", width)?,
        })
    }

    /// Distance from base to apex
    pub fn length(&self) -> f64 {
        self.base.axis().mag()
    }

    /// Rescale the axis to `length`
    pub fn set_length(&mut self, length: f64) -> SceneResult<()> {
        rescale_axis(&mut self.base, length)
    }

    /// Base extent along up
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Set the base height
    pub fn set_height(&mut self, height: f64) -> SceneResult<()> {
        self.height = non_negative("height", height)?;
        Ok(())
    }

    /// Base extent across
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Set the base width
    pub fn set_width(&mut self, width: f64) -> SceneResult<()> {
        self.width = non_negative("width", width)?;
        Ok(())
    }
}

impl Renderable for Pyramid {
    primitive_core!();

    fn center(&self) -> Vector {
        self.base.pos() + self.base.axis() * 0.5
    }

    #[allow(clippy::float_cmp)]
    fn is_degenerate(&self) -> bool {
        self.length() == 0.0 || self.height == 0.0 || self.width == 0.0
    }

    fn grow_extent(&self, extent: &mut Extent) {
        let transform = self.model_world_transform(1.0);
        extent.add_box(
            &transform,
            Vector::new(0.0, -0.5, -0.5),
            Vector::new(1.0, 0.5, 0.5),
        );
    }

    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let transform = self.model_world_transform(view.gcf);
        ctx.draw_shape(ShapeKind::Pyramid, 0, &transform, self.core(), view)
    }
}

impl Primitive for Pyramid {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }

    fn object_scale(&self) -> Vector {
        Vector::new(self.length(), self.height, self.width)
    }
}
