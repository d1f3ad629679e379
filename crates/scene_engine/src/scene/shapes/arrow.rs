//! Arrows: a box shaft capped by a pyramid head
//!
//! Unset widths follow the arrow's length. The shaft never gets thinner than
//! 2% of the length unless `fixedwidth` is set, and the head is shrunk
//! (together with the widths) so it never exceeds half the length.

use super::{non_negative, primitive_core};
use crate::foundation::math::{Tmatrix, Vector, VectorExt};
use crate::render::shapes::{DrawContext, ShapeKind};
use crate::render::RenderResult;
use crate::scene::extent::Extent;
use crate::scene::primitive::{Primitive, PrimitiveBase};
use crate::scene::renderable::Renderable;
use crate::scene::view::ViewState;
use crate::scene::SceneResult;

const DEFAULT_SHAFT_FRACTION: f64 = 0.1;
const MIN_SHAFT_FRACTION: f64 = 0.02;
const MAX_HEAD_FRACTION: f64 = 0.5;
const HEAD_WIDTH_PER_SHAFT: f64 = 2.0;
const HEAD_LENGTH_PER_SHAFT: f64 = 3.0;

/// Resolved arrow dimensions in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    /// Shaft cross-section
    pub shaft_width: f64,
    /// Shaft length from `pos`
    pub shaft_length: f64,
    /// Head base width
    pub head_width: f64,
    /// Head length up to the tip
    pub head_length: f64,
}

/// Arrow from `pos` to `pos + axis`
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    base: PrimitiveBase,
    shaftwidth: f64,
    headwidth: f64,
    headlength: f64,
    fixedwidth: bool,
}

impl Arrow {
    /// Arrow with all widths derived from its length
    pub fn new(pos: Vector, axis: Vector) -> Self {
        let mut base = PrimitiveBase::at(pos);
        base.set_axis(axis);
        Self {
            base,
            shaftwidth: 0.0,
            headwidth: 0.0,
            headlength: 0.0,
            fixedwidth: false,
        }
    }

    /// Set the shaft width; zero derives it from the length
    pub fn set_shaftwidth(&mut self, width: f64) -> SceneResult<()> {
        self.shaftwidth = non_negative("shaftwidth", width)?;
        Ok(())
    }

    /// Set the head width; zero derives it from the shaft
    pub fn set_headwidth(&mut self, width: f64) -> SceneResult<()> {
        self.headwidth = non_negative("headwidth", width)?;
        Ok(())
    }

    /// Set the head length; zero derives it from the shaft
    pub fn set_headlength(&mut self, length: f64) -> SceneResult<()> {
        self.headlength = non_negative("headlength", length)?;
        Ok(())
    }

    /// Keep widths as set even when the arrow is long
    pub fn set_fixedwidth(&mut self, fixed: bool) {
        self.fixedwidth = fixed;
    }

    /// Resolve the drawn dimensions
    #[allow(clippy::float_cmp)]
    pub fn geometry(&self) -> ArrowGeometry {
        let length = self.base.axis().mag();
        let mut shaft = if self.shaftwidth == 0.0 {
            length * DEFAULT_SHAFT_FRACTION
        } else {
            self.shaftwidth
        };
        let mut head_width = if self.headwidth == 0.0 {
            shaft * HEAD_WIDTH_PER_SHAFT
        } else {
            self.headwidth
        };
        let mut head_length = if self.headlength == 0.0 {
            shaft * HEAD_LENGTH_PER_SHAFT
        } else {
            self.headlength
        };

        if !self.fixedwidth && shaft < length * MIN_SHAFT_FRACTION {
            let scale = length * MIN_SHAFT_FRACTION / shaft;
            shaft *= scale;
            head_width *= scale;
            head_length *= scale;
        }

        if head_length > length * MAX_HEAD_FRACTION {
            let scale = length * MAX_HEAD_FRACTION / head_length;
            shaft *= scale;
            head_width *= scale;
            head_length *= scale;
        }

        ArrowGeometry {
            shaft_width: shaft,
            shaft_length: length - head_length,
            head_width,
            head_length,
        }
    }

    fn part_transforms(&self, gcf: f64) -> (Tmatrix, Tmatrix) {
        let geometry = self.geometry();
        let frame = self.base.model_world_transform(gcf, &Vector::repeat(1.0));

        let mut shaft = frame;
        shaft.translate(&Vector::new(geometry.shaft_length / 2.0, 0.0, 0.0));
        shaft.scale(&Vector::new(
            geometry.shaft_length,
            geometry.shaft_width,
            geometry.shaft_width,
        ));

        let mut head = frame;
        head.translate(&Vector::new(geometry.shaft_length, 0.0, 0.0));
        head.scale(&Vector::new(
            geometry.head_length,
            geometry.head_width,
            geometry.head_width,
        ));
        (shaft, head)
    }
}

impl Renderable for Arrow {
    primitive_core!();

    fn center(&self) -> Vector {
        self.base.pos() + self.base.axis() * 0.5
    }

    #[allow(clippy::float_cmp)]
    fn is_degenerate(&self) -> bool {
        self.base.axis().mag() == 0.0
    }

    fn grow_extent(&self, extent: &mut Extent) {
        let geometry = self.geometry();
        let half = geometry.head_width.max(geometry.shaft_width) / 2.0;
        let frame = self.base.model_world_transform(1.0, &Vector::repeat(1.0));
        extent.add_box(
            &frame,
            Vector::new(0.0, -half, -half),
            Vector::new(self.base.axis().mag(), half, half),
        );
    }

    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let (shaft, head) = self.part_transforms(view.gcf);
        ctx.draw_shape(ShapeKind::Box, 0, &shaft, self.core(), view)?;
        ctx.draw_shape(ShapeKind::Pyramid, 0, &head, self.core(), view)
    }
}

impl Primitive for Arrow {
    fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }

    fn object_scale(&self) -> Vector {
        let geometry = self.geometry();
        Vector::new(self.base.axis().mag(), geometry.head_width, geometry.head_width)
    }
}
