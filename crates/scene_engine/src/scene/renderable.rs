//! Renderable object interface
//!
//! Objects are shared between the application, which mutates them, and the
//! display, which only holds weak references. Dropping the last strong
//! reference removes the object from the scene on the next frame.
//!
//! ## Design
//!
//! `Renderable` carries the per-object hooks the display calls each frame:
//! extent growth, drawing, pick drawing and nested-name lookup. The
//! `outer_*` provided methods skip invisible and degenerate objects so
//! individual shapes never need to check.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::color::{Material, Rgb};
use super::extent::Extent;
use super::view::ViewState;
use super::{SceneError, SceneResult};
use crate::foundation::math::Vector;
use crate::render::shapes::DrawContext;
use crate::render::RenderResult;

/// Strong handle to a renderable held by the application
pub type SharedRenderable = Rc<RefCell<dyn Renderable>>;

/// Non-owning handle held by display layers
pub type WeakRenderable = Weak<RefCell<dyn Renderable>>;

/// Wrap an object for sharing with a display
pub fn share<T: Renderable + 'static>(object: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(object))
}

/// State shared by every renderable
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableCore {
    /// Surface colour
    pub color: Rgb,
    opacity: f32,
    /// Hidden objects are skipped for extent, drawing and picking
    pub visible: bool,
    /// Optional material; a translucent material forces depth sorting
    pub material: Option<Rc<Material>>,
}

impl Default for RenderableCore {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            opacity: 1.0,
            visible: true,
            material: None,
        }
    }
}

impl RenderableCore {
    /// Core with the given colour, fully opaque
    pub fn with_color(color: Rgb) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Opacity in `[0, 1]`
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the opacity; values outside `[0, 1]` are rejected
    pub fn set_opacity(&mut self, opacity: f32) -> SceneResult<()> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(SceneError::InvalidValue {
                property: "opacity",
                value: f64::from(opacity),
            });
        }
        self.opacity = opacity;
        Ok(())
    }

    /// Whether this object belongs in the depth-sorted layer
    #[allow(clippy::float_cmp)]
    pub fn is_translucent(&self) -> bool {
        self.opacity != 1.0 || self.material.as_ref().is_some_and(|m| m.translucent)
    }
}

/// An object the display can size, draw and pick
pub trait Renderable {
    /// Shared colour/opacity/material state
    fn core(&self) -> &RenderableCore;

    /// Mutable shared state
    fn core_mut(&mut self) -> &mut RenderableCore;

    /// Representative point used for translucent depth sorting
    fn center(&self) -> Vector;

    /// Whether the object needs blending
    fn is_translucent(&self) -> bool {
        self.core().is_translucent()
    }

    /// Degenerate objects (zero radius, zero axis, ...) are never drawn
    fn is_degenerate(&self) -> bool {
        false
    }

    /// Add this object's bounds to the scene extent, in world units
    fn grow_extent(&self, extent: &mut Extent);

    /// Draw into the current eye pass
    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()>;

    /// Draw for selection; composites push child names here
    fn render_for_pick(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        self.render(view, ctx)
    }

    /// Selection-buffer words this object can fill with `depth` names on
    /// the stack
    fn pick_words(&self, depth: usize) -> usize {
        crate::render::pick::RECORD_HEADER + depth
    }

    /// Resolve nested selection names below this object
    fn lookup_name(&self, _names: &[u32]) -> Option<SharedRenderable> {
        None
    }

    /// Whether the object currently takes part in extent, drawing and picking
    fn is_active(&self) -> bool {
        self.core().visible && !self.is_degenerate()
    }

    /// Grow the extent if the object is active
    fn outer_grow_extent(&self, extent: &mut Extent) {
        if self.is_active() {
            self.grow_extent(extent);
        }
    }

    /// Draw if the object is active
    fn outer_render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        if self.is_active() {
            self.render(view, ctx)?;
        }
        Ok(())
    }

    /// Draw for selection if the object is active
    fn outer_render_for_pick(
        &self,
        view: &mut ViewState,
        ctx: &mut DrawContext<'_>,
    ) -> RenderResult<()> {
        if self.is_active() {
            self.render_for_pick(view, ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_bounds() {
        let mut core = RenderableCore::default();
        assert!(core.set_opacity(0.5).is_ok());
        assert!(core.set_opacity(1.5).is_err());
        assert!(core.set_opacity(-0.1).is_err());
        assert!((core.opacity() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_translucency_from_opacity_or_material() {
        let mut core = RenderableCore::default();
        assert!(!core.is_translucent());

        core.set_opacity(0.3).unwrap();
        assert!(core.is_translucent());

        core.set_opacity(1.0).unwrap();
        core.material = Some(Rc::new(Material::new("glass", true)));
        assert!(core.is_translucent());

        core.material = Some(Rc::new(Material::new("wood", false)));
        assert!(!core.is_translucent());
    }
}
