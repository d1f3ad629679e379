//! Composite objects
//!
//! A frame positions a group of child renderables with its own pos/axis/up
//! and per-axis scale. Children are expressed in the frame's local space.
//!
//! ## Picking
//!
//! While picking, a frame pushes one extra level onto the backend name
//! stack and loads each child's index into it. A hit on a child therefore
//! reports `[frame_index, child_index, ...]`, and [`Frame::lookup_name`]
//! walks those trailing names back down to the child that was hit.

use std::cell::RefCell;
use std::rc::Rc;

use super::extent::Extent;
use super::primitive::PrimitiveBase;
use super::renderable::{Renderable, RenderableCore, SharedRenderable};
use super::view::ViewState;
use super::{SceneError, SceneResult};
use crate::foundation::math::{Tmatrix, Vector};
use crate::render::shapes::DrawContext;
use crate::render::RenderResult;

/// Group of renderables sharing a local coordinate system
#[derive(Clone)]
pub struct Frame {
    base: PrimitiveBase,
    scale: Vector,
    children: Vec<SharedRenderable>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("base", &self.base)
            .field("scale", &self.scale)
            .field("children", &self.children.len())
            .finish()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(Vector::zeros())
    }
}

impl Frame {
    /// Empty frame at `pos` with identity orientation and scale
    pub fn new(pos: Vector) -> Self {
        Self {
            base: PrimitiveBase::at(pos),
            scale: Vector::repeat(1.0),
            children: Vec::new(),
        }
    }

    /// Placement
    pub const fn base(&self) -> &PrimitiveBase {
        &self.base
    }

    /// Mutable placement
    pub fn base_mut(&mut self) -> &mut PrimitiveBase {
        &mut self.base
    }

    /// Per-axis scale of the local space
    pub const fn scale(&self) -> Vector {
        self.scale
    }

    /// Set the local scale; every component must be positive
    pub fn set_scale(&mut self, scale: Vector) -> SceneResult<()> {
        if let Some(bad) = scale.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
            return Err(SceneError::InvalidComponent {
                property: "frame scale",
                value: *bad,
            });
        }
        self.scale = scale;
        Ok(())
    }

    /// Add a child; the frame keeps a strong reference
    pub fn add_child<T: Renderable + 'static>(&mut self, child: &Rc<RefCell<T>>) {
        let shared: SharedRenderable = child.clone();
        self.children.push(shared);
    }

    /// Add an already type-erased child
    pub fn add_shared(&mut self, child: SharedRenderable) {
        self.children.push(child);
    }

    /// Remove a child by identity
    pub fn remove_child(&mut self, child: &SharedRenderable) -> bool {
        let before = self.children.len();
        self.children.retain(|c| !Rc::ptr_eq(c, child));
        self.children.len() != before
    }

    /// Children in pick-name order
    pub fn children(&self) -> &[SharedRenderable] {
        &self.children
    }

    /// Local-to-world transform with world positions scaled by `gcf`
    ///
    /// Unlike a primitive's transform the local axes are not scaled by
    /// `gcf`: children apply it themselves.
    pub fn frame_world_transform(&self, gcf: f64) -> Tmatrix {
        let mut transform = self.base.model_world_transform(1.0, &self.scale);
        transform.w_column(&(self.base.pos() * gcf));
        transform
    }
}

impl Renderable for Frame {
    fn core(&self) -> &RenderableCore {
        &self.base.core
    }

    fn core_mut(&mut self) -> &mut RenderableCore {
        &mut self.base.core
    }

    fn center(&self) -> Vector {
        self.base.pos()
    }

    fn is_translucent(&self) -> bool {
        self.base.core.is_translucent() || self.children.iter().any(|c| c.borrow().is_translucent())
    }

    fn grow_extent(&self, extent: &mut Extent) {
        extent.push_frame(self.frame_world_transform(1.0));
        for child in &self.children {
            child.borrow().outer_grow_extent(extent);
        }
        extent.pop_frame();
    }

    fn render(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let world = self.frame_world_transform(1.0);
        let mut local = match world.inverse() {
            Some(inverse) => view.localized(&inverse),
            None => return Ok(()),
        };

        ctx.backend.push_matrix();
        ctx.backend.multiply_matrix(&self.frame_world_transform(view.gcf).to_gl());
        let result = self
            .children
            .iter()
            .try_for_each(|child| child.borrow().outer_render(&mut local, ctx));
        ctx.backend.pop_matrix();

        for mut object in local.screen_objects.drain(..) {
            object.anchor = world.project(&object.anchor);
            object.depth = (object.anchor - view.camera).dot(&view.forward);
            view.queue_screen_object(object);
        }
        result
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_for_pick(&self, view: &mut ViewState, ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        let world = self.frame_world_transform(1.0);
        let mut local = match world.inverse() {
            Some(inverse) => view.localized(&inverse),
            None => return Ok(()),
        };

        ctx.backend.push_matrix();
        ctx.backend.multiply_matrix(&self.frame_world_transform(view.gcf).to_gl());
        ctx.backend.push_name(0);
        let result = self.children.iter().enumerate().try_for_each(|(index, child)| {
            ctx.backend.load_name(index as u32);
            child.borrow().outer_render_for_pick(&mut local, ctx)
        });
        ctx.backend.pop_name();
        ctx.backend.pop_matrix();
        result
    }

    fn pick_words(&self, depth: usize) -> usize {
        self.children
            .iter()
            .map(|child| child.borrow().pick_words(depth + 1))
            .sum()
    }

    fn lookup_name(&self, names: &[u32]) -> Option<SharedRenderable> {
        let (first, rest) = names.split_first()?;
        let child = self.children.get(*first as usize)?;
        if rest.is_empty() {
            return Some(child.clone());
        }
        child.borrow().lookup_name(rest).or_else(|| Some(child.clone()))
    }
}
