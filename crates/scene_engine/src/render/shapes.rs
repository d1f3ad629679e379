//! Cached unit-shape display lists
//!
//! Every primitive draws a unit shape under its model-to-world transform.
//! The geometry for each (shape, level) pair is compiled into a backend
//! display list the first time it is needed and replayed afterwards.

use std::collections::HashMap;

use super::backend::{DisplayList, RenderBackend};
use super::RenderResult;
use crate::foundation::math::Tmatrix;
use crate::scene::lod::LOD_LEVELS;
use crate::scene::renderable::RenderableCore;
use crate::scene::view::ViewState;

/// Unit shapes the backend knows how to tessellate
///
/// Axial shapes run along +x from 0 to 1 with unit radius; the box is the
/// unit cube centered on the origin; the pyramid has its unit-square base at
/// x = 0 and its apex at x = 1; the ring is a torus of unit major radius in
/// the y-z plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Unit sphere
    Sphere,
    /// Unit cylinder
    Cylinder,
    /// Unit cone
    Cone,
    /// Torus; tube radius as a fraction of the major radius, in thousandths
    Ring {
        /// Tube-to-major radius ratio times 1000
        thickness_permille: u16,
    },
    /// Unit cube
    Box,
    /// Unit square pyramid
    Pyramid,
}

impl ShapeKind {
    /// Number of tessellation levels this shape is built at
    pub const fn lod_levels(self) -> usize {
        match self {
            Self::Sphere | Self::Cylinder | Self::Cone | Self::Ring { .. } => LOD_LEVELS,
            Self::Box | Self::Pyramid => 1,
        }
    }
}

/// Display-list cache keyed by shape and level
#[derive(Debug, Default)]
pub struct ShapeLibrary {
    lists: HashMap<(ShapeKind, usize), DisplayList>,
}

impl ShapeLibrary {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay the list for `shape` at `level`, compiling it on first use
    ///
    /// Levels past the shape's last are clamped.
    pub fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        shape: ShapeKind,
        level: usize,
    ) -> RenderResult<()> {
        let level = level.min(shape.lod_levels() - 1);
        let list = match self.lists.get(&(shape, level)) {
            Some(list) => *list,
            None => self.compile(backend, shape, level)?,
        };
        backend.render_list(list);
        Ok(())
    }

    fn compile(
        &mut self,
        backend: &mut dyn RenderBackend,
        shape: ShapeKind,
        level: usize,
    ) -> RenderResult<DisplayList> {
        let list = backend.create_display_list()?;
        backend.compile_begin(list);
        backend.emit_geometry(shape, level);
        backend.compile_end();
        log::debug!("Compiled {shape:?} level {level} into {list:?}");
        self.lists.insert((shape, level), list);
        Ok(list)
    }

    /// Forget every compiled list, e.g. after the backend context was lost
    pub fn clear(&mut self) {
        self.lists.clear();
    }

    /// Number of compiled lists
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Whether nothing has been compiled yet
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Backend plus shape cache, handed to renderables while drawing
pub struct DrawContext<'a> {
    /// Active backend
    pub backend: &'a mut dyn RenderBackend,
    /// Shared display-list cache
    pub shapes: &'a mut ShapeLibrary,
}

impl<'a> DrawContext<'a> {
    /// Bundle a backend with a shape cache
    pub fn new(backend: &'a mut dyn RenderBackend, shapes: &'a mut ShapeLibrary) -> Self {
        Self { backend, shapes }
    }

    /// Draw a unit shape under `transform` with the object's colour
    pub fn draw_shape(
        &mut self,
        shape: ShapeKind,
        level: usize,
        transform: &Tmatrix,
        core: &RenderableCore,
        view: &ViewState,
    ) -> RenderResult<()> {
        self.backend
            .set_color(view.effective_color(core.color), core.opacity());
        self.backend.push_matrix();
        self.backend.multiply_matrix(&transform.to_gl());
        let result = self.shapes.render(&mut *self.backend, shape, level);
        self.backend.pop_matrix();
        result
    }
}
