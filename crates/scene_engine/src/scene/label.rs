//! Screen-space text labels
//!
//! A label is anchored at a world position but drawn flat on the screen
//! after all 3D geometry, with depth testing off. During the pass it only
//! queues a [`ScreenObject`]; the display draws the queue farthest first.

use super::color::Rgb;
use super::extent::Extent;
use super::renderable::{Renderable, RenderableCore};
use super::view::ViewState;
use crate::foundation::math::Vector;
use crate::render::shapes::DrawContext;
use crate::render::RenderResult;

/// Deferred screen-space draw queued during a pass
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenObject {
    /// Distance of the anchor along the viewing direction
    pub depth: f64,
    /// Anchor in world coordinates
    pub anchor: Vector,
    /// Text to draw
    pub text: String,
    /// Colour after anaglyph adjustment
    pub color: Rgb,
    /// Opacity
    pub opacity: f32,
}

/// Text anchored to a world position
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    core: RenderableCore,
    pos: Vector,
    text: String,
}

impl Label {
    /// New label
    pub fn new(pos: Vector, text: impl Into<String>) -> Self {
        Self {
            core: RenderableCore::default(),
            pos,
            text: text.into(),
        }
    }

    /// Anchor position
    pub const fn pos(&self) -> Vector {
        self.pos
    }

    /// Move the anchor
    pub fn set_pos(&mut self, pos: Vector) {
        self.pos = pos;
    }

    /// Displayed text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Renderable for Label {
    fn core(&self) -> &RenderableCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RenderableCore {
        &mut self.core
    }

    fn center(&self) -> Vector {
        self.pos
    }

    fn is_degenerate(&self) -> bool {
        self.text.is_empty()
    }

    fn grow_extent(&self, extent: &mut Extent) {
        extent.add_point(self.pos);
    }

    fn render(&self, view: &mut ViewState, _ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        view.queue_screen_object(ScreenObject {
            depth: (self.pos - view.camera).dot(&view.forward),
            anchor: self.pos,
            text: self.text.clone(),
            color: view.effective_color(self.core.color),
            opacity: self.core.opacity(),
        });
        Ok(())
    }

    /// Labels are not selectable
    fn render_for_pick(&self, _view: &mut ViewState, _ctx: &mut DrawContext<'_>) -> RenderResult<()> {
        Ok(())
    }
}
