//! Backend abstraction trait for the rendering system
//!
//! The core never talks to a graphics API directly. Every state change and
//! draw goes through [`RenderBackend`], which maps closely onto a classic
//! immediate-mode pipeline: matrix stacks, colour masks, draw buffers,
//! compiled display lists and a name-stack selection mode.

use bitflags::bitflags;

use super::shapes::ShapeKind;
use super::RenderError;
use crate::foundation::math::Vector;
use crate::scene::color::Rgb;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a compiled display list stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayList(pub u64);

bitflags! {
    /// Colour channels enabled for writing
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorMask: u8 {
        /// Red channel
        const RED = 0b0001;
        /// Green channel
        const GREEN = 0b0010;
        /// Blue channel
        const BLUE = 0b0100;
        /// Alpha channel
        const ALPHA = 0b1000;
        /// Every channel
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

/// Target colour buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawBuffer {
    /// Ordinary back buffer
    Back,
    /// Left back buffer of a quad-buffered context
    BackLeft,
    /// Right back buffer of a quad-buffered context
    BackRight,
}

/// Viewport rectangle in window pixels, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Viewport {
    /// Viewport at the given origin and size
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// One light as handed to the backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    /// Homogeneous position; `w == 0` for directional lights
    pub position: [f64; 4],
    /// Light colour
    pub color: Rgb,
}

/// Raw result of a selection pass
///
/// `words` holds `hit_count` variable-length records, each laid out as
/// `[name_count, min_depth, max_depth, name...]`. Depths are unsigned
/// fixed-point in `[0, u32::MAX]`. A negative `hit_count` means the backend
/// ran out of room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionBuffer {
    /// Number of hit records, negative on overflow
    pub hit_count: i64,
    /// Packed records
    pub words: Vec<u32>,
}

/// Immediate-mode rendering device
///
/// Implemented by the host application on top of its graphics API.
pub trait RenderBackend {
    /// Restrict drawing to a window rectangle
    fn set_viewport(&mut self, viewport: Viewport);

    /// Select the colour buffer for subsequent drawing
    fn set_draw_buffer(&mut self, buffer: DrawBuffer);

    /// Enable writes to the given channels only
    fn set_color_mask(&mut self, mask: ColorMask);

    /// Clear colour and depth
    fn clear(&mut self, color: Rgb);

    /// Clear depth only
    fn clear_depth(&mut self);

    /// Toggle depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Replace the projection matrix (column-major)
    fn load_projection(&mut self, matrix: &[f64; 16]);

    /// Replace the modelview matrix (column-major)
    fn load_modelview(&mut self, matrix: &[f64; 16]);

    /// Push the modelview stack
    fn push_matrix(&mut self);

    /// Right-multiply the current modelview (column-major)
    fn multiply_matrix(&mut self, matrix: &[f64; 16]);

    /// Pop the modelview stack
    fn pop_matrix(&mut self);

    /// Current draw colour
    fn set_color(&mut self, color: Rgb, opacity: f32);

    /// Enable lighting with the given ambient term and sources
    fn enable_lights(&mut self, ambient: Rgb, lights: &[LightSource]);

    /// Disable lighting
    fn disable_lights(&mut self);

    /// Reserve a display list handle
    ///
    /// Fails with [`RenderError::ResourceCreationFailed`] when the backend
    /// has no handles left.
    fn create_display_list(&mut self) -> BackendResult<DisplayList>;

    /// Start recording into a display list
    fn compile_begin(&mut self, list: DisplayList);

    /// Emit the unit geometry for `shape` at tessellation `level`
    fn emit_geometry(&mut self, shape: ShapeKind, level: usize);

    /// Stop recording
    fn compile_end(&mut self);

    /// Replay a compiled display list
    fn render_list(&mut self, list: DisplayList);

    /// Draw text at a window position, ignoring depth
    fn draw_screen_text(&mut self, window_pos: &Vector, text: &str, color: Rgb, opacity: f32);

    /// Smallest selection buffer the backend accepts, in words
    fn min_selection_buffer(&self) -> usize;

    /// Enter selection mode with room for `capacity` words
    fn begin_selection(&mut self, capacity: usize) -> BackendResult<()>;

    /// Push a name on the selection name stack
    fn push_name(&mut self, name: u32);

    /// Replace the top of the name stack
    fn load_name(&mut self, name: u32);

    /// Pop the name stack
    fn pop_name(&mut self);

    /// Leave selection mode and return the hit records
    fn end_selection(&mut self) -> BackendResult<SelectionBuffer>;

    /// Report any error the backend deferred since the last check
    fn check_error(&mut self) -> BackendResult<()>;
}
