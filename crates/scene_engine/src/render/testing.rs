//! Recording backend for unit tests
//!
//! Logs every call in order and plays back scripted selection results.

use std::collections::VecDeque;

use super::backend::{
    BackendResult, ColorMask, DisplayList, DrawBuffer, LightSource, RenderBackend,
    SelectionBuffer, Viewport,
};
use super::shapes::ShapeKind;
use super::RenderError;
use crate::foundation::math::Vector;
use crate::scene::color::Rgb;

/// One recorded backend call, named after the trait method
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetViewport(Viewport),
    SetDrawBuffer(DrawBuffer),
    SetColorMask(ColorMask),
    Clear(Rgb),
    ClearDepth,
    SetDepthTest(bool),
    LoadProjection([f64; 16]),
    LoadModelview([f64; 16]),
    PushMatrix,
    MultiplyMatrix([f64; 16]),
    PopMatrix,
    SetColor(Rgb, f32),
    EnableLights(usize),
    DisableLights,
    CompileBegin(DisplayList),
    EmitGeometry(ShapeKind, usize),
    CompileEnd,
    RenderList(DisplayList),
    ScreenText(String),
    BeginSelection(usize),
    PushName(u32),
    LoadName(u32),
    PopName,
    EndSelection,
}

/// Backend that records calls instead of drawing
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<Call>,
    next_list: u64,
    selections: VecDeque<SelectionBuffer>,
    pending_error: Option<String>,
    list_limit: Option<u64>,
    min_selection: usize,
}

impl RecordingBackend {
    /// Backend with a 64-word minimum selection buffer
    pub fn new() -> Self {
        Self {
            min_selection: 64,
            ..Self::default()
        }
    }

    /// Calls recorded so far
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Forget the recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Queue the buffer returned by the next `end_selection`
    pub fn script_selection(&mut self, buffer: SelectionBuffer) {
        self.selections.push_back(buffer);
    }

    /// Make the next `check_error` fail
    pub fn fail_next_check(&mut self, message: &str) {
        self.pending_error = Some(message.to_string());
    }

    /// Refuse display lists once `limit` have been handed out
    pub fn limit_display_lists(&mut self, limit: u64) {
        self.list_limit = Some(limit);
    }

    /// Smallest selection buffer the backend accepts
    pub fn set_min_selection(&mut self, words: usize) {
        self.min_selection = words;
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }
}

impl RenderBackend for RecordingBackend {
    fn set_viewport(&mut self, viewport: Viewport) {
        self.calls.push(Call::SetViewport(viewport));
    }

    fn set_draw_buffer(&mut self, buffer: DrawBuffer) {
        self.calls.push(Call::SetDrawBuffer(buffer));
    }

    fn set_color_mask(&mut self, mask: ColorMask) {
        self.calls.push(Call::SetColorMask(mask));
    }

    fn clear(&mut self, color: Rgb) {
        self.calls.push(Call::Clear(color));
    }

    fn clear_depth(&mut self) {
        self.calls.push(Call::ClearDepth);
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.calls.push(Call::SetDepthTest(enabled));
    }

    fn load_projection(&mut self, matrix: &[f64; 16]) {
        self.calls.push(Call::LoadProjection(*matrix));
    }

    fn load_modelview(&mut self, matrix: &[f64; 16]) {
        self.calls.push(Call::LoadModelview(*matrix));
    }

    fn push_matrix(&mut self) {
        self.calls.push(Call::PushMatrix);
    }

    fn multiply_matrix(&mut self, matrix: &[f64; 16]) {
        self.calls.push(Call::MultiplyMatrix(*matrix));
    }

    fn pop_matrix(&mut self) {
        self.calls.push(Call::PopMatrix);
    }

    fn set_color(&mut self, color: Rgb, opacity: f32) {
        self.calls.push(Call::SetColor(color, opacity));
    }

    fn enable_lights(&mut self, _ambient: Rgb, lights: &[LightSource]) {
        self.calls.push(Call::EnableLights(lights.len()));
    }

    fn disable_lights(&mut self) {
        self.calls.push(Call::DisableLights);
    }

    fn create_display_list(&mut self) -> BackendResult<DisplayList> {
        if self.list_limit.is_some_and(|limit| self.next_list >= limit) {
            return Err(RenderError::ResourceCreationFailed(format!(
                "display list {}",
                self.next_list + 1
            )));
        }
        self.next_list += 1;
        Ok(DisplayList(self.next_list))
    }

    fn compile_begin(&mut self, list: DisplayList) {
        self.calls.push(Call::CompileBegin(list));
    }

    fn emit_geometry(&mut self, shape: ShapeKind, level: usize) {
        self.calls.push(Call::EmitGeometry(shape, level));
    }

    fn compile_end(&mut self) {
        self.calls.push(Call::CompileEnd);
    }

    fn render_list(&mut self, list: DisplayList) {
        self.calls.push(Call::RenderList(list));
    }

    fn draw_screen_text(&mut self, _window_pos: &Vector, text: &str, _color: Rgb, _opacity: f32) {
        self.calls.push(Call::ScreenText(text.to_string()));
    }

    fn min_selection_buffer(&self) -> usize {
        self.min_selection
    }

    fn begin_selection(&mut self, capacity: usize) -> BackendResult<()> {
        self.calls.push(Call::BeginSelection(capacity));
        Ok(())
    }

    fn push_name(&mut self, name: u32) {
        self.calls.push(Call::PushName(name));
    }

    fn load_name(&mut self, name: u32) {
        self.calls.push(Call::LoadName(name));
    }

    fn pop_name(&mut self) {
        self.calls.push(Call::PopName);
    }

    fn end_selection(&mut self) -> BackendResult<SelectionBuffer> {
        self.calls.push(Call::EndSelection);
        Ok(self.selections.pop_front().unwrap_or_default())
    }

    fn check_error(&mut self) -> BackendResult<()> {
        match self.pending_error.take() {
            Some(message) => Err(RenderError::BackendError(message)),
            None => Ok(()),
        }
    }
}
