//! Render orchestration
//!
//! The `Display` owns everything that lives for the life of a window: the
//! scene settings, the camera, the object layers, the lights and the shape
//! cache. Each call to [`Display::render`] draws one complete frame through
//! the backend; [`Display::pick`] runs a selection pass under the cursor.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use super::backend::{ColorMask, DrawBuffer, LightSource, RenderBackend};
use super::camera::{Camera, PickRegion, ViewTransform};
use super::layers::Layers;
use super::pick::{PickEngine, PickResult};
use super::shapes::{DrawContext, ShapeLibrary};
use super::stereo::{Clear, EyePass};
use super::RenderResult;
use crate::foundation::math::Vector;
use crate::scene::light::Light;
use crate::scene::renderable::{Renderable, SharedRenderable};
use crate::scene::settings::{SceneSettings, WindowSettings};
use crate::scene::view::ViewState;
use crate::scene::{SceneError, SceneResult};

/// A scene bound to one window
#[derive(Debug)]
pub struct Display {
    settings: SceneSettings,
    camera: Camera,
    layers: Layers,
    lights: Vec<Light>,
    shapes: ShapeLibrary,
    visible: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

fn render_object(
    object: &SharedRenderable,
    view: &mut ViewState,
    ctx: &mut DrawContext<'_>,
) -> RenderResult<()> {
    object.borrow().outer_render(view, ctx)
}

fn render_object_for_pick(
    object: &SharedRenderable,
    view: &mut ViewState,
    ctx: &mut DrawContext<'_>,
) -> RenderResult<()> {
    object.borrow().outer_render_for_pick(view, ctx)
}

impl Display {
    /// Hidden display with default settings and the default lights
    pub fn new() -> Self {
        Self {
            settings: SceneSettings::default(),
            camera: Camera::new(),
            layers: Layers::new(),
            lights: Light::defaults(),
            shapes: ShapeLibrary::new(),
            visible: false,
        }
    }

    /// Hidden display using settings loaded elsewhere
    pub fn with_settings(settings: SceneSettings) -> SceneResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::new()
        })
    }

    /// Scene settings
    pub const fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Scene settings for the validated setters
    pub fn settings_mut(&mut self) -> &mut SceneSettings {
        &mut self.settings
    }

    /// Camera state from the last frame
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    // Objects

    /// Start drawing an object; the display keeps only a weak reference
    pub fn add<T: Renderable + 'static>(&mut self, object: &Rc<RefCell<T>>) {
        let shared: SharedRenderable = object.clone();
        self.add_shared(&shared);
    }

    /// Start drawing a type-erased object
    pub fn add_shared(&mut self, object: &SharedRenderable) {
        if self.layers.contains(object) {
            return;
        }
        self.layers.insert(object);
        log::trace!("Added object, {} in scene", self.layers.len());
    }

    /// Stop drawing an object
    pub fn remove(&mut self, object: &SharedRenderable) -> bool {
        self.layers.remove(object)
    }

    /// Live objects, opaque layer first
    pub fn objects(&self) -> Vec<SharedRenderable> {
        self.layers.all()
    }

    /// Layer entries, including objects dropped since the last frame
    pub fn object_count(&self) -> usize {
        self.layers.len()
    }

    // Lights

    /// Add a light
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Current lights
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Remove every light, leaving only the ambient term
    pub fn clear_lights(&mut self) {
        self.lights.clear();
    }

    // Window

    /// Mark the window as shown; window properties are locked from now on
    pub fn show(&mut self) {
        if !self.visible {
            log::info!("Showing display '{}'", self.settings.window().title);
        }
        self.visible = true;
    }

    /// Mark the window as hidden
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Whether the window is shown
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    fn unlocked_window(&mut self, property: &'static str) -> SceneResult<&mut WindowSettings> {
        if self.visible {
            return Err(SceneError::WindowPropertyLocked(property));
        }
        Ok(self.settings.window_mut())
    }

    /// Set the window title
    pub fn set_title(&mut self, title: impl Into<String>) -> SceneResult<()> {
        self.unlocked_window("title")?.title = title.into();
        Ok(())
    }

    /// Set the window position
    pub fn set_window_position(&mut self, x: i32, y: i32) -> SceneResult<()> {
        let window = self.unlocked_window("window position")?;
        window.x = x;
        window.y = y;
        Ok(())
    }

    /// Set the window size; both dimensions must be non-zero
    pub fn set_window_size(&mut self, width: u32, height: u32) -> SceneResult<()> {
        let window = self.unlocked_window("window size")?;
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidValue {
                property: "window size",
                value: f64::from(width.min(height)),
            });
        }
        window.width = width;
        window.height = height;
        Ok(())
    }

    /// Switch fullscreen on or off
    pub fn set_fullscreen(&mut self, fullscreen: bool) -> SceneResult<()> {
        self.unlocked_window("fullscreen")?.fullscreen = fullscreen;
        Ok(())
    }

    /// Forget compiled display lists after the backend lost its context
    pub fn release_shapes(&mut self) {
        log::debug!("Releasing {} display lists", self.shapes.len());
        self.shapes.clear();
    }

    fn base_view(&self, width: f64, height: f64) -> ViewState {
        let mut view = ViewState::new(
            self.settings.forward(),
            self.settings.center(),
            self.settings.up(),
            width,
            height,
        );
        view.lod_adjust = self.settings.lod_adjust();
        view
    }

    fn prune(&mut self) {
        let pruned = self.layers.prune();
        if pruned > 0 {
            log::debug!("Pruned {pruned} dropped objects");
        }
    }

    // Frame

    /// Draw one frame
    ///
    /// A fatal error aborts the frame. Layers stay consistent and the next
    /// call starts from scratch.
    pub fn render(&mut self, backend: &mut dyn RenderBackend) -> RenderResult<()> {
        self.prune();

        let window = self.settings.window();
        let (width, height) = (window.width, window.height);
        let mode = self.settings.stereo_mode();
        let eye_width = f64::from(mode.eye_width(width));
        let eye_height = f64::from(height);

        let objects = self.layers.all();
        self.camera
            .recalc_extent(&mut self.settings, &objects, eye_width, eye_height);
        drop(objects);

        let mut view = self.base_view(eye_width, eye_height);
        let mut drawn = Ok(());
        for pass in mode.passes(width, height) {
            view.anaglyph = pass.anaglyph;
            view.coloranaglyph = pass.coloranaglyph;
            self.begin_pass(backend, &pass, &view);
            drawn = self.draw_eye(backend, &mut view, &pass);
            if drawn.is_err() {
                break;
            }
        }

        // restore the mask and buffer even when a pass failed
        backend.set_color_mask(ColorMask::ALL);
        backend.set_draw_buffer(DrawBuffer::Back);
        drawn?;
        backend.check_error().map_err(|e| {
            log::error!("Backend reported an error after the frame: {e}");
            e
        })
    }

    fn begin_pass(&self, backend: &mut dyn RenderBackend, pass: &EyePass, view: &ViewState) {
        backend.set_draw_buffer(pass.draw_buffer);
        backend.set_viewport(pass.viewport);
        match pass.clear {
            Clear::ColorAndDepth => {
                backend.set_color_mask(ColorMask::ALL);
                backend.clear(view.effective_color(self.settings.background()));
            }
            Clear::Depth => backend.clear_depth(),
            Clear::None => {}
        }
        backend.set_color_mask(pass.color_mask);
    }

    fn draw_eye(
        &mut self,
        backend: &mut dyn RenderBackend,
        view: &mut ViewState,
        pass: &EyePass,
    ) -> RenderResult<()> {
        let transform =
            self.camera
                .world_to_view_transform(&self.settings, view, pass.whicheye, None)?;
        backend.load_projection(&transform.projection.to_gl());
        backend.load_modelview(&transform.modelview.to_gl());
        backend.set_depth_test(true);

        let sources: Vec<LightSource> = self
            .lights
            .iter()
            .map(|light| light.to_source(&view.gcfvec))
            .collect();
        backend.enable_lights(self.settings.ambient(), &sources);
        let drawn = self.draw_world(backend, view);
        backend.disable_lights();
        drawn?;

        Self::draw_screen_objects(backend, view, &transform, pass);
        Ok(())
    }

    fn draw_world(
        &mut self,
        backend: &mut dyn RenderBackend,
        view: &mut ViewState,
    ) -> RenderResult<()> {
        self.layers.reclassify();
        let mut ctx = DrawContext::new(backend, &mut self.shapes);
        for object in self.layers.opaque() {
            render_object(&object, view, &mut ctx)?;
        }

        self.layers.sort_translucent(&view.forward);
        for object in self.layers.translucent() {
            render_object(&object, view, &mut ctx)?;
        }
        Ok(())
    }

    fn draw_screen_objects(
        backend: &mut dyn RenderBackend,
        view: &mut ViewState,
        transform: &ViewTransform,
        pass: &EyePass,
    ) {
        let mut queued = std::mem::take(&mut view.screen_objects);
        if queued.is_empty() {
            return;
        }
        queued.sort_by(|a, b| b.depth.partial_cmp(&a.depth).unwrap_or(Ordering::Equal));

        backend.set_depth_test(false);
        let offset = Vector::new(f64::from(pass.viewport.x), f64::from(pass.viewport.y), 0.0);
        for object in queued.iter().filter(|o| o.depth > 0.0) {
            let anchor = object.anchor.component_mul(&view.gcfvec);
            if let Some(window) = transform
                .scene_view
                .project_to_window(&anchor, transform.viewport)
            {
                backend.draw_screen_text(&(window + offset), &object.text, object.color, object.opacity);
            }
        }
        backend.set_depth_test(true);
    }

    // Picking

    /// Find the nearest object under the cursor
    ///
    /// `x` and `y` are window coordinates with the origin at the top left;
    /// `d_pixels` is the half-size of the pick window. Uses the camera state
    /// from the last rendered frame and a single centered eye over the whole
    /// window. A miss is not an error.
    pub fn pick(
        &mut self,
        backend: &mut dyn RenderBackend,
        x: f64,
        y: f64,
        d_pixels: f64,
    ) -> RenderResult<PickResult> {
        self.prune();

        let window = self.settings.window();
        let width = f64::from(window.width);
        let height = f64::from(window.height);
        let window_y = height - y;

        let objects = self.layers.all();
        let capacity = PickEngine::buffer_capacity(&objects, backend.min_selection_buffer());

        let mut view = self.base_view(width, height);
        let region = PickRegion {
            x,
            y: window_y,
            size: 2.0 * d_pixels,
        };
        let transform =
            self.camera
                .world_to_view_transform(&self.settings, &mut view, 0, Some(region))?;

        backend.begin_selection(capacity)?;
        backend.load_projection(&transform.projection.to_gl());
        backend.load_modelview(&transform.modelview.to_gl());
        let drawn = self.draw_for_pick(backend, &mut view, &objects);
        let buffer = backend.end_selection();
        drawn?;
        let buffer = buffer?;

        let hits = PickEngine::decode(&buffer, capacity).map_err(|e| {
            log::error!("Pick failed: {e}");
            e
        })?;
        log::trace!("Pick at ({x}, {y}) produced {} hits", hits.len());

        let gcfvec = view.gcfvec;
        let center_depth = PickEngine::depth_of(&transform, &gcfvec, &self.settings.center())
            .unwrap_or(0.0);
        let cursor_pos = PickEngine::unproject(&transform, &gcfvec, x, window_y, center_depth)
            .unwrap_or_else(Vector::zeros);

        let result = match PickEngine::nearest(&hits) {
            Some(hit) => PickResult {
                object: PickEngine::resolve(hit, &objects),
                hit_pos: PickEngine::unproject(
                    &transform,
                    &gcfvec,
                    x,
                    window_y,
                    PickEngine::window_depth(hit.min_depth),
                )
                .unwrap_or_else(Vector::zeros),
                cursor_pos,
            },
            None => PickResult {
                object: None,
                hit_pos: Vector::zeros(),
                cursor_pos,
            },
        };

        backend.check_error()?;
        Ok(result)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw_for_pick(
        &mut self,
        backend: &mut dyn RenderBackend,
        view: &mut ViewState,
        objects: &[SharedRenderable],
    ) -> RenderResult<()> {
        let mut ctx = DrawContext::new(backend, &mut self.shapes);
        ctx.backend.push_name(0);
        let result = objects.iter().enumerate().try_for_each(|(index, object)| {
            ctx.backend.load_name(index as u32);
            render_object_for_pick(object, view, &mut ctx)
        });
        ctx.backend.pop_name();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::{SelectionBuffer, Viewport};
    use crate::render::stereo::StereoMode;
    use crate::render::testing::{Call, RecordingBackend};
    use crate::render::RenderError;
    use crate::scene::color::Rgb;
    use crate::scene::frame::Frame;
    use crate::scene::label::Label;
    use crate::scene::renderable::share;
    use crate::scene::shapes::Sphere;
    use approx::assert_relative_eq;

    fn sphere_at(x: f64, y: f64, z: f64) -> Rc<RefCell<Sphere>> {
        share(Sphere::new(Vector::new(x, y, z), 1.0).unwrap())
    }

    #[test]
    fn test_window_properties_lock_while_visible() {
        let mut display = Display::new();
        display.set_title("orbits").unwrap();
        display.show();
        assert_eq!(
            display.set_title("other"),
            Err(SceneError::WindowPropertyLocked("title"))
        );
        assert!(display.set_window_size(800, 600).is_err());
        assert!(display.set_window_position(10, 10).is_err());
        assert!(display.set_fullscreen(true).is_err());
        assert_eq!(display.settings().window().title, "orbits");

        display.hide();
        display.set_window_size(800, 600).unwrap();
        assert_eq!(display.settings().window().width, 800);
        assert!(display.set_window_size(0, 600).is_err());
    }

    #[test]
    fn test_mono_frame_call_order() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        display.add(&ball);

        let mut backend = RecordingBackend::new();
        display.render(&mut backend).unwrap();
        let calls = backend.calls();

        assert_eq!(calls[0], Call::SetDrawBuffer(DrawBuffer::Back));
        assert_eq!(calls[1], Call::SetViewport(Viewport::new(0, 0, 640, 480)));
        assert_eq!(calls[2], Call::SetColorMask(ColorMask::ALL));
        assert_eq!(calls[3], Call::Clear(Rgb::BLACK));
        assert_eq!(calls[4], Call::SetColorMask(ColorMask::ALL));
        assert!(matches!(calls[5], Call::LoadProjection(_)));
        assert!(matches!(calls[6], Call::LoadModelview(_)));
        assert_eq!(calls[7], Call::SetDepthTest(true));
        assert_eq!(calls[8], Call::EnableLights(2));

        let lights_off = calls.iter().position(|c| *c == Call::DisableLights).unwrap();
        let drawn = calls
            .iter()
            .position(|c| matches!(c, Call::RenderList(_)))
            .unwrap();
        assert!(drawn < lights_off);
        assert_eq!(calls.last(), Some(&Call::SetDrawBuffer(DrawBuffer::Back)));
    }

    #[test]
    fn test_shapes_compiled_once_across_frames() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        display.add(&ball);

        let mut backend = RecordingBackend::new();
        display.render(&mut backend).unwrap();
        display.render(&mut backend).unwrap();
        assert_eq!(backend.count(|c| matches!(c, Call::CompileBegin(_))), 1);
        assert_eq!(backend.count(|c| matches!(c, Call::RenderList(_))), 2);

        display.release_shapes();
        display.render(&mut backend).unwrap();
        assert_eq!(backend.count(|c| matches!(c, Call::CompileBegin(_))), 2);
    }

    #[test]
    fn test_autocenter_through_render() {
        let mut display = Display::new();
        display.settings_mut().set_autocenter(true);
        let left = sphere_at(5.0, 0.0, 0.0);
        let right = sphere_at(15.0, 0.0, 0.0);
        display.add(&left);
        display.add(&right);

        display.render(&mut RecordingBackend::new()).unwrap();
        assert_relative_eq!(
            display.settings().center(),
            Vector::new(10.0, 0.0, 0.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_translucent_drawn_back_to_front_after_opaque() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        let blue = Rgb::new(0.0, 0.0, 1.0);
        let green = Rgb::new(0.0, 1.0, 0.0);

        let near = sphere_at(0.0, 0.0, 0.0);
        near.borrow_mut().core_mut().color = blue;
        near.borrow_mut().core_mut().set_opacity(0.5).unwrap();
        let far = sphere_at(0.0, 0.0, -3.0);
        far.borrow_mut().core_mut().color = red;
        far.borrow_mut().core_mut().set_opacity(0.5).unwrap();
        let solid = sphere_at(2.0, 0.0, 0.0);
        solid.borrow_mut().core_mut().color = green;

        let mut display = Display::new();
        display.add(&near);
        display.add(&far);
        display.add(&solid);

        let mut backend = RecordingBackend::new();
        display.render(&mut backend).unwrap();
        let colors: Vec<Rgb> = backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::SetColor(color, _) => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![green, red, blue]);
    }

    #[test]
    fn test_opacity_change_moves_object_between_layers() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        let other = sphere_at(1.0, 0.0, 0.0);
        display.add(&ball);
        display.add(&other);

        ball.borrow_mut().core_mut().set_opacity(0.3).unwrap();
        display.render(&mut RecordingBackend::new()).unwrap();

        let ball_dyn: SharedRenderable = ball;
        let objects = display.objects();
        assert!(Rc::ptr_eq(&objects[1], &ball_dyn));
    }

    #[test]
    fn test_degenerate_projection_aborts_frame() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        display.add(&ball);
        display.settings_mut().set_range_uniform(1e-320).unwrap();

        let mut backend = RecordingBackend::new();
        let result = display.render(&mut backend);
        assert!(matches!(result, Err(RenderError::DegenerateProjection { .. })));
        assert_eq!(backend.count(|c| matches!(c, Call::RenderList(_))), 0);
        assert_eq!(display.object_count(), 1);
    }

    #[test]
    fn test_failed_anaglyph_frame_restores_mask_and_buffer() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        display.add(&ball);
        display.settings_mut().set_stereo_mode(StereoMode::RedCyan);
        display.settings_mut().set_range_uniform(1e-320).unwrap();

        let mut backend = RecordingBackend::new();
        assert!(display.render(&mut backend).is_err());
        let calls = backend.calls();
        assert!(calls.contains(&Call::SetColorMask(ColorMask::RED)));
        assert_eq!(
            calls[calls.len() - 2..],
            [
                Call::SetColorMask(ColorMask::ALL),
                Call::SetDrawBuffer(DrawBuffer::Back)
            ]
        );
    }

    #[test]
    fn test_backend_error_surfaces_after_frame() {
        let mut display = Display::new();
        let mut backend = RecordingBackend::new();
        backend.fail_next_check("out of memory");
        assert_eq!(
            display.render(&mut backend),
            Err(RenderError::BackendError("out of memory".to_string()))
        );
        display.render(&mut backend).unwrap();
    }

    #[test]
    fn test_anaglyph_frame() {
        let mut display = Display::new();
        display.settings_mut().set_stereo_mode(StereoMode::RedCyan);
        let ball = sphere_at(0.0, 0.0, 0.0);
        ball.borrow_mut().core_mut().color = Rgb::new(1.0, 0.0, 0.0);
        display.add(&ball);

        let mut backend = RecordingBackend::new();
        display.render(&mut backend).unwrap();

        assert_eq!(backend.count(|c| matches!(c, Call::LoadProjection(_))), 2);
        assert_eq!(backend.count(|c| *c == Call::ClearDepth), 1);
        assert_eq!(
            backend.count(|c| *c == Call::SetColorMask(ColorMask::RED | ColorMask::ALPHA)),
            1
        );
        let desaturated = Rgb::new(1.0, 0.0, 0.0).desaturate();
        assert_eq!(
            backend.count(|c| matches!(c, Call::SetColor(color, _) if *color == desaturated)),
            2
        );
    }

    #[test]
    fn test_side_by_side_frame() {
        let mut display = Display::new();
        display.settings_mut().set_stereo_mode(StereoMode::Passive);
        let ball = sphere_at(0.0, 0.0, 0.0);
        display.add(&ball);

        let mut backend = RecordingBackend::new();
        display.render(&mut backend).unwrap();
        let viewports: Vec<Viewport> = backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::SetViewport(v) => Some(*v),
                _ => None,
            })
            .collect();
        assert_eq!(
            viewports,
            vec![Viewport::new(0, 0, 320, 480), Viewport::new(321, 0, 320, 480)]
        );
        assert_eq!(backend.count(|c| matches!(c, Call::Clear(_))), 1);
    }

    #[test]
    fn test_labels_drawn_after_world_without_depth() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        let near_label = share(Label::new(Vector::new(0.0, 0.0, 1.0), "near"));
        let far_label = share(Label::new(Vector::new(0.0, 0.0, -1.0), "far"));
        display.add(&ball);
        display.add(&near_label);
        display.add(&far_label);

        let mut backend = RecordingBackend::new();
        display.render(&mut backend).unwrap();
        let calls = backend.calls();

        let lights_off = calls.iter().position(|c| *c == Call::DisableLights).unwrap();
        let texts: Vec<(usize, &str)> = calls
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c {
                Call::ScreenText(text) => Some((i, text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].1, "far");
        assert_eq!(texts[1].1, "near");
        assert!(texts[0].0 > lights_off);
        assert_eq!(calls[texts[0].0 - 1], Call::SetDepthTest(false));
        assert_eq!(calls[texts[1].0 + 1], Call::SetDepthTest(true));
    }

    #[test]
    fn test_dropped_objects_pruned_on_render() {
        let mut display = Display::new();
        let kept = sphere_at(0.0, 0.0, 0.0);
        display.add(&kept);
        {
            let dropped = sphere_at(3.0, 0.0, 0.0);
            display.add(&dropped);
        }
        assert_eq!(display.object_count(), 2);
        display.render(&mut RecordingBackend::new()).unwrap();
        assert_eq!(display.object_count(), 1);
    }

    #[test]
    fn test_add_twice_is_ignored() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        display.add(&ball);
        display.add(&ball);
        assert_eq!(display.object_count(), 1);
        let ball_dyn: SharedRenderable = ball;
        assert!(display.remove(&ball_dyn));
        assert_eq!(display.object_count(), 0);
    }

    #[test]
    fn test_pick_selects_nearest_hit() {
        let mut display = Display::new();
        let a = sphere_at(-2.0, 0.0, 0.0);
        let b = sphere_at(2.0, 0.0, 0.0);
        display.add(&a);
        display.add(&b);

        let mut backend = RecordingBackend::new();
        display.render(&mut backend).unwrap();
        backend.clear_calls();
        backend.script_selection(SelectionBuffer {
            hit_count: 2,
            words: vec![1, 900, 950, 0, 1, 100, 200, 1],
        });

        let result = display.pick(&mut backend, 320.0, 240.0, 2.0).unwrap();
        let b_dyn: SharedRenderable = b;
        assert!(Rc::ptr_eq(result.object.as_ref().unwrap(), &b_dyn));
        assert!(result.hit_pos.iter().all(|c| c.is_finite()));

        let calls = backend.calls();
        assert_eq!(calls[0], Call::BeginSelection(64));
        assert!(calls.contains(&Call::PushName(0)));
        assert!(calls.contains(&Call::LoadName(1)));
        assert_eq!(calls.last(), Some(&Call::EndSelection));
    }

    #[test]
    fn test_pick_miss_is_not_an_error() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        display.add(&ball);

        let mut backend = RecordingBackend::new();
        display.render(&mut backend).unwrap();
        let result = display.pick(&mut backend, 5.0, 5.0, 2.0).unwrap();
        assert!(!result.is_hit());
        assert_eq!(result.hit_pos, Vector::zeros());
    }

    #[test]
    fn test_pick_cursor_at_window_center_is_scene_center() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        display.add(&ball);

        let mut backend = RecordingBackend::new();
        display.render(&mut backend).unwrap();
        let result = display.pick(&mut backend, 320.0, 240.0, 2.0).unwrap();
        assert_relative_eq!(result.cursor_pos, Vector::zeros(), epsilon = 1e-6);
    }

    #[test]
    fn test_pick_overflow_is_reported() {
        let mut display = Display::new();
        let ball = sphere_at(0.0, 0.0, 0.0);
        display.add(&ball);

        let mut backend = RecordingBackend::new();
        backend.script_selection(SelectionBuffer {
            hit_count: -1,
            words: Vec::new(),
        });
        assert_eq!(
            display.pick(&mut backend, 320.0, 240.0, 2.0).unwrap_err(),
            RenderError::PickBufferOverflow { capacity: 64 }
        );
    }

    #[test]
    fn test_pick_resolves_frame_children() {
        let mut display = Display::new();
        let leaf = sphere_at(0.0, 0.0, 0.0);
        let mut frame = Frame::new(Vector::new(1.0, 0.0, 0.0));
        frame.add_child(&leaf);
        let frame = share(frame);
        display.add(&frame);

        let mut backend = RecordingBackend::new();
        backend.script_selection(SelectionBuffer {
            hit_count: 1,
            words: vec![2, 10, 20, 0, 0],
        });
        let result = display.pick(&mut backend, 320.0, 240.0, 2.0).unwrap();
        let leaf_dyn: SharedRenderable = leaf;
        assert!(Rc::ptr_eq(result.object.as_ref().unwrap(), &leaf_dyn));
        // the frame pushes its own name level for its children
        assert_eq!(backend.count(|c| matches!(c, Call::PushName(_))), 2);
    }

    #[test]
    fn test_pick_buffer_holds_every_frame_child() {
        let mut display = Display::new();
        let mut frame = Frame::new(Vector::zeros());
        let children: Vec<_> = (0..20).map(|_| sphere_at(0.0, 0.0, 0.0)).collect();
        for child in &children {
            frame.add_child(child);
        }
        let frame = share(frame);
        display.add(&frame);

        // every child overlaps the cursor; the last one is nearest
        let mut words = Vec::new();
        for index in 0..20u32 {
            let depth = 1000 - index;
            words.extend_from_slice(&[2, depth, depth + 5, 0, index]);
        }
        let mut backend = RecordingBackend::new();
        backend.script_selection(SelectionBuffer { hit_count: 20, words });

        let result = display.pick(&mut backend, 320.0, 240.0, 2.0).unwrap();
        assert_eq!(backend.count(|c| *c == Call::BeginSelection(100)), 1);
        let nearest: SharedRenderable = children[19].clone();
        assert!(Rc::ptr_eq(result.object.as_ref().unwrap(), &nearest));
    }

    #[test]
    fn test_with_settings_validates() {
        let settings = SceneSettings::default().with_window_size(800, 600);
        let display = Display::with_settings(settings).unwrap();
        assert_eq!(display.settings().window().height, 600);
        assert_eq!(display.lights().len(), 2);
    }
}
