//! Camera derivation
//!
//! Turns the scene settings and the accumulated extent into a global scale
//! factor and, per eye, a projection and modelview matrix.
//!
//! ## Design
//!
//! Geometry is drawn in *render units*: world coordinates multiplied by the
//! global scale factor `gcf` (or per axis by `gcfvec` when scaling is not
//! uniform). Keeping the visible scene near unit size protects depth-buffer
//! precision regardless of how large or small the user's coordinates are.
//!
//! `recalc_extent` runs once per frame before any eye pass. It applies
//! autocenter, updates the automatic camera distance with hysteresis, and
//! recomputes `gcf`. `world_to_view_transform` then derives the camera
//! position, clip planes and stereo offsets for one eye.

use super::{RenderError, RenderResult};
use crate::foundation::math::{Tmatrix, Vector, VectorExt, ViewportRect};
use crate::scene::extent::Extent;
use crate::scene::renderable::SharedRenderable;
use crate::scene::settings::SceneSettings;
use crate::scene::view::ViewState;

/// Relative squared-distance change below which autocenter has converged
const AUTOCENTER_EPSILON: f64 = 1e-6;

/// Upper bound on autocenter passes in one frame
const MAX_AUTOCENTER_ITERATIONS: usize = 64;

/// The automatic range only shrinks once the scene falls below this fraction
const SHRINK_HYSTERESIS: f64 = 1.0 / 3.0;

/// Extra room around the computed camera distance
const DISTANCE_MARGIN: f64 = 1.02;

/// Distance numerator used when nothing else determines the camera distance
const FALLBACK_DISTANCE: f64 = 10.0;

/// Near clip offset; the near plane is `fwz^2 / (NEAR_DENOMINATOR + fwz)`
const NEAR_DENOMINATOR: f64 = 100.0;

/// Far clip margin past the farthest object
const FAR_MARGIN: f64 = 1.05;

/// Fraction of the focal half-width used as the eye separation
const STEREO_SEPARATION: f64 = 0.02;

/// Tangents of the horizontal and vertical half fields of view
///
/// `fov` applies to the narrower viewport dimension.
pub fn tan_hfov(fov: f64, view_width: f64, view_height: f64) -> (f64, f64) {
    let t = (fov / 2.0).tan();
    let aspect = view_height / view_width;
    if aspect > 1.0 {
        (t / aspect, t)
    } else {
        (t, t * aspect)
    }
}

/// Pick window around the cursor, in window coordinates with origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickRegion {
    /// Cursor x
    pub x: f64,
    /// Cursor y, bottom-left origin
    pub y: f64,
    /// Side of the square pick window in pixels
    pub size: f64,
}

/// Matrices for one eye pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Projection, prefixed by the pick region when picking
    pub projection: Tmatrix,
    /// Modelview applied to geometry in render units
    pub modelview: Tmatrix,
    /// Frustum times look-at, without pick prefix or axis correction
    ///
    /// Maps `gcfvec`-scaled world points to clip space; used to project
    /// anchors and to unproject pick hits.
    pub scene_view: Tmatrix,
    /// Viewport the projection was built for
    pub viewport: ViewportRect,
    /// Near clip distance in render units
    pub near: f64,
    /// Far clip distance in render units
    pub far: f64,
}

/// Camera state carried between frames
#[derive(Debug, Clone)]
pub struct Camera {
    range_auto: f64,
    gcf: f64,
    gcfvec: Vector,
    extent: Extent,
    cam_to_center: f64,
    position: Vector,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

fn frustum_is_valid(near: f64, far: f64, tan_x: f64, tan_y: f64) -> bool {
    near > 0.0 && far > near && tan_x > 0.0 && tan_y > 0.0
}

impl Camera {
    /// Camera with unit scale and no automatic range yet
    pub fn new() -> Self {
        Self {
            range_auto: 0.0,
            gcf: 1.0,
            gcfvec: Vector::repeat(1.0),
            extent: Extent::default(),
            cam_to_center: 0.0,
            position: Vector::zeros(),
        }
    }

    /// Global scale factor
    pub const fn gcf(&self) -> f64 {
        self.gcf
    }

    /// Per-axis scale factors
    pub const fn gcfvec(&self) -> Vector {
        self.gcfvec
    }

    /// Automatic camera distance in world units; zero until the first extent
    pub const fn range_auto(&self) -> f64 {
        self.range_auto
    }

    /// Extent from the last `recalc_extent`
    pub const fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Camera position in world coordinates from the last transform
    pub const fn position(&self) -> Vector {
        self.position
    }

    /// Camera-to-center distance in render units from the last transform
    pub const fn cam_to_center(&self) -> f64 {
        self.cam_to_center
    }

    /// Recompute the extent, autocenter, automatic range and scale factor
    ///
    /// Must run once per frame before any eye pass. `view_width` is the
    /// width of a single eye's viewport.
    pub fn recalc_extent(
        &mut self,
        settings: &mut SceneSettings,
        objects: &[SharedRenderable],
        view_width: f64,
        view_height: f64,
    ) {
        let (tan_x, tan_y) = tan_hfov(settings.fov(), view_width, view_height);
        let tan_wide = tan_x.max(tan_y);
        let forward = settings.forward();

        let mut iterations = 0;
        loop {
            self.extent.reset(settings.center(), forward, tan_wide);
            for object in objects {
                object.borrow().outer_grow_extent(&mut self.extent);
            }

            if !settings.autocenter() || self.extent.is_empty() {
                break;
            }
            let old = settings.center();
            let new = self.extent.get_center();
            if (old - new).mag2() <= (old.mag2() + new.mag2()) * AUTOCENTER_EPSILON {
                break;
            }
            settings.recenter(new);
            iterations += 1;
            if iterations >= MAX_AUTOCENTER_ITERATIONS {
                log::warn!("Autocenter did not converge after {iterations} passes");
                self.extent.reset(settings.center(), forward, tan_wide);
                for object in objects {
                    object.borrow().outer_grow_extent(&mut self.extent);
                }
                break;
            }
        }

        if settings.autoscale() {
            let recommended = self.extent.get_camera_z();
            if !settings.uniform() || recommended > self.range_auto {
                self.range_auto = recommended;
            } else if recommended < self.range_auto * SHRINK_HYSTERESIS {
                log::debug!(
                    "Automatic range shrinking from {} to {recommended}",
                    self.range_auto
                );
                self.range_auto = recommended;
            }
        }

        let previous = self.gcf;
        if settings.has_explicit_range() {
            let range = settings.range();
            self.gcfvec = if settings.uniform() {
                Vector::repeat(1.0 / range.x)
            } else {
                range.map(|r| 1.0 / r)
            };
            self.gcf = self.gcfvec.x;
        } else if settings.autoscale() {
            let radius = self.extent.radius();
            if radius > 0.0 {
                self.gcf = 1.0 / radius;
                self.gcfvec = Vector::repeat(self.gcf);
            }
        }

        if previous != 0.0 && (self.gcf / previous > 2.0 || previous / self.gcf > 2.0) {
            log::debug!("Global scale factor changed from {previous} to {}", self.gcf);
        }
    }

    /// Derive the matrices for one eye
    ///
    /// `whicheye` is -1, 0 or +1. With a pick region the projection is
    /// restricted to that window. Fills in the camera fields of `view`.
    pub fn world_to_view_transform(
        &mut self,
        settings: &SceneSettings,
        view: &mut ViewState,
        whicheye: i32,
        pick: Option<PickRegion>,
    ) -> RenderResult<ViewTransform> {
        let (tan_x, tan_y) = tan_hfov(settings.fov(), view.view_width, view.view_height);
        let cot_hfov = if settings.uniform() {
            1.0 / tan_x.max(tan_y)
        } else {
            1.0 / tan_x
        };
        let forward = settings.forward().unit_or_zero();
        let up = non_parallel_up(&forward, &settings.up());
        let scene_center = settings.center().component_mul(&self.gcfvec);

        let explicit = settings
            .has_explicit_range()
            .then(|| settings.range().x * cot_hfov / DISTANCE_MARGIN);
        let automatic = (!settings.has_explicit_range() && self.range_auto > 0.0)
            .then_some(self.range_auto);
        let world_distance = match (explicit, automatic) {
            (Some(a), Some(b)) => a.min(b),
            (Some(d), None) | (None, Some(d)) => d,
            (None, None) => FALLBACK_DISTANCE / (settings.fov() / 2.0).sin(),
        };

        let cam_to_center_without_zoom = world_distance * self.gcf * DISTANCE_MARGIN;
        let cam_to_center = cam_to_center_without_zoom * settings.user_scale();

        let fwz = cam_to_center_without_zoom + 1.0;
        let near = fwz * fwz / (NEAR_DENOMINATOR + fwz) * settings.user_scale();
        let farthest = self.extent.farthest() * self.gcf;
        let far = (FAR_MARGIN * (farthest + cam_to_center)).max(1.001 * near);

        if !frustum_is_valid(near, far, tan_x, tan_y) {
            log::error!(
                "Degenerate projection: near={near}, far={far}, tan=({tan_x}, {tan_y}), gcf={}",
                self.gcf
            );
            return Err(RenderError::DegenerateProjection {
                near,
                far,
                tan_hfov_x: tan_x,
                tan_hfov_y: tan_y,
            });
        }

        let focal_length = cam_to_center + 0.5 * settings.stereo_depth();
        let stereo_offset = tan_x * focal_length * STEREO_SEPARATION;
        let eye = f64::from(whicheye);
        let right = forward.cross(&up).unit_or_zero();
        let eye_shift = right * (stereo_offset * eye);
        let frustum_shift = -eye * stereo_offset * near / focal_length;

        let scene_camera = scene_center - forward * cam_to_center + eye_shift;
        let look_target = scene_center + eye_shift;

        let frustum = Tmatrix::frustum(
            -near * tan_x + frustum_shift,
            near * tan_x + frustum_shift,
            -near * tan_y,
            near * tan_y,
            near,
            far,
        );
        let look_at = Tmatrix::look_at(&scene_camera, &look_target, &up);

        let mut modelview = look_at;
        modelview.scale(&(self.gcfvec / self.gcf));

        let viewport = [0.0, 0.0, view.view_width, view.view_height];
        let projection = match pick {
            Some(region) => {
                Tmatrix::pick_region(region.x, region.y, region.size, region.size, viewport) * frustum
            }
            None => frustum,
        };

        self.cam_to_center = cam_to_center;
        self.position = scene_camera.component_div(&self.gcfvec);

        view.camera = self.position;
        view.forward = forward;
        view.center = settings.center();
        view.up = up;
        view.gcf = self.gcf;
        view.gcfvec = self.gcfvec;
        view.tan_hfov_x = tan_x;
        view.tan_hfov_y = tan_y;

        log::trace!(
            "Eye {whicheye}: camera={:?} near={near} far={far} gcf={}",
            self.position,
            self.gcf
        );

        Ok(ViewTransform {
            projection,
            modelview,
            scene_view: frustum * look_at,
            viewport,
            near,
            far,
        })
    }
}

/// `up`, replaced by a perpendicular axis when it is parallel to `forward`
fn non_parallel_up(forward: &Vector, up: &Vector) -> Vector {
    if forward.cross(up).mag2() > 1e-20 * up.mag2() {
        return *up;
    }
    let candidate = if forward.x.abs() < 0.9 { Vector::x() } else { Vector::z() };
    forward.cross(&candidate).cross(forward).unit_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::renderable::share;
    use crate::scene::shapes::Sphere;
    use approx::assert_relative_eq;

    fn view(width: f64, height: f64) -> ViewState {
        ViewState::new(Vector::new(0.0, 0.0, -1.0), Vector::zeros(), Vector::y(), width, height)
    }

    fn spheres(positions: &[(f64, f64, f64)], radius: f64) -> Vec<SharedRenderable> {
        positions
            .iter()
            .map(|&(x, y, z)| {
                let shared: SharedRenderable =
                    share(Sphere::new(Vector::new(x, y, z), radius).unwrap());
                shared
            })
            .collect()
    }

    #[test]
    fn test_tan_hfov_uses_narrow_dimension() {
        let (x, y) = tan_hfov(std::f64::consts::FRAC_PI_2, 200.0, 100.0);
        assert_relative_eq!(x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y, 0.5, epsilon = 1e-12);

        let (x, y) = tan_hfov(std::f64::consts::FRAC_PI_2, 100.0, 200.0);
        assert_relative_eq!(x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_autocenter_converges_on_midpoint() {
        let mut settings = SceneSettings::default()
            .with_center(Vector::new(3.0, 3.0, 0.0))
            .with_autocenter(true);
        let objects = spheres(&[(-5.0, 0.0, 0.0), (5.0, 0.0, 0.0)], 0.5);
        let mut camera = Camera::new();
        camera.recalc_extent(&mut settings, &objects, 640.0, 480.0);
        assert_relative_eq!(settings.center(), Vector::zeros(), epsilon = 1e-9);
    }

    #[test]
    fn test_autocenter_off_keeps_center() {
        let mut settings = SceneSettings::default().with_center(Vector::new(1.0, 0.0, 0.0));
        let objects = spheres(&[(5.0, 0.0, 0.0)], 1.0);
        let mut camera = Camera::new();
        camera.recalc_extent(&mut settings, &objects, 640.0, 480.0);
        assert_eq!(settings.center(), Vector::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_autoscale_hysteresis() {
        let mut settings = SceneSettings::default();
        let mut camera = Camera::new();

        let big = spheres(&[(0.0, 0.0, 0.0)], 3.0);
        camera.recalc_extent(&mut settings, &big, 640.0, 480.0);
        let grown = camera.range_auto();
        assert!(grown > 0.0);

        // shrinking by half keeps the range
        let half = spheres(&[(0.0, 0.0, 0.0)], 1.5);
        camera.recalc_extent(&mut settings, &half, 640.0, 480.0);
        assert_relative_eq!(camera.range_auto(), grown);

        // shrinking below a third follows the scene
        let small = spheres(&[(0.0, 0.0, 0.0)], 0.5);
        camera.recalc_extent(&mut settings, &small, 640.0, 480.0);
        assert_relative_eq!(camera.range_auto(), grown / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_explicit_range_sets_gcf() {
        let mut settings = SceneSettings::default();
        settings.set_range_uniform(4.0).unwrap();
        let mut camera = Camera::new();
        camera.recalc_extent(&mut settings, &[], 640.0, 480.0);
        assert_relative_eq!(camera.gcf(), 0.25);
        assert_eq!(camera.range_auto(), 0.0);

        settings.set_uniform(false);
        settings.set_range(Vector::new(4.0, 2.0, 1.0)).unwrap();
        camera.recalc_extent(&mut settings, &[], 640.0, 480.0);
        assert_relative_eq!(camera.gcfvec(), Vector::new(0.25, 0.5, 1.0));
        assert_relative_eq!(camera.gcf(), 0.25);
    }

    #[test]
    fn test_autoscale_gcf_from_radius() {
        let mut settings = SceneSettings::default();
        let objects = spheres(&[(0.0, 0.0, 0.0)], 2.0);
        let mut camera = Camera::new();
        camera.recalc_extent(&mut settings, &objects, 640.0, 480.0);
        // radius is the distance to a bounds corner
        assert_relative_eq!(camera.gcf(), 1.0 / (2.0 * 3.0_f64.sqrt()), epsilon = 1e-12);
    }

    #[test]
    fn test_mono_camera_looks_at_center() {
        let mut settings = SceneSettings::default();
        let objects = spheres(&[(0.0, 0.0, 0.0)], 1.0);
        let mut camera = Camera::new();
        camera.recalc_extent(&mut settings, &objects, 640.0, 480.0);

        let mut view = view(640.0, 480.0);
        let transform = camera
            .world_to_view_transform(&settings, &mut view, 0, None)
            .unwrap();

        assert!(view.camera.z > 0.0);
        assert_relative_eq!(view.camera.x, 0.0, epsilon = 1e-12);
        assert!(transform.near > 0.0 && transform.far > transform.near);
        let center = transform
            .scene_view
            .project_to_window(&Vector::zeros(), transform.viewport)
            .unwrap();
        assert_relative_eq!(center.x, 320.0, epsilon = 1e-9);
        assert_relative_eq!(center.y, 240.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stereo_eyes_are_symmetric() {
        let mut settings = SceneSettings::default();
        let objects = spheres(&[(0.0, 0.0, 0.0)], 1.0);
        let mut camera = Camera::new();
        camera.recalc_extent(&mut settings, &objects, 640.0, 480.0);

        let mut view = view(640.0, 480.0);
        camera.world_to_view_transform(&settings, &mut view, -1, None).unwrap();
        let left = view.camera;
        camera.world_to_view_transform(&settings, &mut view, 1, None).unwrap();
        let right = view.camera;
        assert!(left.x < 0.0);
        assert_relative_eq!(left.x, -right.x, epsilon = 1e-12);
        assert_relative_eq!(left.z, right.z, epsilon = 1e-12);
    }

    #[test]
    fn test_fallback_distance_without_extent() {
        let settings = SceneSettings::default();
        let mut camera = Camera::new();
        let mut view = view(640.0, 480.0);
        camera.world_to_view_transform(&settings, &mut view, 0, None).unwrap();
        let expected = 10.0 / (settings.fov() / 2.0).sin() * 1.02;
        assert_relative_eq!(camera.cam_to_center(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_overflowed_scale_is_degenerate_projection() {
        let mut settings = SceneSettings::default();
        settings.set_range_uniform(1e-320).unwrap();
        let mut camera = Camera::new();
        camera.recalc_extent(&mut settings, &[], 640.0, 480.0);
        let mut view = view(640.0, 480.0);
        let result = camera.world_to_view_transform(&settings, &mut view, 0, None);
        assert!(matches!(result, Err(RenderError::DegenerateProjection { .. })));
    }

    #[test]
    fn test_frustum_validation() {
        assert!(frustum_is_valid(0.1, 10.0, 1.0, 0.75));
        assert!(!frustum_is_valid(0.0, 10.0, 1.0, 0.75));
        assert!(!frustum_is_valid(0.1, 0.1, 1.0, 0.75));
        assert!(!frustum_is_valid(f64::NAN, 10.0, 1.0, 0.75));
        assert!(!frustum_is_valid(0.1, 10.0, 0.0, 0.75));
    }

    #[test]
    fn test_up_parallel_to_forward_is_replaced() {
        let up = non_parallel_up(&Vector::new(0.0, 1.0, 0.0), &Vector::new(0.0, 2.0, 0.0));
        assert_relative_eq!(up.dot(&Vector::y()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(up.norm(), 1.0, epsilon = 1e-12);
    }
}
