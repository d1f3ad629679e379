//! Math utilities and types
//!
//! Provides the vector and affine-matrix types every renderable uses to move
//! from object space to world space to eye space. Matrices are stored
//! column-major (nalgebra's native layout), which is also the layout the
//! render backend expects, so they can be handed over without transposing.

use std::ops::Mul;

pub use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// 3D vector type used for positions, directions and per-axis scales
pub type Vector = Vector3<f64>;

/// Cosine threshold beyond which `diff_angle` switches to the chord formula
const DIFF_ANGLE_CHORD_THRESHOLD: f64 = 0.999;

/// Extension trait for [`Vector`] with the operations the scene code relies on
///
/// nalgebra already provides `dot`, `cross`, `component_mul` and
/// `component_div`; this trait adds the zero-safe and numerically stable
/// variants.
pub trait VectorExt {
    /// Length of the vector
    fn mag(&self) -> f64;

    /// Squared length of the vector
    fn mag2(&self) -> f64;

    /// Unit vector in the same direction, or the zero vector for zero input
    ///
    /// Never divides by zero and never produces NaN.
    fn unit_or_zero(&self) -> Vector;

    /// Angle between two vectors in `[0, π]`
    ///
    /// Uses the chord-length/asin form near 0 and π where `acos` loses
    /// precision. Returns 0 if either vector has zero length.
    fn diff_angle(&self, other: &Vector) -> f64;

    /// Rotate this vector by `angle` radians about `axis` (through the origin)
    fn rotate(&self, angle: f64, axis: &Vector) -> Vector;
}

impl VectorExt for Vector {
    fn mag(&self) -> f64 {
        self.norm()
    }

    fn mag2(&self) -> f64 {
        self.norm_squared()
    }

    fn unit_or_zero(&self) -> Vector {
        let mag = self.mag();
        if mag == 0.0 {
            Vector::zeros()
        } else {
            self * (1.0 / mag)
        }
    }

    fn diff_angle(&self, other: &Vector) -> f64 {
        if self.mag2() == 0.0 || other.mag2() == 0.0 {
            return 0.0;
        }
        let a = self.unit_or_zero();
        let b = other.unit_or_zero();
        let d = a.dot(&b);
        if d > DIFF_ANGLE_CHORD_THRESHOLD {
            let chord = (b - a).mag();
            2.0 * (chord / 2.0).min(1.0).asin()
        } else if d < -DIFF_ANGLE_CHORD_THRESHOLD {
            let chord = (b + a).mag();
            std::f64::consts::PI - 2.0 * (chord / 2.0).min(1.0).asin()
        } else {
            d.acos()
        }
    }

    fn rotate(&self, angle: f64, axis: &Vector) -> Vector {
        rotation(angle, axis).times_v(self)
    }
}

/// Viewport rectangle in window pixels: `[x, y, width, height]`
pub type ViewportRect = [f64; 4];

/// 4x4 homogeneous affine transform
///
/// The upper-left 3x3 block holds rotation and scale, the fourth column holds
/// the translation, and the last row is `(0, 0, 0, 1)` for every affine map.
/// Projection matrices built by [`Tmatrix::frustum`] are the one exception
/// and are only ever used on the projection side of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tmatrix {
    m: Matrix4<f64>,
}

impl Default for Tmatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Tmatrix {
    /// Identity transform
    pub fn identity() -> Self {
        Self { m: Matrix4::identity() }
    }

    /// Wrap an existing nalgebra matrix
    pub const fn from_matrix(m: Matrix4<f64>) -> Self {
        Self { m }
    }

    /// Borrow the underlying nalgebra matrix
    pub const fn as_matrix(&self) -> &Matrix4<f64> {
        &self.m
    }

    /// Element access by (row, column)
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[(row, col)]
    }

    /// Set the first column of the linear block
    pub fn x_column(&mut self, v: &Vector) {
        self.set_column(0, v);
    }

    /// Set the second column of the linear block
    pub fn y_column(&mut self, v: &Vector) {
        self.set_column(1, v);
    }

    /// Set the third column of the linear block
    pub fn z_column(&mut self, v: &Vector) {
        self.set_column(2, v);
    }

    /// Set the translation column
    pub fn w_column(&mut self, v: &Vector) {
        self.set_column(3, v);
    }

    /// Reset the bottom row to `(0, 0, 0, 1)`
    pub fn w_row(&mut self) {
        self.m[(3, 0)] = 0.0;
        self.m[(3, 1)] = 0.0;
        self.m[(3, 2)] = 0.0;
        self.m[(3, 3)] = 1.0;
    }

    fn set_column(&mut self, col: usize, v: &Vector) {
        self.m[(0, col)] = v.x;
        self.m[(1, col)] = v.y;
        self.m[(2, col)] = v.z;
    }

    /// Translation currently held in the fourth column
    pub fn translation(&self) -> Vector {
        Vector::new(self.m[(0, 3)], self.m[(1, 3)], self.m[(2, 3)])
    }

    /// Right-multiply in place by a scale matrix built from `v`
    ///
    /// The scale is applied before the existing transform, i.e. in object
    /// space.
    pub fn scale(&mut self, v: &Vector) {
        for row in 0..4 {
            self.m[(row, 0)] *= v.x;
            self.m[(row, 1)] *= v.y;
            self.m[(row, 2)] *= v.z;
        }
    }

    /// Right-multiply in place by a translation matrix built from `v`
    pub fn translate(&mut self, v: &Vector) {
        let offset = self.times_v(v);
        let w = self.translation() + offset;
        self.w_column(&w);
    }

    /// Transform a point, including translation and the homogeneous divide
    ///
    /// A zero `w` leaves the coordinates undivided.
    pub fn project(&self, p: &Vector) -> Vector {
        let h = self.m * Vector4::new(p.x, p.y, p.z, 1.0);
        if h.w == 0.0 {
            Vector::new(h.x, h.y, h.z)
        } else {
            Vector::new(h.x / h.w, h.y / h.w, h.z / h.w)
        }
    }

    /// Transform a direction through the linear block only
    pub fn times_v(&self, v: &Vector) -> Vector {
        self.m.fixed_view::<3, 3>(0, 0) * v
    }

    /// General inverse, `None` when the matrix is singular
    pub fn inverse(&self) -> Option<Self> {
        self.m.try_inverse().map(Self::from_matrix)
    }

    /// The sixteen elements in column-major order, as the backend expects
    pub fn to_gl(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.m.as_slice());
        out
    }

    /// Perspective frustum with the given clip-plane extents (glFrustum layout)
    pub fn frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        let mut m = Matrix4::zeros();
        m[(0, 0)] = 2.0 * near / (right - left);
        m[(0, 2)] = (right + left) / (right - left);
        m[(1, 1)] = 2.0 * near / (top - bottom);
        m[(1, 2)] = (top + bottom) / (top - bottom);
        m[(2, 2)] = -(far + near) / (far - near);
        m[(2, 3)] = -2.0 * far * near / (far - near);
        m[(3, 2)] = -1.0;
        Self { m }
    }

    /// Right-handed look-at view matrix (gluLookAt layout)
    pub fn look_at(eye: &Vector, center: &Vector, up: &Vector) -> Self {
        let f = (center - eye).unit_or_zero();
        let s = f.cross(up).unit_or_zero();
        let u = s.cross(&f);
        Self {
            m: Matrix4::new(
                s.x, s.y, s.z, -s.dot(eye),
                u.x, u.y, u.z, -u.dot(eye),
                -f.x, -f.y, -f.z, f.dot(eye),
                0.0, 0.0, 0.0, 1.0,
            ),
        }
    }

    /// Projection prefix restricting drawing to a `width` x `height` pixel
    /// region centered on window position (`x`, `y`) (gluPickMatrix layout)
    pub fn pick_region(x: f64, y: f64, width: f64, height: f64, viewport: ViewportRect) -> Self {
        let [vx, vy, vw, vh] = viewport;
        let mut m = Matrix4::identity();
        m[(0, 0)] = vw / width;
        m[(1, 1)] = vh / height;
        m[(0, 3)] = (vw - 2.0 * (x - vx)) / width;
        m[(1, 3)] = (vh - 2.0 * (y - vy)) / height;
        Self { m }
    }

    /// Map a point through this (projection x view) matrix to window
    /// coordinates; `z` is the normalized depth in `[0, 1]`
    pub fn project_to_window(&self, p: &Vector, viewport: ViewportRect) -> Option<Vector> {
        let clip = self.m * Vector4::new(p.x, p.y, p.z, 1.0);
        if clip.w == 0.0 {
            return None;
        }
        let ndc = Vector::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w);
        let [vx, vy, vw, vh] = viewport;
        Some(Vector::new(
            vx + vw * (ndc.x + 1.0) / 2.0,
            vy + vh * (ndc.y + 1.0) / 2.0,
            (ndc.z + 1.0) / 2.0,
        ))
    }

    /// Inverse of [`Tmatrix::project_to_window`]
    pub fn unproject_from_window(&self, win: &Vector, viewport: ViewportRect) -> Option<Vector> {
        let inverse = self.m.try_inverse()?;
        let [vx, vy, vw, vh] = viewport;
        let ndc = Vector4::new(
            2.0 * (win.x - vx) / vw - 1.0,
            2.0 * (win.y - vy) / vh - 1.0,
            2.0 * win.z - 1.0,
            1.0,
        );
        let obj = inverse * ndc;
        if obj.w == 0.0 {
            return None;
        }
        Some(Vector::new(obj.x / obj.w, obj.y / obj.w, obj.z / obj.w))
    }
}

impl Mul for Tmatrix {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self { m: self.m * rhs.m }
    }
}

impl Mul<&Tmatrix> for &Tmatrix {
    type Output = Tmatrix;

    fn mul(self, rhs: &Tmatrix) -> Tmatrix {
        Tmatrix { m: self.m * rhs.m }
    }
}

/// Pure rotation by `angle` radians about `axis` through the origin
///
/// Closed (Rodrigues) form with a single sin/cos evaluation. A zero axis
/// yields the identity.
pub fn rotation(angle: f64, axis: &Vector) -> Tmatrix {
    let k = axis.unit_or_zero();
    if k.mag2() == 0.0 {
        return Tmatrix::identity();
    }
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let (x, y, z) = (k.x, k.y, k.z);
    Tmatrix::from_matrix(Matrix4::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y, 0.0,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x, 0.0,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,     0.0,
        0.0,               0.0,               0.0,               1.0,
    ))
}

/// Rotation by `angle` radians about `axis` passing through `origin`
///
/// Built from the origin-centered rotation with the translation column
/// adjusted so that `origin` maps onto itself.
pub fn rotation_about(angle: f64, axis: &Vector, origin: &Vector) -> Tmatrix {
    let mut ret = rotation(angle, axis);
    let rotated_origin = ret.times_v(origin);
    ret.w_column(&(origin - rotated_origin));
    ret
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f64 = std::f64::consts::PI;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_vec_eq(a: Vector, b: Vector) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-9);
    }

    #[test]
    fn test_unit_or_zero_is_idempotent() {
        let v = Vector::new(3.0, -4.0, 12.0);
        let once = v.unit_or_zero();
        assert_relative_eq!(once.mag(), 1.0, epsilon = 1e-12);
        assert_vec_eq(once.unit_or_zero(), once);
    }

    #[test]
    fn test_unit_or_zero_of_zero_is_zero() {
        let n = Vector::zeros().unit_or_zero();
        assert_eq!(n, Vector::zeros());
        assert!(!n.x.is_nan());
    }

    #[test]
    fn test_diff_angle_extremes() {
        let v = Vector::new(1.0, 2.0, 3.0);
        assert_eq!(v.diff_angle(&v), 0.0);
        assert_relative_eq!(v.diff_angle(&-v), PI);
        assert_relative_eq!(
            Vector::x().diff_angle(&Vector::y()),
            FRAC_PI_2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_diff_angle_symmetric_and_bounded() {
        let samples = [
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(1.0, 1e-7, 0.0),
            Vector::new(-1.0, 1e-7, 0.0),
            Vector::new(0.3, -2.0, 5.0),
            Vector::new(-7.0, 0.1, -0.2),
        ];
        for a in &samples {
            for b in &samples {
                let ab = a.diff_angle(b);
                assert_eq!(ab, b.diff_angle(a));
                assert!((0.0..=PI).contains(&ab));
            }
        }
    }

    #[test]
    fn test_diff_angle_precise_near_zero() {
        let a = Vector::new(1.0, 0.0, 0.0);
        let b = Vector::new(1.0, 1e-7, 0.0);
        // acos(dot) would round this to zero
        assert_relative_eq!(a.diff_angle(&b), 1e-7, max_relative = 1e-6);
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let r = rotation(FRAC_PI_2, &Vector::z());
        assert_vec_eq(r.times_v(&Vector::x()), Vector::y());
        assert_vec_eq(Vector::y().rotate(FRAC_PI_2, &Vector::z()), -Vector::x());
    }

    #[test]
    fn test_rotation_about_keeps_pivot_fixed() {
        let pivot = Vector::new(2.0, -1.0, 5.0);
        let r = rotation_about(1.234, &Vector::new(1.0, 1.0, 0.0), &pivot);
        assert_vec_eq(r.project(&pivot), pivot);
    }

    #[test]
    fn test_rotation_with_zero_axis_is_identity() {
        assert_eq!(rotation(1.0, &Vector::zeros()), Tmatrix::identity());
    }

    #[test]
    fn test_scale_then_translate_order() {
        let mut m = Tmatrix::identity();
        m.w_column(&Vector::new(1.0, 2.0, 3.0));
        m.scale(&Vector::new(2.0, 2.0, 2.0));
        assert_vec_eq(m.project(&Vector::new(1.0, 0.0, 0.0)), Vector::new(3.0, 2.0, 3.0));

        m.translate(&Vector::new(1.0, 0.0, 0.0));
        assert_vec_eq(m.translation(), Vector::new(3.0, 2.0, 3.0));
    }

    #[test]
    fn test_inverse_undoes_transform() {
        let mut m = rotation_about(0.7, &Vector::new(0.0, 1.0, 1.0), &Vector::new(1.0, 0.0, 0.0));
        m.scale(&Vector::new(2.0, 3.0, 4.0));
        let inv = m.inverse().expect("affine matrix should invert");
        let p = Vector::new(0.5, -1.5, 2.5);
        assert_vec_eq(inv.project(&m.project(&p)), p);
    }

    #[test]
    fn test_to_gl_is_column_major() {
        let mut m = Tmatrix::identity();
        m.w_column(&Vector::new(7.0, 8.0, 9.0));
        let gl = m.to_gl();
        assert_eq!(&gl[12..15], &[7.0, 8.0, 9.0]);
        assert_eq!(gl[15], 1.0);
    }

    #[test]
    fn test_look_at_places_center_on_negative_z() {
        let view = Tmatrix::look_at(
            &Vector::new(0.0, 0.0, 10.0),
            &Vector::zeros(),
            &Vector::y(),
        );
        assert_vec_eq(view.project(&Vector::zeros()), Vector::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_window_projection_inverts() {
        let projection = Tmatrix::frustum(-1.0, 1.0, -0.75, 0.75, 1.0, 100.0);
        let view = Tmatrix::look_at(&Vector::new(0.0, 0.0, 10.0), &Vector::zeros(), &Vector::y());
        let m = projection * view;
        let viewport = [0.0, 0.0, 800.0, 600.0];

        let center = m.project_to_window(&Vector::zeros(), viewport).unwrap();
        assert_abs_diff_eq!(center.x, 400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(center.y, 300.0, epsilon = 1e-9);

        let p = Vector::new(1.0, -2.0, 0.5);
        let win = m.project_to_window(&p, viewport).unwrap();
        let back = m.unproject_from_window(&win, viewport).unwrap();
        assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-6);
        assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-6);
        assert_abs_diff_eq!(back.z, p.z, epsilon = 1e-6);
    }
}
