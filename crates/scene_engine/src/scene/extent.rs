//! Scene extent accumulation
//!
//! Renderables report their bounds here once per frame. The accumulator keeps
//! an axis-aligned box for autocenter and the autoscale radius, plus two
//! camera-relative quantities: the camera distance needed to see every
//! reported sphere (`camera_z`) and the farthest reported point along the
//! viewing direction (used for the far clip plane).
//!
//! All inputs are world coordinates. Composites push their local-to-world
//! transform before reporting children.

use crate::foundation::math::{Tmatrix, Vector, VectorExt};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vector,
    /// Maximum corner
    pub max: Vector,
}

impl Aabb {
    /// Box around a single point
    pub const fn from_point(point: Vector) -> Self {
        Self { min: point, max: point }
    }

    /// Center of the box
    pub fn center(&self) -> Vector {
        (self.min + self.max) * 0.5
    }

    /// Half-size of the box
    pub fn extents(&self) -> Vector {
        (self.max - self.min) * 0.5
    }

    /// Grow to include a box of half-size `extents` around `center`
    pub fn include(&mut self, center: &Vector, extents: &Vector) {
        self.min = self.min.inf(&(center - extents));
        self.max = self.max.sup(&(center + extents));
    }

    /// The eight corners
    pub fn corners(&self) -> [Vector; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vector::new(lo.x, lo.y, lo.z),
            Vector::new(hi.x, lo.y, lo.z),
            Vector::new(lo.x, hi.y, lo.z),
            Vector::new(hi.x, hi.y, lo.z),
            Vector::new(lo.x, lo.y, hi.z),
            Vector::new(hi.x, lo.y, hi.z),
            Vector::new(lo.x, hi.y, hi.z),
            Vector::new(hi.x, hi.y, hi.z),
        ]
    }
}

/// Per-frame bounds accumulator
#[derive(Debug, Clone)]
pub struct Extent {
    bounds: Option<Aabb>,
    camera_z: f64,
    farthest: f64,
    center: Vector,
    forward: Vector,
    cot_hfov: f64,
    inv_sin_hfov: f64,
    frames: Vec<Tmatrix>,
}

impl Default for Extent {
    fn default() -> Self {
        Self::new(Vector::zeros(), Vector::new(0.0, 0.0, -1.0), 1.0)
    }
}

impl Extent {
    /// Empty extent relative to `center`, looking along `forward`
    ///
    /// `tan_hfov` is the tangent of the wider half field of view.
    pub fn new(center: Vector, forward: Vector, tan_hfov: f64) -> Self {
        let mut extent = Self {
            bounds: None,
            camera_z: 0.0,
            farthest: 0.0,
            center,
            forward,
            cot_hfov: 1.0,
            inv_sin_hfov: 1.0,
            frames: Vec::new(),
        };
        extent.reset(center, forward, tan_hfov);
        extent
    }

    /// Clear all accumulated bounds and set a new reference frame
    pub fn reset(&mut self, center: Vector, forward: Vector, tan_hfov: f64) {
        self.bounds = None;
        self.camera_z = 0.0;
        self.farthest = 0.0;
        self.center = center;
        self.forward = forward.unit_or_zero();
        self.cot_hfov = 1.0 / tan_hfov;
        // sin(atan(t)) = t / sqrt(1 + t^2)
        self.inv_sin_hfov = (1.0 + tan_hfov * tan_hfov).sqrt() / tan_hfov;
        self.frames.clear();
    }

    /// Enter a composite's coordinate system
    pub fn push_frame(&mut self, local_to_parent: Tmatrix) {
        let combined = match self.frames.last() {
            Some(parent) => parent * &local_to_parent,
            None => local_to_parent,
        };
        self.frames.push(combined);
    }

    /// Leave the innermost composite's coordinate system
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    fn to_world(&self, point: &Vector) -> Vector {
        self.frames.last().map_or(*point, |frame| frame.project(point))
    }

    fn direction_to_world(&self, direction: &Vector) -> Vector {
        self.frames.last().map_or(*direction, |frame| frame.times_v(direction))
    }

    fn length_to_world(&self, length: f64) -> f64 {
        self.frames.last().map_or(length, |frame| {
            let x = frame.times_v(&Vector::x()).mag();
            let y = frame.times_v(&Vector::y()).mag();
            let z = frame.times_v(&Vector::z()).mag();
            length * x.max(y).max(z)
        })
    }

    fn include_box(&mut self, center: &Vector, extents: &Vector) {
        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(center, extents),
            None => {
                let mut bounds = Aabb::from_point(*center);
                bounds.include(center, extents);
                self.bounds = Some(bounds);
            }
        }
    }

    fn include_camera_sphere(&mut self, center: &Vector, radius: f64) {
        let p = center - self.center;
        let along = p.dot(&self.forward);
        let perp = (p.mag2() - along * along).max(0.0).sqrt();
        let needed = perp * self.cot_hfov + radius * self.inv_sin_hfov - along;
        self.camera_z = self.camera_z.max(needed);
        self.farthest = self.farthest.max(along + radius);
    }

    /// Include a single point
    pub fn add_point(&mut self, point: Vector) {
        self.add_sphere(point, 0.0);
    }

    /// Include a sphere
    pub fn add_sphere(&mut self, center: Vector, radius: f64) {
        let center = self.to_world(&center);
        let radius = self.length_to_world(radius.abs());
        self.include_box(&center, &Vector::repeat(radius));
        self.include_camera_sphere(&center, radius);
    }

    /// Include a circle of `radius` around `center` in the plane normal to `normal`
    pub fn add_circle(&mut self, center: Vector, normal: Vector, radius: f64) {
        let center = self.to_world(&center);
        let normal = self.direction_to_world(&normal).unit_or_zero();
        let radius = self.length_to_world(radius.abs());
        let extents = normal.map(|n| radius * (1.0 - n * n).max(0.0).sqrt());
        self.include_box(&center, &extents);
        self.include_camera_sphere(&center, radius);
    }

    /// Include the box `[min, max]` expressed in the space of `transform`
    pub fn add_box(&mut self, transform: &Tmatrix, min: Vector, max: Vector) {
        for corner in (Aabb { min, max }).corners() {
            self.add_point(transform.project(&corner));
        }
    }

    /// Whether nothing has been reported since the last reset
    pub const fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Accumulated bounds, if any
    pub const fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    /// Midpoint of the bounds; the reference center when empty
    pub fn get_center(&self) -> Vector {
        self.bounds.map_or(self.center, |b| b.center())
    }

    /// Camera distance from the reference center needed to see every sphere
    pub const fn get_camera_z(&self) -> f64 {
        self.camera_z
    }

    /// Farthest reported point along the viewing direction, from the center
    pub const fn farthest(&self) -> f64 {
        self.farthest
    }

    /// Largest extent from the reference center along `direction`
    pub fn get_range(&self, direction: &Vector) -> f64 {
        let direction = direction.unit_or_zero();
        self.bounds.map_or(0.0, |b| {
            b.corners()
                .iter()
                .map(|corner| (corner - self.center).dot(&direction).abs())
                .fold(0.0, f64::max)
        })
    }

    /// Largest distance from the reference center to a bounds corner
    pub fn radius(&self) -> f64 {
        self.bounds.map_or(0.0, |b| {
            b.corners()
                .iter()
                .map(|corner| (corner - self.center).mag())
                .fold(0.0, f64::max)
        })
    }
}
