//! Level-of-detail selection
//!
//! Each curved shape family has a table of projected-size thresholds. The
//! number of thresholds a shape's pixel coverage meets or exceeds is its base
//! level; the user bias is then added and the result clamped to the levels
//! the shape library actually builds.

/// Highest tessellation level any shape provides
pub const MAX_LOD: usize = 5;

/// Number of tessellation levels for curved shapes
pub const LOD_LEVELS: usize = MAX_LOD + 1;

/// Coverage thresholds for one shape family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodTable {
    thresholds: &'static [f64],
    behind_camera: usize,
}

/// Spheres and ellipsoids
pub const SPHERE: LodTable = LodTable::new(&[30.0, 100.0, 500.0, 5000.0], MAX_LOD);

/// Cylinders
pub const CYLINDER: LodTable = LodTable::new(&[10.0, 25.0, 50.0, 196.0, 400.0], MAX_LOD);

/// Cones
pub const CONE: LodTable = LodTable::new(&[10.0, 30.0, 90.0, 250.0, 450.0], MAX_LOD);

/// Rings
pub const RING: LodTable = LodTable::new(&[10.0, 30.0, 90.0, 250.0, 450.0], MAX_LOD);

impl LodTable {
    /// Build a table from ascending thresholds
    ///
    /// `behind_camera` is the level used when the coverage is negative,
    /// i.e. the object's center lies behind the eye.
    pub const fn new(thresholds: &'static [f64], behind_camera: usize) -> Self {
        Self {
            thresholds,
            behind_camera,
        }
    }

    /// Level before the user bias is applied
    pub fn base_level(&self, coverage: f64) -> usize {
        if coverage < 0.0 {
            return self.behind_camera;
        }
        self.thresholds
            .iter()
            .position(|threshold| coverage < *threshold)
            .unwrap_or(self.thresholds.len())
    }

    /// Final level: base level plus `lod_adjust`, clamped to `[0, MAX_LOD]`
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn select(&self, coverage: f64, lod_adjust: i32) -> usize {
        let level = self.base_level(coverage) as i32 + lod_adjust;
        level.clamp(0, MAX_LOD as i32) as usize
    }
}
