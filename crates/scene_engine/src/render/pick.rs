//! Selection-buffer decoding and pick resolution
//!
//! A pick pass draws every object with its layer index loaded on the name
//! stack and a projection narrowed to a few pixels around the cursor. The
//! backend returns one variable-length record per object that touched that
//! window. This module turns those records into the nearest object and the
//! world-space points under the cursor.

use super::backend::SelectionBuffer;
use super::camera::ViewTransform;
use super::{RenderError, RenderResult};
use crate::foundation::math::Vector;
use crate::scene::renderable::SharedRenderable;

/// Words per object reserved in the selection buffer
const WORDS_PER_OBJECT: usize = 4;

/// Words in a record before its names
pub(crate) const RECORD_HEADER: usize = 3;

/// One decoded selection record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRecord {
    /// Nearest depth of the hit, fixed-point
    pub min_depth: u32,
    /// Farthest depth of the hit, fixed-point
    pub max_depth: u32,
    /// Name stack at the time of the hit, outermost first
    pub names: Vec<u32>,
}

/// Outcome of a pick
#[derive(Clone)]
pub struct PickResult {
    /// Nearest object under the cursor, if any
    pub object: Option<SharedRenderable>,
    /// World point on the picked surface; zero on a miss
    pub hit_pos: Vector,
    /// World point under the cursor at the depth of the scene center
    pub cursor_pos: Vector,
}

impl std::fmt::Debug for PickResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickResult")
            .field("hit", &self.object.is_some())
            .field("hit_pos", &self.hit_pos)
            .field("cursor_pos", &self.cursor_pos)
            .finish()
    }
}

impl PickResult {
    /// Whether something was hit
    pub fn is_hit(&self) -> bool {
        self.object.is_some()
    }
}

/// Stateless selection helpers
#[derive(Debug, Clone, Copy, Default)]
pub struct PickEngine;

impl PickEngine {
    /// Selection buffer size for the top-level `objects`
    ///
    /// Composites report the words their nested records need, so every
    /// leaf gets a header plus one name per nesting level. Never less than
    /// four words per top-level object or `backend_minimum`.
    pub fn buffer_capacity(objects: &[SharedRenderable], backend_minimum: usize) -> usize {
        let nested: usize = objects.iter().map(|object| object.borrow().pick_words(1)).sum();
        nested
            .max(objects.len() * WORDS_PER_OBJECT)
            .max(backend_minimum)
    }

    /// Decode every record in `buffer`
    ///
    /// Never reads past the words actually returned or past `capacity`. A
    /// negative hit count or a record that runs off the end is reported as
    /// an overflow.
    pub fn decode(buffer: &SelectionBuffer, capacity: usize) -> RenderResult<Vec<HitRecord>> {
        let hit_count = usize::try_from(buffer.hit_count)
            .map_err(|_| RenderError::PickBufferOverflow { capacity })?;
        let words = &buffer.words[..buffer.words.len().min(capacity)];

        let mut hits = Vec::with_capacity(hit_count);
        let mut cursor = 0;
        let mut remaining = words.len();
        for _ in 0..hit_count {
            if remaining < RECORD_HEADER {
                return Err(RenderError::PickBufferOverflow { capacity });
            }
            let name_count = words[cursor] as usize;
            let record_len = RECORD_HEADER + name_count;
            if record_len > remaining {
                return Err(RenderError::PickBufferOverflow { capacity });
            }
            hits.push(HitRecord {
                min_depth: words[cursor + 1],
                max_depth: words[cursor + 2],
                names: words[cursor + RECORD_HEADER..cursor + record_len].to_vec(),
            });
            cursor += record_len;
            remaining -= record_len;
        }
        Ok(hits)
    }

    /// Record with the smallest minimum depth; the first one wins ties
    pub fn nearest(hits: &[HitRecord]) -> Option<&HitRecord> {
        hits.iter().fold(None, |best: Option<&HitRecord>, hit| match best {
            Some(current) if current.min_depth <= hit.min_depth => Some(current),
            _ => Some(hit),
        })
    }

    /// Map a hit's names back to the object that produced it
    ///
    /// The first name indexes `table`; deeper names are resolved by that
    /// object, falling back to the object itself.
    pub fn resolve(hit: &HitRecord, table: &[SharedRenderable]) -> Option<SharedRenderable> {
        let (first, rest) = hit.names.split_first()?;
        let Some(object) = table.get(*first as usize) else {
            log::warn!("Pick hit names unknown object index {first}");
            return None;
        };
        if rest.is_empty() {
            return Some(object.clone());
        }
        let nested = object.borrow().lookup_name(rest);
        nested.or_else(|| Some(object.clone()))
    }

    /// Normalized window depth of a fixed-point selection depth
    pub fn window_depth(depth: u32) -> f64 {
        f64::from(depth) / f64::from(u32::MAX)
    }

    /// World point at window position (`x`, `y`) and normalized depth `z`
    pub fn unproject(
        transform: &ViewTransform,
        gcfvec: &Vector,
        x: f64,
        y: f64,
        z: f64,
    ) -> Option<Vector> {
        transform
            .scene_view
            .unproject_from_window(&Vector::new(x, y, z), transform.viewport)
            .map(|p| p.component_div(gcfvec))
    }

    /// Normalized window depth of a world point
    pub fn depth_of(transform: &ViewTransform, gcfvec: &Vector, point: &Vector) -> Option<f64> {
        transform
            .scene_view
            .project_to_window(&point.component_mul(gcfvec), transform.viewport)
            .map(|w| w.z)
    }
}
