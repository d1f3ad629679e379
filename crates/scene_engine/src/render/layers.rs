//! Opaque and translucent object layers
//!
//! The display draws every opaque object first in insertion order, then the
//! translucent objects back to front. Objects move between the two layers
//! when their opacity or material changes, and objects the application has
//! dropped are pruned. Layers hold weak references only.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::foundation::math::{Vector, VectorExt};
use crate::scene::renderable::{SharedRenderable, WeakRenderable};

/// Opaque and translucent draw lists
#[derive(Debug, Default)]
pub struct Layers {
    opaque: Vec<WeakRenderable>,
    translucent: Vec<WeakRenderable>,
}

fn upgrade_all(layer: &[WeakRenderable]) -> Vec<SharedRenderable> {
    layer.iter().filter_map(std::rc::Weak::upgrade).collect()
}

fn is_translucent(object: &SharedRenderable) -> bool {
    object.borrow().is_translucent()
}

fn depth_along(object: &SharedRenderable, forward: &Vector) -> f64 {
    object.borrow().center().dot(forward)
}

impl Layers {
    /// Empty layers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the layer matching its current translucency
    pub fn insert(&mut self, object: &SharedRenderable) {
        let weak = Rc::downgrade(object);
        if is_translucent(object) {
            self.translucent.push(weak);
        } else {
            self.opaque.push(weak);
        }
    }

    /// Whether the object is already in either layer
    pub fn contains(&self, object: &SharedRenderable) -> bool {
        let weak = Rc::downgrade(object);
        self.opaque
            .iter()
            .chain(&self.translucent)
            .any(|w| w.ptr_eq(&weak))
    }

    /// Remove an object from whichever layer holds it
    pub fn remove(&mut self, object: &SharedRenderable) -> bool {
        let weak = Rc::downgrade(object);
        let before = self.len();
        self.opaque.retain(|w| !w.ptr_eq(&weak));
        self.translucent.retain(|w| !w.ptr_eq(&weak));
        self.len() != before
    }

    /// Drop entries whose objects no longer exist; returns how many
    pub fn prune(&mut self) -> usize {
        let before = self.len();
        self.opaque.retain(|w| w.strong_count() > 0);
        self.translucent.retain(|w| w.strong_count() > 0);
        before - self.len()
    }

    /// Move objects whose translucency changed to the other layer
    ///
    /// Moved objects go to the end of their new layer; the relative order
    /// of everything else is unchanged.
    pub fn reclassify(&mut self) {
        let live_translucent =
            |w: &WeakRenderable| w.upgrade().is_some_and(|o| is_translucent(&o));

        let (stay, to_translucent): (Vec<_>, Vec<_>) =
            self.opaque.drain(..).partition(|w| !live_translucent(w));
        let (stay_translucent, to_opaque): (Vec<_>, Vec<_>) =
            self.translucent.drain(..).partition(live_translucent);

        if !to_translucent.is_empty() || !to_opaque.is_empty() {
            log::trace!(
                "Reclassified {} objects to translucent, {} to opaque",
                to_translucent.len(),
                to_opaque.len()
            );
        }

        self.opaque = stay;
        self.opaque.extend(to_opaque);
        self.translucent = stay_translucent;
        self.translucent.extend(to_translucent);
    }

    /// Stable back-to-front sort of the translucent layer along `forward`
    pub fn sort_translucent(&mut self, forward: &Vector) {
        let forward = forward.unit_or_zero();
        let mut keyed: Vec<(f64, WeakRenderable)> = self
            .translucent
            .drain(..)
            .map(|w| {
                let depth = w
                    .upgrade()
                    .map_or(f64::NEG_INFINITY, |o| depth_along(&o, &forward));
                (depth, w)
            })
            .collect();
        keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        self.translucent = keyed.into_iter().map(|(_, w)| w).collect();
    }

    /// Live opaque objects in draw order
    pub fn opaque(&self) -> Vec<SharedRenderable> {
        upgrade_all(&self.opaque)
    }

    /// Live translucent objects in draw order
    pub fn translucent(&self) -> Vec<SharedRenderable> {
        upgrade_all(&self.translucent)
    }

    /// Every live object, opaque layer first
    pub fn all(&self) -> Vec<SharedRenderable> {
        let mut objects = self.opaque();
        objects.extend(self.translucent());
        objects
    }

    /// Entries in both layers, live or not
    pub fn len(&self) -> usize {
        self.opaque.len() + self.translucent.len()
    }

    /// Whether both layers are empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in the opaque layer
    pub fn opaque_len(&self) -> usize {
        self.opaque.len()
    }

    /// Entries in the translucent layer
    pub fn translucent_len(&self) -> usize {
        self.translucent.len()
    }
}
