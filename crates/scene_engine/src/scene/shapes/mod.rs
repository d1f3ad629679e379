//! Concrete primitives
//!
//! Each shape owns a [`PrimitiveBase`](super::PrimitiveBase) and maps its own
//! dimensions onto the scale of a cached unit shape. Lengths along the axis
//! come from the axis magnitude; cross-section dimensions are separate fields.

use super::primitive::PrimitiveBase;
use super::{SceneError, SceneResult};
use crate::foundation::math::{Vector, VectorExt};

mod arrow;
mod axial;
mod rectangular;
mod round;

pub use arrow::{Arrow, ArrowGeometry};
pub use axial::{Cone, Cylinder, Ring};
pub use rectangular::{BoxShape, Pyramid};
pub use round::{Ellipsoid, Sphere};

/// Reject negative or non-finite dimensions
pub(crate) fn non_negative(property: &'static str, value: f64) -> SceneResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SceneError::NegativeDimension { property, value })
    }
}

/// Set the axis magnitude to `length`, keeping its direction
pub(crate) fn rescale_axis(base: &mut PrimitiveBase, length: f64) -> SceneResult<()> {
    let length = non_negative("length", length)?;
    let direction = base.axis().unit_or_zero();
    base.set_axis(if direction == Vector::zeros() {
        Vector::new(length, 0.0, 0.0)
    } else {
        direction * length
    });
    Ok(())
}

/// Implements the `Renderable` accessors every shape shares
macro_rules! primitive_core {
    () => {
        fn core(&self) -> &$crate::scene::renderable::RenderableCore {
            &self.base.core
        }

        fn core_mut(&mut self) -> &mut $crate::scene::renderable::RenderableCore {
            &mut self.base.core
        }
    };
}

pub(crate) use primitive_core;
