//! Scene lights

use super::color::Rgb;
use super::{SceneError, SceneResult};
use crate::foundation::math::{Vector, VectorExt};
use crate::render::backend::LightSource;

/// A light source in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Point light at a position
    Local {
        /// World position
        pos: Vector,
        /// Light colour
        color: Rgb,
    },
    /// Directional light shining from `direction` toward the origin
    Distant {
        /// Unit direction toward the light
        direction: Vector,
        /// Light colour
        color: Rgb,
    },
}

impl Light {
    /// Point light
    pub fn local(pos: Vector, color: Rgb) -> SceneResult<Self> {
        color.validate("light color")?;
        Ok(Self::Local { pos, color })
    }

    /// Directional light; the zero direction is rejected
    pub fn distant(direction: Vector, color: Rgb) -> SceneResult<Self> {
        color.validate("light color")?;
        if direction == Vector::zeros() {
            return Err(SceneError::ZeroVector {
                property: "light direction",
            });
        }
        Ok(Self::Distant {
            direction: direction.unit_or_zero(),
            color,
        })
    }

    /// Backend form, with local positions scaled into render units
    pub fn to_source(&self, gcfvec: &Vector) -> LightSource {
        match *self {
            Self::Local { pos, color } => {
                let p = pos.component_mul(gcfvec);
                LightSource {
                    position: [p.x, p.y, p.z, 1.0],
                    color,
                }
            }
            Self::Distant { direction, color } => LightSource {
                position: [direction.x, direction.y, direction.z, 0.0],
                color,
            },
        }
    }

    /// The default pair of distant lights
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::Distant {
                direction: Vector::new(0.25, 0.5, 1.0).unit_or_zero(),
                color: Rgb::gray(0.8),
            },
            Self::Distant {
                direction: Vector::new(-1.0, -0.25, -0.5).unit_or_zero(),
                color: Rgb::gray(0.3),
            },
        ]
    }
}
