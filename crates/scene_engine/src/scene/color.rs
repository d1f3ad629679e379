//! Colours and materials

use serde::{Deserialize, Serialize};

use super::{SceneError, SceneResult};

/// Gamma used when collapsing a colour to a single luminance value
const GRAYSCALE_GAMMA: f32 = 2.5;

/// Factor applied to saturation for colour anaglyph passes
const ANAGLYPH_SATURATION: f32 = 0.5;

/// RGB colour with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub red: f32,
    /// Green channel
    pub green: f32,
    /// Blue channel
    pub blue: f32,
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Rgb {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a colour from its channels
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Uniform grey of the given intensity
    pub const fn gray(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// Validate that every channel lies in `[0, 1]`
    pub fn validate(&self, property: &'static str) -> SceneResult<()> {
        for channel in [self.red, self.green, self.blue] {
            if !(0.0..=1.0).contains(&channel) {
                return Err(SceneError::InvalidValue {
                    property,
                    value: f64::from(channel),
                });
            }
        }
        Ok(())
    }

    /// Channels as an array, in backend order
    pub const fn to_array(self) -> [f32; 3] {
        [self.red, self.green, self.blue]
    }

    /// Perceptual grey level of this colour
    ///
    /// The 0.299/0.587/0.114 weights account for the relative sensitivity of
    /// the eye to each primary; used for red-blue anaglyph passes.
    pub fn grayscale(&self) -> Self {
        let luminance = (0.299 * self.red.powf(GRAYSCALE_GAMMA)
            + 0.587 * self.green.powf(GRAYSCALE_GAMMA)
            + 0.114 * self.blue.powf(GRAYSCALE_GAMMA))
        .powf(1.0 / GRAYSCALE_GAMMA);
        Self::gray(luminance)
    }

    /// This colour with its HSV saturation halved; used for colour anaglyphs
    pub fn desaturate(&self) -> Self {
        let (h, s, v) = self.to_hsv();
        Self::from_hsv(h, s * ANAGLYPH_SATURATION, v)
    }

    fn to_hsv(self) -> (f32, f32, f32) {
        let max = self.red.max(self.green).max(self.blue);
        let min = self.red.min(self.green).min(self.blue);
        let delta = max - min;
        if max == 0.0 || delta == 0.0 {
            return (0.0, 0.0, max);
        }
        let s = delta / max;
        let mut h = if self.red == max {
            (self.green - self.blue) / delta
        } else if self.green == max {
            2.0 + (self.blue - self.red) / delta
        } else {
            4.0 + (self.red - self.green) / delta
        };
        h *= 60.0;
        if h < 0.0 {
            h += 360.0;
        }
        (h, s, max)
    }

    fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        if s == 0.0 {
            return Self::gray(v);
        }
        let sector = (h / 60.0).rem_euclid(6.0);
        let i = sector.floor();
        let f = sector - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        // `i` is in 0..6 after rem_euclid
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        match i as u8 {
            0 => Self::new(v, t, p),
            1 => Self::new(q, v, p),
            2 => Self::new(p, v, t),
            3 => Self::new(p, q, v),
            4 => Self::new(t, p, v),
            _ => Self::new(v, p, q),
        }
    }
}

/// Surface material reference
///
/// Shading itself is the backend's business; the core only needs to know
/// whether the material forces the object into the translucent layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    /// Backend-facing material name
    pub name: String,
    /// Whether surfaces using this material need depth-sorted blending
    pub translucent: bool,
}

impl Material {
    /// Create a new material
    pub fn new(name: impl Into<String>, translucent: bool) -> Self {
        Self {
            name: name.into(),
            translucent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grayscale_preserves_white_and_black() {
        assert_relative_eq!(Rgb::WHITE.grayscale().red, 1.0, epsilon = 1e-6);
        assert_eq!(Rgb::BLACK.grayscale(), Rgb::BLACK);
    }

    #[test]
    fn test_grayscale_weights_green_over_blue() {
        let green = Rgb::new(0.0, 1.0, 0.0).grayscale();
        let blue = Rgb::new(0.0, 0.0, 1.0).grayscale();
        assert!(green.red > blue.red);
        assert_eq!(green.red, green.green);
        assert_eq!(green.green, green.blue);
    }

    #[test]
    fn test_desaturate_halves_saturation() {
        let red = Rgb::new(1.0, 0.0, 0.0).desaturate();
        assert_relative_eq!(red.red, 1.0, epsilon = 1e-6);
        assert_relative_eq!(red.green, 0.5, epsilon = 1e-6);
        assert_relative_eq!(red.blue, 0.5, epsilon = 1e-6);

        let gray = Rgb::gray(0.4);
        assert_eq!(gray.desaturate(), gray);
    }

    #[test]
    fn test_validate_rejects_out_of_range_channel() {
        assert!(Rgb::new(0.2, 0.4, 0.6).validate("color").is_ok());
        assert!(matches!(
            Rgb::new(1.5, 0.0, 0.0).validate("color"),
            Err(SceneError::InvalidValue { property: "color", .. })
        ));
    }
}
