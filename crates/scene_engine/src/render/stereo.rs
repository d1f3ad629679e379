//! Stereo eye-pass planning
//!
//! Each stereo mode expands into one or two eye passes. A pass fixes the
//! eye offset (`-1` left, `0` mono, `+1` right), the viewport, the colour
//! mask, the draw buffer and what must be cleared before drawing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::backend::{ColorMask, DrawBuffer, Viewport};
use crate::scene::SceneError;

/// How the two eyes are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StereoMode {
    /// Single centered eye
    #[default]
    NoStereo,
    /// Quad-buffered shutter glasses
    Active,
    /// Red left, blue right; drawn in grey
    RedBlue,
    /// Red left, cyan right; drawn desaturated
    RedCyan,
    /// Yellow left, blue right
    YellowBlue,
    /// Green left, magenta right
    GreenMagenta,
    /// Side-by-side, left eye on the left
    Passive,
    /// Side-by-side, left eye on the right
    Crosseyed,
}

/// What to clear before a pass draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clear {
    /// Nothing
    None,
    /// Depth buffer only
    Depth,
    /// Colour (with every channel writable) and depth
    ColorAndDepth,
}

/// One rendering pass for one eye
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyePass {
    /// -1 left, 0 mono, +1 right
    pub whicheye: i32,
    /// Target rectangle
    pub viewport: Viewport,
    /// Writable channels
    pub color_mask: ColorMask,
    /// Target buffer
    pub draw_buffer: DrawBuffer,
    /// Clearing done before drawing
    pub clear: Clear,
    /// Draw in grey
    pub anaglyph: bool,
    /// Draw desaturated instead of grey
    pub coloranaglyph: bool,
}

impl StereoMode {
    /// Every mode, in declaration order
    pub const ALL: [Self; 8] = [
        Self::NoStereo,
        Self::Active,
        Self::RedBlue,
        Self::RedCyan,
        Self::YellowBlue,
        Self::GreenMagenta,
        Self::Passive,
        Self::Crosseyed,
    ];

    /// Configuration name
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoStereo => "nostereo",
            Self::Active => "active",
            Self::RedBlue => "redblue",
            Self::RedCyan => "redcyan",
            Self::YellowBlue => "yellowblue",
            Self::GreenMagenta => "greenmagenta",
            Self::Passive => "passive",
            Self::Crosseyed => "crosseyed",
        }
    }

    /// Whether the two eyes share the window side by side
    pub const fn is_side_by_side(self) -> bool {
        matches!(self, Self::Passive | Self::Crosseyed)
    }

    /// Width of each eye's viewport
    pub const fn eye_width(self, width: u32) -> u32 {
        if self.is_side_by_side() {
            width / 2
        } else {
            width
        }
    }

    /// The passes that make up one frame
    pub fn passes(self, width: u32, height: u32) -> Vec<EyePass> {
        let full = Viewport::new(0, 0, width, height);
        let mono = EyePass {
            whicheye: 0,
            viewport: full,
            color_mask: ColorMask::ALL,
            draw_buffer: DrawBuffer::Back,
            clear: Clear::ColorAndDepth,
            anaglyph: false,
            coloranaglyph: false,
        };

        let anaglyph = |left: ColorMask, right: ColorMask, colored: bool| {
            let first = EyePass {
                whicheye: -1,
                color_mask: left | ColorMask::ALPHA,
                anaglyph: true,
                coloranaglyph: colored,
                ..mono
            };
            let second = EyePass {
                whicheye: 1,
                color_mask: right | ColorMask::ALPHA,
                clear: Clear::Depth,
                ..first
            };
            vec![first, second]
        };

        let side_by_side = |left_eye: i32| {
            let eye = width / 2;
            // the second viewport starts one pixel past the midpoint
            #[allow(clippy::cast_possible_wrap)]
            let right_x = eye as i32 + 1;
            let first = EyePass {
                whicheye: left_eye,
                viewport: Viewport::new(0, 0, eye, height),
                ..mono
            };
            let second = EyePass {
                whicheye: -left_eye,
                viewport: Viewport::new(right_x, 0, eye, height),
                clear: Clear::None,
                ..first
            };
            vec![first, second]
        };

        match self {
            Self::NoStereo => vec![mono],
            Self::Active => vec![
                EyePass {
                    whicheye: -1,
                    draw_buffer: DrawBuffer::BackLeft,
                    ..mono
                },
                EyePass {
                    whicheye: 1,
                    draw_buffer: DrawBuffer::BackRight,
                    ..mono
                },
            ],
            Self::RedBlue => anaglyph(ColorMask::RED, ColorMask::BLUE, false),
            Self::RedCyan => anaglyph(ColorMask::RED, ColorMask::GREEN | ColorMask::BLUE, true),
            Self::YellowBlue => anaglyph(ColorMask::RED | ColorMask::GREEN, ColorMask::BLUE, true),
            Self::GreenMagenta => {
                anaglyph(ColorMask::GREEN, ColorMask::RED | ColorMask::BLUE, true)
            }
            Self::Passive => side_by_side(-1),
            Self::Crosseyed => side_by_side(1),
        }
    }
}

impl fmt::Display for StereoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StereoMode {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| SceneError::InvalidStereoMode(s.to_string()))
    }
}

impl TryFrom<String> for StereoMode {
    type Error = SceneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StereoMode> for String {
    fn from(mode: StereoMode) -> Self {
        mode.name().to_string()
    }
}
