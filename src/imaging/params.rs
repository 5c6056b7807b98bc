//! Parameter types for composition.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`Point`]: Signed pixel position on the canvas (offsets may push content off-canvas).
//! - [`TextStyle`]: Where and how one text block is painted.

use image::Rgba;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Pixel position, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Placement of a text block: top-left of its first line, font size in
/// pixels, and foreground color. The drop shadow uses the layout-wide
/// offset and color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub origin: Point,
    pub px: f32,
    pub color: Rgba<u8>,
}

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const GREY: Rgba<u8> = Rgba([150, 150, 150, 255]);
