//! Text painting seam.
//!
//! The [`TextPainter`] trait is the one place the layout engine touches
//! glyphs. The production implementation is
//! [`FontPainter`](super::font_painter::FontPainter), backed by a single
//! font loaded once per run. Tests use a recording mock so layout logic can
//! be checked without a font file.

use super::params::Point;
use image::{Rgba, RgbaImage};

/// Measures and paints single lines of text.
pub trait TextPainter {
    /// Distance between the tops of two consecutive lines at `px`.
    fn line_height(&self, px: f32) -> f32;

    /// Advance width of `text` at `px`.
    fn measure(&self, text: &str, px: f32) -> f32;

    /// Paint one line with its top-left at `origin`. Pixels outside the
    /// canvas are clipped.
    fn draw(&self, canvas: &mut RgbaImage, text: &str, px: f32, origin: Point, color: Rgba<u8>);
}

impl<T: TextPainter + ?Sized> TextPainter for &T {
    fn line_height(&self, px: f32) -> f32 {
        (**self).line_height(px)
    }

    fn measure(&self, text: &str, px: f32) -> f32 {
        (**self).measure(text, px)
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, px: f32, origin: Point, color: Rgba<u8>) {
        (**self).draw(canvas, text, px, origin, color)
    }
}
