//! `rusttype`-backed text painter.
//!
//! Glyphs are laid out with the font's kerning, rasterized to coverage
//! values, and alpha-blended into the RGBA canvas. The font is parsed once
//! and shared by every text block of every render in a run.

use super::painter::TextPainter;
use super::params::Point;
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};

pub struct FontPainter {
    font: Font<'static>,
}

impl std::fmt::Debug for FontPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontPainter")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl FontPainter {
    /// Parse TrueType/OpenType bytes. Returns `None` when the data is not a
    /// usable font.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self { font })
    }
}

/// Blend `color` into `dst` with glyph `coverage` in `0.0..=1.0`.
fn blend(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0) * (color.0[3] as f32 / 255.0);
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * a + dst.0[c] as f32 * inv).round() as u8;
    }
    let dst_a = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((a + dst_a * inv) * 255.0).round() as u8;
}

impl TextPainter for FontPainter {
    fn line_height(&self, px: f32) -> f32 {
        let v = self.font.v_metrics(Scale::uniform(px));
        v.ascent - v.descent + v.line_gap
    }

    fn measure(&self, text: &str, px: f32) -> f32 {
        self.font
            .layout(text, Scale::uniform(px), point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, px: f32, origin: Point, color: Rgba<u8>) {
        let scale = Scale::uniform(px);
        let ascent = self.font.v_metrics(scale).ascent;
        let start = point(origin.x as f32, origin.y as f32 + ascent);
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);

        for glyph in self.font.layout(text, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let x = gx as i32 + bb.min.x;
                let y = gy as i32 + bb.min.y;
                if x < 0 || y < 0 || x >= width || y >= height {
                    return;
                }
                blend(canvas.get_pixel_mut(x as u32, y as u32), color, coverage);
            });
        }
    }
}
