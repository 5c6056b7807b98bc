//! Wallpaper composition.
//!
//! [`render`] turns downloaded backdrop bytes and a record into a finished,
//! alpha-free RGB image:
//!
//! 1. Decode the bytes, crop the backdrop to what the canvas can show, and
//!    scale it to the layout's pinned edge.
//! 2. Copy the template canvas and alpha-composite, bottom to top: backdrop,
//!    overlay, logo.
//! 3. Paint title, overview, metadata line and caption. Each block is drawn
//!    twice: shadow color at the shadow offset first, then the block color
//!    at its true position.
//! 4. Flatten against the layout background.
//!
//! The caller decides where the result goes; [`encode_jpeg`] produces the
//! bytes written to `<output_dir>/<canonical filename>`.

use super::assets::TemplateAssets;
use super::calculations::{line_origin, shadow_origin, visible_crop};
use super::layout::Layout;
use super::painter::TextPainter;
use super::params::{Quality, TextStyle};
use crate::metadata::DisplayText;
use crate::types::{MediaRecord, RenderedAsset};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("backdrop is not a decodable image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("backdrop has zero width or height")]
    EmptyBackdrop,
    #[error("template asset {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("JPEG encoding failed: {0}")]
    Encode(#[source] image::ImageError),
}

/// Decode backdrop bytes in any compiled-in format.
pub fn decode_backdrop(bytes: &[u8]) -> Result<DynamicImage, RenderError> {
    let img = image::load_from_memory(bytes).map_err(RenderError::Decode)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(RenderError::EmptyBackdrop);
    }
    Ok(img)
}

/// Decode `background_bytes` and compose the wallpaper for `record`.
pub fn render(
    background_bytes: &[u8],
    record: &MediaRecord,
    layout: &Layout,
    assets: &TemplateAssets,
    painter: &impl TextPainter,
) -> Result<RgbImage, RenderError> {
    let backdrop = decode_backdrop(background_bytes)?;
    let text = DisplayText::resolve(record, &layout.rules);
    Ok(compose(&backdrop, &text, layout, assets, painter))
}

/// [`render`], packaged with the record's canonical filename.
pub fn render_asset(
    background_bytes: &[u8],
    record: &MediaRecord,
    layout: &Layout,
    assets: &TemplateAssets,
    painter: &impl TextPainter,
) -> Result<RenderedAsset, RenderError> {
    let pixels = render(background_bytes, record, layout, assets, painter)?;
    Ok(RenderedAsset {
        canonical_filename: record.canonical_filename(),
        pixels,
        source_record_id: record.id.clone(),
    })
}

/// Compose an already decoded backdrop with resolved display text.
pub fn compose(
    backdrop: &DynamicImage,
    text: &DisplayText,
    layout: &Layout,
    assets: &TemplateAssets,
    painter: &impl TextPainter,
) -> RgbImage {
    let mut canvas = assets.canvas.clone();

    let ((cw, ch), (w, h)) = visible_crop(
        (backdrop.width(), backdrop.height()),
        layout.backdrop_fit,
        layout.canvas,
        layout.backdrop_origin,
    );
    let scaled = backdrop
        .crop_imm(0, 0, cw, ch)
        .resize_exact(w, h, FilterType::Lanczos3)
        .to_rgba8();
    paste(&mut canvas, &scaled, layout.backdrop_origin.x, layout.backdrop_origin.y);

    if let Some(overlay) = &assets.overlay {
        paste(&mut canvas, overlay, layout.overlay_origin.x, layout.overlay_origin.y);
    }
    if let Some(logo) = &assets.logo {
        paste(&mut canvas, logo, layout.logo_origin.x, layout.logo_origin.y);
    }

    draw_block(&mut canvas, painter, layout, &layout.title, std::slice::from_ref(&text.title));
    draw_block(&mut canvas, painter, layout, &layout.overview, &text.overview);
    draw_block(&mut canvas, painter, layout, &layout.metadata, std::slice::from_ref(&text.metadata));
    draw_block(&mut canvas, painter, layout, &layout.caption, std::slice::from_ref(&text.caption));

    flatten(&canvas, layout.background)
}

fn paste(canvas: &mut RgbaImage, top: &RgbaImage, x: i32, y: i32) {
    imageops::overlay(canvas, top, x as i64, y as i64);
}

/// Paint each line of a block with its drop shadow underneath.
fn draw_block(
    canvas: &mut RgbaImage,
    painter: &impl TextPainter,
    layout: &Layout,
    style: &TextStyle,
    lines: &[String],
) {
    let line_height = painter.line_height(style.px);
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let origin = line_origin(style.origin, i, line_height);
        let overflow = origin.x as f32 + painter.measure(line, style.px) - canvas.width() as f32;
        if overflow > 0.0 {
            debug!(line = %line, overflow, "text runs past the canvas edge");
        }
        painter.draw(
            canvas,
            line,
            style.px,
            shadow_origin(origin, layout.shadow_offset),
            layout.shadow_color,
        );
        painter.draw(canvas, line, style.px, origin, style.color);
    }
}

/// Composite `canvas` over an opaque `background` and drop the alpha channel.
pub fn flatten(canvas: &RgbaImage, background: Rgba<u8>) -> RgbImage {
    let [br, bg, bb, _] = background.0;
    RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let [r, g, b, a] = canvas.get_pixel(x, y).0;
        let a = a as f32 / 255.0;
        let mix = |fg: u8, bgc: u8| (fg as f32 * a + bgc as f32 * (1.0 - a)).round() as u8;
        Rgb([mix(r, br), mix(g, bg), mix(b, bb)])
    })
}

/// Encode a finished wallpaper as baseline JPEG.
pub fn encode_jpeg(img: &RgbImage, quality: Quality) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality.value());
    img.write_with_encoder(encoder).map_err(RenderError::Encode)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::layout::Preset;
    use crate::imaging::painter::tests::MockPainter;
    use crate::imaging::params::Point;
    use crate::types::MediaDetails;
    use image::ImageFormat;
    use std::io::Cursor;

    /// Shrunken copy of a preset so tests stay fast.
    fn small_layout() -> Layout {
        let mut layout = Preset::Trending.layout();
        layout.canvas = (192, 75);
        layout.backdrop_fit = crate::imaging::Fit::Height(75);
        layout.backdrop_origin = Point::new(59, 0);
        layout.overlay_origin = Point::new(59, 0);
        layout.logo_origin = Point::new(11, 26);
        layout.title.origin = Point::new(10, 27);
        layout.overview.origin = Point::new(10, 39);
        layout.metadata.origin = Point::new(10, 43);
        layout.caption.origin = Point::new(10, 46);
        layout
    }

    fn record() -> MediaRecord {
        MediaRecord {
            id: "603".into(),
            title: "Example: Movie!".into(),
            overview: "x".repeat(600),
            date: "2024-05-01".into(),
            rating: 7.8,
            genres: "Drama".into(),
            details: MediaDetails::Movie {
                runtime_minutes: Some(95),
            },
            backdrop: None,
        }
    }

    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let layout = small_layout();
        let assets = TemplateAssets::synthesized(&layout);
        let result = render(b"<html>404</html>", &record(), &layout, &assets, &MockPainter::new());
        assert!(matches!(result, Err(RenderError::Decode(_))));
    }

    #[test]
    fn output_has_canvas_dimensions() {
        let layout = small_layout();
        let assets = TemplateAssets::synthesized(&layout);
        let img = render(&png_bytes(32, 18, [200, 0, 0, 255]), &record(), &layout, &assets, &MockPainter::new())
            .unwrap();
        assert_eq!(img.dimensions(), (192, 75));
    }

    #[test]
    fn extreme_aspect_backdrop_renders_at_canvas_size() {
        let layout = small_layout();
        let assets = TemplateAssets::synthesized(&layout);
        let img = render(&png_bytes(60000, 4, [200, 0, 0, 255]), &record(), &layout, &assets, &MockPainter::new())
            .unwrap();
        assert_eq!(img.dimensions(), (192, 75));
        assert_eq!(*img.get_pixel(191, 74), Rgb([200, 0, 0]));
    }

    #[test]
    fn backdrop_sits_at_offset_and_canvas_shows_elsewhere() {
        let mut layout = small_layout();
        layout.background = Rgba([0, 0, 255, 255]);
        let mut assets = TemplateAssets::synthesized(&layout);
        assets.overlay = None;

        let img = render(&png_bytes(32, 18, [200, 0, 0, 255]), &record(), &layout, &assets, &MockPainter::new())
            .unwrap();

        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 255]));
        assert_eq!(*img.get_pixel(150, 60), Rgb([200, 0, 0]));
    }

    #[test]
    fn overlay_sits_above_backdrop_and_logo_on_top() {
        let layout = small_layout();
        let mut assets = TemplateAssets::synthesized(&layout);
        assets.overlay = Some(RgbaImage::from_pixel(10, 10, Rgba([0, 255, 0, 255])));
        assets.logo = Some(RgbaImage::from_pixel(4, 4, Rgba([255, 255, 0, 255])));
        let mut layout = layout;
        layout.logo_origin = Point::new(62, 2);

        let img = render(&png_bytes(32, 18, [200, 0, 0, 255]), &record(), &layout, &assets, &MockPainter::new())
            .unwrap();

        // Overlay covers the backdrop at its origin...
        assert_eq!(*img.get_pixel(60, 8), Rgb([0, 255, 0]));
        // ...the logo covers the overlay...
        assert_eq!(*img.get_pixel(63, 3), Rgb([255, 255, 0]));
        // ...and the backdrop shows where neither reaches.
        assert_eq!(*img.get_pixel(100, 40), Rgb([200, 0, 0]));
    }

    #[test]
    fn each_block_is_drawn_shadow_first() {
        let layout = small_layout();
        let assets = TemplateAssets::synthesized(&layout);
        let painter = MockPainter::new();
        render(&png_bytes(16, 9, [0, 0, 0, 255]), &record(), &layout, &assets, &painter).unwrap();

        let draws = painter.get_draws();
        // title, truncated overview, metadata, caption: two draws each
        assert_eq!(draws.len(), 8);
        for pair in draws.chunks(2) {
            let (shadow, main) = (&pair[0], &pair[1]);
            assert_eq!(shadow.text, main.text);
            assert_eq!(shadow.color, layout.shadow_color);
            assert_eq!(shadow.origin.x, main.origin.x + layout.shadow_offset.x);
            assert_eq!(shadow.origin.y, main.origin.y + layout.shadow_offset.y);
        }
        assert_eq!(draws[1].text, "Example: Movie!");
        assert_eq!(draws[1].origin, layout.title.origin);
        assert_eq!(draws[1].color, layout.title.color);
        assert!(draws[5].text.contains("1h35min"));
        assert_eq!(draws[7].text, "Now Trending on TMDB");
    }

    #[test]
    fn truncated_overview_respects_budget() {
        let layout = small_layout();
        let assets = TemplateAssets::synthesized(&layout);
        let painter = MockPainter::new();
        let mut rec = record();
        rec.overview = "word ".repeat(100);
        render(&png_bytes(16, 9, [0, 0, 0, 255]), &rec, &layout, &assets, &painter).unwrap();

        let overview = &painter.get_draws()[3].text;
        let body = overview.trim_end_matches("...");
        assert!(body.chars().count() <= 130);
    }

    #[test]
    fn wrapped_overview_lines_stack_by_line_height() {
        let mut layout = small_layout();
        layout.rules = Preset::TrendingWrapped.layout().rules;
        let assets = TemplateAssets::synthesized(&layout);
        let painter = MockPainter::new();
        let mut rec = record();
        rec.overview = "word ".repeat(100);
        render(&png_bytes(16, 9, [0, 0, 0, 255]), &rec, &layout, &assets, &painter).unwrap();

        let main_draws: Vec<_> = painter
            .get_draws()
            .into_iter()
            .filter(|d| d.color != layout.shadow_color)
            .collect();
        // title, two overview lines, metadata, caption
        assert_eq!(main_draws.len(), 5);
        let step = (layout.overview.px * 1.2).round() as i32;
        assert_eq!(main_draws[2].origin.y - main_draws[1].origin.y, step);
        assert!(main_draws[2].text.ends_with("..."));
    }

    #[test]
    fn flatten_blends_against_background() {
        let mut canvas = RgbaImage::new(2, 1);
        canvas.put_pixel(0, 0, Rgba([255, 255, 255, 0]));
        canvas.put_pixel(1, 0, Rgba([200, 100, 0, 255]));
        let flat = flatten(&canvas, Rgba([10, 20, 30, 255]));
        assert_eq!(*flat.get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(*flat.get_pixel(1, 0), Rgb([200, 100, 0]));
    }

    #[test]
    fn encoded_jpeg_decodes_without_alpha() {
        let img = RgbImage::from_pixel(40, 20, Rgb([90, 90, 90]));
        let bytes = encode_jpeg(&img, Quality::default()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 20));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn render_asset_carries_canonical_name() {
        let layout = small_layout();
        let assets = TemplateAssets::synthesized(&layout);
        let asset = render_asset(&png_bytes(16, 9, [0, 0, 0, 255]), &record(), &layout, &assets, &MockPainter::new())
            .unwrap();
        assert_eq!(asset.canonical_filename, "Example__Movie_.jpg");
        assert_eq!(asset.source_record_id, "603");
    }
}
