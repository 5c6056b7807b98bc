//! Pure calculation functions for layout geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::Point;
use serde::{Deserialize, Serialize};

/// Which edge of the backdrop is pinned when scaling it into the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fit {
    /// Scale so the width equals the value; height follows the aspect ratio.
    Width(u32),
    /// Scale so the height equals the value; width follows the aspect ratio.
    Height(u32),
}

/// Calculate backdrop dimensions after fitting, preserving aspect ratio.
///
/// # Arguments
/// * `source` - Decoded backdrop dimensions (width, height), both non-zero
/// * `fit` - Edge to pin and its target length
///
/// # Returns
/// * `(width, height)` - Scaled dimensions, never zero
///
/// # Examples
/// ```
/// # use trendwall::imaging::{Fit, fit_dimensions};
/// // 16:9 backdrop pinned to 1500px tall → 2667x1500
/// assert_eq!(fit_dimensions((1920, 1080), Fit::Height(1500)), (2667, 1500));
///
/// // Same backdrop pinned to 1500px wide → 1500x844
/// assert_eq!(fit_dimensions((1920, 1080), Fit::Width(1500)), (1500, 844));
/// ```
pub fn fit_dimensions(source: (u32, u32), fit: Fit) -> (u32, u32) {
    let (src_w, src_h) = (source.0.max(1) as f64, source.1.max(1) as f64);

    match fit {
        Fit::Width(w) => {
            let h = (w as f64 * src_h / src_w).round() as u32;
            (w.max(1), h.max(1))
        }
        Fit::Height(h) => {
            let w = (h as f64 * src_w / src_h).round() as u32;
            (w.max(1), h.max(1))
        }
    }
}

/// Top-left origin of line `index` of a multi-line block.
pub fn line_origin(origin: Point, index: usize, line_height: f32) -> Point {
    Point {
        x: origin.x,
        y: origin.y + (index as f32 * line_height).round() as i32,
    }
}

/// Origin of the drop shadow for text drawn at `origin`.
pub fn shadow_origin(origin: Point, offset: Point) -> Point {
    Point {
        x: origin.x + offset.x,
        y: origin.y + offset.y,
    }
}

/// Alpha of the synthesized overlay gradient at column `x`.
///
/// Fully opaque at the left edge, fading linearly to fully transparent at
/// `fade_fraction` of `width`, transparent beyond.
pub fn gradient_alpha(x: u32, width: u32, fade_fraction: f32) -> u8 {
    let fade_end = (width as f32 * fade_fraction).max(1.0);
    let t = (x as f32 / fade_end).clamp(0.0, 1.0);
    ((1.0 - t) * 255.0).round() as u8
}

/// Area a backdrop pasted at `origin` can cover on a canvas of `canvas` size.
pub fn backdrop_area(canvas: (u32, u32), origin: Point) -> (u32, u32) {
    let w = canvas.0 as i64 - origin.x.max(0) as i64;
    let h = canvas.1 as i64 - origin.y.max(0) as i64;
    (w.max(1) as u32, h.max(1) as u32)
}

/// Top-left part of a backdrop that can still be seen once fitted and
/// pasted at `origin`, and the size to scale that part to.
///
/// Returns `(crop, scaled)`. `scaled` never exceeds what the canvas shows
/// past `origin`, so an extreme aspect ratio cannot blow up the resize.
///
/// # Examples
/// ```
/// # use trendwall::imaging::{Fit, Point, visible_crop};
/// // 60000x4 strip on the 3840x1500 trending canvas: only 8 source
/// // columns survive, scaled to the 2665x1500 backdrop area.
/// assert_eq!(
///     visible_crop((60000, 4), Fit::Height(1500), (3840, 1500), Point::new(1175, 0)),
///     ((8, 4), (2665, 1500))
/// );
/// ```
pub fn visible_crop(
    source: (u32, u32),
    fit: Fit,
    canvas: (u32, u32),
    origin: Point,
) -> ((u32, u32), (u32, u32)) {
    let (fit_w, fit_h) = fit_dimensions(source, fit);
    let extent_w = (canvas.0 as i64 - origin.x as i64).max(1) as u32;
    let extent_h = (canvas.1 as i64 - origin.y as i64).max(1) as u32;
    let scaled = (fit_w.min(extent_w), fit_h.min(extent_h));

    let crop_edge = |shown: u32, fitted: u32, src: u32| {
        let edge = (shown as f64 * src as f64 / fitted as f64).ceil() as u32;
        edge.clamp(1, src.max(1))
    };
    let crop = (
        crop_edge(scaled.0, fit_w, source.0),
        crop_edge(scaled.1, fit_h, source.1),
    );
    (crop, scaled)
}
