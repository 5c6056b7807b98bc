//! Wallpaper layout engine.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Decode backdrop** | `image::load_from_memory` (JPEG, PNG, WebP) |
//! | **Scale** | `crop_imm` to the visible part, then `resize_exact` + Lanczos3, one edge pinned by the preset |
//! | **Composite** | `imageops::overlay` for backdrop, overlay, logo |
//! | **Text** | [`TextPainter`], `rusttype` in production |
//! | **Encode** | `JpegEncoder::new_with_quality` |
//!
//! The module is split into:
//! - **Calculations**: Pure geometry (fit, line offsets, fade alpha)
//! - **Parameters**: Quality, points and text styles
//! - **Layout**: The named presets
//! - **Assets**: Template canvas, overlay and logo per preset
//! - **Painter**: [`TextPainter`] trait + [`FontPainter`]
//! - **Compose**: [`render`] and friends, combining all of the above

mod assets;
mod calculations;
mod compose;
mod font_painter;
mod layout;
pub mod painter;
mod params;

pub use assets::TemplateAssets;
pub use calculations::{
    Fit, backdrop_area, fit_dimensions, gradient_alpha, line_origin, shadow_origin, visible_crop,
};
pub use compose::{RenderError, compose, decode_backdrop, encode_jpeg, flatten, render, render_asset};
pub use font_painter::FontPainter;
pub use layout::{Layout, Preset};
pub use painter::TextPainter;
pub use params::{BLACK, GREY, Point, Quality, TextStyle, WHITE};
