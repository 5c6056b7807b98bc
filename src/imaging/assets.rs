//! Template assets: base canvas, gradient overlay, brand logo.
//!
//! Assets are looked up per preset under the configured assets directory:
//!
//! ```text
//! assets/
//! ├── trending/
//! │   ├── canvas.png     # base image, sized to the preset canvas
//! │   ├── overlay.png    # semi-transparent vignette over the backdrop
//! │   └── logo.png       # pasted last, on top of everything
//! └── library/
//!     └── overlay.png
//! ```
//!
//! Every file is optional. Without a canvas the preset's background color
//! is used; without an overlay a left-to-right fade is synthesized over the
//! backdrop area; without a logo none is drawn.

use super::calculations::{backdrop_area, gradient_alpha};
use super::compose::RenderError;
use super::layout::Layout;
use image::RgbaImage;
use image::imageops::FilterType;
use std::path::Path;
use tracing::{debug, warn};

const CANVAS_FILE: &str = "canvas.png";
const OVERLAY_FILE: &str = "overlay.png";
const LOGO_FILE: &str = "logo.png";

/// Fraction of the overlay width over which the synthesized fade runs.
const FADE_FRACTION: f32 = 0.4;

/// Template images for one layout, loaded once per run.
#[derive(Debug, Clone)]
pub struct TemplateAssets {
    pub canvas: RgbaImage,
    pub overlay: Option<RgbaImage>,
    pub logo: Option<RgbaImage>,
}

impl TemplateAssets {
    /// Solid canvas plus synthesized overlay, no logo.
    pub fn synthesized(layout: &Layout) -> Self {
        Self {
            canvas: solid_canvas(layout),
            overlay: Some(fade_overlay(layout)),
            logo: None,
        }
    }

    /// Load the assets for `layout` from `dir/<preset>/`, falling back to
    /// synthesized pieces for missing files. `None` means synthesize
    /// everything.
    pub fn load(dir: Option<&Path>, layout: &Layout) -> Result<Self, RenderError> {
        let Some(dir) = dir else {
            return Ok(Self::synthesized(layout));
        };
        let preset_dir = dir.join(layout.preset.name());

        let canvas = match load_png(&preset_dir, CANVAS_FILE)? {
            Some(img) if img.dimensions() != layout.canvas => {
                warn!(
                    preset = %layout.preset,
                    found = ?img.dimensions(),
                    expected = ?layout.canvas,
                    "template canvas has the wrong size, resizing"
                );
                image::imageops::resize(&img, layout.canvas.0, layout.canvas.1, FilterType::Lanczos3)
            }
            Some(img) => img,
            None => solid_canvas(layout),
        };
        let overlay = match load_png(&preset_dir, OVERLAY_FILE)? {
            Some(img) => Some(img),
            None => Some(fade_overlay(layout)),
        };
        let logo = load_png(&preset_dir, LOGO_FILE)?;

        Ok(Self {
            canvas,
            overlay,
            logo,
        })
    }
}

fn load_png(dir: &Path, name: &str) -> Result<Option<RgbaImage>, RenderError> {
    let path = dir.join(name);
    if !path.is_file() {
        debug!(path = %path.display(), "template asset not found, using default");
        return Ok(None);
    }
    let img = image::open(&path).map_err(|source| RenderError::Asset {
        path: path.clone(),
        source,
    })?;
    Ok(Some(img.to_rgba8()))
}

fn solid_canvas(layout: &Layout) -> RgbaImage {
    RgbaImage::from_pixel(layout.canvas.0, layout.canvas.1, layout.background)
}

/// Background-colored fade covering the backdrop area, opaque on the left
/// edge where it meets the text column.
fn fade_overlay(layout: &Layout) -> RgbaImage {
    let (w, h) = backdrop_area(layout.canvas, layout.overlay_origin);
    let [r, g, b, _] = layout.background.0;
    RgbaImage::from_fn(w, h, |x, _| image::Rgba([r, g, b, gradient_alpha(x, w, FADE_FRACTION)]))
}
