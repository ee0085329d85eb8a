// sello/src/processors/compositor.rs
use crate::core::{Anchor, Result, WatermarkError, WatermarkSettings, EDGE_INSET};
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};

/// Draws a logo bitmap onto a base bitmap at a configured anchor, scale and
/// opacity. The base is resampled to the planned output dimensions in the
/// same pass, so resize and watermark cost a single re-encode. Inputs are
/// never mutated; the result is a fresh RGBA bitmap.
pub struct Compositor {
    filter: FilterType,
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Composites `logo` onto `base` at the planned `(width, height)` output
    /// size. The logo width is `scale` times the shorter output dimension;
    /// its height follows from the logo's own aspect ratio.
    pub fn composite(
        &self,
        base: &DynamicImage,
        logo: &DynamicImage,
        settings: &WatermarkSettings,
        output: (u32, u32),
    ) -> Result<DynamicImage> {
        let (out_width, out_height) = output;
        if out_width == 0 || out_height == 0 {
            return Err(WatermarkError::InvalidImage(format!(
                "cannot composite onto {}x{} output",
                out_width, out_height
            )));
        }

        let mut canvas: RgbaImage = if (out_width, out_height) == base.dimensions() {
            base.to_rgba8()
        } else {
            log::debug!(
                "Resampling base from {}x{} to {}x{}",
                base.width(),
                base.height(),
                out_width,
                out_height
            );
            base.resize_exact(out_width, out_height, self.filter).to_rgba8()
        };

        let (logo_width, logo_height) = self.logo_dimensions(logo, settings.scale, output)?;
        let scaled_logo = logo.resize_exact(logo_width, logo_height, self.filter);

        // Opacity applies to the logo draw only; the base stays at full
        // alpha underneath.
        let mut logo_rgba = scaled_logo.to_rgba8();
        if settings.opacity < 1.0 {
            for pixel in logo_rgba.pixels_mut() {
                pixel[3] = (pixel[3] as f32 * settings.opacity).round() as u8;
            }
        }

        let (x, y) = anchor_offset(settings.position, output, (logo_width, logo_height));
        log::debug!(
            "Placing {}x{} logo at ({}, {}) with opacity {}",
            logo_width,
            logo_height,
            x,
            y,
            settings.opacity
        );

        imageops::overlay(&mut canvas, &logo_rgba, x, y);

        Ok(DynamicImage::ImageRgba8(canvas))
    }

    fn logo_dimensions(
        &self,
        logo: &DynamicImage,
        scale: f32,
        output: (u32, u32),
    ) -> Result<(u32, u32)> {
        let (logo_w, logo_h) = logo.dimensions();
        if logo_w == 0 || logo_h == 0 {
            return Err(WatermarkError::LogoResolution(format!(
                "logo has zero dimension: {}x{}",
                logo_w, logo_h
            )));
        }

        // Scale basis: the shorter output side, so the logo stays
        // proportionate for both portrait and landscape images.
        let shorter = output.0.min(output.1) as f32;
        let width = (shorter * scale).round().max(1.0);
        let height = (width * logo_h as f32 / logo_w as f32).round().max(1.0);

        Ok((width as u32, height as u32))
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-left coordinates for the logo given its anchor. Right/bottom anchors
/// subtract the logo extent plus the fixed inset; coordinates may go
/// negative for logos larger than the image, in which case the overlay
/// clips.
fn anchor_offset(anchor: Anchor, output: (u32, u32), logo: (u32, u32)) -> (i64, i64) {
    let (out_w, out_h) = (output.0 as i64, output.1 as i64);
    let (logo_w, logo_h) = (logo.0 as i64, logo.1 as i64);
    let inset = EDGE_INSET as i64;

    match anchor {
        Anchor::Center => ((out_w - logo_w) / 2, (out_h - logo_h) / 2),
        Anchor::TopLeft => (inset, inset),
        Anchor::TopRight => (out_w - logo_w - inset, inset),
        Anchor::BottomLeft => (inset, out_h - logo_h - inset),
        Anchor::BottomRight => (out_w - logo_w - inset, out_h - logo_h - inset),
    }
}
