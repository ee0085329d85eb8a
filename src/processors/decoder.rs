// sello/src/processors/decoder.rs
use crate::core::{Result, WatermarkError};
use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::Path;

/// Turns uploaded files or byte buffers into in-memory bitmaps with known
/// pixel dimensions. Rejects zero-dimension and oversized inputs up front so
/// later stages can assume usable bitmaps.
#[derive(Clone)]
pub struct Decoder {
    max_dimensions: Option<(u32, u32)>,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((100_000, 100_000)),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    pub fn decode_path(&self, path: &Path) -> Result<DynamicImage> {
        log::debug!("Decoding image from: {}", path.display());

        self.validate_path(path)?;

        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| {
                WatermarkError::InvalidImage(format!(
                    "failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })?;

        self.validate_bitmap(&image)?;

        let (width, height) = image.dimensions();
        log::debug!("Decoded {}x{} image from {}", width, height, path.display());

        Ok(image)
    }

    pub fn decode_bytes(&self, data: &[u8]) -> Result<DynamicImage> {
        if data.is_empty() {
            return Err(WatermarkError::InvalidImage(
                "empty image buffer".to_string(),
            ));
        }

        let image = image::load_from_memory(data).map_err(|e| {
            WatermarkError::InvalidImage(format!("failed to decode image bytes: {}", e))
        })?;

        self.validate_bitmap(&image)?;
        Ok(image)
    }

    fn validate_bitmap(&self, image: &DynamicImage) -> Result<()> {
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(WatermarkError::InvalidImage(format!(
                "image has zero dimension: {}x{}",
                width, height
            )));
        }

        if let Some((max_w, max_h)) = self.max_dimensions {
            if width > max_w || height > max_h {
                return Err(WatermarkError::InvalidImage(format!(
                    "image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }

        Ok(())
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(WatermarkError::InvalidImage(format!(
                "file does not exist: {}",
                path.display()
            )));
        }

        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Err(WatermarkError::InvalidImage(format!(
                "file is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
