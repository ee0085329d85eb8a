// sello/src/processors/encoder.rs
use crate::core::{OutputFormat, Result, WatermarkError};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Encoded output of the pipeline. Owns its bytes; never aliases the source
/// image, so callers can hold, save, or drop results independently.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    bytes: Vec<u8>,
    format: OutputFormat,
    width: u32,
    height: u32,
}

impl ProcessedImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        log::debug!("Saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }

    /// Renders the encoded bytes as a `data:` URL, the shape web frontends
    /// consume directly in an `img` source.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Serializes composited bitmaps to JPEG, PNG or WebP. Quality applies to
/// JPEG only; PNG is lossless (with an oxipng optimization pass) and the
/// `image` crate's WebP encoder is lossless as well, so both accept and
/// ignore the quality setting.
pub struct Encoder {
    optimize_png: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Self { optimize_png: true }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    pub fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: f32,
    ) -> Result<ProcessedImage> {
        let (width, height) = (image.width(), image.height());
        log::debug!(
            "Encoding {}x{} bitmap as {:?} at quality {}",
            width,
            height,
            format,
            quality
        );

        let bytes = match format {
            OutputFormat::Jpeg => self.encode_jpeg(image, quality)?,
            OutputFormat::Png => self.encode_png(image)?,
            OutputFormat::WebP => self.encode_webp(image)?,
        };

        Ok(ProcessedImage {
            bytes,
            format,
            width,
            height,
        })
    }

    fn encode_jpeg(&self, image: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        // JPEG has no alpha channel; flatten before encoding.
        let rgb = image.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality_to_percent(quality));
        rgb.write_with_encoder(encoder)
            .map_err(|e| WatermarkError::Encode(format!("JPEG encoding failed: {}", e)))?;
        Ok(buffer.into_inner())
    }

    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| WatermarkError::Encode(format!("PNG encoding failed: {}", e)))?;

        let data = buffer.into_inner();
        if !self.optimize_png {
            return Ok(data);
        }

        oxipng::optimize_from_memory(&data, &oxipng::Options::default())
            .map_err(|e| WatermarkError::Encode(format!("PNG optimization failed: {}", e)))
    }

    fn encode_webp(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let rgba = image.to_rgba8();
        let encoder = WebPEncoder::new_lossless(&mut buffer);
        rgba.write_with_encoder(encoder)
            .map_err(|e| WatermarkError::Encode(format!("WebP encoding failed: {}", e)))?;
        Ok(buffer.into_inner())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps the [0.0, 1.0] quality fraction onto the 1..=100 percent scale the
/// JPEG encoder expects.
fn quality_to_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}
