// sello/src/core/mod.rs
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod pipeline;

/// Which logo gets composited onto the product image.
#[derive(Debug, Clone, PartialEq)]
pub enum Logo {
    /// Bundled primary brand logo.
    Primary,
    /// Bundled secondary brand logo.
    Secondary,
    /// Caller-supplied logo bytes (any decodable image format).
    Custom(Vec<u8>),
}

/// Anchor for logo placement. Non-center anchors are inset
/// `EDGE_INSET` pixels from the relevant edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Fixed inset, in pixels, between a non-center logo and the image edges.
pub const EDGE_INSET: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }
}

/// Watermark configuration, immutable per invocation.
#[derive(Debug, Clone)]
pub struct WatermarkSettings {
    pub logo: Logo,
    /// Fraction of full alpha applied to the logo draw, [0.0, 1.0].
    pub opacity: f32,
    /// Logo width as a fraction of the shorter output dimension, (0.0, 1.0].
    pub scale: f32,
    pub position: Anchor,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            logo: Logo::Primary,
            opacity: 0.5,
            scale: 0.2,
            position: Anchor::BottomRight,
        }
    }
}

impl WatermarkSettings {
    /// Returns a copy with `opacity` and `scale` clamped to their legal
    /// ranges. Values that cannot be clamped into range (non-finite, or a
    /// scale with no positive value to clamp to) are configuration errors.
    pub fn validated(&self) -> Result<Self> {
        if !self.opacity.is_finite() {
            return Err(WatermarkError::Configuration(format!(
                "opacity must be a finite number, got {}",
                self.opacity
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(WatermarkError::Configuration(format!(
                "scale must be a positive fraction, got {}",
                self.scale
            )));
        }
        if let Logo::Custom(bytes) = &self.logo {
            if bytes.is_empty() {
                return Err(WatermarkError::Configuration(
                    "custom logo selected but no logo bytes provided".to_string(),
                ));
            }
        }

        let mut settings = self.clone();
        settings.opacity = settings.opacity.clamp(0.0, 1.0);
        settings.scale = settings.scale.min(1.0);
        Ok(settings)
    }
}

/// Per-call processing overrides, immutable.
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Maximum output size in pixels for the longer side; `None` keeps the
    /// source dimensions. Never upscales.
    pub max_size: Option<u32>,
    /// Encoder quality in [0.0, 1.0]; lossy formats only.
    pub quality: f32,
    pub format: OutputFormat,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            max_size: None,
            quality: 0.9,
            format: OutputFormat::Jpeg,
        }
    }
}

impl ProcessorOptions {
    /// Defaults used by the batch entry points, matching the lighter
    /// compression the batch path applies.
    pub fn batch_default() -> Self {
        Self {
            quality: 0.8,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(max_size) = self.max_size {
            if max_size == 0 {
                return Err(WatermarkError::Configuration(
                    "max_size must be a positive number of pixels".to_string(),
                ));
            }
        }
        if !self.quality.is_finite() || !(0.0..=1.0).contains(&self.quality) {
            return Err(WatermarkError::Configuration(format!(
                "quality must be between 0.0 and 1.0, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Filesystem locations of the bundled predefined logos. Paths are
/// configurable so deployments can swap brand assets without rebuilding.
#[derive(Debug, Clone)]
pub struct LogoCatalog {
    pub primary: PathBuf,
    pub secondary: PathBuf,
}

impl Default for LogoCatalog {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("assets/logos/primary.png"),
            secondary: PathBuf::from("assets/logos/secondary.png"),
        }
    }
}

impl LogoCatalog {
    pub fn path_for(&self, logo: &Logo) -> Option<&Path> {
        match logo {
            Logo::Primary => Some(&self.primary),
            Logo::Secondary => Some(&self.secondary),
            Logo::Custom(_) => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Logo resolution failed: {0}")]
    LogoResolution(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Translation unavailable: {0}")]
    TranslationUnavailable(String),

    #[error("Draft save failed: {0}")]
    Save(String),

    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Batch image {index} failed: {source}")]
    BatchFailed {
        index: usize,
        #[source]
        source: Box<WatermarkError>,
    },
}

pub type Result<T> = std::result::Result<T, WatermarkError>;
