// sello/src/core/pipeline.rs
use super::{Logo, LogoCatalog, ProcessorOptions, Result, WatermarkError, WatermarkSettings};
use crate::processors::{Compositor, Decoder, DimensionPlanner, Encoder, ProcessedImage};
use image::DynamicImage;
use std::path::Path;

/// Orchestrates decode -> plan -> composite -> encode for one image under a
/// fixed `WatermarkSettings` / `ProcessorOptions` pair. Holds no references
/// to source bytes after returning, so repeated calls on the same source
/// with different pipelines never interfere.
pub struct WatermarkPipeline {
    settings: WatermarkSettings,
    options: ProcessorOptions,
    catalog: LogoCatalog,
    decoder: Decoder,
    planner: DimensionPlanner,
    compositor: Compositor,
    encoder: Encoder,
}

impl WatermarkPipeline {
    /// Builds a pipeline, clamping settings into range and rejecting
    /// configurations that cannot be clamped (see
    /// [`WatermarkSettings::validated`]).
    pub fn new(settings: WatermarkSettings, options: ProcessorOptions) -> Result<Self> {
        let settings = settings.validated()?;
        options.validate()?;

        Ok(Self {
            settings,
            options,
            catalog: LogoCatalog::default(),
            decoder: Decoder::new(),
            planner: DimensionPlanner::new(),
            compositor: Compositor::new(),
            encoder: Encoder::new(),
        })
    }

    pub fn with_catalog(mut self, catalog: LogoCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn settings(&self) -> &WatermarkSettings {
        &self.settings
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Watermarks a single in-memory image. The logo is resolved fresh for
    /// the call; batch callers resolve once and reuse via
    /// [`Self::apply_with_logo`].
    pub fn apply_watermark(&self, source: &[u8]) -> Result<ProcessedImage> {
        let logo = self.resolve_logo()?;
        self.apply_with_logo(source, &logo)
    }

    /// Watermarks a file on disk and writes the encoded result next to the
    /// requested output path.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<ProcessedImage> {
        let image = self.decoder.decode_path(input)?;
        let logo = self.resolve_logo()?;
        let processed = self.apply_to_bitmap(&image, &logo)?;

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        processed.save(output)?;

        log::info!(
            "Watermarked {} -> {} ({}x{}, {} bytes)",
            input.display(),
            output.display(),
            processed.dimensions().0,
            processed.dimensions().1,
            processed.len()
        );

        Ok(processed)
    }

    /// Decodes the configured logo. Custom logo bytes are borrowed for
    /// exactly this one decode and not retained afterwards.
    pub fn resolve_logo(&self) -> Result<DynamicImage> {
        match &self.settings.logo {
            Logo::Custom(bytes) => self.decoder.decode_bytes(bytes).map_err(|e| {
                WatermarkError::LogoResolution(format!("custom logo: {}", e))
            }),
            predefined => {
                let path = self
                    .catalog
                    .path_for(predefined)
                    .ok_or_else(|| {
                        WatermarkError::LogoResolution(
                            "no catalog entry for logo selection".to_string(),
                        )
                    })?;
                self.decoder.decode_path(path).map_err(|e| {
                    WatermarkError::LogoResolution(format!(
                        "predefined logo {}: {}",
                        path.display(),
                        e
                    ))
                })
            }
        }
    }

    pub(crate) fn apply_with_logo(
        &self,
        source: &[u8],
        logo: &DynamicImage,
    ) -> Result<ProcessedImage> {
        let image = self.decoder.decode_bytes(source)?;
        self.apply_to_bitmap(&image, logo)
    }

    fn apply_to_bitmap(&self, image: &DynamicImage, logo: &DynamicImage) -> Result<ProcessedImage> {
        let output = self
            .planner
            .plan(image.width(), image.height(), self.options.max_size)?;
        let composited = self
            .compositor
            .composite(image, logo, &self.settings, output)?;
        self.encoder
            .encode(&composited, self.options.format, self.options.quality)
    }
}
