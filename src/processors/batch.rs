// sello/src/processors/batch.rs
use crate::core::pipeline::WatermarkPipeline;
use crate::core::{Result, WatermarkError};
use crate::processors::ProcessedImage;
use crate::utils::{format_file_size, is_supported_format};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Applies one pipeline configuration across many images in parallel.
///
/// The batch contract is all-or-nothing: a single failing image fails the
/// whole call, and no partial results are returned. Output order always
/// matches input order regardless of which image finishes first.
pub struct BatchProcessor {
    pipeline: WatermarkPipeline,
    thread_pool: Option<rayon::ThreadPool>,
    show_progress: bool,
}

#[derive(Debug, Default)]
pub struct BatchStats {
    pub processed_count: usize,
    pub total_size_before: u64,
    pub total_size_after: u64,
}

impl BatchProcessor {
    pub fn new(pipeline: WatermarkPipeline, max_threads: usize) -> Result<Self> {
        let mut processor = Self {
            pipeline,
            thread_pool: None,
            show_progress: false,
        };

        if max_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(max_threads)
                .build()
                .map_err(|e| {
                    WatermarkError::Configuration(format!("failed to create thread pool: {}", e))
                })?;
            processor.thread_pool = Some(pool);
        }

        Ok(processor)
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn pipeline(&self) -> &WatermarkPipeline {
        &self.pipeline
    }

    /// Watermarks every buffer in `sources` with the same settings. The
    /// logo is decoded once and shared read-only across workers; the
    /// compositor never mutates it.
    pub fn process_all<B>(&self, sources: &[B]) -> Result<Vec<ProcessedImage>>
    where
        B: AsRef<[u8]> + Sync,
    {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        log::info!("Batch processing {} images", sources.len());
        let logo = Arc::new(self.pipeline.resolve_logo()?);

        let results: Vec<Result<ProcessedImage>> = match &self.thread_pool {
            Some(pool) => pool.install(|| {
                sources
                    .par_iter()
                    .map(|source| self.pipeline.apply_with_logo(source.as_ref(), &logo))
                    .collect()
            }),
            None => sources
                .par_iter()
                .map(|source| self.pipeline.apply_with_logo(source.as_ref(), &logo))
                .collect(),
        };

        collect_ordered(results)
    }

    /// Watermarks every supported image file under `input_dir`, writing
    /// results into `output_dir` with the configured output extension.
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        recursive: bool,
    ) -> Result<BatchStats> {
        self.validate_paths(input_dir, output_dir)?;

        let image_paths = self.collect_image_paths(input_dir, recursive);
        if image_paths.is_empty() {
            log::warn!("No image files found in {}", input_dir.display());
            return Ok(BatchStats::default());
        }

        log::info!(
            "Watermarking {} images from {}",
            image_paths.len(),
            input_dir.display()
        );

        std::fs::create_dir_all(output_dir)?;

        let logo = Arc::new(self.pipeline.resolve_logo()?);
        let pb = self.create_progress_bar(image_paths.len());

        let work = |path: &PathBuf| -> Result<(u64, ProcessedImage)> {
            let data = std::fs::read(path)?;
            let processed = self.pipeline.apply_with_logo(&data, &logo)?;
            Ok((data.len() as u64, processed))
        };

        let results: Vec<Result<(u64, ProcessedImage)>> = match &self.thread_pool {
            Some(pool) => pool.install(|| {
                image_paths
                    .par_iter()
                    .progress_with(pb.clone())
                    .map(work)
                    .collect()
            }),
            None => image_paths
                .par_iter()
                .progress_with(pb.clone())
                .map(work)
                .collect(),
        };

        // Every image must succeed before anything is written, so a failed
        // batch leaves no partial outputs behind.
        let mut outputs = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(pair) => outputs.push(pair),
                Err(source) => {
                    pb.abandon();
                    log::error!(
                        "Batch aborted: {} failed: {}",
                        image_paths[index].display(),
                        source
                    );
                    return Err(WatermarkError::BatchFailed {
                        index,
                        source: Box::new(source),
                    });
                }
            }
        }

        let mut stats = BatchStats::default();
        for (path, (before, processed)) in image_paths.iter().zip(outputs) {
            let output_path = output_dir.join(self.output_file_name(path));
            processed.save(&output_path)?;
            stats.processed_count += 1;
            stats.total_size_before += before;
            stats.total_size_after += processed.len() as u64;
        }

        pb.finish_with_message(format!(
            "Watermarked {} images ({} -> {})",
            stats.processed_count,
            format_file_size(stats.total_size_before),
            format_file_size(stats.total_size_after)
        ));

        Ok(stats)
    }

    fn output_file_name(&self, input_path: &Path) -> String {
        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        format!("{}.{}", stem, self.pipeline.options().format.extension())
    }

    fn collect_image_paths(&self, input_dir: &Path, recursive: bool) -> Vec<PathBuf> {
        let walker = if recursive {
            WalkDir::new(input_dir)
        } else {
            WalkDir::new(input_dir).max_depth(1)
        };

        walker
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_supported_format(entry.path()))
            .map(|entry| entry.into_path())
            .collect()
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }

    fn validate_paths(&self, input_dir: &Path, output_dir: &Path) -> Result<()> {
        if !input_dir.exists() {
            return Err(WatermarkError::Configuration(format!(
                "input directory does not exist: {}",
                input_dir.display()
            )));
        }

        if !input_dir.is_dir() {
            return Err(WatermarkError::Configuration(format!(
                "input path is not a directory: {}",
                input_dir.display()
            )));
        }

        if output_dir.exists() && !output_dir.is_dir() {
            return Err(WatermarkError::Configuration(format!(
                "output path exists but is not a directory: {}",
                output_dir.display()
            )));
        }

        if input_dir == output_dir {
            return Err(WatermarkError::Configuration(
                "input and output directories cannot be the same".to_string(),
            ));
        }

        Ok(())
    }
}

/// Unpacks positional per-image results into an ordered output vector, or
/// fails the whole batch with the lowest failing input index.
fn collect_ordered(results: Vec<Result<ProcessedImage>>) -> Result<Vec<ProcessedImage>> {
    let mut processed = Vec::with_capacity(results.len());
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(image) => processed.push(image),
            Err(source) => {
                return Err(WatermarkError::BatchFailed {
                    index,
                    source: Box::new(source),
                })
            }
        }
    }
    Ok(processed)
}
