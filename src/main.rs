use anyhow::{bail, Context};
use clap::Parser;
use log::LevelFilter;
use sello::{
    BatchProcessor, Cli, Commands, Logo, LogoArg, ProcessorOptions, WatermarkArgs,
    WatermarkPipeline, WatermarkSettings,
};
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Apply {
            input,
            output,
            watermark,
        } => {
            let settings = build_settings(&watermark)?;
            let options = build_options(&watermark, false);
            let pipeline = WatermarkPipeline::new(settings, options)?;

            let output = output.unwrap_or_else(|| default_output_path(&input, &watermark));
            let processed = pipeline.process_file(&input, &output)?;
            let (width, height) = processed.dimensions();
            println!(
                "Watermarked {} -> {} ({}x{})",
                input.display(),
                output.display(),
                width,
                height
            );
        }
        Commands::Batch {
            input_dir,
            output_dir,
            recursive,
            threads,
            watermark,
        } => {
            let settings = build_settings(&watermark)?;
            let options = build_options(&watermark, true);
            let pipeline = WatermarkPipeline::new(settings, options)?;
            let batch = BatchProcessor::new(pipeline, threads)?.with_progress(true);

            let stats = batch.process_directory(&input_dir, &output_dir, recursive)?;
            println!(
                "Watermarked {} images into {}",
                stats.processed_count,
                output_dir.display()
            );
        }
    }

    Ok(())
}

fn build_settings(args: &WatermarkArgs) -> anyhow::Result<WatermarkSettings> {
    let logo = match args.logo {
        LogoArg::Primary => Logo::Primary,
        LogoArg::Secondary => Logo::Secondary,
        LogoArg::Custom => {
            let Some(path) = &args.custom_logo else {
                bail!("--custom-logo is required with --logo custom");
            };
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read custom logo {}", path.display()))?;
            Logo::Custom(bytes)
        }
    };

    Ok(WatermarkSettings {
        logo,
        opacity: args.opacity,
        scale: args.scale,
        position: args.position.into(),
    })
}

fn build_options(args: &WatermarkArgs, batch: bool) -> ProcessorOptions {
    let defaults = if batch {
        ProcessorOptions::batch_default()
    } else {
        ProcessorOptions::default()
    };

    ProcessorOptions {
        max_size: args.max_size,
        quality: args.quality.unwrap_or(defaults.quality),
        format: args.format.into(),
    }
}

fn default_output_path(input: &Path, args: &WatermarkArgs) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let format: sello::OutputFormat = args.format.into();
    input.with_file_name(format!("{}_watermarked.{}", stem, format.extension()))
}
