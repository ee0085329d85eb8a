// sello/src/cli.rs
use crate::core::{Anchor, OutputFormat};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sello", version, about = "Watermark product images in bulk")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watermark a single image
    Apply {
        /// Input image file
        input: PathBuf,

        /// Output file; defaults to <input>_watermarked.<format>
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        watermark: WatermarkArgs,
    },

    /// Watermark every image in a directory
    Batch {
        /// Input directory
        input_dir: PathBuf,

        /// Output directory
        output_dir: PathBuf,

        /// Recurse into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Worker threads (0 = rayon default)
        #[arg(short, long, default_value_t = 0)]
        threads: usize,

        #[command(flatten)]
        watermark: WatermarkArgs,
    },
}

#[derive(Args)]
pub struct WatermarkArgs {
    /// Which logo to composite
    #[arg(long, value_enum, default_value_t = LogoArg::Primary)]
    pub logo: LogoArg,

    /// Logo image file, required with --logo custom
    #[arg(long)]
    pub custom_logo: Option<PathBuf>,

    /// Logo opacity, 0.0-1.0
    #[arg(long, default_value_t = 0.5)]
    pub opacity: f32,

    /// Logo width as a fraction of the shorter output side, 0.0-1.0
    #[arg(long, default_value_t = 0.2)]
    pub scale: f32,

    /// Logo anchor position
    #[arg(long, value_enum, default_value_t = PositionArg::BottomRight)]
    pub position: PositionArg,

    /// Maximum output size in pixels for the longer side
    #[arg(long)]
    pub max_size: Option<u32>,

    /// Encoder quality, 0.0-1.0 (lossy formats only)
    #[arg(long)]
    pub quality: Option<f32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Jpeg)]
    pub format: FormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogoArg {
    Primary,
    Secondary,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PositionArg {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<PositionArg> for Anchor {
    fn from(position: PositionArg) -> Self {
        match position {
            PositionArg::Center => Anchor::Center,
            PositionArg::TopLeft => Anchor::TopLeft,
            PositionArg::TopRight => Anchor::TopRight,
            PositionArg::BottomLeft => Anchor::BottomLeft,
            PositionArg::BottomRight => Anchor::BottomRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Jpeg,
    Png,
    Webp,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Webp => OutputFormat::WebP,
        }
    }
}
