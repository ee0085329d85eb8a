mod cli;
mod core;
mod processors;
mod utils;
mod wizard;

pub use cli::{Cli, Commands, FormatArg, LogoArg, PositionArg, WatermarkArgs};
pub use crate::core::pipeline::WatermarkPipeline;
pub use crate::core::{
    Anchor, Logo, LogoCatalog, OutputFormat, ProcessorOptions, Result, WatermarkError,
    WatermarkSettings, EDGE_INSET,
};
pub use processors::{
    BatchProcessor, BatchStats, Compositor, Decoder, DimensionPlanner, Encoder, ProcessedImage,
};
pub use utils::{calculate_aspect_ratio, format_file_size, is_supported_format};
pub use wizard::{
    CancelReport, DraftAck, DraftField, DraftStore, Lang, LocalizedText, PassthroughTranslator,
    ProductDraft, ProductDraftAssembler, TranslationSequencer, Translator, WizardStep,
};

pub mod prelude {
    pub use crate::{
        BatchProcessor, Compositor, Decoder, DimensionPlanner, Encoder, ProcessedImage,
        ProcessorOptions, WatermarkPipeline, WatermarkSettings,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
