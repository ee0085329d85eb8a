// sello/src/processors/mod.rs
mod batch;
mod compositor;
mod decoder;
mod encoder;
mod planner;

pub use batch::{BatchProcessor, BatchStats};
pub use compositor::Compositor;
pub use decoder::Decoder;
pub use encoder::{Encoder, ProcessedImage};
pub use planner::DimensionPlanner;

pub mod prelude {
    pub use super::{BatchProcessor, Compositor, Decoder, DimensionPlanner, Encoder};
}
