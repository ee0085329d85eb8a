// sello/src/processors/planner.rs
use crate::core::{Result, WatermarkError};

/// Computes target output dimensions for a source bitmap under an optional
/// maximum-size budget, preserving aspect ratio. Never upscales.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionPlanner;

impl DimensionPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plans the output dimensions for a `source_width` x `source_height`
    /// bitmap. Without a budget, or when both sides already fit, the source
    /// dimensions come back unchanged. Otherwise the longer side is scaled
    /// down to `max_size` and the shorter side follows proportionally,
    /// rounded to the nearest pixel.
    pub fn plan(
        &self,
        source_width: u32,
        source_height: u32,
        max_size: Option<u32>,
    ) -> Result<(u32, u32)> {
        if source_width == 0 || source_height == 0 {
            return Err(WatermarkError::InvalidImage(format!(
                "cannot plan dimensions for {}x{} source",
                source_width, source_height
            )));
        }

        let max_size = match max_size {
            Some(max) => max,
            None => return Ok((source_width, source_height)),
        };

        if source_width <= max_size && source_height <= max_size {
            return Ok((source_width, source_height));
        }

        let (width, height) = if source_width > source_height {
            let ratio = source_height as f32 / source_width as f32;
            (max_size, (max_size as f32 * ratio).round() as u32)
        } else {
            let ratio = source_width as f32 / source_height as f32;
            ((max_size as f32 * ratio).round() as u32, max_size)
        };

        Ok((width.max(1), height.max(1)))
    }
}
