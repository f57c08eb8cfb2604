//! Pixel buffers and resampling.
//!
//! This module provides:
//! - The RGB8 `PixelBuffer` every image node consumes and produces
//! - The `Resampling` kernel selection shared by all scaling nodes
//! - Resize helpers (exact, supersampled, fixed-height, fit-inside-box)
//!
//! All operations are synchronous and return new buffers.

mod resize;
mod types;

pub(crate) use resize::round_dimension;
pub use resize::{
    calculate_fit_dimensions, resize, resize_supersampled, resize_to_height, SUPERSAMPLE_FACTOR,
};
pub use types::{NodeError, NodeResult, PixelBuffer, Resampling, RgbColor};
