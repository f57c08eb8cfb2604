//! Nimbus Core - image and numeric transform nodes
//!
//! This crate provides the transforms behind the Nimbus node pack:
//! resize-and-crop with alignment, square padding, corner rectangle
//! extraction/combination, auto levels, integer math, number ranges and
//! resolution helpers.
//!
//! # Module Structure
//!
//! - `buffer` - RGB8 pixel buffers, resampling kernels, resize helpers
//! - `tensor` - `[B, H, W, C]` batch bridge used by the host
//! - `transform` - fit-and-crop, square adapter, corner rectangles
//! - `levels` - percentile-based contrast stretching
//! - `math`, `range`, `resolution` - scalar nodes
//!
//! Every node validates its parameters up front and reports problems as a
//! [`NodeError`]; unknown keywords never fall through silently.

pub mod buffer;
pub mod levels;
pub mod math;
pub mod range;
pub mod resolution;
pub mod tensor;
pub mod transform;

pub use buffer::{NodeError, NodeResult, PixelBuffer, Resampling, RgbColor};
pub use levels::{auto_levels, LevelsParams};
pub use math::MathOperation;
pub use range::{number_range, NumberRange, RangeParams};
pub use resolution::{adjust_and_round_dimensions, resolve_preset, DimensionPlan};
pub use tensor::ImageBatch;
pub use transform::{
    combine_rect, extract_rect, fit_and_crop, fit_in_square, Alignment, Corner, FitCropParams,
    FittingMode, SquareParams,
};

