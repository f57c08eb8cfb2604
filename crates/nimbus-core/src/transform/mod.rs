//! Geometric image nodes: fit-and-crop, square adapter, corner rectangles.
//!
//! # Coordinate System
//!
//! - Sizes and offsets are whole pixels
//! - Origin is the top-left corner
//! - Every node returns a new image; inputs are never modified

mod crop;
mod fit;
mod patch;
mod square;

pub use crop::{crop_exact, paste};
pub use fit::{
    fit_and_crop, fit_and_crop_batch, plan_fit, Alignment, FitCropParams, FitPlan,
    HorizontalAlign, VerticalAlign,
};
pub use patch::{combine_rect, extract_rect, Corner};
pub use square::{fit_in_square, fit_in_square_batch, FittingMode, SquareParams};
