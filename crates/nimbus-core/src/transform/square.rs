//! Square adapter: letterbox an image onto a square canvas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::{
    calculate_fit_dimensions, resize_supersampled, round_dimension, NodeError, NodeResult,
    PixelBuffer, Resampling, RgbColor,
};
use crate::tensor::ImageBatch;
use crate::transform::paste;

/// How the scaled image is placed on the square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FittingMode {
    /// Fit the longest edge and center on both axes.
    #[default]
    None,
    /// Fill the width, pin to the top edge.
    Top,
    /// Fill the width, pin to the bottom edge.
    Bottom,
    /// Fill the width, center vertically.
    Center,
}

impl FittingMode {
    pub const ALL: [FittingMode; 4] = [
        FittingMode::None,
        FittingMode::Top,
        FittingMode::Bottom,
        FittingMode::Center,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            FittingMode::None => "none",
            FittingMode::Top => "top",
            FittingMode::Bottom => "bottom",
            FittingMode::Center => "center",
        }
    }
}

impl FromStr for FittingMode {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FittingMode::ALL
            .into_iter()
            .find(|mode| mode.keyword() == s)
            .ok_or_else(|| NodeError::invalid(format!("unknown fitting mode '{s}'")))
    }
}

impl fmt::Display for FittingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parameters of the square adapter node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquareParams {
    /// Canvas side length (1 to 10000)
    pub target_size: u32,
    /// Canvas colour around the image
    pub fill_color: RgbColor,
    pub resampling: Resampling,
    pub supersample: bool,
    pub fitting_mode: FittingMode,
}

impl Default for SquareParams {
    fn default() -> Self {
        Self {
            target_size: 224,
            fill_color: RgbColor::WHITE,
            resampling: Resampling::Lanczos,
            supersample: false,
            fitting_mode: FittingMode::None,
        }
    }
}

/// Scale `image` and paste it onto a `target_size` square of `fill_color`.
///
/// In the width-filling modes a portrait image is taller than the canvas;
/// the part outside the canvas is clipped.
pub fn fit_in_square(image: &PixelBuffer, params: &SquareParams) -> NodeResult<PixelBuffer> {
    let size = params.target_size;
    if size == 0 {
        return Err(NodeError::invalid("square target size must be non-zero"));
    }
    if image.is_empty() {
        return Err(NodeError::invalid("cannot fit an empty image"));
    }

    let (new_width, new_height) = match params.fitting_mode {
        FittingMode::None => calculate_fit_dimensions(image.width, image.height, size, size),
        _ => {
            let scale = size as f64 / image.width as f64;
            (size, round_dimension(image.height as f64 * scale))
        }
    };

    let scaled = resize_supersampled(
        image,
        new_width,
        new_height,
        params.resampling,
        params.supersample,
    )?;

    let spare_x = size as i64 - new_width as i64;
    let spare_y = size as i64 - new_height as i64;
    let (x, y) = match params.fitting_mode {
        FittingMode::None => (spare_x / 2, spare_y / 2),
        FittingMode::Top => (0, 0),
        FittingMode::Bottom => (0, spare_y),
        FittingMode::Center => (0, spare_y.div_euclid(2)),
    };
    tracing::debug!(new_width, new_height, x, y, mode = %params.fitting_mode, "square fit");

    let mut canvas = PixelBuffer::filled(size, size, params.fill_color);
    paste(&mut canvas, &scaled, x, y)?;
    Ok(canvas)
}

/// Apply [`fit_in_square`] to every image of a batch.
pub fn fit_in_square_batch(batch: &ImageBatch, params: &SquareParams) -> NodeResult<ImageBatch> {
    batch.map(|image| fit_in_square(image, params))
}
