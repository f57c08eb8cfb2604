//! Fit-and-crop: cover a target box while preserving aspect ratio, then
//! crop the overflow according to a nine-way alignment.
//!
//! # Algorithm
//!
//! ```text
//! ratio > target_ratio  =>  new = (round(ratio * th), th)
//! otherwise             =>  new = (tw, round(tw / ratio))
//! offset                 =  0 | (new - target) / 2 | new - target
//! ```
//!
//! Derived sides are clamped up to the target side so the crop box always
//! lies inside the resized image.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::{
    resize_supersampled, round_dimension, NodeError, NodeResult, PixelBuffer, Resampling,
};
use crate::tensor::ImageBatch;
use crate::transform::crop_exact;

/// Horizontal anchor of the crop window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical anchor of the crop window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Which part of the scaled image survives cropping.
///
/// Keywords are `"<horizontal>-<vertical>"` (e.g. `left-top`,
/// `right-center`), plus the alias `center` for `center-center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alignment {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

impl Alignment {
    pub const CENTER: Alignment = Alignment::new(HorizontalAlign::Center, VerticalAlign::Center);

    pub const fn new(horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// All nine alignments, row by row from left to right.
    pub fn all() -> [Alignment; 9] {
        use HorizontalAlign as H;
        use VerticalAlign as V;
        [
            Alignment::new(H::Left, V::Top),
            Alignment::new(H::Left, V::Center),
            Alignment::new(H::Left, V::Bottom),
            Alignment::new(H::Center, V::Top),
            Alignment::new(H::Center, V::Center),
            Alignment::new(H::Center, V::Bottom),
            Alignment::new(H::Right, V::Top),
            Alignment::new(H::Right, V::Center),
            Alignment::new(H::Right, V::Bottom),
        ]
    }

    /// Crop offsets for an image of `new_*` size cropped to `target_*`.
    ///
    /// Callers guarantee `new >= target` on both axes.
    pub fn offsets(
        self,
        new_width: u32,
        new_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> (u32, u32) {
        let spare_x = new_width - target_width;
        let spare_y = new_height - target_height;

        let left = match self.horizontal {
            HorizontalAlign::Left => 0,
            HorizontalAlign::Center => spare_x / 2,
            HorizontalAlign::Right => spare_x,
        };
        let top = match self.vertical {
            VerticalAlign::Top => 0,
            VerticalAlign::Center => spare_y / 2,
            VerticalAlign::Bottom => spare_y,
        };
        (left, top)
    }
}

impl FromStr for Alignment {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "center" {
            return Ok(Alignment::CENTER);
        }

        let unknown = || NodeError::invalid(format!("unknown alignment '{s}'"));
        let (h, v) = s.split_once('-').ok_or_else(unknown)?;

        let horizontal = match h {
            "left" => HorizontalAlign::Left,
            "center" => HorizontalAlign::Center,
            "right" => HorizontalAlign::Right,
            _ => return Err(unknown()),
        };
        let vertical = match v {
            "top" => VerticalAlign::Top,
            "center" => VerticalAlign::Center,
            "bottom" => VerticalAlign::Bottom,
            _ => return Err(unknown()),
        };
        Ok(Alignment::new(horizontal, vertical))
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = match self.horizontal {
            HorizontalAlign::Left => "left",
            HorizontalAlign::Center => "center",
            HorizontalAlign::Right => "right",
        };
        let v = match self.vertical {
            VerticalAlign::Top => "top",
            VerticalAlign::Center => "center",
            VerticalAlign::Bottom => "bottom",
        };
        write!(f, "{h}-{v}")
    }
}

impl TryFrom<String> for Alignment {
    type Error = NodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Alignment> for String {
    fn from(alignment: Alignment) -> Self {
        alignment.to_string()
    }
}

/// Parameters of the resize-and-crop node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitCropParams {
    /// Target width (1 to 10000)
    pub width: u32,
    /// Target height (1 to 10000)
    pub height: u32,
    pub alignment: Alignment,
    pub resampling: Resampling,
    /// Resize through an 8x intermediate to reduce aliasing
    pub supersample: bool,
}

impl Default for FitCropParams {
    fn default() -> Self {
        Self {
            width: 224,
            height: 224,
            alignment: Alignment::CENTER,
            resampling: Resampling::Lanczos,
            supersample: false,
        }
    }
}

/// Intermediate geometry of a fit-and-crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitPlan {
    /// Size after the aspect-preserving resize.
    pub new_width: u32,
    pub new_height: u32,
    /// Top-left corner of the crop window inside the resized image.
    pub left: u32,
    pub top: u32,
}

/// Compute the resize size and crop offsets without touching pixels.
///
/// # Errors
///
/// `NodeError::InvalidArgument` if any dimension is zero.
pub fn plan_fit(
    width: u32,
    height: u32,
    target_width: u32,
    target_height: u32,
    alignment: Alignment,
) -> NodeResult<FitPlan> {
    if target_width == 0 || target_height == 0 {
        return Err(NodeError::invalid(format!(
            "target size {target_width}x{target_height} must be non-zero"
        )));
    }
    if width == 0 || height == 0 {
        return Err(NodeError::invalid(format!(
            "source size {width}x{height} must be non-zero"
        )));
    }

    let original_ratio = width as f64 / height as f64;
    let target_ratio = target_width as f64 / target_height as f64;

    let (new_width, new_height) = if original_ratio > target_ratio {
        // Relatively wider: match height, overflow horizontally
        let new_width = round_dimension(original_ratio * target_height as f64);
        (new_width.max(target_width), target_height)
    } else {
        // Relatively taller: match width, overflow vertically
        let new_height = round_dimension(target_width as f64 / original_ratio);
        (target_width, new_height.max(target_height))
    };

    let (left, top) = alignment.offsets(new_width, new_height, target_width, target_height);

    Ok(FitPlan {
        new_width,
        new_height,
        left,
        top,
    })
}

/// Scale `image` to cover the target box and crop it to exactly
/// `target_width x target_height`.
///
/// # Example
///
/// ```ignore
/// // 400x200 -> 100x100: resized to 200x100, crop starts at x = 50
/// let out = fit_and_crop(&image, 100, 100, Alignment::CENTER, Resampling::Bilinear, false)?;
/// assert_eq!(out.dimensions(), (100, 100));
/// ```
pub fn fit_and_crop(
    image: &PixelBuffer,
    target_width: u32,
    target_height: u32,
    alignment: Alignment,
    resampling: Resampling,
    supersample: bool,
) -> NodeResult<PixelBuffer> {
    let plan = plan_fit(
        image.width,
        image.height,
        target_width,
        target_height,
        alignment,
    )?;
    tracing::debug!(
        ?plan,
        %alignment,
        %resampling,
        supersample,
        "fit and crop"
    );

    let resized = resize_supersampled(
        image,
        plan.new_width,
        plan.new_height,
        resampling,
        supersample,
    )?;
    crop_exact(&resized, plan.left, plan.top, target_width, target_height)
}

/// Apply [`fit_and_crop`] to every image of a batch.
pub fn fit_and_crop_batch(batch: &ImageBatch, params: &FitCropParams) -> NodeResult<ImageBatch> {
    batch.map(|image| {
        fit_and_crop(
            image,
            params.width,
            params.height,
            params.alignment,
            params.resampling,
            params.supersample,
        )
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================
