//! Core types shared by every node: the pixel buffer, resampling kernels,
//! fill colours and the node error type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the node crate.
pub type NodeResult<T> = Result<T, NodeError>;

/// Error types for node operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeError {
    /// A parameter is out of range or a keyword is not recognized.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A crop region does not fit inside the image it is taken from.
    #[error(
        "Crop region {width}x{height} at ({left}, {top}) exceeds {image_width}x{image_height} image"
    )]
    Geometry {
        left: u32,
        top: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// Two images or tensors that must agree in shape do not.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

impl NodeError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Interpolation kernel used when changing image resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    /// Nearest neighbor (fastest, blocky).
    Nearest,
    /// Bilinear (triangle) interpolation.
    Bilinear,
    /// Bicubic (Catmull-Rom) interpolation.
    Bicubic,
    /// Lanczos3 interpolation (slowest, sharpest).
    #[default]
    Lanczos,
}

impl Resampling {
    /// Every kernel, in the order hosts list them.
    pub const ALL: [Resampling; 4] = [
        Resampling::Lanczos,
        Resampling::Nearest,
        Resampling::Bilinear,
        Resampling::Bicubic,
    ];

    /// The keyword this kernel is selected by.
    pub fn keyword(self) -> &'static str {
        match self {
            Resampling::Nearest => "nearest",
            Resampling::Bilinear => "bilinear",
            Resampling::Bicubic => "bicubic",
            Resampling::Lanczos => "lanczos",
        }
    }

    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            Resampling::Nearest => image::imageops::FilterType::Nearest,
            Resampling::Bilinear => image::imageops::FilterType::Triangle,
            Resampling::Bicubic => image::imageops::FilterType::CatmullRom,
            Resampling::Lanczos => image::imageops::FilterType::Lanczos3,
        }
    }
}

impl FromStr for Resampling {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resampling::ALL
            .into_iter()
            .find(|kind| kind.keyword() == s)
            .ok_or_else(|| NodeError::invalid(format!("unknown resampling kernel '{s}'")))
    }
}

impl fmt::Display for Resampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// An opaque RGB colour, written as `"R,G,B"` in node parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbColor(pub [u8; 3]);

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor([0, 0, 0]);
    pub const WHITE: RgbColor = RgbColor([255, 255, 255]);
    pub const RED: RgbColor = RgbColor([255, 0, 0]);
}

impl FromStr for RgbColor {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NodeError::invalid(format!("invalid colour '{s}': {e}")))?;

        match parts.as_slice() {
            [r, g, b] => Ok(RgbColor([*r, *g, *b])),
            _ => Err(NodeError::invalid(format!(
                "invalid colour '{s}': expected three comma-separated components"
            ))),
        }
    }
}

impl TryFrom<String> for RgbColor {
    type Error = NodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RgbColor> for String {
    fn from(color: RgbColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "{r},{g},{b}")
    }
}

/// An image with RGB pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new PixelBuffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a buffer where every pixel has the same colour.
    pub fn filled(width: u32, height: u32, color: RgbColor) -> Self {
        let count = width as usize * height as usize;
        let pixels = color.0.repeat(count);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a PixelBuffer from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Check that `pixels` holds exactly `width * height * 3` bytes.
    ///
    /// The fields are public, so every node that indexes into `pixels`
    /// calls this first.
    pub fn validate(&self) -> NodeResult<()> {
        let expected = self.width as usize * self.height as usize * 3;
        if self.pixels.len() != expected {
            return Err(NodeError::ShapeMismatch {
                expected: format!("{expected} bytes"),
                actual: format!("{} bytes", self.pixels.len()),
            });
        }
        Ok(())
    }

    /// Convert to an image::RgbImage for resampling.
    pub fn to_rgb_image(&self) -> NodeResult<image::RgbImage> {
        self.validate()?;
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(|| {
            NodeError::ShapeMismatch {
                expected: format!("{}x{} image", self.width, self.height),
                actual: format!("{} bytes", self.pixels.len()),
            }
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Read one pixel. Panics if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
