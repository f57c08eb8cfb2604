//! Resizing built on the `image` crate's resampling filters.
//!
//! All functions return new `PixelBuffer` instances without modifying the input.

use super::{NodeError, NodeResult, PixelBuffer, Resampling};

/// Scale factor for the oversample-then-downsample path.
pub const SUPERSAMPLE_FACTOR: u32 = 8;

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `NodeError::InvalidArgument` for a zero target dimension or an
/// empty source image.
pub fn resize(
    image: &PixelBuffer,
    width: u32,
    height: u32,
    resampling: Resampling,
) -> NodeResult<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(NodeError::invalid(format!(
            "resize target {width}x{height} must be non-zero"
        )));
    }
    if image.is_empty() {
        return Err(NodeError::invalid("cannot resize an empty image"));
    }
    image.validate()?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image.to_rgb_image()?;
    let resized =
        image::imageops::resize(&rgb_image, width, height, resampling.to_image_filter());

    Ok(PixelBuffer::from_rgb_image(resized))
}

/// Resize, optionally going through an 8x oversampled intermediate first.
///
/// The oversampled pass is skipped when the image already has the requested
/// size, so supersampling never alters an image that needs no scaling.
pub fn resize_supersampled(
    image: &PixelBuffer,
    width: u32,
    height: u32,
    resampling: Resampling,
    supersample: bool,
) -> NodeResult<PixelBuffer> {
    if !supersample || image.dimensions() == (width, height) {
        return resize(image, width, height, resampling);
    }

    let (big_w, big_h) = width
        .checked_mul(SUPERSAMPLE_FACTOR)
        .zip(height.checked_mul(SUPERSAMPLE_FACTOR))
        .ok_or_else(|| {
            NodeError::invalid(format!("supersampling {width}x{height} overflows"))
        })?;

    tracing::debug!(big_w, big_h, width, height, "supersampling resize");
    let oversampled = resize(image, big_w, big_h, resampling)?;
    resize(&oversampled, width, height, resampling)
}

/// Resize to a fixed height, keeping the aspect ratio.
pub fn resize_to_height(
    image: &PixelBuffer,
    height: u32,
    resampling: Resampling,
) -> NodeResult<PixelBuffer> {
    if image.is_empty() {
        return Err(NodeError::invalid("cannot resize an empty image"));
    }
    let ratio = image.width as f64 / image.height as f64;
    let width = round_dimension(ratio * height as f64);
    resize(image, width, height, resampling)
}

/// Calculate the largest size with the image's aspect ratio that fits inside
/// `box_width x box_height`. One side always equals the box side.
pub fn calculate_fit_dimensions(
    width: u32,
    height: u32,
    box_width: u32,
    box_height: u32,
) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;
    let box_ratio = box_width as f64 / box_height as f64;

    if ratio > box_ratio {
        // Wider than the box: constrain by width
        let new_height = round_dimension(box_width as f64 / ratio).min(box_height);
        (box_width, new_height)
    } else {
        // Taller than (or same shape as) the box: constrain by height
        let new_width = round_dimension(box_height as f64 * ratio).min(box_width);
        (new_width, box_height)
    }
}

/// Round a derived dimension half away from zero, never below one pixel.
#[inline]
pub(crate) fn round_dimension(value: f64) -> u32 {
    value.round().max(1.0) as u32
}


// ============================================================================
// Property-Based Tests
// ============================================================================
