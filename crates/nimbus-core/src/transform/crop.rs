//! Pixel-space cropping and pasting.
//!
//! # Coordinate System
//!
//! - Coordinates are whole pixels, origin at the top-left corner
//! - Crops must lie fully inside the source; pastes are clipped to the canvas

use crate::buffer::{NodeError, NodeResult, PixelBuffer};

/// Crop the rectangle `[left, top, left + width, top + height)` from an image.
///
/// # Errors
///
/// - `NodeError::InvalidArgument` if `width` or `height` is zero
/// - `NodeError::Geometry` if the rectangle extends outside the image
/// - `NodeError::ShapeMismatch` if the pixel data does not match the image size
///
/// A crop covering the whole image returns a copy of the original.
pub fn crop_exact(
    image: &PixelBuffer,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
) -> NodeResult<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(NodeError::invalid(format!(
            "crop size {width}x{height} must be non-zero"
        )));
    }
    image.validate()?;

    let fits = left
        .checked_add(width)
        .is_some_and(|right| right <= image.width)
        && top
            .checked_add(height)
            .is_some_and(|bottom| bottom <= image.height);
    if !fits {
        return Err(NodeError::Geometry {
            left,
            top,
            width,
            height,
            image_width: image.width,
            image_height: image.height,
        });
    }

    // Fast path: full crop returns a clone
    if left == 0 && top == 0 && width == image.width && height == image.height {
        return Ok(image.clone());
    }

    let src_stride = image.width as usize * 3;
    let row_len = width as usize * 3;
    let mut output = Vec::with_capacity(row_len * height as usize);

    // Copy pixel data row by row
    for y in top..top + height {
        let start = y as usize * src_stride + left as usize * 3;
        output.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    Ok(PixelBuffer::new(width, height, output))
}

/// Paste `image` onto `canvas` with its top-left corner at `(x, y)`.
///
/// Offsets may be negative or push the image past the canvas edge; only the
/// overlapping part is copied.
///
/// # Errors
///
/// `NodeError::ShapeMismatch` if either buffer's pixel data does not match its
/// size. The canvas is left untouched in that case.
pub fn paste(canvas: &mut PixelBuffer, image: &PixelBuffer, x: i64, y: i64) -> NodeResult<()> {
    canvas.validate()?;
    image.validate()?;

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + image.width as i64).min(canvas.width as i64);
    let y1 = (y + image.height as i64).min(canvas.height as i64);

    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let dst_stride = canvas.width as usize * 3;
    let src_stride = image.width as usize * 3;
    let row_len = (x1 - x0) as usize * 3;
    let src_x = (x0 - x) as usize;

    for dst_y in y0..y1 {
        let src_y = (dst_y - y) as usize;
        let src_start = src_y * src_stride + src_x * 3;
        let dst_start = dst_y as usize * dst_stride + x0 as usize * 3;
        canvas.pixels[dst_start..dst_start + row_len]
            .copy_from_slice(&image.pixels[src_start..src_start + row_len]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RgbColor;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.push(v); // R
                pixels.push(v); // G
                pixels.push(v); // B
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_full_crop() {
        let img = test_image(20, 10);
        let result = crop_exact(&img, 0, 0, 20, 10).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_inner_crop() {
        let img = test_image(10, 10);
        let result = crop_exact(&img, 2, 3, 4, 5).unwrap();

        assert_eq!(result.dimensions(), (4, 5));
        // First pixel comes from (2, 3): 3 * 10 + 2 = 32
        assert_eq!(result.pixel(0, 0), [32, 32, 32]);
        // Last pixel comes from (5, 7): 7 * 10 + 5 = 75
        assert_eq!(result.pixel(3, 4), [75, 75, 75]);
    }

    #[test]
    fn test_crop_touching_edges() {
        let img = test_image(10, 10);
        let result = crop_exact(&img, 6, 6, 4, 4).unwrap();
        assert_eq!(result.pixel(3, 3), [99, 99, 99]);
    }

    #[test]
    fn test_crop_outside_bounds() {
        let img = test_image(10, 10);

        let err = crop_exact(&img, 8, 0, 4, 4).unwrap_err();
        assert_eq!(
            err,
            NodeError::Geometry {
                left: 8,
                top: 0,
                width: 4,
                height: 4,
                image_width: 10,
                image_height: 10,
            }
        );
        assert!(crop_exact(&img, 0, 7, 10, 4).is_err());
        assert!(crop_exact(&img, u32::MAX, 0, 2, 2).is_err());
    }

    #[test]
    fn test_crop_zero_size() {
        let img = test_image(10, 10);
        assert!(matches!(
            crop_exact(&img, 0, 0, 0, 5),
            Err(NodeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_paste_inside() {
        let mut canvas = PixelBuffer::filled(6, 6, RgbColor::BLACK);
        let patch = PixelBuffer::filled(2, 2, RgbColor::WHITE);
        paste(&mut canvas, &patch, 3, 1).unwrap();

        assert_eq!(canvas.pixel(3, 1), [255, 255, 255]);
        assert_eq!(canvas.pixel(4, 2), [255, 255, 255]);
        assert_eq!(canvas.pixel(2, 1), [0, 0, 0]);
        assert_eq!(canvas.pixel(5, 1), [0, 0, 0]);
        assert_eq!(canvas.pixel(3, 3), [0, 0, 0]);
    }

    #[test]
    fn test_paste_clips_negative_offset() {
        let mut canvas = PixelBuffer::filled(4, 4, RgbColor::BLACK);
        let patch = test_image(4, 4);
        paste(&mut canvas, &patch, -2, -1).unwrap();

        // Canvas (0, 0) receives patch (2, 1) = 1 * 4 + 2 = 6
        assert_eq!(canvas.pixel(0, 0), [6, 6, 6]);
        assert_eq!(canvas.pixel(1, 2), [15, 15, 15]);
        assert_eq!(canvas.pixel(2, 0), [0, 0, 0]);
        assert_eq!(canvas.pixel(0, 3), [0, 0, 0]);
    }

    #[test]
    fn test_paste_clips_far_edge() {
        let mut canvas = PixelBuffer::filled(4, 4, RgbColor::BLACK);
        let patch = PixelBuffer::filled(3, 3, RgbColor::RED);
        paste(&mut canvas, &patch, 2, 2).unwrap();

        assert_eq!(canvas.pixel(3, 3), [255, 0, 0]);
        assert_eq!(canvas.pixel(1, 3), [0, 0, 0]);
    }

    #[test]
    fn test_paste_fully_outside_is_noop() {
        let mut canvas = PixelBuffer::filled(4, 4, RgbColor::BLACK);
        let before = canvas.clone();
        let patch = PixelBuffer::filled(2, 2, RgbColor::WHITE);

        paste(&mut canvas, &patch, 4, 0).unwrap();
        paste(&mut canvas, &patch, -2, 0).unwrap();
        paste(&mut canvas, &patch, 0, 10).unwrap();
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_crop_rejects_mismatched_pixel_data() {
        let short = PixelBuffer {
            width: 10,
            height: 10,
            pixels: vec![0; 5],
        };
        assert!(matches!(
            crop_exact(&short, 0, 0, 10, 5),
            Err(NodeError::ShapeMismatch { .. })
        ));
        // Full-size crops take the clone path and are checked too
        assert!(matches!(
            crop_exact(&short, 0, 0, 10, 10),
            Err(NodeError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_paste_rejects_mismatched_pixel_data() {
        let short = PixelBuffer {
            width: 4,
            height: 4,
            pixels: vec![7; 3],
        };
        let mut canvas = PixelBuffer::filled(8, 8, RgbColor::BLACK);
        assert!(matches!(
            paste(&mut canvas, &short, 0, 0),
            Err(NodeError::ShapeMismatch { .. })
        ));
        assert_eq!(canvas, PixelBuffer::filled(8, 8, RgbColor::BLACK));

        let mut bad_canvas = PixelBuffer {
            width: 8,
            height: 8,
            pixels: vec![0; 10],
        };
        let patch = PixelBuffer::filled(2, 2, RgbColor::WHITE);
        assert!(paste(&mut bad_canvas, &patch, 0, 0).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    proptest! {
        /// Property: In-bounds crops have the requested size and origin pixel.
        #[test]
        fn prop_crop_in_bounds(
            (width, height) in (4u32..=60, 4u32..=60),
            (fl, ft, fw, fh) in (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0),
        ) {
            let left = (fl * width as f64) as u32;
            let top = (ft * height as f64) as u32;
            let w = 1 + (fw * (width - left - 1) as f64) as u32;
            let h = 1 + (fh * (height - top - 1) as f64) as u32;

            let img = create_test_image(width, height);
            let result = crop_exact(&img, left, top, w, h).unwrap();

            prop_assert_eq!(result.dimensions(), (w, h));
            prop_assert_eq!(result.pixels.len(), (w * h * 3) as usize);
            prop_assert_eq!(result.pixel(0, 0), img.pixel(left, top));
            prop_assert_eq!(result.pixel(w - 1, h - 1), img.pixel(left + w - 1, top + h - 1));
        }

        /// Property: Pasting a crop back where it came from is a no-op.
        #[test]
        fn prop_paste_crop_roundtrip(
            (width, height) in (4u32..=40, 4u32..=40),
            (left, top) in (0u32..3, 0u32..3),
        ) {
            let img = create_test_image(width, height);
            let patch = crop_exact(&img, left, top, width - left, height - top).unwrap();

            let mut canvas = img.clone();
            paste(&mut canvas, &patch, left as i64, top as i64).unwrap();
            prop_assert_eq!(canvas, img);
        }
    }
}
