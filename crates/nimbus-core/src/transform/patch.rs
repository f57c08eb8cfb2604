//! Corner-anchored rectangle extraction and combination on image batches.
//!
//! Used for watermark-style workflows: cut a corner out of a batch, process
//! it, and paste it back into the same corner.

use std::fmt;
use std::str::FromStr;

use ndarray::s;
use serde::{Deserialize, Serialize};

use crate::buffer::{NodeError, NodeResult};
use crate::tensor::ImageBatch;

/// Corner a rectangle is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        }
    }

    /// Start of a `width x height` rectangle anchored at this corner of a
    /// `outer_width x outer_height` area. May be negative.
    fn origin(self, outer_width: i64, outer_height: i64, width: i64, height: i64) -> (i64, i64) {
        match self {
            Corner::TopLeft => (0, 0),
            Corner::TopRight => (outer_width - width, 0),
            Corner::BottomLeft => (0, outer_height - height),
            Corner::BottomRight => (outer_width - width, outer_height - height),
        }
    }
}

impl FromStr for Corner {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Corner::ALL
            .into_iter()
            .find(|corner| corner.keyword() == s)
            .ok_or_else(|| NodeError::invalid(format!("unknown corner '{s}'")))
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Cut a `width x height` rectangle out of every image, anchored at `corner`.
///
/// A rectangle larger than the image is shrunk to the image, so the result
/// can be smaller than requested but never empty.
pub fn extract_rect(
    batch: &ImageBatch,
    width: u32,
    height: u32,
    corner: Corner,
) -> NodeResult<ImageBatch> {
    if width == 0 || height == 0 {
        return Err(NodeError::invalid(format!(
            "rectangle size {width}x{height} must be non-zero"
        )));
    }

    let img_w = batch.width() as i64;
    let img_h = batch.height() as i64;
    let (w, h) = (width as i64, height as i64);

    let (start_x, start_y) = corner.origin(img_w, img_h, w, h);
    let start_x = start_x.min(img_w - w).max(0);
    let start_y = start_y.min(img_h - h).max(0);
    let valid_w = w.min(img_w - start_x);
    let valid_h = h.min(img_h - start_y);

    let (x0, y0) = (start_x as usize, start_y as usize);
    let (x1, y1) = (x0 + valid_w as usize, y0 + valid_h as usize);
    tracing::debug!(x0, y0, x1, y1, %corner, "extract rect");

    ImageBatch::new(batch.data().slice(s![.., y0..y1, x0..x1, ..]).to_owned())
}

/// Paste `source` into a copy of `destination`, anchored at `corner`.
///
/// Parts of the source that fall outside the destination are dropped. A
/// single source image is applied to every destination image.
///
/// # Errors
///
/// `NodeError::InvalidArgument` when the batch sizes differ and the source
/// batch is not a single image.
pub fn combine_rect(
    destination: &ImageBatch,
    source: &ImageBatch,
    corner: Corner,
) -> NodeResult<ImageBatch> {
    let (dst_batch, src_batch) = (destination.len(), source.len());
    if src_batch != dst_batch && src_batch != 1 {
        return Err(NodeError::invalid(format!(
            "cannot combine a batch of {src_batch} source images into {dst_batch} destinations"
        )));
    }

    let dest_w = destination.width() as i64;
    let dest_h = destination.height() as i64;
    let src_w = source.width() as i64;
    let src_h = source.height() as i64;

    let (start_x, start_y) = corner.origin(dest_w, dest_h, src_w, src_h);

    let paste_x = start_x.max(0);
    let paste_y = start_y.max(0);
    let paste_w = src_w.min(dest_w - paste_x);
    let paste_h = src_h.min(dest_h - paste_y);

    if paste_w <= 0 || paste_h <= 0 {
        return Ok(destination.clone());
    }

    // Negative starts crop the leading edge of the source
    let src_x = (paste_x - start_x) as usize;
    let src_y = (paste_y - start_y) as usize;
    let (px, py) = (paste_x as usize, paste_y as usize);
    let (pw, ph) = (paste_w as usize, paste_h as usize);
    tracing::debug!(px, py, pw, ph, %corner, "combine rect");

    let region = source
        .data()
        .slice(s![.., src_y..src_y + ph, src_x..src_x + pw, ..]);
    let mut output = destination.data().clone();
    // A single-image source broadcasts over the destination batch
    output
        .slice_mut(s![.., py..py + ph, px..px + pw, ..])
        .assign(&region);

    ImageBatch::new(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    /// Batch where channel 0 encodes x, channel 1 encodes y, channel 2 the batch index.
    fn coordinate_batch(batch: usize, width: usize, height: usize) -> ImageBatch {
        let data = Array4::from_shape_fn((batch, height, width, 3), |(b, y, x, c)| match c {
            0 => x as f32,
            1 => y as f32,
            _ => b as f32,
        });
        ImageBatch::new(data).unwrap()
    }

    fn constant_batch(batch: usize, width: usize, height: usize, value: f32) -> ImageBatch {
        ImageBatch::new(Array4::from_elem((batch, height, width, 3), value)).unwrap()
    }

    #[test]
    fn test_corner_keywords() {
        for corner in Corner::ALL {
            assert_eq!(corner.keyword().parse::<Corner>().unwrap(), corner);
        }
        assert!("left-top".parse::<Corner>().is_err());
        assert_eq!(
            serde_json::to_string(&Corner::BottomRight).unwrap(),
            "\"bottom-right\""
        );
    }

    #[test]
    fn test_extract_each_corner() {
        let batch = coordinate_batch(1, 10, 8);

        let tl = extract_rect(&batch, 3, 2, Corner::TopLeft).unwrap();
        assert_eq!((tl.width(), tl.height()), (3, 2));
        assert_eq!(tl.data()[[0, 0, 0, 0]], 0.0);

        let tr = extract_rect(&batch, 3, 2, Corner::TopRight).unwrap();
        assert_eq!(tr.data()[[0, 0, 0, 0]], 7.0);
        assert_eq!(tr.data()[[0, 0, 0, 1]], 0.0);

        let bl = extract_rect(&batch, 3, 2, Corner::BottomLeft).unwrap();
        assert_eq!(bl.data()[[0, 0, 0, 0]], 0.0);
        assert_eq!(bl.data()[[0, 0, 0, 1]], 6.0);

        let br = extract_rect(&batch, 3, 2, Corner::BottomRight).unwrap();
        assert_eq!(br.data()[[0, 1, 2, 0]], 9.0);
        assert_eq!(br.data()[[0, 1, 2, 1]], 7.0);
    }

    #[test]
    fn test_extract_oversized_is_clamped() {
        let batch = coordinate_batch(2, 10, 8);
        let out = extract_rect(&batch, 50, 5, Corner::BottomRight).unwrap();

        assert_eq!((out.len(), out.width(), out.height()), (2, 10, 5));
        assert_eq!(out.data()[[0, 0, 0, 0]], 0.0);
        assert_eq!(out.data()[[1, 0, 0, 1]], 3.0);
        assert_eq!(out.data()[[1, 0, 0, 2]], 1.0);
    }

    #[test]
    fn test_extract_zero_size() {
        let batch = coordinate_batch(1, 10, 8);
        assert!(extract_rect(&batch, 0, 2, Corner::TopLeft).is_err());
    }

    #[test]
    fn test_combine_bottom_right() {
        let dest = constant_batch(1, 10, 8, 0.0);
        let src = constant_batch(1, 3, 2, 1.0);
        let out = combine_rect(&dest, &src, Corner::BottomRight).unwrap();

        assert_eq!((out.width(), out.height()), (10, 8));
        assert_eq!(out.data()[[0, 6, 7, 0]], 1.0);
        assert_eq!(out.data()[[0, 7, 9, 2]], 1.0);
        assert_eq!(out.data()[[0, 5, 7, 0]], 0.0);
        assert_eq!(out.data()[[0, 6, 6, 0]], 0.0);
        // Destination untouched
        assert_eq!(dest.data()[[0, 7, 9, 0]], 0.0);
    }

    #[test]
    fn test_extract_then_combine_restores() {
        let batch = coordinate_batch(2, 12, 9);
        for corner in Corner::ALL {
            let patch = extract_rect(&batch, 4, 3, corner).unwrap();
            let blank = constant_batch(2, 12, 9, -1.0);
            let restored = combine_rect(&blank, &patch, corner).unwrap();
            let again = extract_rect(&restored, 4, 3, corner).unwrap();
            assert_eq!(again, patch, "corner {corner}");
        }
    }

    #[test]
    fn test_combine_broadcasts_single_source() {
        let dest = constant_batch(3, 6, 6, 0.0);
        let src = constant_batch(1, 2, 2, 0.5);
        let out = combine_rect(&dest, &src, Corner::TopLeft).unwrap();

        for b in 0..3 {
            assert_eq!(out.data()[[b, 1, 1, 0]], 0.5);
            assert_eq!(out.data()[[b, 2, 2, 0]], 0.0);
        }
    }

    #[test]
    fn test_combine_batch_mismatch() {
        let dest = constant_batch(3, 6, 6, 0.0);
        let src = constant_batch(2, 2, 2, 0.5);
        assert!(matches!(
            combine_rect(&dest, &src, Corner::TopLeft),
            Err(NodeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_combine_oversized_source_is_cropped() {
        let dest = constant_batch(1, 4, 4, 0.0);
        let src = coordinate_batch(1, 6, 5);
        let out = combine_rect(&dest, &src, Corner::BottomRight).unwrap();

        // Start (-2, -1): destination (0, 0) receives source (2, 1)
        assert_eq!(out.data()[[0, 0, 0, 0]], 2.0);
        assert_eq!(out.data()[[0, 0, 0, 1]], 1.0);
        assert_eq!(out.data()[[0, 3, 3, 0]], 5.0);
        assert_eq!(out.data()[[0, 3, 3, 1]], 4.0);
    }
}
