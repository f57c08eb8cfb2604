//! Bridge between the host's batched image tensor and pixel buffers.
//!
//! The host passes images as a `[B, H, W, C]` tensor of `f32` samples in
//! `[0, 1]` with `C = 3`. Conversion to RGB8 scales by 255 and rounds, so
//! 8-bit images survive a round trip unchanged.

use ndarray::{Array4, ArrayView3, Axis};

use crate::buffer::{NodeError, NodeResult, PixelBuffer};

/// A stack of equally sized RGB images in `[B, H, W, C]` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    data: Array4<f32>,
}

impl ImageBatch {
    /// Samples per pixel.
    pub const CHANNELS: usize = 3;

    /// Wrap a tensor, checking its channel count.
    pub fn new(data: Array4<f32>) -> NodeResult<Self> {
        let channels = data.shape()[3];
        if channels != Self::CHANNELS {
            return Err(NodeError::ShapeMismatch {
                expected: format!("{} channels", Self::CHANNELS),
                actual: format!("{channels} channels"),
            });
        }
        Ok(Self { data })
    }

    /// Stack pixel buffers into a batch. All images must share one size.
    pub fn from_buffers(images: &[PixelBuffer]) -> NodeResult<Self> {
        let first = images
            .first()
            .ok_or_else(|| NodeError::invalid("cannot build a batch from zero images"))?;
        let (width, height) = first.dimensions();

        let mut data = Array4::<f32>::zeros((
            images.len(),
            height as usize,
            width as usize,
            Self::CHANNELS,
        ));
        for (image, mut slot) in images.iter().zip(data.outer_iter_mut()) {
            if image.dimensions() != (width, height) {
                return Err(NodeError::ShapeMismatch {
                    expected: format!("{width}x{height}"),
                    actual: format!("{}x{}", image.width, image.height),
                });
            }
            image.validate()?;
            for (dst, &src) in slot.iter_mut().zip(&image.pixels) {
                *dst = src as f32 / 255.0;
            }
        }

        Ok(Self { data })
    }

    /// A batch holding a single image.
    pub fn from_buffer(image: &PixelBuffer) -> NodeResult<Self> {
        Self::from_buffers(std::slice::from_ref(image))
    }

    /// Unstack into pixel buffers.
    pub fn to_buffers(&self) -> Vec<PixelBuffer> {
        self.data.outer_iter().map(image_from_view).collect()
    }

    /// Convert one image of the batch.
    pub fn get(&self, index: usize) -> Option<PixelBuffer> {
        (index < self.len()).then(|| image_from_view(self.data.index_axis(Axis(0), index)))
    }

    /// Transform every image and restack the results.
    ///
    /// The closure must produce images of one common size.
    pub fn map<F>(&self, mut f: F) -> NodeResult<Self>
    where
        F: FnMut(&PixelBuffer) -> NodeResult<PixelBuffer>,
    {
        let outputs = self
            .to_buffers()
            .iter()
            .map(&mut f)
            .collect::<NodeResult<Vec<_>>>()?;
        Self::from_buffers(&outputs)
    }

    pub fn len(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn height(&self) -> u32 {
        self.data.shape()[1] as u32
    }

    pub fn width(&self) -> u32 {
        self.data.shape()[2] as u32
    }

    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn into_inner(self) -> Array4<f32> {
        self.data
    }
}

fn image_from_view(view: ArrayView3<'_, f32>) -> PixelBuffer {
    let (height, width, _) = view.dim();
    let pixels = view
        .iter()
        .map(|&v| (v * 255.0).clamp(0.0, 255.0).round() as u8)
        .collect();
    PixelBuffer::new(width as u32, height as u32, pixels)
}
