use nimbus_core::PixelBuffer;

use crate::error::{VideoError, VideoResult};

/// Destination for rendered frames.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &PixelBuffer) -> VideoResult<()>;
}

/// Collects frames in memory, for previews and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Vec<PixelBuffer>,
    limit: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse frames beyond `limit`.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            frames: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn frames(&self) -> &[PixelBuffer] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<PixelBuffer> {
        self.frames
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &PixelBuffer) -> VideoResult<()> {
        if self.limit.is_some_and(|limit| self.frames.len() >= limit) {
            return Err(VideoError::encode(format!(
                "memory sink is full ({} frames)",
                self.frames.len()
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_core::RgbColor;

    #[test]
    fn collects_frames_in_order() {
        let mut sink = MemorySink::new();
        sink.write_frame(&PixelBuffer::filled(2, 2, RgbColor::BLACK)).unwrap();
        sink.write_frame(&PixelBuffer::filled(2, 2, RgbColor::WHITE)).unwrap();

        let frames = sink.into_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].pixel(0, 0), [255, 255, 255]);
    }

    #[test]
    fn limit_is_enforced() {
        let mut sink = MemorySink::with_limit(1);
        let frame = PixelBuffer::filled(1, 1, RgbColor::RED);
        assert!(sink.write_frame(&frame).is_ok());
        assert!(matches!(sink.write_frame(&frame), Err(VideoError::Encode(_))));
        assert_eq!(sink.frames().len(), 1);
    }
}
