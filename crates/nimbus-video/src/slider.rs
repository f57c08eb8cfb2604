//! Before/after slider frames.
//!
//! A vertical divider sweeps across the frame. Columns left of the divider
//! show the "after" image, columns right of it the "before" image, and a
//! solid line marks the divider while it is inside the frame.

use serde::{Deserialize, Serialize};

use nimbus_core::buffer::{calculate_fit_dimensions, resize, resize_to_height};
use nimbus_core::transform::paste;
use nimbus_core::{NodeResult, PixelBuffer, Resampling, RgbColor};

use crate::error::{VideoError, VideoResult};

/// Letterbox `image` onto a `canvas_width x canvas_height` canvas, centered.
pub fn fit_onto_canvas(
    image: &PixelBuffer,
    canvas_width: u32,
    canvas_height: u32,
    background: RgbColor,
) -> NodeResult<PixelBuffer> {
    let (w, h) = calculate_fit_dimensions(image.width, image.height, canvas_width, canvas_height);
    let fitted = resize(image, w, h, Resampling::Lanczos)?;

    let mut canvas = PixelBuffer::filled(canvas_width, canvas_height, background);
    let x = (canvas_width - w) / 2;
    let y = (canvas_height - h) / 2;
    paste(&mut canvas, &fitted, x as i64, y as i64)?;
    Ok(canvas)
}

/// Parse a slider colour, falling back to red on malformed input.
pub fn parse_slider_color(value: &str) -> RgbColor {
    value.parse().unwrap_or_else(|err| {
        tracing::warn!(%value, %err, "invalid slider colour, defaulting to red");
        RgbColor::RED
    })
}

/// Divider motion over the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SliderStyle {
    /// One left-to-right sweep revealing "after" over the whole duration.
    #[default]
    Wipe,
    /// Four equal phases: sweep right, sweep back left, sweep right, sweep
    /// back left.
    PingPong,
}

/// Settings of the slider comparison node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    /// Clip length in seconds (1 to 60)
    pub duration_secs: f64,
    /// Frames per second (1 to 60)
    pub frame_rate: u32,
    pub color: RgbColor,
    /// Divider width in pixels (1 to 20)
    pub thickness: u32,
    /// Output frame height (100 to 4096)
    pub target_height: u32,
    pub style: SliderStyle,
    /// Letterbox colour when the images differ in aspect ratio
    pub background: RgbColor,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            duration_secs: 10.0,
            frame_rate: 30,
            color: RgbColor::RED,
            thickness: 5,
            target_height: 1080,
            style: SliderStyle::Wipe,
            background: RgbColor::BLACK,
        }
    }
}

impl SliderConfig {
    pub fn validate(&self) -> VideoResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(VideoError::validation(format!(
                "duration must be positive, got {}",
                self.duration_secs
            )));
        }
        if self.frame_rate == 0 {
            return Err(VideoError::validation("frame rate must be non-zero"));
        }
        if self.thickness == 0 {
            return Err(VideoError::validation("slider thickness must be non-zero"));
        }
        if self.target_height == 0 {
            return Err(VideoError::validation("target height must be non-zero"));
        }
        Ok(())
    }
}

/// Two equally sized images to compare.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderPair {
    before: PixelBuffer,
    after: PixelBuffer,
}

impl SliderPair {
    pub fn new(before: PixelBuffer, after: PixelBuffer) -> VideoResult<Self> {
        if before.dimensions() != after.dimensions() {
            return Err(VideoError::validation(format!(
                "slider images differ in size: {}x{} vs {}x{}",
                before.width, before.height, after.width, after.height
            )));
        }
        if before.is_empty() {
            return Err(VideoError::validation("slider images must not be empty"));
        }
        before.validate()?;
        after.validate()?;
        Ok(Self { before, after })
    }

    /// Match `before` to `after`'s canvas, then scale both to `target_height`.
    pub fn prepare(
        before: &PixelBuffer,
        after: &PixelBuffer,
        target_height: u32,
        background: RgbColor,
    ) -> VideoResult<Self> {
        let fitted = fit_onto_canvas(before, after.width, after.height, background)?;
        let before = resize_to_height(&fitted, target_height, Resampling::Lanczos)?;
        let after = resize_to_height(after, target_height, Resampling::Lanczos)?;
        Self::new(before, after)
    }

    pub fn width(&self) -> u32 {
        self.before.width
    }

    pub fn height(&self) -> u32 {
        self.before.height
    }
}

/// A slider animation ready to be sampled.
#[derive(Debug, Clone)]
pub struct Slider {
    pair: SliderPair,
    config: SliderConfig,
}

impl Slider {
    pub fn new(pair: SliderPair, config: SliderConfig) -> VideoResult<Self> {
        config.validate()?;
        Ok(Self { pair, config })
    }

    pub fn width(&self) -> u32 {
        self.pair.width()
    }

    pub fn height(&self) -> u32 {
        self.pair.height()
    }

    pub fn config(&self) -> &SliderConfig {
        &self.config
    }

    /// Whole frames in the clip: `trunc(fps * duration)`.
    pub fn frame_count(&self) -> u64 {
        (self.config.frame_rate as f64 * self.config.duration_secs) as u64
    }

    /// Presentation time of frame `index` in seconds.
    pub fn frame_time(&self, index: u64) -> f64 {
        index as f64 / self.config.frame_rate as f64
    }

    /// Divider column at time `t`, in `0..=width`.
    pub fn divider_at(&self, t: f64) -> u32 {
        let width = self.width() as f64;
        let duration = self.config.duration_secs;

        let position = match self.config.style {
            SliderStyle::Wipe => (t / duration * width).trunc(),
            SliderStyle::PingPong => {
                let cycle = duration / 4.0;
                let progress = (t % cycle) / cycle;
                let sweep = (progress * width).trunc();
                match (t / cycle) as u64 {
                    1 | 3 => width - sweep,
                    _ => sweep,
                }
            }
        };
        position.clamp(0.0, width) as u32
    }

    /// Render the frame shown at time `t` seconds.
    pub fn frame_at(&self, t: f64) -> PixelBuffer {
        let divider = self.divider_at(t) as usize;
        let width = self.width() as usize;
        let stride = width * 3;
        let split = divider * 3;

        let mut pixels = Vec::with_capacity(self.pair.before.pixels.len());
        for (after_row, before_row) in self
            .pair
            .after
            .pixels
            .chunks_exact(stride)
            .zip(self.pair.before.pixels.chunks_exact(stride))
        {
            pixels.extend_from_slice(&after_row[..split]);
            pixels.extend_from_slice(&before_row[split..]);
        }

        if divider < width {
            let end = (divider + self.config.thickness as usize).min(width);
            for row in pixels.chunks_exact_mut(stride) {
                for px in row[split..end * 3].chunks_exact_mut(3) {
                    px.copy_from_slice(&self.config.color.0);
                }
            }
        }

        PixelBuffer::new(self.width(), self.height(), pixels)
    }
}
