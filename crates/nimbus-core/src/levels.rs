//! Auto levels: percentile-based contrast stretching.
//!
//! For each image the `black_point` and `white_point` percentiles are found
//! and the range between them is stretched to `[0, 1]`:
//!
//! ```text
//! out = clamp((x - low) / (high - low), 0, 1)    if high > low
//! out = clamp(x - low, 0, 1)                     otherwise
//! ```
//!
//! Percentiles interpolate linearly between the two nearest order
//! statistics.

use ndarray::{ArrayViewMut, Axis, Dimension};
use serde::{Deserialize, Serialize};

use crate::buffer::{NodeError, NodeResult};
use crate::tensor::ImageBatch;

/// Parameters of the auto levels node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsParams {
    /// Percentage of darkest samples clipped to black (0 to 49)
    pub black_point: f64,
    /// Percentile above which samples clip to white (51 to 100)
    pub white_point: f64,
    /// Stretch each channel on its own (rebalances colour) instead of
    /// all channels together (keeps colour balance)
    pub channel_independent: bool,
}

impl Default for LevelsParams {
    fn default() -> Self {
        Self {
            black_point: 1.0,
            white_point: 99.0,
            channel_independent: true,
        }
    }
}

impl LevelsParams {
    /// Check `0 <= black_point < white_point <= 100`.
    pub fn validate(&self) -> NodeResult<()> {
        let in_range = |p: f64| (0.0..=100.0).contains(&p);
        if !in_range(self.black_point) || !in_range(self.white_point) {
            return Err(NodeError::invalid(format!(
                "levels percentiles must lie in [0, 100], got {} and {}",
                self.black_point, self.white_point
            )));
        }
        if self.black_point >= self.white_point {
            return Err(NodeError::invalid(format!(
                "black point {} must be below white point {}",
                self.black_point, self.white_point
            )));
        }
        Ok(())
    }
}

/// Stretch the levels of every image in the batch.
pub fn auto_levels(batch: &ImageBatch, params: &LevelsParams) -> NodeResult<ImageBatch> {
    params.validate()?;

    let mut data = batch.data().clone();
    for mut image in data.outer_iter_mut() {
        if params.channel_independent {
            for channel in image.axis_iter_mut(Axis(2)) {
                stretch_in_place(channel, params.black_point, params.white_point);
            }
        } else {
            stretch_in_place(image.view_mut(), params.black_point, params.white_point);
        }
    }

    // Samples outside the percentile window land below 0 or above 1
    data.mapv_inplace(|v| v.clamp(0.0, 1.0));
    ImageBatch::new(data)
}

/// Stretch one group of samples between its own percentiles.
fn stretch_in_place<D: Dimension>(mut samples: ArrayViewMut<'_, f32, D>, black: f64, white: f64) {
    let mut sorted: Vec<f32> = samples.iter().copied().collect();
    if sorted.is_empty() {
        return;
    }
    sorted.sort_unstable_by(f32::total_cmp);

    let low = percentile(&sorted, black);
    let high = percentile(&sorted, white);
    tracing::debug!(low, high, count = sorted.len(), "levels window");

    if high > low {
        let scale = 1.0 / (high - low);
        samples.mapv_inplace(|v| (v - low) * scale);
    } else {
        // Flat input: nothing to stretch, shift only
        samples.mapv_inplace(|v| v - low);
    }
}

/// Percentile `p` (0 to 100) of ascending `sorted` samples, interpolating
/// linearly between neighbours. `sorted` must be non-empty.
pub fn percentile(sorted: &[f32], p: f64) -> f32 {
    let last = sorted.len() - 1;
    let rank = (p / 100.0).clamp(0.0, 1.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    let a = sorted[lower] as f64;
    let b = sorted[upper] as f64;
    (a + (b - a) * frac) as f32
}
