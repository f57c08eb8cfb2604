//! Resolution helpers: generation-size rounding and preset tables.

use ndarray::Array4;
use serde::{Deserialize, Serialize};

use crate::buffer::{NodeError, NodeResult};

/// Latent channels of an empty latent batch.
pub const LATENT_CHANNELS: usize = 4;

/// Pixels per latent cell on each axis.
pub const LATENT_SCALE: u32 = 8;

/// Target the compression factor is derived against.
const COMPRESSION_TARGET: f64 = 24.0;

/// Round `value` up to the next multiple of `alignment`.
///
/// Returns `None` if the result does not fit in a `u32` or `alignment` is
/// zero.
pub fn align_up(value: u32, alignment: u32) -> Option<u32> {
    value.checked_next_multiple_of(alignment)
}

/// Output of [`adjust_and_round_dimensions`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionPlan {
    pub original_width: u32,
    pub original_height: u32,
    pub generation_width: u32,
    pub generation_height: u32,
    /// Divisor actually applied (never below 1)
    pub factor: f64,
    pub min_value: u32,
    pub max_value: u32,
    pub compression_factor: u32,
}

/// Derive aligned generation dimensions by dividing by `factor`.
///
/// Each side becomes `align_up(max(1, trunc(side / factor)), alignment)`.
/// The compression factor is `max / 24` (ties to even), clamped to
/// `32..=42`.
pub fn adjust_and_round_dimensions(
    width: u32,
    height: u32,
    alignment: u32,
    factor: f64,
) -> NodeResult<DimensionPlan> {
    if width == 0 || height == 0 {
        return Err(NodeError::invalid(format!(
            "dimensions {width}x{height} must be non-zero"
        )));
    }
    if alignment == 0 {
        return Err(NodeError::invalid("alignment must be at least 1"));
    }
    if !factor.is_finite() {
        return Err(NodeError::invalid(format!("factor {factor} must be finite")));
    }

    let factor = factor.max(1.0);
    let scale = |side: u32| {
        let scaled = ((side as f64 / factor) as u32).max(1);
        align_up(scaled, alignment).ok_or_else(|| {
            NodeError::invalid(format!(
                "side {side} aligned to {alignment} overflows a u32 dimension"
            ))
        })
    };
    let generation_width = scale(width)?;
    let generation_height = scale(height)?;

    let min_value = generation_width.min(generation_height);
    let max_value = generation_width.max(generation_height);
    let compression =
        ((max_value as f64 / COMPRESSION_TARGET).round_ties_even() as u32).max(1);

    Ok(DimensionPlan {
        original_width: width,
        original_height: height,
        generation_width,
        generation_height,
        factor,
        min_value,
        max_value,
        compression_factor: compression.clamp(32, 42),
    })
}

/// A named device or screen resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionPreset {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

const fn preset(name: &'static str, width: u32, height: u32) -> ResolutionPreset {
    ResolutionPreset {
        name,
        width,
        height,
    }
}

/// Native resolutions of common phones and tablets.
pub const MOBILE_DEVICES: &[ResolutionPreset] = &[
    preset("iPhone 14-15 Pro Max", 1290, 2796),
    preset("iPhone 14-15 Pro", 1179, 2556),
    preset("iPhone 13 Pro Max", 1284, 2778),
    preset("iPhone 13 Pro", 1170, 2532),
    preset("iPhone 13", 1170, 2532),
    preset("iPhone 13 Mini", 1080, 2340),
    preset("iPhone 12 Pro Max", 1284, 2778),
    preset("iPhone 12 Pro", 1170, 2532),
    preset("iPhone 12", 1170, 2532),
    preset("iPhone 12 Mini", 1080, 2340),
    preset("iPhone 11 Pro Max", 1242, 2688),
    preset("iPhone 11 Pro", 1125, 2436),
    preset("iPhone 11", 828, 1792),
    preset("iPad Pro 12.9-inch (5th generation)", 2048, 2732),
    preset("iPad Pro 11-inch (3rd generation)", 1668, 2388),
    preset("iPad Air (4th generation)", 1640, 2360),
    preset("iPad (9th generation)", 1620, 2160),
    preset("iPad Mini (6th generation)", 1488, 2266),
    preset("Samsung Galaxy Tab S7+", 2800, 1752),
];

/// Popular monitor, laptop and phone screen resolutions.
pub const SCREEN_RESOLUTIONS: &[ResolutionPreset] = &[
    preset("Full HD (1080p)", 1920, 1080),
    preset("2K (QHD)", 2560, 1440),
    preset("4K (UHD)", 3840, 2160),
    preset("8K (UHD)", 7680, 4320),
    preset("iPhone 12/13/14 Pro Max", 1284, 2778),
    preset("Samsung Galaxy S22 Ultra", 1440, 3088),
    preset("Google Pixel 6", 1080, 2400),
    preset("OnePlus 9 Pro", 1440, 3216),
    preset("iPad Pro 12.9-inch", 2048, 2732),
    preset("MacBook Pro 16-inch", 3072, 1920),
    preset("Dell XPS 15", 3456, 2160),
    preset("Surface Laptop 4 (15\")", 2496, 1664),
];

impl ResolutionPreset {
    /// Label shown in preset pickers, e.g. `"2K (QHD) - 2560x1440"`.
    pub fn label(&self) -> String {
        format!("{} - {}x{}", self.name, self.width, self.height)
    }

    /// Find a preset in `table` by its label.
    pub fn find(table: &'static [ResolutionPreset], label: &str) -> NodeResult<Self> {
        table
            .iter()
            .find(|p| p.label() == label)
            .copied()
            .ok_or_else(|| NodeError::invalid(format!("unknown resolution preset '{label}'")))
    }
}

/// Parse the `WxH` suffix of a `"Name - WxH"` label.
pub fn parse_resolution_label(label: &str) -> NodeResult<(u32, u32)> {
    let invalid = || NodeError::invalid(format!("invalid resolution label '{label}'"));
    let (_, resolution) = label.rsplit_once(" - ").ok_or_else(invalid)?;
    let (w, h) = resolution.split_once('x').ok_or_else(invalid)?;
    let width = w.trim().parse().map_err(|_| invalid())?;
    let height = h.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}

/// Parameters applied to a chosen preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetParams {
    /// Swap width and height (portrait <-> landscape)
    pub swap_dimensions: bool,
    /// Passed through for a later upscale step (0.1 to 10)
    pub upscale_factor: f64,
    /// Multiplies the preset dimensions (0.1 to 10)
    pub prescale_factor: f64,
    /// Images in the empty latent (1 to 64)
    pub batch_size: u32,
}

impl Default for PresetParams {
    fn default() -> Self {
        Self {
            swap_dimensions: false,
            upscale_factor: 1.0,
            prescale_factor: 1.0,
            batch_size: 1,
        }
    }
}

/// A preset resolved into generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetResolution {
    pub width: u32,
    pub height: u32,
    pub upscale_factor: f64,
    pub prescale_factor: f64,
    pub batch_size: u32,
    /// Zeroed `[batch, 4, height / 8, width / 8]` latent
    pub latent: Array4<f32>,
    /// Help text for the host UI
    pub help: String,
}

/// Resolve a `"Name - WxH"` label with swap, prescale and batch settings.
pub fn resolve_preset(label: &str, params: &PresetParams) -> NodeResult<PresetResolution> {
    let (mut width, mut height) = parse_resolution_label(label)?;

    let valid_factor = |f: f64| f.is_finite() && f > 0.0;
    if !valid_factor(params.prescale_factor) || !valid_factor(params.upscale_factor) {
        return Err(NodeError::invalid(format!(
            "scale factors must be positive, got upscale {} and prescale {}",
            params.upscale_factor, params.prescale_factor
        )));
    }
    if params.batch_size == 0 {
        return Err(NodeError::invalid("batch size must be at least 1"));
    }

    if params.swap_dimensions {
        std::mem::swap(&mut width, &mut height);
    }
    let width = (width as f64 * params.prescale_factor) as u32;
    let height = (height as f64 * params.prescale_factor) as u32;

    let latent = Array4::zeros((
        params.batch_size as usize,
        LATENT_CHANNELS,
        (height / LATENT_SCALE) as usize,
        (width / LATENT_SCALE) as usize,
    ));

    Ok(PresetResolution {
        width,
        height,
        upscale_factor: params.upscale_factor,
        prescale_factor: params.prescale_factor,
        batch_size: params.batch_size,
        latent,
        help: String::new(),
    })
}
