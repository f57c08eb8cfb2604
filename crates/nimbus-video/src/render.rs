use std::path::PathBuf;

use nimbus_core::{ImageBatch, PixelBuffer};

use crate::error::{VideoError, VideoResult};
use crate::ffmpeg::{output_path, EncodeConfig, FfmpegWriter, DEFAULT_BITRATE};
use crate::sink::FrameSink;
use crate::slider::{Slider, SliderConfig, SliderPair};

pub const DEFAULT_FILENAME_PREFIX: &str = "slider_comparison";

/// Where and how the comparison clip is written.
#[derive(Debug, Clone)]
pub struct VideoOutput {
    pub dir: PathBuf,
    pub filename_prefix: String,
    pub bitrate: String,
}

impl VideoOutput {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
            bitrate: DEFAULT_BITRATE.to_string(),
        }
    }
}

/// Push every frame of `slider` into `sink`, returning the frame count.
#[tracing::instrument(
    skip_all,
    fields(
        width = slider.width(),
        height = slider.height(),
        frames = slider.frame_count(),
        style = ?slider.config().style
    )
)]
pub fn render_frames<S: FrameSink + ?Sized>(slider: &Slider, sink: &mut S) -> VideoResult<u64> {
    let total = slider.frame_count();
    for index in 0..total {
        let frame = slider.frame_at(slider.frame_time(index));
        sink.write_frame(&frame)?;
    }
    tracing::debug!(frames = total, "rendered slider frames");
    Ok(total)
}

/// First image of a batch; the rest are ignored with a warning.
pub fn first_image(batch: &ImageBatch, label: &str) -> VideoResult<PixelBuffer> {
    if batch.len() > 1 {
        tracing::warn!(
            input = label,
            count = batch.len(),
            "batch has several images, only the first is used"
        );
    }
    batch
        .get(0)
        .ok_or_else(|| VideoError::validation(format!("{label} batch is empty")))
}

/// Build the slider for two host batches.
pub fn build_slider(
    before: &ImageBatch,
    after: &ImageBatch,
    config: &SliderConfig,
) -> VideoResult<Slider> {
    config.validate()?;
    let before = first_image(before, "before")?;
    let after = first_image(after, "after")?;
    let pair = SliderPair::prepare(&before, &after, config.target_height, config.background)?;
    Slider::new(pair, *config)
}

/// Render the comparison clip to an MP4 file and return its path.
#[tracing::instrument(skip(before, after), fields(dir = %output.dir.display()))]
pub fn render_comparison_video(
    before: &ImageBatch,
    after: &ImageBatch,
    config: &SliderConfig,
    output: &VideoOutput,
) -> VideoResult<PathBuf> {
    let slider = build_slider(before, after, config)?;
    let path = output_path(&output.dir, &output.filename_prefix);

    let encode = EncodeConfig::new(&path, slider.width(), slider.height(), config.frame_rate)
        .with_bitrate(output.bitrate.clone());
    let mut writer = FfmpegWriter::new(encode)?;
    let frames = render_frames(&slider, &mut writer)?;
    let path = writer.finish()?;

    tracing::info!(path = %path.display(), frames, "slider comparison video written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffmpeg::is_ffmpeg_on_path;
    use crate::sink::MemorySink;
    use crate::slider::SliderStyle;
    use nimbus_core::RgbColor;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn batch(width: u32, height: u32, color: RgbColor, count: usize) -> ImageBatch {
        let images = vec![PixelBuffer::filled(width, height, color); count];
        ImageBatch::from_buffers(&images).unwrap()
    }

    fn small_config(style: SliderStyle) -> SliderConfig {
        SliderConfig {
            duration_secs: 1.0,
            frame_rate: 8,
            thickness: 2,
            target_height: 20,
            style,
            ..SliderConfig::default()
        }
    }

    #[test]
    fn renders_expected_frame_count() {
        init_tracing();
        let before = batch(40, 20, RgbColor::BLACK, 1);
        let after = batch(40, 20, RgbColor::WHITE, 1);
        let slider = build_slider(&before, &after, &small_config(SliderStyle::Wipe)).unwrap();

        let mut sink = MemorySink::new();
        let frames = render_frames(&slider, &mut sink).unwrap();

        assert_eq!(frames, 8);
        let frames = sink.into_frames();
        assert_eq!(frames.len(), 8);
        assert!(frames.iter().all(|f| f.dimensions() == (40, 20)));
        // Divider starts at the left edge
        assert_eq!(frames[0].pixel(0, 10), [255, 0, 0]);
        assert_eq!(frames[0].pixel(39, 10), [0, 0, 0]);
        // Frame 4 of 8 puts the divider in the middle
        assert_eq!(frames[4].pixel(19, 10), [255, 255, 255]);
        assert_eq!(frames[4].pixel(20, 10), [255, 0, 0]);
        assert_eq!(frames[4].pixel(22, 10), [0, 0, 0]);
    }

    #[test]
    fn ping_pong_returns_to_start() {
        let before = batch(16, 20, RgbColor::BLACK, 1);
        let after = batch(16, 20, RgbColor::WHITE, 1);
        let slider = build_slider(&before, &after, &small_config(SliderStyle::PingPong)).unwrap();

        let mut sink = MemorySink::new();
        render_frames(&slider, &mut sink).unwrap();
        let frames = sink.into_frames();

        // Frame 2 starts phase 1: fully revealed "after", no divider
        assert!(frames[2].pixels.iter().all(|&v| v == 255));
        // Frame 4 starts phase 2: back at the left edge
        assert_eq!(frames[4], frames[0]);
    }

    #[test]
    fn uses_first_image_of_batch() {
        init_tracing();
        let before = batch(10, 10, RgbColor::BLACK, 3);
        let img = first_image(&before, "before").unwrap();
        assert_eq!(img.dimensions(), (10, 10));
    }

    #[test]
    fn mismatched_aspect_is_letterboxed() {
        let before = batch(20, 20, RgbColor::WHITE, 1);
        let after = batch(40, 20, RgbColor::WHITE, 1);
        let config = SliderConfig {
            background: RgbColor([0, 0, 255]),
            ..small_config(SliderStyle::Wipe)
        };
        let slider = build_slider(&before, &after, &config).unwrap();
        assert_eq!((slider.width(), slider.height()), (40, 20));

        // Last frame would be all "after"; the first frame shows "before" with
        // blue pillarbox bars beyond the divider line.
        let frame = slider.frame_at(0.0);
        assert_eq!(frame.pixel(39, 10), [0, 0, 255]);
        assert_eq!(frame.pixel(20, 10), [255, 255, 255]);
    }

    #[test]
    fn invalid_config_is_rejected_before_rendering() {
        let before = batch(4, 4, RgbColor::BLACK, 1);
        let after = batch(4, 4, RgbColor::WHITE, 1);
        let config = SliderConfig {
            frame_rate: 0,
            ..SliderConfig::default()
        };
        assert!(matches!(
            build_slider(&before, &after, &config),
            Err(VideoError::Validation(_))
        ));
    }

    #[test]
    fn writes_mp4_when_ffmpeg_available() {
        if !is_ffmpeg_on_path() {
            return;
        }
        init_tracing();
        let tmp = tempfile::tempdir().unwrap();
        let before = batch(32, 18, RgbColor::BLACK, 1);
        let after = batch(32, 18, RgbColor::WHITE, 1);
        let output = VideoOutput::new(tmp.path());

        let path =
            render_comparison_video(&before, &after, &small_config(SliderStyle::Wipe), &output)
                .unwrap();

        assert!(path.starts_with(tmp.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp4"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
