//! Nimbus Video - before/after slider comparison clips
//!
//! Two images are matched to a common canvas and height, then a vertical
//! divider sweeps across them frame by frame. Frames go to any
//! [`FrameSink`]; [`FfmpegWriter`] encodes them to H.264 MP4 through the
//! system `ffmpeg` binary.
//!
//! # Module Structure
//!
//! - `slider` - canvas fitting, divider motion, frame composition
//! - `sink` - frame destinations
//! - `ffmpeg` - MP4 encoding and output naming
//! - `render` - node entry point tying the pieces together

pub mod error;
pub mod ffmpeg;
pub mod render;
pub mod sink;
pub mod slider;

pub use error::{VideoError, VideoResult};
pub use ffmpeg::{is_ffmpeg_on_path, output_path, EncodeConfig, FfmpegWriter};
pub use render::{build_slider, render_comparison_video, render_frames, VideoOutput};
pub use sink::{FrameSink, MemorySink};
pub use slider::{
    fit_onto_canvas, parse_slider_color, Slider, SliderConfig, SliderPair, SliderStyle,
};
