//! MP4 output through the system `ffmpeg` binary.

use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use nimbus_core::PixelBuffer;

use crate::{
    error::{VideoError, VideoResult},
    sink::FrameSink,
};

pub const DEFAULT_BITRATE: &str = "5000k";

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Target video bitrate in ffmpeg notation, e.g. `5000k`
    pub bitrate: String,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn new(out_path: impl Into<PathBuf>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            bitrate: DEFAULT_BITRATE.to_string(),
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.bitrate = bitrate.into();
        self
    }

    pub fn validate(&self) -> VideoResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VideoError::validation("encode width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(VideoError::validation("encode fps must be non-zero"));
        }
        let bitrate = self.bitrate.trim();
        if bitrate.is_empty() || bitrate.chars().any(char::is_whitespace) {
            return Err(VideoError::validation(format!(
                "invalid bitrate '{}'",
                self.bitrate
            )));
        }
        Ok(())
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> VideoResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `<dir>/<prefix>_<8 hex chars>.mp4`, unique per call.
pub fn output_path(dir: &Path, prefix: &str) -> PathBuf {
    let id = uuid::Uuid::new_v4().simple().to_string();
    dir.join(format!("{prefix}_{}.mp4", &id[..8]))
}

/// Streams RGB frames into an ffmpeg child process.
///
/// Odd dimensions are padded up to even ones inside ffmpeg since yuv420p
/// needs them.
pub struct FfmpegWriter {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    frames: u64,
}

impl FfmpegWriter {
    pub fn new(cfg: EncodeConfig) -> VideoResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(VideoError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(VideoError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-c:v",
            "libx264",
            "-b:v",
            cfg.bitrate.trim(),
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| VideoError::encode(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VideoError::encode("failed to open ffmpeg stdin"))?;

        tracing::debug!(
            path = %cfg.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps,
            bitrate = %cfg.bitrate,
            "spawned ffmpeg"
        );

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
            frames: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Close the pipe and wait for ffmpeg, returning the output path.
    pub fn finish(mut self) -> VideoResult<PathBuf> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| VideoError::encode(format!("failed to wait for ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(self.cfg.out_path)
    }
}

impl FrameSink for FfmpegWriter {
    fn write_frame(&mut self, frame: &PixelBuffer) -> VideoResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(VideoError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.pixels.len() != self.cfg.frame_len() {
            return Err(VideoError::validation(
                "frame data size mismatch with width*height*3",
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(VideoError::encode("ffmpeg writer is already finalized"));
        };
        stdin
            .write_all(&frame.pixels)
            .map_err(|e| VideoError::encode(format!("failed to write frame to ffmpeg: {e}")))?;

        self.frames += 1;
        Ok(())
    }
}
