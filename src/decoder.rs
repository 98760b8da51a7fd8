//! Video frame acquisition through an FFmpeg subprocess.
//!
//! `ffprobe` supplies the stream geometry and frame count, then `ffmpeg`
//! decodes the file to packed `rgb24` on stdout, which is read one frame
//! (`width * height * 3` bytes) at a time.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use crate::frame::PixelFrame;

/// Errors raised while opening or reading a video source.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("{0} not found. Please install FFmpeg (it provides ffmpeg and ffprobe)")]
    FfmpegNotFound(&'static str),

    #[error("Cannot open video '{path}': {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("ffprobe could not read video stream info: {0}")]
    ProbeFailed(String),

    #[error("Video '{0}' contains no readable frames")]
    NoFrames(PathBuf),

    #[error("I/O error while decoding: {0}")]
    Io(#[from] std::io::Error),
}

/// A rewindable stream of decoded frames.
pub trait FrameSource {
    /// Next frame, or `None` at end of stream.
    fn read_next(&mut self) -> Result<Option<PixelFrame>, DecodeError>;

    /// Restart the stream from its first frame.
    fn rewind_to_start(&mut self) -> Result<(), DecodeError>;

    /// Total number of frames, if known (0 otherwise). May be approximate.
    fn frame_count_hint(&self) -> usize;
}

/// Stream geometry reported by `ffprobe`.
///
/// `width` and `height` are the displayed size: ffmpeg applies the stream's
/// rotation while decoding, so a quarter turn swaps the coded dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Display rotation in degrees, normalized to 0, 90, 180 or 270
    pub rotation: u32,
    /// Frame count from the container, or estimated from duration and rate
    pub frame_count: usize,
}

/// Parse `ffprobe -of default=noprint_wrappers=1` output.
///
/// Expects `width` and `height`; uses `nb_frames` when present and numeric,
/// otherwise estimates from `duration * avg_frame_rate`. Rotation is read from
/// the display matrix side data (`rotation`) or the legacy `TAG:rotate`.
pub fn parse_probe_output(output: &str) -> Result<VideoInfo, DecodeError> {
    let mut width = None;
    let mut height = None;
    let mut nb_frames = None;
    let mut rate = None;
    let mut duration = None;
    let mut rotation = None;

    for line in output.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        match key {
            "width" => width = value.parse::<u32>().ok(),
            "height" => height = value.parse::<u32>().ok(),
            "nb_frames" => nb_frames = value.parse::<usize>().ok(),
            "avg_frame_rate" => rate = parse_rate(value),
            "duration" => duration = value.parse::<f64>().ok(),
            "rotation" | "TAG:rotate" => {
                rotation = rotation.or_else(|| value.parse::<f64>().ok());
            }
            _ => {}
        }
    }

    let (Some(width), Some(height)) = (width, height) else {
        return Err(DecodeError::ProbeFailed(
            "no video stream with width and height".to_string(),
        ));
    };
    if width == 0 || height == 0 {
        return Err(DecodeError::ProbeFailed(format!(
            "invalid frame size {}x{}",
            width, height
        )));
    }

    let frame_count = match (nb_frames, duration, rate) {
        (Some(n), _, _) if n > 0 => n,
        (_, Some(d), Some(r)) => (d * r).round() as usize,
        _ => 0,
    };

    let rotation = rotation.map_or(0, normalize_rotation);
    let (width, height) = if rotation % 180 == 90 {
        (height, width)
    } else {
        (width, height)
    };

    Ok(VideoInfo {
        width,
        height,
        rotation,
        frame_count,
    })
}

/// Snap degrees (either sign) to the nearest quarter turn in `0..360`.
fn normalize_rotation(degrees: f64) -> u32 {
    let quarter_turns = (degrees / 90.0).round() as i64;
    (quarter_turns.rem_euclid(4) * 90) as u32
}

/// Parse an FFmpeg rational such as `30000/1001`.
fn parse_rate(value: &str) -> Option<f64> {
    let (num, den) = value.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

fn spawn_error(tool: &'static str, e: std::io::Error) -> DecodeError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DecodeError::FfmpegNotFound(tool)
    } else {
        DecodeError::Io(e)
    }
}

/// Run `ffprobe` on `path` and parse the first video stream's info.
///
/// The decoder maps the same stream (`0:v:0`) so the sizes agree.
pub fn probe(path: &Path) -> Result<VideoInfo, DecodeError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,nb_frames,avg_frame_rate\
             :stream_tags=rotate:stream_side_data=rotation:format=duration",
            "-of",
            "default=noprint_wrappers=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error("ffprobe", e))?;

    if !output.status.success() {
        return Err(DecodeError::OpenFailed {
            path: path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// A running `ffmpeg` process streaming raw RGB frames.
struct DecodeProcess {
    child: Child,
    stdout: ChildStdout,
    stderr_thread: Option<JoinHandle<()>>,
}

impl DecodeProcess {
    fn spawn(path: &Path) -> Result<Self, DecodeError> {
        let mut child = Command::new("ffmpeg")
            .args(["-loglevel", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error("ffmpeg", e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DecodeError::Io(std::io::Error::other("ffmpeg stdout was not captured"))
        })?;

        // Drain stderr so ffmpeg never blocks on a full pipe
        let stderr_thread = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines() {
                    match line {
                        Ok(l) => log::warn!("[ffmpeg] {}", l),
                        Err(_) => break,
                    }
                }
            })
        });

        log::debug!("Spawned ffmpeg (pid {}) for {}", child.id(), path.display());

        Ok(Self {
            child,
            stdout,
            stderr_thread,
        })
    }

    /// Fill `buf` with the next frame. Returns `false` on a clean EOF at a
    /// frame boundary; a partial trailing frame is also treated as EOF.
    fn read_frame(&mut self, buf: &mut [u8]) -> Result<bool, DecodeError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => {
                    if filled > 0 {
                        log::warn!(
                            "Discarding truncated trailing frame ({} of {} bytes)",
                            filled,
                            buf.len()
                        );
                    }
                    return Ok(false);
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }
}

impl Drop for DecodeProcess {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
        if let Some(handle) = self.stderr_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Decodes a video file into [`PixelFrame`]s using FFmpeg.
pub struct FfmpegDecoder {
    path: PathBuf,
    info: VideoInfo,
    process: Option<DecodeProcess>,
}

impl FfmpegDecoder {
    /// Probe and start decoding `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DecodeError::OpenFailed {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            });
        }

        let info = probe(path)?;
        log::info!(
            "Opened {} ({}x{}, rotation {}, ~{} frames)",
            path.display(),
            info.width,
            info.height,
            info.rotation,
            info.frame_count
        );

        Ok(Self {
            path: path.to_path_buf(),
            info,
            process: Some(DecodeProcess::spawn(path)?),
        })
    }
}

impl FrameSource for FfmpegDecoder {
    fn read_next(&mut self) -> Result<Option<PixelFrame>, DecodeError> {
        let Some(process) = self.process.as_mut() else {
            return Ok(None);
        };

        let mut data = vec![0u8; PixelFrame::byte_len(self.info.width, self.info.height)];
        if process.read_frame(&mut data)? {
            Ok(PixelFrame::from_raw(self.info.width, self.info.height, data))
        } else {
            // Reap the finished process; rewinding starts a new one
            self.process = None;
            Ok(None)
        }
    }

    fn rewind_to_start(&mut self) -> Result<(), DecodeError> {
        self.process = None;
        self.process = Some(DecodeProcess::spawn(&self.path)?);
        log::debug!("Rewound {}", self.path.display());
        Ok(())
    }

    fn frame_count_hint(&self) -> usize {
        self.info.frame_count
    }
}

/// Frames held in memory, for still images and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    frames: Vec<PixelFrame>,
    cursor: usize,
}

impl MemorySource {
    pub fn new(frames: Vec<PixelFrame>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl FrameSource for MemorySource {
    fn read_next(&mut self) -> Result<Option<PixelFrame>, DecodeError> {
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn rewind_to_start(&mut self) -> Result<(), DecodeError> {
        self.cursor = 0;
        Ok(())
    }

    fn frame_count_hint(&self) -> usize {
        self.frames.len()
    }
}
