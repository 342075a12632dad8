//! Video frame extraction
//!
//! Frames are pulled with ffmpeg and probed with ffprobe, both run as child
//! processes. The seek time is clamped before ffmpeg sees it, and a seek that
//! still produces no frame falls back to the last frame of the stream.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, TransformError};

/// Assumed when the stream does not report a usable frame rate.
pub const FALLBACK_FRAME_RATE: f64 = 30.0;

/// ffmpeg `-q:v` bounds for JPEG (lower is better).
const QSCALE_WORST: f64 = 31.0;
const QSCALE_BEST: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFrameRequest {
    pub url: String,
    /// Seconds
    pub time: f64,
    /// 0.0 (smallest) to 1.0 (best)
    pub quality: f64,
}

/// Result of a frame extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFrame {
    /// `file://` locator of the written JPEG
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Stream facts needed to place a seek.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProbe {
    /// Seconds, 0 when unknown
    pub duration: f64,
    pub frame_rate: f64,
}

impl VideoProbe {
    /// Clamp a requested time to `[0, duration - one frame)`.
    pub fn clamp_time(&self, requested: f64) -> f64 {
        let requested = if requested.is_finite() {
            requested.max(0.0)
        } else {
            0.0
        };
        if self.duration <= 0.0 {
            return requested;
        }
        let frame = 1.0 / self.frame_rate;
        let last = (self.duration - frame).max(0.0);
        requested.min(last)
    }
}

/// Map `quality` in `[0, 1]` to an ffmpeg JPEG qscale in `31..=2`.
pub fn qscale_for(quality: f64) -> u8 {
    let quality = if quality.is_finite() {
        quality.clamp(0.0, 1.0)
    } else {
        1.0
    };
    (QSCALE_WORST - quality * (QSCALE_WORST - QSCALE_BEST)).round() as u8
}

/// Decoder used by the transform engine for video sources.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Open `input` and report its duration and frame rate.
    ///
    /// Fails with `UnseekableSource` when the input has no decodable video.
    async fn probe(&self, input: &str) -> Result<VideoProbe>;

    /// Write one JPEG frame at `at_seconds` to `destination`.
    async fn extract(
        &self,
        input: &str,
        at_seconds: f64,
        qscale: u8,
        destination: &Path,
    ) -> Result<()>;
}

/// [`FrameExtractor`] backed by the ffmpeg command-line tools.
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegFrameExtractor {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    async fn run(&self, program: &Path, args: &[String]) -> Result<Output> {
        debug!(program = %program.display(), ?args, "Running media tool");
        Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TransformError::ToolUnavailable {
                tool: program.display().to_string(),
                reason: e.to_string(),
            })
    }
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn probe(&self, input: &str) -> Result<VideoProbe> {
        let args: Vec<String> = [
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=r_frame_rate,avg_frame_rate,duration:format=duration",
            "-of",
            "json",
            input,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let output = self.run(&self.ffprobe, &args).await?;
        if !output.status.success() {
            return Err(TransformError::UnseekableSource {
                url: input.to_string(),
                reason: stderr_line(&output),
            });
        }
        parse_probe(&output.stdout).ok_or_else(|| TransformError::UnseekableSource {
            url: input.to_string(),
            reason: "no video stream".to_string(),
        })
    }

    async fn extract(
        &self,
        input: &str,
        at_seconds: f64,
        qscale: u8,
        destination: &Path,
    ) -> Result<()> {
        let destination_arg = destination.to_string_lossy().into_owned();
        let seek = vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            format!("{:.3}", at_seconds),
            "-i".to_string(),
            input.to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            qscale.to_string(),
            destination_arg.clone(),
        ];
        let output = self.run(&self.ffmpeg, &seek).await?;
        if output.status.success() && has_content(destination).await {
            return Ok(());
        }

        warn!(at_seconds, "Seek produced no frame, using the last frame");
        let tail = vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-sseof".to_string(),
            "-1".to_string(),
            "-i".to_string(),
            input.to_string(),
            "-update".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            qscale.to_string(),
            destination_arg,
        ];
        let output = self.run(&self.ffmpeg, &tail).await?;
        if output.status.success() && has_content(destination).await {
            Ok(())
        } else {
            Err(TransformError::UnseekableSource {
                url: input.to_string(),
                reason: stderr_line(&output),
            })
        }
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse ffprobe JSON. `None` when there is no video stream.
fn parse_probe(stdout: &[u8]) -> Option<VideoProbe> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout).ok()?;
    let stream = parsed.streams.into_iter().next()?;

    let frame_rate = [stream.avg_frame_rate, stream.r_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|rate| parse_rate(&rate))
        .unwrap_or(FALLBACK_FRAME_RATE);

    let duration = parsed
        .format
        .and_then(|f| f.duration)
        .or(stream.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(0.0);

    Some(VideoProbe {
        duration,
        frame_rate,
    })
}

/// `"30000/1001"` or `"25"` to frames per second.
fn parse_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

async fn has_content(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.len() > 0)
        .unwrap_or(false)
}

fn stderr_line(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.lines().rev().find(|l| !l.trim().is_empty()) {
        Some(line) => line.trim().to_string(),
        None => format!("exited with {}", output.status),
    }
}
