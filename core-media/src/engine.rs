//! Transform Engine
//!
//! Stateless per call. Decoding and encoding run on the blocking pool; every
//! output goes through the [`CacheRoot`] sandbox and is staged before it is
//! moved into place. The engine never deletes finished outputs.

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::cache::{CacheRoot, StagedOutput};
use crate::codec::{self, ImageFormatKind};
use crate::combine;
use crate::error::{Result, TransformError};
use crate::locator;
use crate::probe::{self, ImageDimensions};
use crate::resize::{self, ResizeRequest};
use crate::video::{qscale_for, FfmpegFrameExtractor, FrameExtractor, VideoFrame, VideoFrameRequest};

/// Sub-directory of the cache root holding extracted video frames.
pub const THUMBNAIL_DIR: &str = "thumbnails";

/// One transform invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformJob {
    Thumbnail(VideoFrameRequest),
    Resize(ResizeRequest),
    Combine { sources: Vec<String>, output: String },
    Probe { sources: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutput {
    Frame(VideoFrame),
    Written(PathBuf),
    Dimensions(Vec<ImageDimensions>),
}

#[derive(Clone)]
pub struct TransformEngine {
    cache: CacheRoot,
    frames: Arc<dyn FrameExtractor>,
}

impl TransformEngine {
    pub fn new(cache: CacheRoot, frames: Arc<dyn FrameExtractor>) -> Self {
        Self { cache, frames }
    }

    /// Engine using `ffmpeg`/`ffprobe` from `PATH`.
    pub fn with_default_tools(cache: CacheRoot) -> Self {
        Self::new(cache, Arc::new(FfmpegFrameExtractor::default()))
    }

    pub fn cache_root(&self) -> &CacheRoot {
        &self.cache
    }

    pub async fn run(&self, job: TransformJob) -> Result<TransformOutput> {
        match job {
            TransformJob::Thumbnail(request) => self
                .extract_video_frame(&request)
                .await
                .map(TransformOutput::Frame),
            TransformJob::Resize(request) => {
                self.resize(request).await.map(TransformOutput::Written)
            }
            TransformJob::Combine { sources, output } => self
                .combine(sources, &output)
                .await
                .map(TransformOutput::Written),
            TransformJob::Probe { sources } => self
                .image_sizes(sources)
                .await
                .map(TransformOutput::Dimensions),
        }
    }

    pub async fn probe_dimensions(&self, source: &str) -> Result<ImageDimensions> {
        let source = source.to_string();
        blocking(move || probe::probe(&source)).await
    }

    /// Probe every source in order. Any failure fails the whole call.
    pub async fn image_sizes(&self, sources: Vec<String>) -> Result<Vec<ImageDimensions>> {
        blocking(move || sources.iter().map(|s| probe::probe(s)).collect()).await
    }

    #[instrument(skip(self, request), fields(width = ?request.width, height = ?request.height, format = ?request.format))]
    pub async fn resize(&self, request: ResizeRequest) -> Result<PathBuf> {
        let target = self.cache.resolve_output(&request.output)?;
        let staged = self.cache.stage(target).await?;

        let written = blocking(move || {
            let image = codec::load(&request.source)?;
            let resized = resize::resize_image(image, request.width, request.height);
            codec::encode(&resized, request.format, staged.temp_path())?;
            Ok(staged.persist()?)
        })
        .await?;

        info!(output = %written.display(), "Resized image");
        Ok(written)
    }

    /// Overlay `sources` in order into one image at `output`.
    ///
    /// The encoding follows the output extension.
    #[instrument(skip(self, sources), fields(count = sources.len()))]
    pub async fn combine(&self, sources: Vec<String>, output: &str) -> Result<PathBuf> {
        if sources.is_empty() {
            return Err(TransformError::InvalidRequest(
                "no images to combine".to_string(),
            ));
        }
        let target = self.cache.resolve_output(output)?;
        let format = ImageFormatKind::from_path(&target);
        let staged = self.cache.stage(target).await?;

        let written = blocking(move || {
            let images = sources
                .iter()
                .map(|s| codec::load(s))
                .collect::<Result<Vec<_>>>()?;
            let combined = combine::compose(&images)?;
            codec::encode(&combined, format, staged.temp_path())?;
            Ok(staged.persist()?)
        })
        .await?;

        info!(output = %written.display(), "Combined images");
        Ok(written)
    }

    /// Grab one frame near `request.time` as a JPEG under `thumbnails/`.
    #[instrument(skip(self, request), fields(time = request.time, quality = request.quality))]
    pub async fn extract_video_frame(&self, request: &VideoFrameRequest) -> Result<VideoFrame> {
        let input = locator::media_input(&request.url);
        if input.is_empty() {
            return Err(TransformError::UnseekableSource {
                url: request.url.clone(),
                reason: "empty url".to_string(),
            });
        }

        let probe = self.frames.probe(&input).await?;
        let at = probe.clamp_time(request.time);
        let qscale = qscale_for(request.quality);
        debug!(duration = probe.duration, at, qscale, "Seeking video");

        let name = format!("{}/{}.jpg", THUMBNAIL_DIR, frame_key(&input, at, qscale));
        let staged: StagedOutput = self.cache.stage(self.cache.resolve_output(&name)?).await?;
        self.frames
            .extract(&input, at, qscale, staged.temp_path())
            .await?;

        let url = request.url.clone();
        let (path, dims) = blocking(move || {
            let dims = probe::probe_path(staged.temp_path())
                .map_err(|reason| TransformError::UnseekableSource { url, reason })?;
            Ok((staged.persist()?, dims))
        })
        .await?;

        Ok(VideoFrame {
            url: format!("file://{}", path.display()),
            width: dims.width,
            height: dims.height,
        })
    }
}

/// Stable file name for a frame of `input` at `at` seconds and `qscale`.
fn frame_key(input: &str, at: f64, qscale: u8) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher.update(format!("|{:.3}|{}", at, qscale).as_bytes());
    format!("{:x}", hasher.finalize())
}

async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| TransformError::Internal(e.to_string()))?
}
