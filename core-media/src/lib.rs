//! # Media Transform Module
//!
//! On-demand image and video transforms whose outputs land in a sandboxed
//! cache directory.
//!
//! ## Overview
//!
//! - [`probe`] reads image dimensions and file size from headers only
//! - [`resize`] scales an image, keeping the aspect ratio when only one side
//!   is given
//! - [`combine`] overlays several images into one
//! - [`video`] extracts a single JPEG frame through ffmpeg
//! - [`cache`] confines output paths to the cache root
//!
//! [`TransformEngine`] ties these together and moves blocking work off the
//! async runtime.

pub mod cache;
pub mod codec;
pub mod combine;
pub mod engine;
pub mod error;
pub mod locator;
pub mod probe;
pub mod resize;
pub mod video;

pub use cache::CacheRoot;
pub use codec::ImageFormatKind;
pub use engine::{TransformEngine, TransformJob, TransformOutput};
pub use error::{Result, TransformError};
pub use probe::ImageDimensions;
pub use resize::ResizeRequest;
pub use video::{FfmpegFrameExtractor, FrameExtractor, VideoFrame, VideoFrameRequest, VideoProbe};
