//! # Core Configuration Module
//!
//! Configuration for the media-library core.
//!
//! ## Overview
//!
//! A builder constructs a [`CoreConfig`] holding the directories the core
//! works in, the worker pool size, the external tools used for video frames,
//! and the bridge collaborators. Validation is fail-fast: `build()` either
//! returns a usable configuration or an actionable error.
//!
//! ## Collaborators
//!
//! - `MediaStore` - Platform media index. Desktop default: a SQLite index at
//!   `database_path`, opened by the service at bootstrap.
//! - `LocationReader` - EXIF GPS reader (optional). Desktop default:
//!   `ExifLocationReader`.
//!
//! When the `desktop-shims` feature is enabled, directories and collaborators
//! that were not provided fall back to desktop defaults.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/data/media-index.db")
//!     .library_dir("/data/Library")
//!     .cache_dir("/cache/media-library")
//!     .worker_threads(2)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{LocationReader, MediaStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Default number of worker threads for the dispatch pool.
pub const DEFAULT_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 64;

/// Core configuration.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Path of the media index database (desktop store)
    pub database_path: PathBuf,

    /// Directory that committed assets are copied into
    pub library_dir: PathBuf,

    /// Sandboxed root for every transform output
    pub cache_dir: PathBuf,

    /// Threads in the background worker pool
    pub worker_threads: usize,

    /// `ffmpeg` executable used for frame extraction
    pub ffmpeg_path: PathBuf,

    /// `ffprobe` executable used to open videos
    pub ffprobe_path: PathBuf,

    /// Injected media index; `None` lets the service open the desktop default
    pub media_store: Option<Arc<dyn MediaStore>>,

    /// EXIF location reader, if any
    pub location_reader: Option<Arc<dyn LocationReader>>,

    pub features: FeatureFlags,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("database_path", &self.database_path)
            .field("library_dir", &self.library_dir)
            .field("cache_dir", &self.cache_dir)
            .field("worker_threads", &self.worker_threads)
            .field("ffmpeg_path", &self.ffmpeg_path)
            .field("ffprobe_path", &self.ffprobe_path)
            .field(
                "media_store",
                &self.media_store.as_ref().map(|_| "MediaStore { ... }"),
            )
            .field(
                "location_reader",
                &self
                    .location_reader
                    .as_ref()
                    .map(|_| "LocationReader { ... }"),
            )
            .field("features", &self.features)
            .finish()
    }
}

/// Feature flags control optional functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Extract GPS location on single-asset fetches
    pub enable_location: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_location: true,
        }
    }
}

/// Optional capabilities, resolved once from flags and available bridges.
///
/// Code paths branch on these flags instead of probing collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub location: bool,
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Resolve optional capabilities for this configuration.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            location: self.features.enable_location && self.location_reader.is_some(),
        }
    }

    /// Create the cache root, the library directory and the database parent.
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir)?;
        std::fs::create_dir_all(&self.library_dir)?;
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// Checks that paths are non-empty, that the library and cache roots do
    /// not nest inside each other, and that the worker count is in range.
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.library_dir.as_os_str().is_empty() {
            return Err(Error::Config("Library directory cannot be empty".to_string()));
        }

        if self.cache_dir.as_os_str().is_empty() {
            return Err(Error::Config("Cache directory cannot be empty".to_string()));
        }

        if self.library_dir.starts_with(&self.cache_dir)
            || self.cache_dir.starts_with(&self.library_dir)
        {
            return Err(Error::Config(
                "Cache directory and library directory must not contain each other".to_string(),
            ));
        }

        if self.worker_threads == 0 || self.worker_threads > MAX_WORKER_THREADS {
            return Err(Error::Config(format!(
                "Worker threads must be between 1 and {}",
                MAX_WORKER_THREADS
            )));
        }

        if self.ffmpeg_path.as_os_str().is_empty() || self.ffprobe_path.as_os_str().is_empty() {
            return Err(Error::Config(
                "ffmpeg/ffprobe paths cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn media_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaStore".to_string(),
        message: "A MediaStore implementation is required to query the media index. \
                 Desktop: enable the 'desktop-shims' feature to use the SQLite index. \
                 Mobile: inject an adapter over the platform media index."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn default_directories() -> bridge_desktop::DesktopDirectories {
    bridge_desktop::DesktopDirectories::new()
}

#[cfg(feature = "desktop-shims")]
fn provide_default_location_reader() -> Option<Arc<dyn LocationReader>> {
    let reader: Arc<dyn LocationReader> = Arc::new(bridge_desktop::ExifLocationReader::new());
    Some(reader)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_location_reader() -> Option<Arc<dyn LocationReader>> {
    None
}

#[derive(Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    library_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    worker_threads: Option<usize>,
    ffmpeg_path: Option<PathBuf>,
    ffprobe_path: Option<PathBuf>,
    media_store: Option<Arc<dyn MediaStore>>,
    location_reader: Option<Arc<dyn LocationReader>>,
    features: FeatureFlags,
}

impl CoreConfigBuilder {
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn library_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.library_dir = Some(path.into());
        self
    }

    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn ffmpeg_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.ffmpeg_path = Some(path.into());
        self
    }

    pub fn ffprobe_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.ffprobe_path = Some(path.into());
        self
    }

    pub fn media_store(mut self, store: Arc<dyn MediaStore>) -> Self {
        self.media_store = Some(store);
        self
    }

    pub fn location_reader(mut self, reader: Arc<dyn LocationReader>) -> Self {
        self.location_reader = Some(reader);
        self
    }

    pub fn enable_location(mut self, enabled: bool) -> Self {
        self.features.enable_location = enabled;
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    #[cfg(feature = "desktop-shims")]
    fn resolve_directories(&mut self) -> Result<(PathBuf, PathBuf, PathBuf)> {
        let defaults = default_directories();
        Ok((
            self.database_path
                .take()
                .unwrap_or_else(|| defaults.database_path()),
            self.library_dir
                .take()
                .unwrap_or_else(|| defaults.library_dir()),
            self.cache_dir.take().unwrap_or_else(|| defaults.cache_dir()),
        ))
    }

    #[cfg(not(feature = "desktop-shims"))]
    fn resolve_directories(&mut self) -> Result<(PathBuf, PathBuf, PathBuf)> {
        let database_path = self.database_path.take().ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;
        let library_dir = self.library_dir.take().ok_or_else(|| {
            Error::Config("Library directory is required. Use .library_dir() to set it.".to_string())
        })?;
        let cache_dir = self.cache_dir.take().ok_or_else(|| {
            Error::Config("Cache directory is required. Use .cache_dir() to set it.".to_string())
        })?;
        Ok((database_path, library_dir, cache_dir))
    }

    pub fn build(mut self) -> Result<CoreConfig> {
        let (database_path, library_dir, cache_dir) = self.resolve_directories()?;

        #[cfg(not(feature = "desktop-shims"))]
        if self.media_store.is_none() {
            return Err(media_store_missing_error());
        }

        let location_reader = match self.location_reader {
            Some(reader) => Some(reader),
            None if self.features.enable_location => provide_default_location_reader(),
            None => None,
        };

        let config = CoreConfig {
            database_path,
            library_dir,
            cache_dir,
            worker_threads: self.worker_threads.unwrap_or(DEFAULT_WORKER_THREADS),
            ffmpeg_path: self.ffmpeg_path.unwrap_or_else(|| PathBuf::from("ffmpeg")),
            ffprobe_path: self
                .ffprobe_path
                .unwrap_or_else(|| PathBuf::from("ffprobe")),
            media_store: self.media_store,
            location_reader,
            features: self.features,
        };

        config.validate()?;

        Ok(config)
    }
}
