//! Media library facade and bootstrap.
//!
//! This crate wires a host-provided (or desktop default) media store into the
//! shared core and exposes every operation through [`MediaLibrary`]. Desktop
//! apps enable the `desktop-shims` feature (the default), which opens a
//! SQLite media index from `bridge-desktop` when no store is injected.
//!
//! ```no_run
//! # fn example() -> core_service::Result<()> {
//! use core_runtime::CoreConfig;
//! use core_service::{Completion, GetAssetsRequest, MediaLibrary};
//!
//! let config = CoreConfig::builder()
//!     .database_path("/tmp/media/index.db")
//!     .library_dir("/tmp/media/Library")
//!     .cache_dir("/tmp/media-cache")
//!     .build()?;
//! let library = MediaLibrary::install(config)?;
//!
//! let (done, _assets) = Completion::channel();
//! library.get_assets(GetAssetsRequest::default(), done)?;
//! library.shutdown_blocking();
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod dispatcher;
pub mod error;
pub mod requests;
pub mod service;

pub use completion::{Completion, Outcome};
pub use dispatcher::Dispatcher;
pub use error::{CoreError, Failure, FailureCode, Result};
pub use requests::{
    BridgeCall, CombineImagesRequest, FetchVideoFrameRequest, GetAssetRequest, GetAssetsRequest,
    ImageResizeRequest, ImageSizesRequest, SaveToLibraryRequest, TransformResult,
};
pub use service::{reply_envelope, MediaLibrary};
