//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `MediaStore` using a SQLite media index (`sqlx`) whose columns mirror
//!   the platform media index, with a managed library directory for
//!   committed files
//! - `LocationReader` using `kamadak-exif` GPS tags
//! - Default cache/data directories using `dirs`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopDirectories, SqliteMediaStore};
//!
//! let dirs = DesktopDirectories::new();
//! let store = SqliteMediaStore::open(dirs.database_path(), dirs.library_dir()).await?;
//! ```

mod directories;
mod exif_location;
mod media_index;

pub use directories::DesktopDirectories;
pub use exif_location::ExifLocationReader;
pub use media_index::{mime_type_for, SqliteMediaStore};
