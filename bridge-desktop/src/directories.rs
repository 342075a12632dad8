//! Default desktop locations

use std::path::PathBuf;

const APP_DIR: &str = "media-library";

/// Cache and data roots for a desktop install.
///
/// The cache root holds transform outputs; the data root holds the media
/// index database and the library directory that committed assets are
/// copied into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopDirectories {
    cache_dir: PathBuf,
    data_dir: PathBuf,
}

impl DesktopDirectories {
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR);

        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".local")
                    .join("share")
            })
            .join(APP_DIR);

        Self {
            cache_dir,
            data_dir,
        }
    }

    pub fn with_directories(cache_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data_dir,
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("media-index.db")
    }

    pub fn library_dir(&self) -> PathBuf {
        self.data_dir.join("Library")
    }
}

impl Default for DesktopDirectories {
    fn default() -> Self {
        Self::new()
    }
}
