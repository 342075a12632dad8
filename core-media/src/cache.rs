//! Sandboxed cache root
//!
//! Every transform output lands under one directory. Requested output paths
//! are checked lexically: `.` and `..` are collapsed before the containment
//! test, so `thumbs/../../etc/passwd` is rejected even if it does not exist.
//! Symlinks inside the root are not resolved.
//!
//! Outputs are staged next to their final location and renamed into place,
//! so a reader never sees a partially written file.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, TransformError};

#[derive(Debug, Clone)]
pub struct CacheRoot {
    root: PathBuf,
}

impl CacheRoot {
    /// Use `root` as the cache directory. Relative roots are anchored at the
    /// current working directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(TransformError::InvalidOutputPath(
                "cache root cannot be empty".to_string(),
            ));
        }
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(root)
        };
        Ok(Self {
            root: normalize_lexically(&root),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// The root as a string without a trailing separator.
    pub fn display_path(&self) -> String {
        let raw = self.root.to_string_lossy();
        let trimmed = raw.trim_end_matches(std::path::MAIN_SEPARATOR);
        if trimmed.is_empty() {
            raw.into_owned()
        } else {
            trimmed.to_string()
        }
    }

    /// Map a requested output path to an absolute path inside the root.
    ///
    /// Relative paths are joined to the root; `file://` prefixes are
    /// accepted.
    pub fn resolve_output(&self, requested: &str) -> Result<PathBuf> {
        let raw = requested.trim();
        let raw = raw.strip_prefix("file://").unwrap_or(raw);
        if raw.is_empty() {
            return Err(TransformError::InvalidOutputPath(
                "output path is empty".to_string(),
            ));
        }

        let candidate = Path::new(raw);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };
        let resolved = normalize_lexically(&joined);

        if resolved == self.root || !resolved.starts_with(&self.root) {
            return Err(TransformError::InvalidOutputPath(requested.to_string()));
        }
        Ok(resolved)
    }

    /// Create parent directories and reserve a staging file for `target`.
    pub async fn stage(&self, target: PathBuf) -> Result<StagedOutput> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(StagedOutput::new(target))
    }
}

/// A temporary sibling of an output file.
///
/// Dropping without [`persist`](Self::persist) removes whatever was written.
#[derive(Debug)]
pub struct StagedOutput {
    target: PathBuf,
    temp: PathBuf,
    persisted: bool,
}

impl StagedOutput {
    fn new(target: PathBuf) -> Self {
        let mut name = OsString::from(format!(".{}-", Uuid::new_v4().simple()));
        name.push(target.file_name().unwrap_or_default());
        let temp = target.with_file_name(name);
        Self {
            target,
            temp,
            persisted: false,
        }
    }

    /// Where the producer should write. Keeps the target's extension.
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the staged file into place.
    pub fn persist(mut self) -> io::Result<PathBuf> {
        std::fs::rename(&self.temp, &self.target)?;
        self.persisted = true;
        debug!(path = %self.target.display(), "Transform output written");
        Ok(self.target.clone())
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.temp);
        }
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> CacheRoot {
        CacheRoot::new("/var/cache/media").unwrap()
    }

    #[test]
    fn test_relative_outputs_join_root() {
        assert_eq!(
            root().resolve_output("thumbs/a.jpg").unwrap(),
            PathBuf::from("/var/cache/media/thumbs/a.jpg")
        );
        assert_eq!(
            root().resolve_output("./x/../b.png").unwrap(),
            PathBuf::from("/var/cache/media/b.png")
        );
    }

    #[test]
    fn test_absolute_outputs_inside_root() {
        assert_eq!(
            root().resolve_output("/var/cache/media/out.png").unwrap(),
            PathBuf::from("/var/cache/media/out.png")
        );
        assert_eq!(
            root()
                .resolve_output("file:///var/cache/media/sub/out.png")
                .unwrap(),
            PathBuf::from("/var/cache/media/sub/out.png")
        );
    }

    #[test]
    fn test_escapes_rejected() {
        for path in [
            "../outside.png",
            "thumbs/../../outside.png",
            "/etc/passwd",
            "/var/cache/media-evil/x.png",
            "/var/cache/media",
            ".",
            "",
        ] {
            assert!(
                matches!(
                    root().resolve_output(path),
                    Err(TransformError::InvalidOutputPath(_))
                ),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_path_has_no_trailing_separator() {
        let cache = CacheRoot::new("/var/cache/media/").unwrap();
        assert_eq!(cache.display_path(), "/var/cache/media");
    }

    #[tokio::test]
    async fn test_staged_output_persists_or_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheRoot::new(dir.path()).unwrap();

        let target = cache.resolve_output("nested/out.txt").unwrap();
        let staged = cache.stage(target.clone()).await.unwrap();
        assert!(staged.temp_path().to_string_lossy().ends_with("out.txt"));
        std::fs::write(staged.temp_path(), b"done").unwrap();
        assert_eq!(staged.persist().unwrap(), target);
        assert_eq!(std::fs::read(&target).unwrap(), b"done");

        let abandoned = cache
            .stage(cache.resolve_output("nested/other.txt").unwrap())
            .await
            .unwrap();
        let temp = abandoned.temp_path().to_path_buf();
        std::fs::write(&temp, b"partial").unwrap();
        drop(abandoned);
        assert!(!temp.exists());
        assert!(!dir.path().join("nested/other.txt").exists());
    }
}
