//! Source locators
//!
//! A locator is either a plain filesystem path or a `file://` URI. Image
//! operations only read local files; video extraction hands remote URLs to
//! ffmpeg untouched.

use std::path::PathBuf;

use crate::error::{Result, TransformError};

const FILE_SCHEME: &str = "file://";

/// Resolve a locator to a local path.
pub fn local_file(locator: &str) -> Result<PathBuf> {
    let trimmed = locator.trim();
    if trimmed.is_empty() {
        return Err(TransformError::unreadable(locator, "empty locator"));
    }

    let path = trimmed.strip_prefix(FILE_SCHEME).unwrap_or(trimmed);
    if has_scheme(path) {
        return Err(TransformError::unreadable(
            locator,
            "only local files can be read",
        ));
    }
    Ok(PathBuf::from(path))
}

/// The argument to hand to ffmpeg/ffprobe for `locator`.
pub fn media_input(locator: &str) -> String {
    let trimmed = locator.trim();
    match trimmed.strip_prefix(FILE_SCHEME) {
        Some(path) => path.to_string(),
        None => trimmed.to_string(),
    }
}

fn has_scheme(s: &str) -> bool {
    match s.find("://") {
        Some(idx) => {
            idx > 0
                && s[..idx]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_file_paths() {
        assert_eq!(local_file("/tmp/a.png").unwrap(), PathBuf::from("/tmp/a.png"));
        assert_eq!(
            local_file("file:///tmp/a.png").unwrap(),
            PathBuf::from("/tmp/a.png")
        );
        assert_eq!(local_file("a.png").unwrap(), PathBuf::from("a.png"));
    }

    #[test]
    fn test_remote_locators_rejected() {
        for locator in ["https://example.com/a.png", "content://media/1", "", "  "] {
            assert!(matches!(
                local_file(locator),
                Err(TransformError::UnreadableSource { .. })
            ));
        }
    }

    #[test]
    fn test_media_input_passes_urls_through() {
        assert_eq!(media_input("file:///v/clip.mp4"), "/v/clip.mp4");
        assert_eq!(
            media_input("https://cdn.example.com/clip.mp4"),
            "https://cdn.example.com/clip.mp4"
        );
    }
}
