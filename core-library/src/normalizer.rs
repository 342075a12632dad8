//! Metadata Normalizer
//!
//! Maps raw media-index rows into [`Asset`]s. Normalization never fails:
//! absent or malformed numeric columns become 0 and absent strings become
//! empty.

use bridge_traits::media_store::{columns, StoreRow};
use std::path::Path;

use crate::models::{Asset, MediaType};

/// Convert one store row into an asset.
///
/// The `media_type` code wins when it names a known type; otherwise the MIME
/// type decides.
pub fn normalize(row: &StoreRow) -> Asset {
    let media_type = media_type_of(row);
    let data = text(row, columns::DATA);

    let filename = match text(row, columns::DISPLAY_NAME) {
        name if !name.is_empty() => name,
        _ => Path::new(&data)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let duration = if media_type.is_timed() {
        integer(row, columns::DURATION).max(0) as f64 / 1000.0
    } else {
        0.0
    };

    Asset {
        id: identifier(row),
        filename,
        media_type,
        creation_time: integer(row, columns::DATE_ADDED).saturating_mul(1000),
        modification_time: integer(row, columns::DATE_MODIFIED).saturating_mul(1000),
        duration,
        width: dimension(row, columns::WIDTH),
        height: dimension(row, columns::HEIGHT),
        uri: content_uri(&data),
        location: None,
        url: None,
    }
}

/// The store code wins whenever it is present, so rows label the same way
/// the planner filters them. MIME is only consulted for a missing code.
fn media_type_of(row: &StoreRow) -> MediaType {
    match row.get(columns::MEDIA_TYPE).and_then(|v| v.as_i64()) {
        Some(code) => MediaType::from_store_code(code).unwrap_or(MediaType::Unknown),
        None => MediaType::from_mime(&text(row, columns::MIME_TYPE)),
    }
}

/// `file://` locator for an indexed path; empty when the path is unknown.
pub fn content_uri(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("file://{}", path)
    }
}

/// Path of the file backing a row, if the store reported one.
pub fn data_path(row: &StoreRow) -> Option<&str> {
    row.get(columns::DATA)
        .and_then(|v| v.as_str())
        .filter(|p| !p.is_empty())
}

fn identifier(row: &StoreRow) -> String {
    match row.get(columns::ID) {
        Some(value) => match value.as_str() {
            Some(s) => s.to_string(),
            None => value.as_i64().map(|i| i.to_string()).unwrap_or_default(),
        },
        None => String::new(),
    }
}

fn text(row: &StoreRow, column: &str) -> String {
    row.get(column)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn integer(row: &StoreRow, column: &str) -> i64 {
    row.get(column).and_then(|v| v.as_i64()).unwrap_or(0)
}

fn dimension(row: &StoreRow, column: &str) -> u32 {
    u32::try_from(integer(row, column)).unwrap_or(0)
}
