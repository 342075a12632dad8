//! Domain models for the media library
//!
//! Serialized field names are camelCase, which is what the host application
//! reads on the other side of the bridge.

use bridge_traits::media_store::media_type_codes;
use bridge_traits::GeoLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::LibraryError;

// =============================================================================
// Media type
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
    Audio,
    Unknown,
}

impl MediaType {
    /// The store's `media_type` column value for this type.
    pub fn store_code(self) -> i64 {
        match self {
            MediaType::Photo => media_type_codes::IMAGE,
            MediaType::Video => media_type_codes::VIDEO,
            MediaType::Audio => media_type_codes::AUDIO,
            MediaType::Unknown => media_type_codes::NONE,
        }
    }

    pub fn from_store_code(code: i64) -> Option<Self> {
        match code {
            media_type_codes::IMAGE => Some(MediaType::Photo),
            media_type_codes::VIDEO => Some(MediaType::Video),
            media_type_codes::AUDIO => Some(MediaType::Audio),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            MediaType::Photo
        } else if mime.starts_with("video/") {
            MediaType::Video
        } else if mime.starts_with("audio/") {
            MediaType::Audio
        } else {
            MediaType::Unknown
        }
    }

    /// Video and audio carry a duration.
    pub fn is_timed(self) -> bool {
        matches!(self, MediaType::Video | MediaType::Audio)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Photo => "photo",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
            MediaType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(MediaType::Photo),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            "unknown" => Ok(MediaType::Unknown),
            other => Err(LibraryError::InvalidInput {
                field: "mediaType".to_string(),
                message: format!("unsupported media type '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Asset & Collection
// =============================================================================

/// Canonical asset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Store-native identifier
    pub id: String,
    pub filename: String,
    pub media_type: MediaType,
    /// Epoch millis
    pub creation_time: i64,
    /// Epoch millis
    pub modification_time: i64,
    /// Seconds, 0 for photos
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    /// Content locator usable by the transform operations
    pub uri: String,
    /// Only on detail fetches, and only when readable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    /// Resolved openable locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Album/bucket grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    /// Display name
    pub filename: String,
}

// =============================================================================
// Query specification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    CreationTime,
    ModificationTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// An immutable asset query.
///
/// Built once per call through [`QuerySpec::builder`]; extensions are stored
/// lowercase without a leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    media_types: BTreeSet<MediaType>,
    sort_by: SortBy,
    sort_order: SortOrder,
    extensions: Option<BTreeSet<String>>,
    request_urls: bool,
    limit: Option<u64>,
    offset: u64,
    only_favorites: bool,
    collection_id: Option<String>,
}

impl QuerySpec {
    pub fn builder() -> QuerySpecBuilder {
        QuerySpecBuilder::default()
    }

    pub fn media_types(&self) -> &BTreeSet<MediaType> {
        &self.media_types
    }

    pub fn sort_by(&self) -> SortBy {
        self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// `None` when no extension allow-list applies.
    pub fn extensions(&self) -> Option<&BTreeSet<String>> {
        self.extensions.as_ref()
    }

    pub fn request_urls(&self) -> bool {
        self.request_urls
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn only_favorites(&self) -> bool {
        self.only_favorites
    }

    pub fn collection_id(&self) -> Option<&str> {
        self.collection_id.as_deref()
    }
}

impl Default for QuerySpec {
    fn default() -> Self {
        QuerySpecBuilder::default().build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuerySpecBuilder {
    media_types: Option<BTreeSet<MediaType>>,
    sort_by: SortBy,
    sort_order: SortOrder,
    extensions: Option<Vec<String>>,
    request_urls: bool,
    limit: Option<u64>,
    offset: u64,
    only_favorites: bool,
    collection_id: Option<String>,
}

impl QuerySpecBuilder {
    /// Defaults to photos and videos when never called.
    pub fn media_types<I: IntoIterator<Item = MediaType>>(mut self, types: I) -> Self {
        self.media_types = Some(types.into_iter().collect());
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn request_urls(mut self, request_urls: bool) -> Self {
        self.request_urls = request_urls;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn only_favorites(mut self, only_favorites: bool) -> Self {
        self.only_favorites = only_favorites;
        self
    }

    pub fn collection_id(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn build(self) -> QuerySpec {
        let media_types = self
            .media_types
            .unwrap_or_else(|| [MediaType::Photo, MediaType::Video].into_iter().collect());

        // An empty allow-list filters nothing.
        let extensions = self
            .extensions
            .map(|list| {
                list.iter()
                    .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect::<BTreeSet<_>>()
            })
            .filter(|set| !set.is_empty());

        QuerySpec {
            media_types,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            extensions,
            request_urls: self.request_urls,
            limit: self.limit,
            offset: self.offset,
            only_favorites: self.only_favorites,
            collection_id: self.collection_id,
        }
    }
}
