//! Media Store Abstraction
//!
//! The platform media index is an external, read-mostly table of media files.
//! Every platform exposes the same fixed column set (see [`columns`]); the
//! core plans a [`StoreQuery`] against those columns and receives raw
//! [`StoreRow`]s back, which it normalizes itself.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::media_store::{columns, MediaStore, StoreQuery, StoreValue};
//!
//! let query = StoreQuery::new()
//!     .with_selection(format!("{} = ?", columns::MEDIA_TYPE), vec![StoreValue::Integer(1)])
//!     .with_sort_order(format!("{} DESC", columns::DATE_ADDED))
//!     .with_window(0, Some(20));
//! let rows = store.query(&query).await?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::Result;

/// Column names of the media index.
pub mod columns {
    pub const ID: &str = "_id";
    pub const DISPLAY_NAME: &str = "_display_name";
    pub const DATA: &str = "_data";
    pub const MIME_TYPE: &str = "mime_type";
    pub const MEDIA_TYPE: &str = "media_type";
    /// Epoch seconds
    pub const DATE_ADDED: &str = "date_added";
    /// Epoch seconds
    pub const DATE_MODIFIED: &str = "date_modified";
    /// Milliseconds
    pub const DURATION: &str = "duration";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const SIZE: &str = "size";
    pub const BUCKET_ID: &str = "bucket_id";
    pub const BUCKET_DISPLAY_NAME: &str = "bucket_display_name";
    pub const IS_FAVORITE: &str = "is_favorite";
}

/// Values stored in the `media_type` column.
pub mod media_type_codes {
    pub const NONE: i64 = 0;
    pub const IMAGE: i64 = 1;
    pub const AUDIO: i64 = 2;
    pub const VIDEO: i64 = 3;
}

/// A single row from the media index keyed by column name.
pub type StoreRow = HashMap<String, StoreValue>;

/// A raw media index value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl StoreValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StoreValue::Integer(i) => Some(*i),
            StoreValue::Real(r) => Some(*r as i64),
            StoreValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StoreValue::Real(r) => Some(*r),
            StoreValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StoreValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StoreValue::Null)
    }
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        StoreValue::Integer(value)
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        StoreValue::Text(value.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        StoreValue::Text(value)
    }
}

/// A query against the media index, shaped like a content-resolver call:
/// a selection clause with positional arguments, a sort clause and a row
/// window.
///
/// Clauses may only reference names from [`columns`]; user input always
/// travels through `args`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreQuery {
    /// `WHERE` body without the keyword, `None` selects every row
    pub selection: Option<String>,
    /// Positional arguments for `?` placeholders in `selection`
    pub args: Vec<StoreValue>,
    /// `ORDER BY` body without the keyword
    pub sort_order: Option<String>,
    /// Rows to skip
    pub offset: u64,
    /// Row cap, `None` means unbounded
    pub limit: Option<u64>,
}

impl StoreQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(mut self, selection: impl Into<String>, args: Vec<StoreValue>) -> Self {
        self.selection = Some(selection.into());
        self.args = args;
        self
    }

    pub fn with_sort_order(mut self, sort_order: impl Into<String>) -> Self {
        self.sort_order = Some(sort_order.into());
        self
    }

    pub fn with_window(mut self, offset: u64, limit: Option<u64>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

/// Album/bucket entry as reported by the store. The store may report the same
/// bucket more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    pub display_name: String,
}

/// Registration of a local file into the media index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertRequest {
    /// Readable local file
    pub source: PathBuf,
    /// Target album, created when absent
    pub album: Option<String>,
}

/// Platform media index.
///
/// Implementations must be atomic on [`MediaStore::insert`]: either the row
/// and its content exist afterwards, or neither does.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Run a planned query and return matching rows in store order.
    async fn query(&self, query: &StoreQuery) -> Result<Vec<StoreRow>>;

    /// Fetch one row by its store-native identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<StoreRow>>;

    /// List buckets in store-native order.
    async fn buckets(&self) -> Result<Vec<Bucket>>;

    /// Resolve a playable/openable locator for an asset.
    ///
    /// This may be expensive; callers only ask for it when needed.
    async fn resolve_url(&self, id: &str) -> Result<Option<String>>;

    /// Copy and register a file, returning the new store identifier.
    ///
    /// Rejections surface as [`BridgeError::WriteRejected`](crate::BridgeError::WriteRejected).
    async fn insert(&self, request: InsertRequest) -> Result<String>;

    /// Undo an [`insert`](MediaStore::insert): drop the row and the copy it
    /// made. Removing an unknown id is not an error.
    async fn remove(&self, id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_value_conversions() {
        assert_eq!(StoreValue::Integer(42).as_i64(), Some(42));
        assert_eq!(StoreValue::Integer(42).as_f64(), Some(42.0));
        assert_eq!(StoreValue::Text("17".into()).as_i64(), Some(17));
        assert_eq!(StoreValue::Text("abc".into()).as_i64(), None);
        assert_eq!(StoreValue::Text("abc".into()).as_str(), Some("abc"));
        assert!(StoreValue::Null.is_null());
        assert!(StoreValue::Null.as_str().is_none());
    }

    #[test]
    fn test_store_query_builder() {
        let query = StoreQuery::new()
            .with_selection("media_type IN (?)", vec![StoreValue::from(1)])
            .with_sort_order("date_added DESC")
            .with_window(10, Some(5));

        assert_eq!(query.selection.as_deref(), Some("media_type IN (?)"));
        assert_eq!(query.args, vec![StoreValue::Integer(1)]);
        assert_eq!(query.sort_order.as_deref(), Some("date_added DESC"));
        assert_eq!(query.offset, 10);
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_default_query_is_unbounded() {
        let query = StoreQuery::default();
        assert!(query.selection.is_none());
        assert_eq!(query.offset, 0);
        assert!(query.limit.is_none());
    }
}
