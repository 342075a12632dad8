//! Media index backed by SQLite
//!
//! Stores one row per media file in a `files` table whose columns match the
//! platform media index (see [`bridge_traits::media_store::columns`]).
//! Committed files are copied under a managed library directory; each album
//! is a sub-directory and its name doubles as the bucket id.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    host::{Clock, SystemClock},
    media_store::{
        columns, media_type_codes, Bucket, InsertRequest, MediaStore, StoreQuery, StoreRow,
        StoreValue,
    },
};
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    SqliteRow, SqliteSynchronous,
};
use sqlx::{Column, Row, Sqlite};
use std::collections::HashMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tokio::fs::{File, OpenOptions};
use tracing::{debug, info, warn};

const SELECT_COLUMNS: &str = "_id, _display_name, _data, mime_type, media_type, date_added, \
     date_modified, duration, width, height, size, bucket_id, bucket_display_name, is_favorite";

const CREATE_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS files (
        _id INTEGER PRIMARY KEY AUTOINCREMENT,
        _display_name TEXT NOT NULL,
        _data TEXT NOT NULL UNIQUE,
        mime_type TEXT,
        media_type INTEGER NOT NULL DEFAULT 0,
        date_added INTEGER NOT NULL,
        date_modified INTEGER NOT NULL,
        duration INTEGER,
        width INTEGER,
        height INTEGER,
        size INTEGER NOT NULL DEFAULT 0,
        bucket_id TEXT,
        bucket_display_name TEXT,
        is_favorite INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_files_date_added ON files (date_added);
    CREATE INDEX IF NOT EXISTS idx_files_bucket ON files (bucket_id);
"#;

/// Map a file extension to its MIME type.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "3gp" => "video/3gpp",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        _ => return None,
    };
    Some(mime)
}

fn media_type_code(mime: Option<&str>) -> i64 {
    match mime {
        Some(m) if m.starts_with("image/") => media_type_codes::IMAGE,
        Some(m) if m.starts_with("video/") => media_type_codes::VIDEO,
        Some(m) if m.starts_with("audio/") => media_type_codes::AUDIO,
        _ => media_type_codes::NONE,
    }
}

/// Column values derived from a file on disk.
struct FileFacts {
    display_name: String,
    mime_type: Option<&'static str>,
    media_type: i64,
    width: Option<i64>,
    height: Option<i64>,
    size: i64,
    modified: i64,
}

impl FileFacts {
    async fn read(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        let mime_type = mime_type_for(path);
        let media_type = media_type_code(mime_type);

        let (width, height) = if media_type == media_type_codes::IMAGE {
            let image_path = path.to_path_buf();
            match tokio::task::spawn_blocking(move || image::image_dimensions(image_path)).await {
                Ok(Ok((w, h))) => (Some(w as i64), Some(h as i64)),
                _ => (None, None),
            }
        } else {
            (None, None)
        };

        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        Ok(Self {
            display_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime_type,
            media_type,
            width,
            height,
            size: metadata.len() as i64,
            modified,
        })
    }
}

/// SQLite implementation of [`MediaStore`].
pub struct SqliteMediaStore {
    pool: SqlitePool,
    library_root: PathBuf,
    clock: Arc<dyn Clock>,
}

impl SqliteMediaStore {
    /// Open (or create) an index database at `db_path`.
    pub async fn open(db_path: impl Into<PathBuf>, library_root: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::StoreError(format!("Failed to open media index: {}", e)))?;

        info!(path = ?db_path, "Opened media index");
        Self::from_pool(pool, library_root.into()).await
    }

    /// Create an in-memory index (for testing).
    pub async fn in_memory(library_root: impl Into<PathBuf>) -> Result<Self> {
        // Every connection to `:memory:` is a separate database, so pin one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::StoreError(format!("Failed to open media index: {}", e)))?;

        Self::from_pool(pool, library_root.into()).await
    }

    async fn from_pool(pool: SqlitePool, library_root: PathBuf) -> Result<Self> {
        sqlx::raw_sql(CREATE_SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| BridgeError::StoreError(format!("Failed to create schema: {}", e)))?;

        Ok(Self {
            pool,
            library_root,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    /// Register a file where it lies, without copying it.
    ///
    /// This is how existing media on disk enters the index (a scan).
    pub async fn index_file(&self, path: &Path, album: Option<&str>) -> Result<String> {
        let facts = FileFacts::read(path).await?;
        let id = self
            .insert_row(path, &facts, album)
            .await
            .map_err(|e| BridgeError::WriteRejected(format!("{}: {}", path.display(), e)))?;
        debug!(id, name = %facts.display_name, "Indexed file");
        Ok(id.to_string())
    }

    /// Mark or unmark an asset as favorite.
    pub async fn set_favorite(&self, id: &str, favorite: bool) -> Result<()> {
        let id = parse_id(id)
            .ok_or_else(|| BridgeError::OperationFailed(format!("Invalid media id: {}", id)))?;
        sqlx::query("UPDATE files SET is_favorite = ? WHERE _id = ?")
            .bind(favorite as i64)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::StoreError(format!("Failed to update favorite: {}", e)))?;
        Ok(())
    }

    async fn insert_row(
        &self,
        path: &Path,
        facts: &FileFacts,
        album: Option<&str>,
    ) -> std::result::Result<i64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let done = sqlx::query(
            r#"
            INSERT INTO files (
                _display_name, _data, mime_type, media_type, date_added, date_modified,
                duration, width, height, size, bucket_id, bucket_display_name
            ) VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&facts.display_name)
        .bind(path.to_string_lossy().as_ref())
        .bind(facts.mime_type)
        .bind(facts.media_type)
        .bind(self.clock.unix_timestamp())
        .bind(facts.modified)
        .bind(facts.width)
        .bind(facts.height)
        .bind(facts.size)
        .bind(album)
        .bind(album)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(done.last_insert_rowid())
    }

    async fn fetch(&self, sql: &str, args: &[StoreValue]) -> Result<Vec<StoreRow>> {
        let query = bind_values(sqlx::query(sql), args);
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::StoreError(format!("Query failed: {}", e)))?;
        Ok(rows.iter().map(row_to_store_row).collect())
    }
}

#[async_trait]
impl MediaStore for SqliteMediaStore {
    async fn query(&self, query: &StoreQuery) -> Result<Vec<StoreRow>> {
        let mut sql = format!("SELECT {} FROM files", SELECT_COLUMNS);
        let mut args = query.args.clone();

        if let Some(selection) = &query.selection {
            sql.push_str(" WHERE ");
            sql.push_str(selection);
        }
        if let Some(sort_order) = &query.sort_order {
            sql.push_str(" ORDER BY ");
            sql.push_str(sort_order);
        }
        if query.limit.is_some() || query.offset > 0 {
            // SQLite only accepts OFFSET after LIMIT; -1 means no cap.
            sql.push_str(" LIMIT ? OFFSET ?");
            args.push(StoreValue::Integer(
                query.limit.map(|l| l.min(i64::MAX as u64) as i64).unwrap_or(-1),
            ));
            args.push(StoreValue::Integer(query.offset.min(i64::MAX as u64) as i64));
        }

        debug!(sql = %sql, arg_count = args.len(), "Querying media index");
        let rows = self.fetch(&sql, &args).await?;
        debug!(row_count = rows.len(), "Media index query complete");
        Ok(rows)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<StoreRow>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let sql = format!("SELECT {} FROM files WHERE _id = ?", SELECT_COLUMNS);
        Ok(self
            .fetch(&sql, &[StoreValue::Integer(id)])
            .await?
            .into_iter()
            .next())
    }

    async fn buckets(&self) -> Result<Vec<Bucket>> {
        let rows = self
            .fetch(
                "SELECT bucket_id, bucket_display_name FROM files \
                 WHERE bucket_id IS NOT NULL ORDER BY _id ASC",
                &[],
            )
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.get(columns::BUCKET_ID)?.as_str()?.to_string();
                let display_name = row
                    .get(columns::BUCKET_DISPLAY_NAME)
                    .and_then(|v| v.as_str())
                    .unwrap_or(&id)
                    .to_string();
                Some(Bucket { id, display_name })
            })
            .collect())
    }

    async fn resolve_url(&self, id: &str) -> Result<Option<String>> {
        let Some(row) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let Some(path) = row.get(columns::DATA).and_then(|v| v.as_str()) else {
            return Ok(None);
        };
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            Ok(Some(path.to_string()))
        } else {
            warn!(id, "Indexed file no longer exists on disk");
            Ok(None)
        }
    }

    async fn insert(&self, request: InsertRequest) -> Result<String> {
        let target_dir = match &request.album {
            Some(album) => self.library_root.join(sanitize_album(album)),
            None => self.library_root.clone(),
        };
        tokio::fs::create_dir_all(&target_dir).await.map_err(|e| {
            BridgeError::WriteRejected(format!("Cannot create {}: {}", target_dir.display(), e))
        })?;

        let file_name = request
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                BridgeError::WriteRejected(format!("No file name in {}", request.source.display()))
            })?;
        let (destination, file) = reserve_destination(&target_dir, &file_name)
            .await
            .map_err(|e| {
                BridgeError::WriteRejected(format!("Cannot reserve library file: {}", e))
            })?;

        // From here on `destination` belongs to this call alone.
        let registered = match copy_into(&request.source, file).await {
            Ok(()) => match FileFacts::read(&destination).await {
                Ok(facts) => self
                    .insert_row(&destination, &facts, request.album.as_deref())
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(format!("Copy failed: {}", e)),
        };

        match registered {
            Ok(id) => {
                info!(id, album = ?request.album, "Committed file to library");
                Ok(id.to_string())
            }
            Err(reason) => {
                if let Err(e) = tokio::fs::remove_file(&destination).await {
                    warn!(error = %e, "Failed to remove orphaned library copy");
                }
                Err(BridgeError::WriteRejected(reason))
            }
        }
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let Some(row) = self.find_by_id(id).await? else {
            return Ok(());
        };
        let path = row
            .get(columns::DATA)
            .and_then(|v| v.as_str())
            .map(PathBuf::from);

        sqlx::query("DELETE FROM files WHERE _id = ?")
            .bind(parse_id(id))
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::StoreError(format!("Failed to remove row: {}", e)))?;

        // Files indexed in place are not ours to delete.
        if let Some(path) = path.filter(|p| p.starts_with(&self.library_root)) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(BridgeError::Io(e)),
            }
        }
        info!(id, "Removed library entry");
        Ok(())
    }
}

fn parse_id(id: &str) -> Option<i64> {
    id.trim().parse().ok()
}

/// Album names become one directory level; separators are not allowed.
fn sanitize_album(album: &str) -> String {
    let cleaned: String = album
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        name => name.to_string(),
    }
}

/// Atomically claim `file_name` in `dir`, or the first free `stem-N.ext`.
async fn reserve_destination(dir: &Path, file_name: &str) -> io::Result<(PathBuf, File)> {
    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 0u32;
    loop {
        let candidate = match (n, &extension) {
            (0, _) => dir.join(file_name),
            (_, Some(ext)) => dir.join(format!("{}-{}.{}", stem, n, ext)),
            (_, None) => dir.join(format!("{}-{}", stem, n)),
        };
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}

async fn copy_into(source: &Path, mut destination: File) -> io::Result<()> {
    let mut source = File::open(source).await?;
    tokio::io::copy(&mut source, &mut destination).await?;
    destination.sync_all().await
}

fn row_to_store_row(row: &SqliteRow) -> StoreRow {
    let mut result = HashMap::new();

    for column in row.columns() {
        let ordinal = column.ordinal();
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(ordinal) {
            v.map(StoreValue::Integer).unwrap_or(StoreValue::Null)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(ordinal) {
            v.map(StoreValue::Real).unwrap_or(StoreValue::Null)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(ordinal) {
            v.map(StoreValue::Text).unwrap_or(StoreValue::Null)
        } else if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(ordinal) {
            v.map(StoreValue::Blob).unwrap_or(StoreValue::Null)
        } else {
            StoreValue::Null
        };
        result.insert(column.name().to_string(), value);
    }

    result
}

fn bind_values<'q>(
    mut query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    args: &'q [StoreValue],
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = match arg {
            StoreValue::Null => query.bind(None::<i64>),
            StoreValue::Integer(i) => query.bind(*i),
            StoreValue::Real(r) => query.bind(*r),
            StoreValue::Text(s) => query.bind(s.as_str()),
            StoreValue::Blob(b) => query.bind(b.as_slice()),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::host::FixedClock;
    use tempfile::TempDir;

    async fn store_in(dir: &TempDir) -> SqliteMediaStore {
        SqliteMediaStore::in_memory(dir.path().join("Library"))
            .await
            .unwrap()
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn test_mime_type_mapping() {
        assert_eq!(mime_type_for(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_type_for(Path::new("clip.mov")), Some("video/quicktime"));
        assert_eq!(mime_type_for(Path::new("song.flac")), Some("audio/flac"));
        assert_eq!(mime_type_for(Path::new("notes.txt")), None);
        assert_eq!(mime_type_for(Path::new("noext")), None);
        assert_eq!(media_type_code(Some("video/mp4")), media_type_codes::VIDEO);
        assert_eq!(media_type_code(None), media_type_codes::NONE);
    }

    #[test]
    fn test_sanitize_album() {
        assert_eq!(sanitize_album("Trips"), "Trips");
        assert_eq!(sanitize_album("a/b"), "a_b");
        assert_eq!(sanitize_album(".."), "_");
    }

    #[tokio::test]
    async fn test_insert_copies_into_album_and_registers_row() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_png(dir.path(), "a.png", 30, 20);
        let store = store_in(&dir)
            .await
            .with_clock(Arc::new(FixedClock::at_unix(1_000)));

        let id = store
            .insert(InsertRequest {
                source: source.clone(),
                album: Some("Trips".to_string()),
            })
            .await
            .unwrap();

        let row = store.find_by_id(&id).await.unwrap().unwrap();
        let data = row.get(columns::DATA).and_then(|v| v.as_str()).unwrap();
        assert!(Path::new(data).starts_with(dir.path().join("Library").join("Trips")));
        assert!(Path::new(data).exists());
        assert_eq!(row[columns::MEDIA_TYPE].as_i64(), Some(media_type_codes::IMAGE));
        assert_eq!(row[columns::WIDTH].as_i64(), Some(30));
        assert_eq!(row[columns::HEIGHT].as_i64(), Some(20));
        assert_eq!(row[columns::DATE_ADDED].as_i64(), Some(1_000));
        assert_eq!(row[columns::BUCKET_ID].as_str(), Some("Trips"));
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_insert_avoids_name_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_png(dir.path(), "a.png", 2, 2);
        let store = store_in(&dir).await;

        let first = store
            .insert(InsertRequest {
                source: source.clone(),
                album: None,
            })
            .await
            .unwrap();
        let second = store
            .insert(InsertRequest {
                source,
                album: None,
            })
            .await
            .unwrap();

        assert_ne!(first, second);
        let url = store.resolve_url(&second).await.unwrap().unwrap();
        assert!(url.ends_with("a-1.png"));
    }

    #[tokio::test]
    async fn test_concurrent_same_name_inserts_keep_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_png(dir.path(), "a.png", 3, 3);
        let store = store_in(&dir).await;
        let request = || InsertRequest {
            source: source.clone(),
            album: Some("A0".to_string()),
        };

        let (first, second) = tokio::join!(store.insert(request()), store.insert(request()));
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_ne!(first, second);

        let first_url = store.resolve_url(&first).await.unwrap().unwrap();
        let second_url = store.resolve_url(&second).await.unwrap().unwrap();
        assert_ne!(first_url, second_url);
        assert!(Path::new(&first_url).exists());
        assert!(Path::new(&second_url).exists());
    }

    #[tokio::test]
    async fn test_remove_drops_row_and_library_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_png(dir.path(), "a.png", 2, 2);
        let store = store_in(&dir).await;
        let id = store
            .insert(InsertRequest {
                source: source.clone(),
                album: Some("Trips".to_string()),
            })
            .await
            .unwrap();
        let copy = store.resolve_url(&id).await.unwrap().unwrap();

        store.remove(&id).await.unwrap();

        assert!(store.find_by_id(&id).await.unwrap().is_none());
        assert!(!Path::new(&copy).exists());
        assert!(source.exists());
        store.remove(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_keeps_files_indexed_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "scan.png", 1, 1);
        let store = store_in(&dir).await;
        let id = store.index_file(&path, None).await.unwrap();

        store.remove(&id).await.unwrap();

        assert!(store.find_by_id(&id).await.unwrap().is_none());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_insert_of_missing_source_registers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let result = store
            .insert(InsertRequest {
                source: dir.path().join("missing.jpg"),
                album: Some("Trips".to_string()),
            })
            .await;

        assert!(matches!(result, Err(BridgeError::WriteRejected(_))));
        assert!(store.query(&StoreQuery::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_applies_selection_order_and_window() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        for (i, name) in ["a.png", "b.png", "c.png"].iter().enumerate() {
            let path = write_png(dir.path(), name, 1 + i as u32, 1);
            store.index_file(&path, None).await.unwrap();
        }

        let query = StoreQuery::new()
            .with_selection("media_type = ?", vec![StoreValue::Integer(1)])
            .with_sort_order("_id DESC")
            .with_window(1, Some(1));
        let rows = store.query(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][columns::DISPLAY_NAME].as_str(), Some("b.png"));

        let beyond = store
            .query(&StoreQuery::new().with_window(10, None))
            .await
            .unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_buckets_in_store_order_with_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        for (name, album) in [("a.png", "Trips"), ("b.png", "Home"), ("c.png", "Trips")] {
            let path = write_png(dir.path(), name, 1, 1);
            store.index_file(&path, Some(album)).await.unwrap();
        }
        let loose = write_png(dir.path(), "d.png", 1, 1);
        store.index_file(&loose, None).await.unwrap();

        let ids: Vec<_> = store
            .buckets()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["Trips", "Home", "Trips"]);
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_id_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        assert!(store.find_by_id("42").await.unwrap().is_none());
        assert!(store.find_by_id("not-a-number").await.unwrap().is_none());
        assert!(store.resolve_url("42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_favorite() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        let path = write_png(dir.path(), "a.png", 1, 1);
        let id = store.index_file(&path, None).await.unwrap();

        store.set_favorite(&id, true).await.unwrap();
        let rows = store
            .query(&StoreQuery::new().with_selection("is_favorite = 1", vec![]))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
