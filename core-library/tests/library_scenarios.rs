//! End-to-end query and ingestion against a real SQLite media index.

use bridge_desktop::{ExifLocationReader, SqliteMediaStore};
use bridge_traits::host::Clock;
use bridge_traits::MediaStore;
use chrono::{DateTime, TimeZone, Utc};
use core_library::{
    AssetRepository, IngestionGateway, LibraryError, MediaType, QuerySpec, SortBy, SortOrder,
    StoreAssetRepository,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Advances one minute per reading so every indexed file gets a distinct
/// creation time.
struct SteppingClock(AtomicI64);

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.0.fetch_add(60, Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }
}

struct Fixture {
    _dir: TempDir,
    incoming: PathBuf,
    store: Arc<SqliteMediaStore>,
    repository: Arc<StoreAssetRepository>,
}

impl Fixture {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let incoming = dir.path().join("incoming");
        std::fs::create_dir_all(&incoming).unwrap();

        let store = SqliteMediaStore::in_memory(dir.path().join("Library"))
            .await
            .unwrap()
            .with_clock(Arc::new(SteppingClock(AtomicI64::new(1_700_000_000))));
        let store = Arc::new(store);
        let repository = Arc::new(
            StoreAssetRepository::new(store.clone())
                .with_location_reader(Arc::new(ExifLocationReader::new())),
        );

        Self {
            _dir: dir,
            incoming,
            store,
            repository,
        }
    }

    fn write_png(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.incoming.join(name);
        image::RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    async fn index_photos(&self, count: usize) -> Vec<String> {
        let mut ids = Vec::new();
        for i in 0..count {
            let path = self.write_png(&format!("photo{i}.png"), 4, 3);
            ids.push(self.store.index_file(&path, None).await.unwrap());
        }
        ids
    }

    fn gateway(&self) -> IngestionGateway {
        IngestionGateway::new(self.store.clone(), self.repository.clone())
    }
}

fn ids(assets: &[core_library::Asset]) -> Vec<String> {
    assets.iter().map(|a| a.id.clone()).collect()
}

#[tokio::test]
async fn newest_first_page_of_two() {
    let fixture = Fixture::new().await;
    let indexed = fixture.index_photos(5).await;

    let spec = QuerySpec::builder()
        .media_types([MediaType::Photo])
        .limit(2)
        .build();
    let assets = fixture.repository.list_assets(&spec).await.unwrap();

    assert_eq!(ids(&assets), vec![indexed[4].clone(), indexed[3].clone()]);
    assert!(assets[0].creation_time > assets[1].creation_time);
    assert_eq!((assets[0].width, assets[0].height), (4, 3));
    assert!(assets[0].uri.starts_with("file://"));
}

#[tokio::test]
async fn offset_past_end_is_empty() {
    let fixture = Fixture::new().await;
    fixture.index_photos(3).await;

    let spec = QuerySpec::builder().offset(10).limit(5).build();
    assert!(fixture.repository.list_assets(&spec).await.unwrap().is_empty());
}

#[tokio::test]
async fn sort_order_is_monotonic() {
    let fixture = Fixture::new().await;
    fixture.index_photos(4).await;

    let ascending = QuerySpec::builder()
        .sort_by(SortBy::CreationTime)
        .sort_order(SortOrder::Asc)
        .build();
    let assets = fixture.repository.list_assets(&ascending).await.unwrap();
    assert_eq!(assets.len(), 4);
    assert!(assets
        .windows(2)
        .all(|pair| pair[0].creation_time <= pair[1].creation_time));

    let descending = QuerySpec::builder()
        .sort_by(SortBy::ModificationTime)
        .sort_order(SortOrder::Desc)
        .build();
    let assets = fixture.repository.list_assets(&descending).await.unwrap();
    assert!(assets
        .windows(2)
        .all(|pair| pair[0].modification_time >= pair[1].modification_time));
}

#[tokio::test]
async fn extension_filter_then_window() {
    let fixture = Fixture::new().await;
    for name in ["a.png", "b.jpg", "c.png", "d.png"] {
        let path = fixture.incoming.join(name);
        image::RgbImage::new(2, 2).save(&path).unwrap();
        fixture.store.index_file(&path, None).await.unwrap();
    }

    let spec = QuerySpec::builder()
        .extensions([".PNG"])
        .sort_order(SortOrder::Asc)
        .offset(1)
        .limit(5)
        .build();
    let names: Vec<_> = fixture
        .repository
        .list_assets(&spec)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.filename)
        .collect();
    assert_eq!(names, vec!["c.png", "d.png"]);
}

#[tokio::test]
async fn favorites_only() {
    let fixture = Fixture::new().await;
    let indexed = fixture.index_photos(3).await;
    fixture.store.set_favorite(&indexed[1], true).await.unwrap();

    let spec = QuerySpec::builder().only_favorites(true).build();
    let assets = fixture.repository.list_assets(&spec).await.unwrap();
    assert_eq!(ids(&assets), vec![indexed[1].clone()]);
}

#[tokio::test]
async fn request_urls_resolves_paths() {
    let fixture = Fixture::new().await;
    fixture.index_photos(2).await;

    let spec = QuerySpec::builder().request_urls(true).build();
    let assets = fixture.repository.list_assets(&spec).await.unwrap();
    for asset in assets {
        let url = asset.url.expect("url requested");
        assert!(Path::new(&url).exists());
        assert_eq!(asset.uri, format!("file://{url}"));
    }
}

#[tokio::test]
async fn save_to_album_then_query_collection() {
    let fixture = Fixture::new().await;
    fixture.index_photos(2).await;
    let source = fixture.write_png("beach.png", 8, 6);

    let saved = fixture
        .gateway()
        .commit(source.to_str().unwrap(), Some("Trips"))
        .await
        .unwrap();
    assert_eq!(saved.filename, "beach.png");
    assert_eq!(saved.media_type, MediaType::Photo);
    assert!(saved.url.is_some());

    let collections = fixture.repository.list_collections().await.unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].filename, "Trips");

    let spec = QuerySpec::builder()
        .collection_id(collections[0].id.clone())
        .build();
    let in_album = fixture.repository.list_assets(&spec).await.unwrap();
    assert_eq!(ids(&in_album), vec![saved.id.clone()]);

    // The source stays where it was.
    assert!(source.exists());
}

#[tokio::test]
async fn saving_twice_keeps_both_copies() {
    let fixture = Fixture::new().await;
    let source = fixture.write_png("dup.png", 2, 2);
    let locator = format!("file://{}", source.display());

    let first = fixture.gateway().commit(&locator, Some("Trips")).await.unwrap();
    let second = fixture.gateway().commit(&locator, Some("Trips")).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_ne!(first.url, second.url);
    assert_eq!(fixture.repository.list_collections().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_source_is_reported_without_writing() {
    let fixture = Fixture::new().await;

    let err = fixture
        .gateway()
        .commit("/no/such/file.jpg", Some("Trips"))
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::SourceUnreadable { .. }));
    assert!(fixture
        .repository
        .list_assets(&QuerySpec::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn detail_of_photo_without_gps() {
    let fixture = Fixture::new().await;
    let indexed = fixture.index_photos(1).await;

    let asset = fixture
        .repository
        .get_asset(&indexed[0])
        .await
        .unwrap()
        .unwrap();
    assert!(asset.url.is_some());
    assert!(asset.location.is_none());

    assert!(fixture.repository.get_asset("999999").await.unwrap().is_none());
    assert!(fixture.store.find_by_id("not-a-number").await.unwrap().is_none());
}
