//! Asset Repository
//!
//! Runs planned queries against the media index and returns normalized
//! snapshots. The repository owns no store data; each call builds fresh
//! [`Asset`] values.

use async_trait::async_trait;
use bridge_traits::{LocationReader, MediaStore};
use futures::future::join_all;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::models::{Asset, Collection, MediaType, QuerySpec};
use crate::normalizer::{data_path, normalize};
use crate::planner;

#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Assets matching `spec`, in the requested order.
    ///
    /// The result is a one-shot snapshot; callers page by adjusting the
    /// offset.
    async fn list_assets(&self, spec: &QuerySpec) -> Result<Vec<Asset>>;

    /// Detail view of one asset with `url` and best-effort `location`.
    ///
    /// Returns `Ok(None)` when the id does not resolve.
    async fn get_asset(&self, id: &str) -> Result<Option<Asset>>;

    /// Collections in store order, one entry per id.
    async fn list_collections(&self) -> Result<Vec<Collection>>;
}

/// [`AssetRepository`] over a [`MediaStore`].
pub struct StoreAssetRepository {
    store: Arc<dyn MediaStore>,
    location_reader: Option<Arc<dyn LocationReader>>,
}

impl StoreAssetRepository {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self {
            store,
            location_reader: None,
        }
    }

    /// Enable location extraction on detail fetches.
    ///
    /// Only pass a reader when the location capability is on.
    pub fn with_location_reader(mut self, reader: Arc<dyn LocationReader>) -> Self {
        self.location_reader = Some(reader);
        self
    }

    async fn resolve_url(&self, id: &str) -> Option<String> {
        match self.store.resolve_url(id).await {
            Ok(url) => url,
            Err(e) => {
                debug!(asset_id = id, error = %e, "URL resolution failed");
                None
            }
        }
    }

    async fn read_location(&self, asset: &mut Asset, path: &str) {
        let Some(reader) = &self.location_reader else {
            return;
        };
        if asset.media_type != MediaType::Photo {
            return;
        }
        match reader.read_location(Path::new(path)).await {
            Ok(location) => asset.location = location,
            Err(e) => debug!(asset_id = %asset.id, error = %e, "Location unavailable"),
        }
    }
}

#[async_trait]
impl AssetRepository for StoreAssetRepository {
    #[instrument(skip(self, spec), fields(limit = ?spec.limit(), offset = spec.offset()))]
    async fn list_assets(&self, spec: &QuerySpec) -> Result<Vec<Asset>> {
        let plan = planner::plan(spec);
        if plan.yields_nothing {
            debug!("Query cannot match any rows");
            return Ok(Vec::new());
        }

        let rows = self.store.query(&plan.store_query()).await?;
        let fetched = rows.len();
        let mut assets = plan.finish(rows.iter().map(normalize).collect());

        if spec.request_urls() {
            let urls = join_all(assets.iter().map(|a| self.resolve_url(&a.id))).await;
            for (asset, url) in assets.iter_mut().zip(urls) {
                asset.url = url;
            }
        }

        debug!(fetched, returned = assets.len(), "Listed assets");
        Ok(assets)
    }

    async fn get_asset(&self, id: &str) -> Result<Option<Asset>> {
        let Some(row) = self.store.find_by_id(id).await? else {
            debug!(asset_id = id, "Asset not found");
            return Ok(None);
        };

        let mut asset = normalize(&row);
        asset.url = self.resolve_url(id).await;
        if let Some(path) = data_path(&row) {
            self.read_location(&mut asset, path).await;
        }

        Ok(Some(asset))
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        let buckets = self.store.buckets().await?;
        let mut seen = HashSet::new();

        Ok(buckets
            .into_iter()
            .filter(|b| seen.insert(b.id.clone()))
            .map(|b| Collection {
                id: b.id,
                filename: b.display_name,
            })
            .collect())
    }
}
