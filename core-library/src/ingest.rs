//! Ingestion Gateway
//!
//! Commits a local file into the media index, optionally inside a named
//! album, and hands back the resulting asset as it reads after the write.

use bridge_traits::error::BridgeError;
use bridge_traits::{InsertRequest, MediaStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{LibraryError, Result};
use crate::models::Asset;
use crate::repository::AssetRepository;

pub struct IngestionGateway {
    store: Arc<dyn MediaStore>,
    repository: Arc<dyn AssetRepository>,
}

impl IngestionGateway {
    pub fn new(store: Arc<dyn MediaStore>, repository: Arc<dyn AssetRepository>) -> Self {
        Self { store, repository }
    }

    /// Copy `local_locator` into the library and return the new asset.
    ///
    /// Accepts a plain path or a `file://` locator. An unreadable source is
    /// reported before anything is written.
    #[instrument(skip(self))]
    pub async fn commit(&self, local_locator: &str, album: Option<&str>) -> Result<Asset> {
        let source = local_path(local_locator)?;
        ensure_readable(&source).await?;

        let request = InsertRequest {
            source,
            album: album.map(str::to_string),
        };
        let id = self.store.insert(request).await.map_err(|e| match e {
            BridgeError::WriteRejected(reason) => LibraryError::StoreWriteFailure(reason),
            other => LibraryError::StoreWriteFailure(other.to_string()),
        })?;

        let failure = match self.repository.get_asset(&id).await {
            Ok(Some(asset)) => {
                info!(asset_id = %asset.id, "Saved to library");
                return Ok(asset);
            }
            Ok(None) => LibraryError::StoreWriteFailure(format!("asset {} missing after insert", id)),
            Err(e) => e,
        };

        // The asset is either fully committed or not there at all.
        warn!(asset_id = %id, error = %failure, "Committed asset is not readable back, rolling back");
        if let Err(e) = self.store.remove(&id).await {
            warn!(asset_id = %id, error = %e, "Rollback of unreadable asset failed");
        }
        Err(failure)
    }
}

fn local_path(locator: &str) -> Result<PathBuf> {
    let path = locator.strip_prefix("file://").unwrap_or(locator);
    if path.is_empty() {
        return Err(LibraryError::SourceUnreadable {
            path: locator.to_string(),
            reason: "empty locator".to_string(),
        });
    }
    if path.contains("://") {
        return Err(LibraryError::SourceUnreadable {
            path: locator.to_string(),
            reason: "not a local file".to_string(),
        });
    }
    Ok(PathBuf::from(path))
}

async fn ensure_readable(path: &Path) -> Result<()> {
    let unreadable = |reason: String| LibraryError::SourceUnreadable {
        path: path.display().to_string(),
        reason,
    };

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    if !metadata.is_file() {
        return Err(unreadable("not a regular file".to_string()));
    }
    tokio::fs::File::open(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    Ok(())
}
