//! The media library facade
//!
//! [`MediaLibrary`] is the single entry point hosts talk to. Every operation
//! returns as soon as the work is queued; the result arrives later through
//! the operation's [`Completion`] on a worker thread.

use bridge_traits::MediaStore;
use core_library::{
    Asset, AssetRepository, Collection, IngestionGateway, StoreAssetRepository,
};
use core_media::{
    CacheRoot, FfmpegFrameExtractor, ImageDimensions, TransformEngine, VideoFrame,
};
use core_runtime::{Capabilities, CoreConfig};
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tracing::info;

use crate::completion::{Completion, Outcome};
use crate::dispatcher::Dispatcher;
use crate::error::{CoreError, Failure, Result};
use crate::requests::{
    BridgeCall, CombineImagesRequest, FetchVideoFrameRequest, GetAssetRequest, GetAssetsRequest,
    ImageResizeRequest, ImageSizesRequest, SaveToLibraryRequest, TransformResult,
};

static LIBRARY: OnceLock<MediaLibrary> = OnceLock::new();

/// Collaborators an operation needs once it is running on a worker.
#[derive(Clone)]
struct Operations {
    repository: Arc<dyn AssetRepository>,
    ingestion: Arc<IngestionGateway>,
    transforms: TransformEngine,
}

impl Operations {
    async fn get_assets(self, request: GetAssetsRequest) -> Result<Vec<Asset>> {
        let spec = request.into_spec();
        Ok(self.repository.list_assets(&spec).await?)
    }

    async fn get_asset(self, request: GetAssetRequest) -> Result<Option<Asset>> {
        Ok(self.repository.get_asset(&request.id).await?)
    }

    async fn get_collections(self) -> Result<Vec<Collection>> {
        Ok(self.repository.list_collections().await?)
    }

    async fn save_to_library(self, request: SaveToLibraryRequest) -> Result<Asset> {
        Ok(self
            .ingestion
            .commit(&request.local_url, request.album.as_deref())
            .await?)
    }

    async fn fetch_video_frame(self, request: FetchVideoFrameRequest) -> Result<VideoFrame> {
        Ok(self.transforms.extract_video_frame(&request.into()).await?)
    }

    async fn combine_images(self, request: CombineImagesRequest) -> Result<TransformResult> {
        self.transforms
            .combine(request.images, &request.result_save_path)
            .await?;
        Ok(TransformResult::WRITTEN)
    }

    async fn image_resize(self, request: ImageResizeRequest) -> Result<TransformResult> {
        self.transforms.resize(request.into()).await?;
        Ok(TransformResult::WRITTEN)
    }

    async fn image_sizes(self, request: ImageSizesRequest) -> Result<Vec<ImageDimensions>> {
        Ok(self.transforms.image_sizes(request.images).await?)
    }

    fn cache_dir(&self) -> String {
        self.transforms.cache_root().display_path()
    }

    async fn call(self, call: BridgeCall) -> Outcome<Value> {
        match call {
            BridgeCall::GetAssets(request) => to_json(self.get_assets(request).await),
            BridgeCall::GetAsset(request) => to_json(self.get_asset(request).await),
            BridgeCall::GetCollections => to_json(self.get_collections().await),
            BridgeCall::SaveToLibrary(request) => to_json(self.save_to_library(request).await),
            BridgeCall::FetchVideoFrame(request) => {
                to_json(self.fetch_video_frame(request).await)
            }
            BridgeCall::CombineImages(request) => to_json(self.combine_images(request).await),
            BridgeCall::ImageResize(request) => to_json(self.image_resize(request).await),
            BridgeCall::ImageSizes(request) => to_json(self.image_sizes(request).await),
            BridgeCall::CacheDir => Ok(Value::String(self.cache_dir())),
        }
    }
}

fn to_json<T: Serialize>(result: Result<T>) -> Outcome<Value> {
    let value = result?;
    serde_json::to_value(value).map_err(|e| Failure::internal(format!("encode reply: {}", e)))
}

/// Render an outcome as the JSON reply envelope.
pub fn reply_envelope(outcome: Outcome<Value>) -> String {
    match outcome {
        Ok(value) => json!({ "ok": value }).to_string(),
        Err(failure) => json!({ "error": failure }).to_string(),
    }
}

/// Primary facade exposed to host applications.
///
/// Every operation method hands its work to the worker pool and returns at
/// once. `Ok(())` means the completion will be invoked exactly once. Once
/// [`MediaLibrary::shutdown`] has begun, calls return
/// `Err(CoreError::ShuttingDown)` and the completion is dropped without
/// being invoked, so a refused call never calls back.
pub struct MediaLibrary {
    dispatcher: Dispatcher,
    operations: Operations,
    capabilities: Capabilities,
}

impl MediaLibrary {
    /// Bootstrap the library from a validated configuration.
    ///
    /// Creates the working directories, starts the worker pool, and opens
    /// the default media index when no store was injected and the
    /// `desktop-shims` feature is enabled.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        config.ensure_directories()?;

        let dispatcher = Dispatcher::new(config.worker_threads)?;
        let store = match config.media_store.clone() {
            Some(store) => store,
            None => open_default_store(&config, &dispatcher)?,
        };

        let capabilities = config.capabilities();
        let mut repository = StoreAssetRepository::new(store.clone());
        if capabilities.location {
            if let Some(reader) = config.location_reader.clone() {
                repository = repository.with_location_reader(reader);
            }
        }
        let repository: Arc<dyn AssetRepository> = Arc::new(repository);
        let ingestion = Arc::new(IngestionGateway::new(store, repository.clone()));

        let cache = CacheRoot::new(&config.cache_dir)?;
        let frames = FfmpegFrameExtractor::new(&config.ffmpeg_path, &config.ffprobe_path);
        let transforms = TransformEngine::new(cache, Arc::new(frames));

        info!(
            cache_dir = %transforms.cache_root().display_path(),
            location = capabilities.location,
            "Media library ready"
        );

        Ok(Self {
            dispatcher,
            operations: Operations {
                repository,
                ingestion,
                transforms,
            },
            capabilities,
        })
    }

    /// Install the process-wide instance.
    ///
    /// Fails if an instance was already installed.
    pub fn install(config: CoreConfig) -> Result<&'static MediaLibrary> {
        if LIBRARY.get().is_some() {
            return Err(CoreError::InitializationFailed(
                "Media library is already installed".to_string(),
            ));
        }
        let library = MediaLibrary::new(config)?;
        LIBRARY.set(library).map_err(|_| {
            CoreError::InitializationFailed("Media library is already installed".to_string())
        })?;
        LIBRARY.get().ok_or_else(|| {
            CoreError::InitializationFailed("Media library install did not complete".to_string())
        })
    }

    /// The process-wide instance, if [`MediaLibrary::install`] has run.
    pub fn global() -> Option<&'static MediaLibrary> {
        LIBRARY.get()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Absolute cache root without a trailing separator.
    pub fn cache_dir(&self) -> String {
        self.operations.cache_dir()
    }

    /// Refused with [`CoreError::ShuttingDown`] after shutdown, without
    /// invoking `completion`.
    pub fn get_assets(
        &self,
        request: GetAssetsRequest,
        completion: Completion<Vec<Asset>>,
    ) -> Result<()> {
        let ops = self.operations.clone();
        self.run("getAssets", ops.get_assets(request), completion)
    }

    /// A missing id completes with `Ok(None)`. Refused with
    /// [`CoreError::ShuttingDown`] after shutdown, without invoking
    /// `completion`.
    pub fn get_asset(&self, id: impl Into<String>, completion: Completion<Option<Asset>>) -> Result<()> {
        let ops = self.operations.clone();
        let request = GetAssetRequest { id: id.into() };
        self.run("getAsset", ops.get_asset(request), completion)
    }

    /// Refused with [`CoreError::ShuttingDown`] after shutdown, without
    /// invoking `completion`.
    pub fn get_collections(&self, completion: Completion<Vec<Collection>>) -> Result<()> {
        let ops = self.operations.clone();
        self.run("getCollections", ops.get_collections(), completion)
    }

    /// Refused with [`CoreError::ShuttingDown`] after shutdown, without
    /// invoking `completion`.
    pub fn save_to_library(
        &self,
        request: SaveToLibraryRequest,
        completion: Completion<Asset>,
    ) -> Result<()> {
        let ops = self.operations.clone();
        self.run("saveToLibrary", ops.save_to_library(request), completion)
    }

    /// Refused with [`CoreError::ShuttingDown`] after shutdown, without
    /// invoking `completion`.
    pub fn fetch_video_frame(
        &self,
        request: FetchVideoFrameRequest,
        completion: Completion<VideoFrame>,
    ) -> Result<()> {
        let ops = self.operations.clone();
        self.run("fetchVideoFrame", ops.fetch_video_frame(request), completion)
    }

    /// Refused with [`CoreError::ShuttingDown`] after shutdown, without
    /// invoking `completion`.
    pub fn combine_images(
        &self,
        request: CombineImagesRequest,
        completion: Completion<TransformResult>,
    ) -> Result<()> {
        let ops = self.operations.clone();
        self.run("combineImages", ops.combine_images(request), completion)
    }

    /// Refused with [`CoreError::ShuttingDown`] after shutdown, without
    /// invoking `completion`.
    pub fn image_resize(
        &self,
        request: ImageResizeRequest,
        completion: Completion<TransformResult>,
    ) -> Result<()> {
        let ops = self.operations.clone();
        self.run("imageResize", ops.image_resize(request), completion)
    }

    /// Refused with [`CoreError::ShuttingDown`] after shutdown, without
    /// invoking `completion`.
    pub fn image_sizes(
        &self,
        request: ImageSizesRequest,
        completion: Completion<Vec<ImageDimensions>>,
    ) -> Result<()> {
        let ops = self.operations.clone();
        self.run("imageSizes", ops.image_sizes(request), completion)
    }

    /// JSON boundary.
    ///
    /// `reply` receives `{"ok": value}` or `{"error": {"code", "message"}}`.
    /// Malformed payloads are answered the same way, from a worker, so the
    /// host sees one delivery path. After shutdown the call is refused with
    /// [`CoreError::ShuttingDown`] and `reply` is dropped uncalled.
    pub fn call_json<F>(&self, payload: &str, reply: F) -> Result<()>
    where
        F: FnOnce(String) + Send + 'static,
    {
        let parsed = BridgeCall::parse(payload);
        let operation = parsed.as_ref().map(BridgeCall::method).unwrap_or("invalid");
        let ops = self.operations.clone();
        let completion = Completion::new(move |outcome: Outcome<Value>| reply(reply_envelope(outcome)));

        self.dispatcher.dispatch(
            operation,
            async move {
                match parsed {
                    Ok(call) => ops.call(call).await,
                    Err(error) => Err(Failure::from(error)),
                }
            },
            completion,
        )
    }

    /// Stop accepting work, wait for in-flight operations, stop the pool.
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }

    /// [`MediaLibrary::shutdown`] for hosts without an async context.
    pub fn shutdown_blocking(&self) {
        futures::executor::block_on(self.shutdown());
    }

    pub fn is_shut_down(&self) -> bool {
        !self.dispatcher.is_accepting()
    }

    fn run<T, Fut>(&self, operation: &'static str, work: Fut, completion: Completion<T>) -> Result<()>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.dispatcher
            .dispatch(operation, async move { work.await.map_err(Failure::from) }, completion)
    }
}

#[cfg(feature = "desktop-shims")]
fn open_default_store(config: &CoreConfig, dispatcher: &Dispatcher) -> Result<Arc<dyn MediaStore>> {
    let open = bridge_desktop::SqliteMediaStore::open(
        config.database_path.clone(),
        config.library_dir.clone(),
    );
    // The pool's background tasks must live on the worker runtime.
    let store = futures::executor::block_on(dispatcher.handle().spawn(open))
        .map_err(|e| CoreError::InitializationFailed(format!("Media index task failed: {}", e)))?
        .map_err(|e| CoreError::InitializationFailed(format!("Failed to open media index: {}", e)))?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
fn open_default_store(_config: &CoreConfig, _dispatcher: &Dispatcher) -> Result<Arc<dyn MediaStore>> {
    Err(CoreError::CapabilityMissing {
        capability: "MediaStore".to_string(),
        message: "No media store was injected and desktop shims are disabled".to_string(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureCode;

    #[test]
    fn test_reply_envelope() {
        assert_eq!(reply_envelope(Ok(Value::Null)), r#"{"ok":null}"#);

        let reply: Value = serde_json::from_str(&reply_envelope(Err(Failure::new(
            FailureCode::UnseekableSource,
            "moov atom not found",
        ))))
        .unwrap();
        assert_eq!(
            reply,
            json!({ "error": { "code": "unseekable_source", "message": "moov atom not found" } })
        );
    }

    #[test]
    fn test_to_json_maps_errors() {
        let failure = to_json::<u32>(Err(CoreError::UnknownMethod("x".into()))).unwrap_err();
        assert_eq!(failure.code, FailureCode::NotFound);
        assert_eq!(to_json(Ok(TransformResult::WRITTEN)).unwrap(), json!({ "result": true }));
    }
}
