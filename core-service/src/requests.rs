//! Boundary request and response types
//!
//! Field names are camelCase, matching what the host sends. Omitted fields
//! take their boundary defaults during deserialization, so the core never
//! sees a half-filled request.

use core_library::{MediaType, QuerySpec, SortBy, SortOrder};
use core_media::{ImageFormatKind, ResizeRequest, VideoFrameRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// Width/height value meaning "not set".
pub const UNSET_DIMENSION: i64 = -1;

fn default_media_types() -> Vec<MediaType> {
    vec![MediaType::Photo, MediaType::Video]
}

fn default_quality() -> f64 {
    1.0
}

fn unset_dimension() -> i64 {
    UNSET_DIMENSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAssetsRequest {
    #[serde(default = "default_media_types")]
    pub media_type: Vec<MediaType>,
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub request_urls: bool,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub only_favorites: bool,
    #[serde(default)]
    pub collection_id: Option<String>,
}

impl Default for GetAssetsRequest {
    fn default() -> Self {
        Self {
            media_type: default_media_types(),
            sort_by: None,
            sort_order: None,
            extensions: None,
            request_urls: false,
            limit: None,
            offset: None,
            only_favorites: false,
            collection_id: None,
        }
    }
}

impl GetAssetsRequest {
    pub fn into_spec(self) -> QuerySpec {
        let mut builder = QuerySpec::builder()
            .media_types(self.media_type)
            .sort_by(self.sort_by.unwrap_or_default())
            .sort_order(self.sort_order.unwrap_or_default())
            .request_urls(self.request_urls)
            .offset(self.offset.unwrap_or(0))
            .only_favorites(self.only_favorites);
        if let Some(extensions) = self.extensions {
            builder = builder.extensions(extensions);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        if let Some(collection_id) = self.collection_id {
            builder = builder.collection_id(collection_id);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAssetRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveToLibraryRequest {
    pub local_url: String,
    #[serde(default)]
    pub album: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchVideoFrameRequest {
    pub url: String,
    #[serde(default)]
    pub time: f64,
    #[serde(default = "default_quality")]
    pub quality: f64,
}

impl From<FetchVideoFrameRequest> for VideoFrameRequest {
    fn from(request: FetchVideoFrameRequest) -> Self {
        VideoFrameRequest {
            url: request.url,
            time: request.time,
            quality: request.quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineImagesRequest {
    pub images: Vec<String>,
    pub result_save_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResizeRequest {
    pub uri: String,
    #[serde(default = "unset_dimension")]
    pub width: i64,
    #[serde(default = "unset_dimension")]
    pub height: i64,
    #[serde(default)]
    pub format: ImageFormatKind,
    pub result_save_path: String,
}

impl From<ImageResizeRequest> for ResizeRequest {
    fn from(request: ImageResizeRequest) -> Self {
        let dimension = |value: i64| u32::try_from(value).ok().filter(|v| *v > 0);
        ResizeRequest {
            source: request.uri,
            width: dimension(request.width),
            height: dimension(request.height),
            format: request.format,
            output: request.result_save_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSizesRequest {
    pub images: Vec<String>,
}

/// `{ "result": true }` for transforms that only write a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResult {
    pub result: bool,
}

impl TransformResult {
    pub const WRITTEN: TransformResult = TransformResult { result: true };
}

/// A parsed JSON boundary call.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    GetAssets(GetAssetsRequest),
    GetAsset(GetAssetRequest),
    GetCollections,
    SaveToLibrary(SaveToLibraryRequest),
    FetchVideoFrame(FetchVideoFrameRequest),
    CombineImages(CombineImagesRequest),
    ImageResize(ImageResizeRequest),
    ImageSizes(ImageSizesRequest),
    CacheDir,
}

#[derive(Deserialize)]
struct Envelope {
    method: String,
    #[serde(default)]
    params: Value,
}

impl BridgeCall {
    /// Parse `{"method": "...", "params": {...}}`.
    ///
    /// `params` may be omitted for methods that take none and for
    /// `getAssets`, whose fields all have defaults.
    pub fn parse(payload: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(payload)
            .map_err(|e| CoreError::InvalidRequest(format!("malformed call: {}", e)))?;
        let params = match envelope.params {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        match envelope.method.as_str() {
            "getAssets" => params_as(params).map(BridgeCall::GetAssets),
            "getAsset" => params_as(params).map(BridgeCall::GetAsset),
            "getCollections" => Ok(BridgeCall::GetCollections),
            "saveToLibrary" => params_as(params).map(BridgeCall::SaveToLibrary),
            "fetchVideoFrame" => params_as(params).map(BridgeCall::FetchVideoFrame),
            "combineImages" => params_as(params).map(BridgeCall::CombineImages),
            "imageResize" => params_as(params).map(BridgeCall::ImageResize),
            "imageSizes" => params_as(params).map(BridgeCall::ImageSizes),
            "cacheDir" => Ok(BridgeCall::CacheDir),
            other => Err(CoreError::UnknownMethod(other.to_string())),
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            BridgeCall::GetAssets(_) => "getAssets",
            BridgeCall::GetAsset(_) => "getAsset",
            BridgeCall::GetCollections => "getCollections",
            BridgeCall::SaveToLibrary(_) => "saveToLibrary",
            BridgeCall::FetchVideoFrame(_) => "fetchVideoFrame",
            BridgeCall::CombineImages(_) => "combineImages",
            BridgeCall::ImageResize(_) => "imageResize",
            BridgeCall::ImageSizes(_) => "imageSizes",
            BridgeCall::CacheDir => "cacheDir",
        }
    }
}

fn params_as<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| CoreError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_assets_defaults() {
        let call = BridgeCall::parse(r#"{"method":"getAssets"}"#).unwrap();
        let BridgeCall::GetAssets(request) = call else {
            panic!("wrong call");
        };
        assert_eq!(request, GetAssetsRequest::default());

        let spec = request.into_spec();
        assert_eq!(spec, QuerySpec::default());
    }

    #[test]
    fn test_get_assets_full() {
        let call = BridgeCall::parse(
            r#"{"method":"getAssets","params":{
                "mediaType":["video"],"sortBy":"modificationTime","sortOrder":"asc",
                "extensions":["mp4"],"requestUrls":true,"limit":10,"offset":20,
                "onlyFavorites":true,"collectionId":"Trips"}}"#,
        )
        .unwrap();
        let BridgeCall::GetAssets(request) = call else {
            panic!("wrong call");
        };
        let spec = request.into_spec();

        assert_eq!(spec.media_types().len(), 1);
        assert!(spec.media_types().contains(&MediaType::Video));
        assert_eq!(spec.sort_by(), SortBy::ModificationTime);
        assert_eq!(spec.sort_order(), SortOrder::Asc);
        assert!(spec.request_urls());
        assert_eq!(spec.limit(), Some(10));
        assert_eq!(spec.offset(), 20);
        assert!(spec.only_favorites());
        assert_eq!(spec.collection_id(), Some("Trips"));
    }

    #[test]
    fn test_video_frame_defaults() {
        let call =
            BridgeCall::parse(r#"{"method":"fetchVideoFrame","params":{"url":"/v.mp4"}}"#).unwrap();
        assert_eq!(
            call,
            BridgeCall::FetchVideoFrame(FetchVideoFrameRequest {
                url: "/v.mp4".into(),
                time: 0.0,
                quality: 1.0,
            })
        );
    }

    #[test]
    fn test_resize_defaults_and_unset_sentinel() {
        let call = BridgeCall::parse(
            r#"{"method":"imageResize","params":{"uri":"/a.png","resultSavePath":"b.png","width":120}}"#,
        )
        .unwrap();
        let BridgeCall::ImageResize(request) = call else {
            panic!("wrong call");
        };
        assert_eq!(request.height, UNSET_DIMENSION);
        assert_eq!(request.format, ImageFormatKind::Png);

        let resize = ResizeRequest::from(request);
        assert_eq!(resize.width, Some(120));
        assert_eq!(resize.height, None);
    }

    #[test]
    fn test_invalid_calls() {
        assert!(matches!(
            BridgeCall::parse("not json"),
            Err(CoreError::InvalidRequest(_))
        ));
        assert!(matches!(
            BridgeCall::parse(r#"{"method":"deleteEverything"}"#),
            Err(CoreError::UnknownMethod(_))
        ));
        assert!(matches!(
            BridgeCall::parse(r#"{"method":"saveToLibrary","params":{}}"#),
            Err(CoreError::InvalidRequest(_))
        ));
        assert!(matches!(
            BridgeCall::parse(r#"{"method":"getAssets","params":{"mediaType":["gif"]}}"#),
            Err(CoreError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in ["getCollections", "cacheDir"] {
            let payload = format!(r#"{{"method":"{}"}}"#, method);
            assert_eq!(BridgeCall::parse(&payload).unwrap().method(), method);
        }
    }
}
