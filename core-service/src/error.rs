use core_library::LibraryError;
use core_media::TransformError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Core is shutting down")]
    ShuttingDown,

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Error category delivered to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    NotFound,
    UnreadableSource,
    EncodeFailure,
    StoreWriteFailure,
    UnseekableSource,
    UnsupportedOnPlatform,
    InvalidRequest,
    ShuttingDown,
    Internal,
}

/// Serializable error payload carried by a completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub code: FailureCode,
    pub message: String,
}

impl Failure {
    pub fn new(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureCode::Internal, message)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl From<&CoreError> for FailureCode {
    fn from(error: &CoreError) -> Self {
        match error {
            CoreError::ShuttingDown => FailureCode::ShuttingDown,
            CoreError::UnknownMethod(_) => FailureCode::NotFound,
            CoreError::InvalidRequest(_) => FailureCode::InvalidRequest,
            CoreError::CapabilityMissing { .. } => FailureCode::UnsupportedOnPlatform,
            CoreError::InitializationFailed(_) | CoreError::Runtime(_) => FailureCode::Internal,
            CoreError::Library(e) => match e {
                LibraryError::SourceUnreadable { .. } => FailureCode::UnreadableSource,
                LibraryError::StoreWriteFailure(_) => FailureCode::StoreWriteFailure,
                LibraryError::InvalidInput { .. } => FailureCode::InvalidRequest,
                LibraryError::Store(_) => FailureCode::Internal,
            },
            CoreError::Transform(e) => match e {
                TransformError::UnreadableSource { .. } => FailureCode::UnreadableSource,
                TransformError::EncodeFailure(_) | TransformError::Io(_) => {
                    FailureCode::EncodeFailure
                }
                TransformError::UnseekableSource { .. } => FailureCode::UnseekableSource,
                TransformError::InvalidOutputPath(_) | TransformError::InvalidRequest(_) => {
                    FailureCode::InvalidRequest
                }
                TransformError::ToolUnavailable { .. } => FailureCode::UnsupportedOnPlatform,
                TransformError::Internal(_) => FailureCode::Internal,
            },
        }
    }
}

impl From<CoreError> for Failure {
    fn from(error: CoreError) -> Self {
        Failure::new(FailureCode::from(&error), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_codes() {
        let cases = [
            (
                CoreError::Library(LibraryError::SourceUnreadable {
                    path: "/a".into(),
                    reason: "gone".into(),
                }),
                FailureCode::UnreadableSource,
            ),
            (
                CoreError::Library(LibraryError::StoreWriteFailure("quota".into())),
                FailureCode::StoreWriteFailure,
            ),
            (
                CoreError::Transform(TransformError::EncodeFailure("disk".into())),
                FailureCode::EncodeFailure,
            ),
            (
                CoreError::Transform(TransformError::InvalidOutputPath("/etc".into())),
                FailureCode::InvalidRequest,
            ),
            (
                CoreError::Transform(TransformError::ToolUnavailable {
                    tool: "ffmpeg".into(),
                    reason: "not found".into(),
                }),
                FailureCode::UnsupportedOnPlatform,
            ),
            (CoreError::ShuttingDown, FailureCode::ShuttingDown),
            (CoreError::UnknownMethod("x".into()), FailureCode::NotFound),
        ];
        for (error, code) in cases {
            assert_eq!(Failure::from(error).code, code);
        }
    }

    #[test]
    fn test_failure_serializes_snake_case() {
        let failure = Failure::new(FailureCode::UnseekableSource, "bad video");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["code"], "unseekable_source");
        assert_eq!(json["message"], "bad video");
    }
}
