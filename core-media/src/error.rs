use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Unreadable source {locator}: {reason}")]
    UnreadableSource { locator: String, reason: String },

    #[error("Encode failed: {0}")]
    EncodeFailure(String),

    #[error("Cannot seek video {url}: {reason}")]
    UnseekableSource { url: String, reason: String },

    #[error("Output path is outside the cache root: {0}")]
    InvalidOutputPath(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{tool} is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("Transform task failed: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransformError {
    pub(crate) fn unreadable(locator: impl Into<String>, reason: impl ToString) -> Self {
        TransformError::UnreadableSource {
            locator: locator.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
