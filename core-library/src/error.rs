use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Media store error: {0}")]
    Store(#[from] BridgeError),

    #[error("Source unreadable: {path} - {reason}")]
    SourceUnreadable { path: String, reason: String },

    #[error("Store write failed: {0}")]
    StoreWriteFailure(String),

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, LibraryError>;
