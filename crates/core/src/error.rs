use descache_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("MessagePack encoding error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("MessagePack decoding error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Reflection error: {0}")]
    Api(#[from] ApiError),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DescacheError>;
