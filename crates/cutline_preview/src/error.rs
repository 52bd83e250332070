use cutline_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("media player error: {0}")]
    Media(String),

    #[error("timeline error: {0}")]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, PreviewError>;
