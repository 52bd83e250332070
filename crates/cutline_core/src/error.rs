use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Item not found: {0}")]
    ItemNotFound(uuid::Uuid),

    #[error("Track not found: {0}")]
    TrackNotFound(uuid::Uuid),

    #[error("Overlap detected")]
    OverlapDetected,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
