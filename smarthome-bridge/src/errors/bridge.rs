use crate::errors::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Storage unavailable: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Broker session failed: {0}")]
    Session(#[from] SessionError),
}
