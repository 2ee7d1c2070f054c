#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage connection error: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Storage operation error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
