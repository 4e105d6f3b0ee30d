use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}
