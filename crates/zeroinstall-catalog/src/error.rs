//! Error type shared by the library surface.

use std::time::Duration;

/// Failures raised by external collaborators and I/O around the pipeline.
///
/// None of these abort a catalog entry on their own: the pipeline converts
/// source and proposer errors into trail entries, and the runner counts
/// persistence errors as failed entries.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("document source error: {0}")]
    Source(String),

    #[error("proposer request failed: {0}")]
    Proposer(String),

    #[error("proposer timed out after {0:?}")]
    ProposerTimeout(Duration),

    #[error("persistence failed for entry '{entry_id}': {message}")]
    Persistence { entry_id: String, message: String },

    #[error("invalid catalog file: {0}")]
    Catalog(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
