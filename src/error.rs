use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CanslimError {
    #[error("upstream fetch failed: {0}")]
    Upstream(String),

    #[error("malformed sheet layout: {0}")]
    MalformedLayout(String),

    #[error("invalid stock row {index}: {reason}")]
    InvalidRow {
        /// Absolute row index in the raw cell array.
        index: usize,
        reason: String,
        /// The offending row as received, for diagnostics.
        raw: Vec<String>,
    },

    #[error("persistence failure at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CanslimError>;
