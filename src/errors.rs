use std::io;

use thiserror::Error;

use crate::types::BlockKey;

/// Error type for configuration, ingestion, enrichment, and per-block
/// clustering failures.
#[derive(Debug, Error)]
pub enum DedupeError {
    #[error("spatial index build failed for block '{block}': {details}")]
    IndexBuild { block: BlockKey, details: String },
    #[error("geocoding provider '{provider}' failed: {reason}")]
    Provider { provider: String, reason: String },
    #[error("feed '{path}' is unreadable: {reason}")]
    Feed { path: String, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}
