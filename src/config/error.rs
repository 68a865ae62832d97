//! Configuration error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors from the strict loader. Watch handlers use the tolerant loader
/// instead, which maps every variant to an empty config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Config file parsing error")]
    Json(#[from] serde_json::Error),
}
