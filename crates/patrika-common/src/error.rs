//! Error types for patrika - umbrella over the storage and asset layers

use miette::Diagnostic;

use crate::assets::AssetError;
use crate::store::StoreError;

/// Main error type for patrika operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum PatrikaError {
    /// Article storage error
    #[error(transparent)]
    #[diagnostic_source]
    Store(#[from] StoreError),

    /// Asset storage error
    #[error(transparent)]
    #[diagnostic_source]
    Asset(#[from] AssetError),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
