//! Error types for catalog access and band reading.

use thiserror::Error;

/// Errors produced while talking to a STAC catalog or reading band assets.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("band decode failed: {0}")]
    Decode(String),

    #[error(
        "no scene found for collection '{collection}' over {datetime} \
         with cloud cover < {max_cloud_cover}%"
    )]
    NoSceneFound {
        collection: String,
        datetime: String,
        max_cloud_cover: f64,
    },

    #[error("scene '{scene_id}' has no asset for band {band} (tried {tried:?})")]
    AssetMissing {
        scene_id: String,
        band: String,
        tried: Vec<&'static str>,
    },

    #[error("core error: {0}")]
    Core(#[from] landshift_core::Error),
}

/// Result alias for cloud operations.
pub type Result<T> = std::result::Result<T, CloudError>;
