//! Error type for pipeline orchestration.

use thiserror::Error;

/// Errors surfaced by a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Cloud(#[from] landshift_cloud::CloudError),

    #[error(transparent)]
    Core(#[from] landshift_core::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
