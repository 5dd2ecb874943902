//! Blocking (synchronous) wrappers for callers without an async runtime.
//!
//! Wraps [`Pipeline`] with an internal current-thread Tokio runtime so
//! the CLI and other sync callers don't manage their own.

use landshift_analysis::boundary::BoundaryCollection;
use landshift_cloud::StacCatalog;

use crate::config::AnalysisConfig;
use crate::error::{PipelineError, Result};
use crate::run::{ChangeAnalysis, Pipeline};

/// Blocking wrapper around [`Pipeline`].
pub struct PipelineBlocking {
    rt: tokio::runtime::Runtime,
    inner: Pipeline,
}

impl PipelineBlocking {
    /// Create a pipeline with an in-memory cache (blocking).
    pub fn new(catalog: StacCatalog) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PipelineError::Config(format!("building runtime: {e}")))?;

        let inner = Pipeline::new(catalog)?;
        Ok(Self { rt, inner })
    }

    /// Run a full change analysis (blocking).
    pub fn run(&self, config: &AnalysisConfig) -> Result<ChangeAnalysis> {
        self.rt.block_on(self.inner.run(config))
    }

    /// Run with ward-level aggregation (blocking).
    pub fn run_with_zones(
        &self,
        config: &AnalysisConfig,
        boundaries: Option<&BoundaryCollection>,
    ) -> Result<ChangeAnalysis> {
        self.rt.block_on(self.inner.run_with_zones(config, boundaries))
    }
}
