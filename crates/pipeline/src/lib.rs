//! # LandShift Pipeline
//!
//! The memoized Sentinel-2 change-detection pipeline: scene selection,
//! band reads, NDVI/NDBI computation, temporal differencing and zone
//! aggregation behind one configuration struct. Each of the original
//! dashboard variants reduces to a caller supplying a different
//! [`AnalysisConfig`].

pub mod blocking;
pub mod cache;
pub mod config;
pub mod error;
pub mod run;
pub mod single_flight;

pub use blocking::PipelineBlocking;
pub use cache::{timepoint_key, CacheKey, IndexCache, MemoryCache};
pub use config::{AnalysisConfig, DateRange};
pub use error::{PipelineError, Result};
pub use run::{ChangeAnalysis, Pipeline, SceneMeta, TimepointIndices};
