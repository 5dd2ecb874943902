//! # LandShift Analysis
//!
//! The arithmetic half of the change pipeline: normalized-difference
//! spectral indices (NDVI, NDBI), temporal differencing with threshold
//! classification, zone-level aggregation against administrative
//! boundaries, and export of the resulting summaries.
//!
//! Everything here is pure: identical inputs produce bit-identical
//! outputs, which is what makes the pipeline's memoization sound.

pub mod boundary;
pub mod change;
pub mod export;
pub mod indices;
pub mod zonal;

pub use boundary::{BoundaryCollection, BoundaryFeature};
pub use change::{change_raster, classify_percentages, CategoryPercentages, ChangeThresholds};
pub use indices::{ndbi, ndvi, normalized_difference, INDEX_EPSILON};
pub use zonal::{zonal_change_stats, ZoneRecord};
