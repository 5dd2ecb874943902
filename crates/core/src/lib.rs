//! # LandShift Core
//!
//! Core types for the LandShift change-detection toolkit.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `BoundingBox`: Query regions and pixel-window mapping
//! - Resampling primitives for bringing bands onto a common grid

pub mod bbox;
pub mod error;
pub mod raster;

pub use bbox::{BoundingBox, PixelWindow};
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bbox::{BoundingBox, PixelWindow};
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
}
