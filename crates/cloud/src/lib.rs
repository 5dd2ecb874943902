//! # LandShift Cloud
//!
//! STAC catalog access and Sentinel-2 band reading.
//!
//! This crate covers the two network-facing stages of the change
//! pipeline: selecting one qualifying scene per time point from a STAC
//! catalog (with Planetary Computer asset signing), and fetching +
//! decoding band rasters onto a common working grid.

pub mod band_reader;
pub mod error;
pub mod scene;
pub mod stac_client;
pub mod stac_models;

pub use band_reader::{BandReader, BandReaderOptions, ReadTarget};
pub use error::{CloudError, Result};
pub use scene::{select_scene, Band, Scene};
pub use stac_client::{StacCatalog, StacClient, StacClientOptions};
pub use stac_models::{StacItem, StacItemCollection, StacSearchParams};
