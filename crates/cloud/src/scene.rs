//! Scene selection: one qualifying acquisition per time point.
//!
//! Searches the catalog for scenes intersecting a bounding box and date
//! interval below a cloud-cover ceiling, picks the first result of the
//! catalog's default ordering, and resolves band asset hrefs (signing
//! them where the catalog requires it). No mosaicking: cloud cover or
//! partial coverage in the selected scene carries through to the output.

use std::collections::HashMap;
use std::fmt;

use tracing::info;

use landshift_core::BoundingBox;

use crate::error::{CloudError, Result};
use crate::stac_client::StacClient;
use crate::stac_models::{StacItem, StacSearchParams};

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

/// Spectral bands used by the change pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// Red (Sentinel-2 B04, 10 m)
    Red,
    /// Near-infrared (Sentinel-2 B08, 10 m)
    Nir,
    /// Shortwave infrared (Sentinel-2 B11, 20 m)
    Swir,
}

impl Band {
    /// Candidate asset keys per band, in lookup order.
    ///
    /// Planetary Computer names Sentinel-2 assets by band id (`B04`),
    /// Earth Search by common name (`red`); the first key present wins.
    pub fn asset_keys(&self) -> &'static [&'static str] {
        match self {
            Band::Red => &["B04", "red"],
            Band::Nir => &["B08", "nir"],
            Band::Swir => &["B11", "swir16"],
        }
    }

    /// Native ground resolution in metres for Sentinel-2 L2A.
    pub fn native_resolution(&self) -> u32 {
        match self {
            Band::Red | Band::Nir => 10,
            Band::Swir => 20,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Band::Red => "red",
            Band::Nir => "nir",
            Band::Swir => "swir",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// One selected satellite acquisition with directly fetchable band hrefs.
///
/// Immutable once selected; owned by the computation that selected it.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Catalog item id.
    pub id: String,
    /// Capture datetime (ISO 8601) as reported by the catalog.
    pub datetime: Option<String>,
    /// Cloud cover percentage as reported by the catalog.
    pub cloud_cover: Option<f64>,
    /// Scene footprint `[west, south, east, north]`, if reported.
    pub bbox: Option<Vec<f64>>,
    assets: HashMap<Band, String>,
}

impl Scene {
    /// The resolved (signed) href for a band.
    pub fn asset_href(&self, band: Band) -> Result<&str> {
        self.assets
            .get(&band)
            .map(String::as_str)
            .ok_or_else(|| CloudError::AssetMissing {
                scene_id: self.id.clone(),
                band: band.to_string(),
                tried: band.asset_keys().to_vec(),
            })
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Select one scene for a region and date interval.
///
/// Takes the first item of the catalog's default ordering among those
/// with `eo:cloud_cover < max_cloud_cover`, and resolves hrefs for the
/// requested bands. Fails with [`CloudError::NoSceneFound`] when the
/// filtered result set is empty; the caller must surface that, not fall
/// back to a different region or a looser filter.
pub async fn select_scene(
    client: &StacClient,
    collection: &str,
    bbox: &BoundingBox,
    datetime: &str,
    max_cloud_cover: f64,
    bands: &[Band],
) -> Result<Scene> {
    let params = StacSearchParams::new()
        .bbox(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y)
        .datetime(datetime)
        .collections(&[collection])
        .cloud_cover_lt(max_cloud_cover)
        .limit(10);

    let results = client.search(&params).await?;

    let item = results
        .features
        .into_iter()
        .next()
        .ok_or_else(|| CloudError::NoSceneFound {
            collection: collection.to_string(),
            datetime: datetime.to_string(),
            max_cloud_cover,
        })?;

    let scene = resolve_assets(client, item, bands).await?;
    info!(
        scene = %scene.id,
        datetime = scene.datetime.as_deref().unwrap_or("-"),
        cloud_cover = ?scene.cloud_cover,
        "selected scene"
    );

    Ok(scene)
}

/// Look up and sign the asset href for each requested band.
async fn resolve_assets(client: &StacClient, item: StacItem, bands: &[Band]) -> Result<Scene> {
    let mut assets = HashMap::new();

    for &band in bands {
        let raw = band
            .asset_keys()
            .iter()
            .find_map(|key| item.asset(key))
            .ok_or_else(|| CloudError::AssetMissing {
                scene_id: item.id.clone(),
                band: band.to_string(),
                tried: band.asset_keys().to_vec(),
            })?;

        let signed = client.sign_asset_href(&raw.href).await?;
        assets.insert(band, signed);
    }

    Ok(Scene {
        id: item.id,
        datetime: item.properties.datetime,
        cloud_cover: item.properties.eo_cloud_cover,
        bbox: item.bbox,
        assets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_asset_keys() {
        assert_eq!(Band::Red.asset_keys()[0], "B04");
        assert_eq!(Band::Nir.asset_keys()[0], "B08");
        assert_eq!(Band::Swir.asset_keys()[0], "B11");
    }

    #[test]
    fn band_resolutions() {
        assert_eq!(Band::Red.native_resolution(), 10);
        assert_eq!(Band::Nir.native_resolution(), 10);
        assert_eq!(Band::Swir.native_resolution(), 20);
    }

    #[test]
    fn missing_asset_is_reported_with_candidates() {
        let scene = Scene {
            id: "test-scene".into(),
            datetime: None,
            cloud_cover: None,
            bbox: None,
            assets: HashMap::new(),
        };

        let err = scene.asset_href(Band::Swir).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("test-scene"));
        assert!(msg.contains("swir"));
        assert!(msg.contains("B11"));
    }
}
