//! STAC (SpatioTemporal Asset Catalog) data types.
//!
//! Lightweight serde models for STAC Item Search (POST /search) responses,
//! covering the subset the change pipeline needs: bbox, datetime and
//! collection filtering, the `eo:cloud_cover` query, and asset access.
//! Scene selection only ever consults the first page of results, so
//! pagination links are not modelled.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Search request
// ---------------------------------------------------------------------------

/// Body for `POST /search` (STAC API – Item Search).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StacSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// STAC query extension filters, e.g. `{"eo:cloud_cover": {"lt": 10}}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<serde_json::Value>,
}

impl StacSearchParams {
    /// Create empty search params.
    pub fn new() -> Self {
        Self {
            bbox: None,
            datetime: None,
            collections: None,
            limit: None,
            query: None,
        }
    }

    /// Set the bounding box `[west, south, east, north]`.
    pub fn bbox(mut self, west: f64, south: f64, east: f64, north: f64) -> Self {
        self.bbox = Some(vec![west, south, east, north]);
        self
    }

    /// Set datetime or datetime range (e.g. `"2019-01-01/2019-12-31"`).
    pub fn datetime(mut self, dt: &str) -> Self {
        self.datetime = Some(dt.to_string());
        self
    }

    /// Set collection filter.
    pub fn collections(mut self, cols: &[&str]) -> Self {
        self.collections = Some(cols.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Set maximum items per page.
    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    /// Filter to scenes with `eo:cloud_cover` strictly below `ceiling`.
    pub fn cloud_cover_lt(mut self, ceiling: f64) -> Self {
        self.query = Some(serde_json::json!({
            "eo:cloud_cover": { "lt": ceiling }
        }));
        self
    }
}

impl Default for StacSearchParams {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A STAC Item Collection (GeoJSON FeatureCollection).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItemCollection {
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<StacItem>,

    /// Some catalogs report the total match count.
    #[serde(rename = "numberMatched", skip_serializing_if = "Option::is_none")]
    pub number_matched: Option<u64>,

    #[serde(rename = "numberReturned", skip_serializing_if = "Option::is_none")]
    pub number_returned: Option<u64>,
}

impl StacItemCollection {
    /// Number of items in this page.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A single STAC Item (GeoJSON Feature).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItem {
    #[serde(rename = "type")]
    pub type_: String,

    /// Unique item identifier.
    pub id: String,

    /// Geometry as raw JSON (we don't need to parse it).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<serde_json::Value>,

    /// Bounding box `[west, south, east, north]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    pub properties: StacItemProperties,

    pub assets: HashMap<String, StacAsset>,

    /// Collection this item belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl StacItem {
    /// Get an asset by key.
    pub fn asset(&self, key: &str) -> Option<&StacAsset> {
        self.assets.get(key)
    }
}

/// STAC Item properties.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItemProperties {
    /// ISO 8601 datetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    /// Cloud cover percentage (EO extension).
    #[serde(rename = "eo:cloud_cover", skip_serializing_if = "Option::is_none")]
    pub eo_cloud_cover: Option<f64>,

    /// Platform name (e.g., "sentinel-2a").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// All other properties we don't model explicitly.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A single STAC Asset (file reference).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacAsset {
    /// URL to the asset file.
    pub href: String,

    /// Media type (e.g., `"image/tiff; application=geotiff; profile=cloud-optimized"`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Roles: `["data"]`, `["thumbnail"]`, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "id": "S2B_MSIL2A_20240112T050159_R119_T44PLT_20240112T081756",
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[80.04, 12.63], [81.05, 12.63], [81.05, 13.63], [80.04, 13.63], [80.04, 12.63]]]
      },
      "bbox": [80.04, 12.63, 81.05, 13.63],
      "properties": {
        "datetime": "2024-01-12T05:01:59Z",
        "eo:cloud_cover": 3.8,
        "platform": "sentinel-2b",
        "proj:epsg": 32644
      },
      "assets": {
        "B04": {
          "href": "https://example.com/B04.tif",
          "type": "image/tiff; application=geotiff; profile=cloud-optimized",
          "title": "Band 4 - Red",
          "roles": ["data"]
        },
        "B08": {
          "href": "https://example.com/B08.tif",
          "type": "image/tiff; application=geotiff; profile=cloud-optimized",
          "title": "Band 8 - NIR",
          "roles": ["data"]
        },
        "B11": {
          "href": "https://example.com/B11.tif",
          "type": "image/tiff; application=geotiff; profile=cloud-optimized",
          "title": "Band 11 - SWIR (1.6)",
          "roles": ["data"]
        },
        "thumbnail": {
          "href": "https://example.com/thumb.png",
          "type": "image/png",
          "title": "Thumbnail",
          "roles": ["thumbnail"]
        }
      },
      "collection": "sentinel-2-l2a"
    }
  ],
  "numberMatched": 17,
  "numberReturned": 1
}"#;

    #[test]
    fn parse_item_collection() {
        let col: StacItemCollection = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(col.type_, "FeatureCollection");
        assert_eq!(col.len(), 1);
        assert_eq!(col.number_matched, Some(17));
        assert_eq!(col.number_returned, Some(1));
    }

    #[test]
    fn parse_item() {
        let col: StacItemCollection = serde_json::from_str(FIXTURE).unwrap();
        let item = &col.features[0];
        assert_eq!(item.id, "S2B_MSIL2A_20240112T050159_R119_T44PLT_20240112T081756");
        assert_eq!(item.collection.as_deref(), Some("sentinel-2-l2a"));
        assert!(item.geometry.is_some());
        assert_eq!(item.bbox.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn parse_properties() {
        let col: StacItemCollection = serde_json::from_str(FIXTURE).unwrap();
        let props = &col.features[0].properties;
        assert_eq!(props.datetime.as_deref(), Some("2024-01-12T05:01:59Z"));
        assert!((props.eo_cloud_cover.unwrap() - 3.8).abs() < f64::EPSILON);
        assert_eq!(props.platform.as_deref(), Some("sentinel-2b"));
        // Extra fields should be captured by flatten
        assert!(props.extra.contains_key("proj:epsg"));
    }

    #[test]
    fn asset_lookup() {
        let col: StacItemCollection = serde_json::from_str(FIXTURE).unwrap();
        let item = &col.features[0];

        assert!(item.asset("B04").is_some());
        assert!(item.asset("B08").is_some());
        assert!(item.asset("B11").is_some());
        assert!(item.asset("nonexistent").is_none());

        let red = item.asset("B04").unwrap();
        assert_eq!(red.href, "https://example.com/B04.tif");
        assert!(red.type_.as_ref().unwrap().contains("geotiff"));
        assert_eq!(red.roles.as_ref().unwrap(), &["data"]);
    }

    #[test]
    fn builder_serializes_correctly() {
        let params = StacSearchParams::new()
            .bbox(80.20, 12.90, 80.35, 13.15)
            .datetime("2019-01-01/2019-12-31")
            .collections(&["sentinel-2-l2a"])
            .cloud_cover_lt(10.0)
            .limit(5);

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["bbox"], serde_json::json!([80.20, 12.90, 80.35, 13.15]));
        assert_eq!(json["datetime"], "2019-01-01/2019-12-31");
        assert_eq!(json["collections"], serde_json::json!(["sentinel-2-l2a"]));
        assert_eq!(json["limit"], 5);
        assert_eq!(
            json["query"],
            serde_json::json!({"eo:cloud_cover": {"lt": 10.0}})
        );
    }

    #[test]
    fn empty_params_has_no_fields() {
        let params = StacSearchParams::new();
        let json = serde_json::to_value(&params).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.is_empty());
    }
}
