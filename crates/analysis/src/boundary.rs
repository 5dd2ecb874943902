//! Administrative boundary files
//!
//! Serde models for the GeoJSON FeatureCollections that carry ward and
//! zone polygons. Property schemas vary between city datasets, so name
//! and area lookups try several candidate keys and fall back to
//! `"unknown"` when none is present. Geometry stays as raw JSON; the
//! pipeline only ever needs each polygon's bounding box.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use landshift_core::{BoundingBox, Error, Result};

/// Candidate property keys for the ward name, in lookup order.
const WARD_NAME_KEYS: &[&str] = &["ward_name", "WARD_NAME", "Ward_Name", "name", "Name", "NAME"];

/// Candidate property keys for the zone name.
const ZONE_NAME_KEYS: &[&str] = &["zone_name", "Zone_Name", "zone", "ZONE", "Zone"];

/// Candidate property keys for the polygon area.
const AREA_KEYS: &[&str] = &["area", "Area", "AREA", "Shape_Area"];

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// A boundary polygon collection (GeoJSON FeatureCollection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryCollection {
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<BoundaryFeature>,
}

/// One administrative polygon (GeoJSON Feature).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryFeature {
    #[serde(rename = "type")]
    pub type_: String,

    /// Geometry as raw JSON; only the coordinate extents are consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<serde_json::Value>,

    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl BoundaryCollection {
    /// Parse a collection from GeoJSON text.
    pub fn from_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Other(format!("parsing boundary file: {e}")))
    }

    /// Read and parse a boundary file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl BoundaryFeature {
    /// Ward name, via candidate keys, `"unknown"` if absent.
    pub fn ward_name(&self) -> String {
        self.lookup_string(WARD_NAME_KEYS)
    }

    /// Zone name, via candidate keys, `"unknown"` if absent.
    pub fn zone_name(&self) -> String {
        self.lookup_string(ZONE_NAME_KEYS)
    }

    /// Polygon area as recorded in the properties, if any.
    pub fn area(&self) -> Option<f64> {
        AREA_KEYS
            .iter()
            .find_map(|key| self.properties.get(*key))
            .and_then(|v| v.as_f64())
    }

    /// Bounding box of the geometry, from the coordinate extents.
    ///
    /// Returns `None` for missing or degenerate geometry (fewer than two
    /// distinct positions per axis).
    pub fn bbox(&self) -> Option<BoundingBox> {
        let coords = self.geometry.as_ref()?.get("coordinates")?;

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        collect_extent(coords, &mut min_x, &mut min_y, &mut max_x, &mut max_y);

        BoundingBox::new(min_x, min_y, max_x, max_y).ok()
    }

    fn lookup_string(&self, keys: &[&str]) -> String {
        for key in keys {
            match self.properties.get(*key) {
                Some(serde_json::Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(serde_json::Value::Number(n)) => return n.to_string(),
                _ => continue,
            }
        }
        "unknown".to_string()
    }
}

/// Walk a GeoJSON coordinates array of any nesting depth, accumulating
/// the [x, y] extents.
fn collect_extent(
    value: &serde_json::Value,
    min_x: &mut f64,
    min_y: &mut f64,
    max_x: &mut f64,
    max_y: &mut f64,
) {
    let Some(array) = value.as_array() else {
        return;
    };

    // A position is an array whose first two elements are numbers
    if array.len() >= 2 {
        if let (Some(x), Some(y)) = (array[0].as_f64(), array[1].as_f64()) {
            *min_x = min_x.min(x);
            *min_y = min_y.min(y);
            *max_x = max_x.max(x);
            *max_y = max_y.max(y);
            return;
        }
    }

    for item in array {
        collect_extent(item, min_x, min_y, max_x, max_y);
    }
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
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[80.21, 12.95], [80.25, 12.95], [80.25, 13.00], [80.21, 13.00], [80.21, 12.95]]]
      },
      "properties": {
        "ward_name": "Adyar",
        "zone_name": "South",
        "area": 12.5
      }
    },
    {
      "type": "Feature",
      "geometry": {
        "type": "MultiPolygon",
        "coordinates": [[[[80.30, 13.05], [80.33, 13.05], [80.33, 13.10], [80.30, 13.10], [80.30, 13.05]]]]
      },
      "properties": {
        "Name": "Ward 47",
        "Shape_Area": 8.75
      }
    },
    {
      "type": "Feature",
      "geometry": null,
      "properties": {}
    }
  ]
}"#;

    #[test]
    fn parse_collection() {
        let col = BoundaryCollection::from_str(FIXTURE).unwrap();
        assert_eq!(col.type_, "FeatureCollection");
        assert_eq!(col.len(), 3);
    }

    #[test]
    fn name_lookup_with_fallback() {
        let col = BoundaryCollection::from_str(FIXTURE).unwrap();

        assert_eq!(col.features[0].ward_name(), "Adyar");
        assert_eq!(col.features[0].zone_name(), "South");

        // Second feature only has the capitalized "Name" variant
        assert_eq!(col.features[1].ward_name(), "Ward 47");
        assert_eq!(col.features[1].zone_name(), "unknown");

        // Empty properties fall back everywhere
        assert_eq!(col.features[2].ward_name(), "unknown");
        assert_eq!(col.features[2].zone_name(), "unknown");
    }

    #[test]
    fn area_lookup() {
        let col = BoundaryCollection::from_str(FIXTURE).unwrap();
        assert_eq!(col.features[0].area(), Some(12.5));
        assert_eq!(col.features[1].area(), Some(8.75));
        assert_eq!(col.features[2].area(), None);
    }

    #[test]
    fn bbox_from_polygon() {
        let col = BoundaryCollection::from_str(FIXTURE).unwrap();
        let bbox = col.features[0].bbox().unwrap();
        assert_eq!(bbox.min_x, 80.21);
        assert_eq!(bbox.min_y, 12.95);
        assert_eq!(bbox.max_x, 80.25);
        assert_eq!(bbox.max_y, 13.00);
    }

    #[test]
    fn bbox_from_multipolygon() {
        let col = BoundaryCollection::from_str(FIXTURE).unwrap();
        let bbox = col.features[1].bbox().unwrap();
        assert_eq!(bbox.min_x, 80.30);
        assert_eq!(bbox.max_y, 13.10);
    }

    #[test]
    fn missing_geometry_has_no_bbox() {
        let col = BoundaryCollection::from_str(FIXTURE).unwrap();
        assert!(col.features[2].bbox().is_none());
    }

    #[test]
    fn numeric_ward_names_are_stringified() {
        let feature: BoundaryFeature = serde_json::from_str(
            r#"{"type": "Feature", "properties": {"ward_name": 102}}"#,
        )
        .unwrap();
        assert_eq!(feature.ward_name(), "102");
    }
}
