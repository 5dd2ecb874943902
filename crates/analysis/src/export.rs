//! Output artifacts
//!
//! Two downloadable products per analysis: a tabular zone summary (CSV)
//! and the boundary collection with per-zone statistics injected into
//! each feature's properties (GeoJSON).

use std::io::Write;

use landshift_core::{Error, Result};

use crate::boundary::BoundaryCollection;
use crate::zonal::ZoneRecord;

/// Write the zone summary table as CSV.
///
/// Columns: ward, zone, area, loss_pct, gain_pct, growth_pct.
pub fn write_zone_summary<W: Write>(records: &[ZoneRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)
            .map_err(|e| Error::Other(format!("writing zone summary: {e}")))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render the zone summary as a CSV string.
pub fn zone_summary_csv(records: &[ZoneRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_zone_summary(records, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::Other(e.to_string()))
}

/// Annotate a boundary collection with per-zone statistics.
///
/// `records` must be in boundary-file order (as produced by
/// [`crate::zonal::zonal_change_stats`]); each feature gains
/// `loss_pct`, `gain_pct` and `growth_pct` properties. Geometry and
/// existing properties pass through untouched.
pub fn annotated_boundaries(
    boundaries: &BoundaryCollection,
    records: &[ZoneRecord],
) -> Result<serde_json::Value> {
    if boundaries.len() != records.len() {
        return Err(Error::Other(format!(
            "{} zone records for {} boundary features",
            records.len(),
            boundaries.len()
        )));
    }

    let features: Vec<serde_json::Value> = boundaries
        .features
        .iter()
        .zip(records)
        .map(|(feature, record)| {
            let mut properties = feature.properties.clone();
            properties.insert("loss_pct".into(), round2(record.loss_pct).into());
            properties.insert("gain_pct".into(), round2(record.gain_pct).into());
            properties.insert("growth_pct".into(), round2(record.growth_pct).into());

            serde_json::json!({
                "type": "Feature",
                "geometry": feature.geometry,
                "properties": properties,
            })
        })
        .collect();

    Ok(serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

/// Statistics are percentages; two decimals is what the dashboards show.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<ZoneRecord> {
        vec![
            ZoneRecord {
                ward: "Adyar".into(),
                zone: "South".into(),
                area: Some(12.5),
                loss_pct: 41.666,
                gain_pct: 3.2,
                growth_pct: 12.0,
            },
            ZoneRecord {
                ward: "unknown".into(),
                zone: "unknown".into(),
                area: None,
                loss_pct: 0.0,
                gain_pct: 0.0,
                growth_pct: 0.0,
            },
        ]
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = zone_summary_csv(&records()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "ward,zone,area,loss_pct,gain_pct,growth_pct"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("Adyar,South,12.5,"));
        // Missing area serializes as an empty field
        let second = lines.next().unwrap();
        assert!(second.starts_with("unknown,unknown,,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn annotation_injects_stats() {
        let boundaries = BoundaryCollection::from_str(
            r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]},
      "properties": {"ward_name": "Adyar"}
    },
    {"type": "Feature", "geometry": null, "properties": {}}
  ]
}"#,
        )
        .unwrap();

        let annotated = annotated_boundaries(&boundaries, &records()).unwrap();

        assert_eq!(annotated["type"], "FeatureCollection");
        let features = annotated["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let props = &features[0]["properties"];
        assert_eq!(props["ward_name"], "Adyar");
        assert_eq!(props["loss_pct"], 41.67);
        assert_eq!(props["gain_pct"], 3.2);
        assert_eq!(props["growth_pct"], 12.0);

        // Geometry passes through untouched
        assert_eq!(features[0]["geometry"]["type"], "Polygon");
    }

    #[test]
    fn annotation_rejects_length_mismatch() {
        let boundaries = BoundaryCollection::from_str(
            r#"{"type": "FeatureCollection", "features": []}"#,
        )
        .unwrap();
        assert!(annotated_boundaries(&boundaries, &records()).is_err());
    }
}
