//! Zone-level change aggregation
//!
//! Computes loss/gain/growth percentages per administrative polygon by
//! mapping each polygon's bounding box into raster pixel space and
//! classifying the resulting sub-window.
//!
//! This is deliberately an approximation: statistics cover the polygon's
//! bounding rectangle, not its exact footprint, so pixels outside the
//! polygon but inside its box are included. The source dashboards have
//! always aggregated this way and the published figures depend on it.

use ndarray::s;
use serde::Serialize;

use landshift_core::raster::Raster;
use landshift_core::BoundingBox;

use crate::boundary::BoundaryCollection;
use crate::change::{percentages_of_view, ChangeThresholds};

/// Per-zone change statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneRecord {
    /// Ward name ("unknown" when the boundary file carries none).
    pub ward: String,
    /// Zone name ("unknown" when absent).
    pub zone: String,
    /// Area as recorded in the boundary file, if any.
    pub area: Option<f64>,
    /// % of pixels with vegetation change < -T_veg.
    pub loss_pct: f64,
    /// % of pixels with vegetation change > T_veg.
    pub gain_pct: f64,
    /// % of pixels with urban change > T_urban.
    pub growth_pct: f64,
}

/// Aggregate change statistics per boundary polygon.
///
/// Each polygon's bounding box is interpolated into pixel indices
/// against `query_bbox` and the raster shape, clamped to raster bounds,
/// and the same percentage classification as the overall statistics is
/// applied to the sub-window. Zones that fall entirely outside the query
/// region report zeros. Records come back in boundary-file order.
pub fn zonal_change_stats(
    vegetation_change: &Raster<f32>,
    urban_change: Option<&Raster<f32>>,
    query_bbox: &BoundingBox,
    boundaries: &BoundaryCollection,
    thresholds: &ChangeThresholds,
) -> Vec<ZoneRecord> {
    boundaries
        .features
        .iter()
        .map(|feature| {
            let zone_bbox = feature.bbox();

            let (loss_pct, gain_pct) = zone_bbox
                .and_then(|zb| window_percentages(vegetation_change, query_bbox, &zb, thresholds.vegetation))
                .map(|p| (p.loss, p.gain))
                .unwrap_or((0.0, 0.0));

            let growth_pct = match (urban_change, zone_bbox) {
                (Some(urban), Some(zb)) => {
                    window_percentages(urban, query_bbox, &zb, thresholds.urban)
                        .map(|p| p.gain)
                        .unwrap_or(0.0)
                }
                _ => 0.0,
            };

            ZoneRecord {
                ward: feature.ward_name(),
                zone: feature.zone_name(),
                area: feature.area(),
                loss_pct,
                gain_pct,
                growth_pct,
            }
        })
        .collect()
}

fn window_percentages(
    raster: &Raster<f32>,
    query_bbox: &BoundingBox,
    zone_bbox: &BoundingBox,
    threshold: f32,
) -> Option<crate::change::CategoryPercentages> {
    let (rows, cols) = raster.shape();
    let w = query_bbox.pixel_window(zone_bbox, rows, cols)?;

    let view = raster
        .data()
        .slice(s![w.row_start..w.row_end, w.col_start..w.col_end]);
    Some(percentages_of_view(view, threshold))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn boundary(json: &str) -> BoundaryCollection {
        BoundaryCollection::from_str(json).unwrap()
    }

    /// A collection with one square ward covering the given bbox.
    fn one_ward(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundaryCollection {
        boundary(&format!(
            r#"{{
  "type": "FeatureCollection",
  "features": [
    {{
      "type": "Feature",
      "geometry": {{
        "type": "Polygon",
        "coordinates": [[[{min_x}, {min_y}], [{max_x}, {min_y}], [{max_x}, {max_y}], [{min_x}, {max_y}], [{min_x}, {min_y}]]]
      }},
      "properties": {{"ward_name": "Test Ward"}}
    }}
  ]
}}"#
        ))
    }

    #[test]
    fn zone_window_stats_cover_quarter() {
        // Raster (100,100) over [0,0,1,1]; loss everywhere in the lower
        // left quarter (rows/cols 0..50 under the direct mapping), zero
        // elsewhere.
        let mut change: Raster<f32> = Raster::new(100, 100);
        for row in 0..50 {
            for col in 0..50 {
                change.set(row, col, -0.6).unwrap();
            }
        }

        let query = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let zones = one_ward(0.0, 0.0, 0.5, 0.5);

        let records = zonal_change_stats(
            &change,
            None,
            &query,
            &zones,
            &ChangeThresholds::default(),
        );

        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.ward, "Test Ward");
        // The zone's window is exactly the loss quarter
        assert_relative_eq!(rec.loss_pct, 100.0);
        assert_relative_eq!(rec.gain_pct, 0.0);
    }

    #[test]
    fn zone_outside_query_reports_zeros() {
        let change: Raster<f32> = Raster::filled(10, 10, -0.9);
        let query = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let zones = one_ward(5.0, 5.0, 6.0, 6.0);

        let records =
            zonal_change_stats(&change, None, &query, &zones, &ChangeThresholds::default());
        assert_relative_eq!(records[0].loss_pct, 0.0);
        assert_relative_eq!(records[0].gain_pct, 0.0);
    }

    #[test]
    fn growth_uses_urban_raster() {
        let veg: Raster<f32> = Raster::new(10, 10);
        let urban: Raster<f32> = Raster::filled(10, 10, 0.5);

        let query = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let zones = one_ward(0.0, 0.0, 1.0, 1.0);

        let records = zonal_change_stats(
            &veg,
            Some(&urban),
            &query,
            &zones,
            &ChangeThresholds::default(),
        );

        assert_relative_eq!(records[0].growth_pct, 100.0);
        assert_relative_eq!(records[0].loss_pct, 0.0);
        assert_relative_eq!(records[0].gain_pct, 0.0);
    }

    #[test]
    fn records_follow_boundary_order() {
        let change: Raster<f32> = Raster::new(10, 10);
        let query = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();

        let zones = boundary(
            r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "geometry": null, "properties": {"ward_name": "B"}},
    {"type": "Feature", "geometry": null, "properties": {"ward_name": "A"}}
  ]
}"#,
        );

        let records =
            zonal_change_stats(&change, None, &query, &zones, &ChangeThresholds::default());
        assert_eq!(records[0].ward, "B");
        assert_eq!(records[1].ward, "A");
    }
}
