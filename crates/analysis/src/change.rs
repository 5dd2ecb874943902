//! Temporal change detection
//!
//! Differences two index rasters captured at different times and
//! classifies the change against loss/gain thresholds.

use landshift_core::raster::Raster;
use landshift_core::{Error, Result};
use ndarray::ArrayView2;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Classification thresholds for index change.
///
/// A pixel counts as vegetation loss when NDVI change < -vegetation,
/// as gain when change > vegetation, and as urban growth when NDBI
/// change > urban.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeThresholds {
    pub vegetation: f32,
    pub urban: f32,
}

impl ChangeThresholds {
    /// Tunable range accepted from callers.
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 0.4;

    /// Create thresholds, validating both into `[0.1, 0.4]`.
    pub fn new(vegetation: f32, urban: f32) -> Result<Self> {
        for (name, value) in [("vegetation", vegetation), ("urban", urban)] {
            if !(Self::MIN..=Self::MAX).contains(&value) {
                return Err(Error::InvalidParameter {
                    name: "threshold",
                    value: format!("{name}={value}"),
                    reason: format!("must be in [{}, {}]", Self::MIN, Self::MAX),
                });
            }
        }
        Ok(Self { vegetation, urban })
    }
}

impl Default for ChangeThresholds {
    fn default() -> Self {
        Self {
            vegetation: 0.2,
            urban: 0.2,
        }
    }
}

// ---------------------------------------------------------------------------
// Change raster
// ---------------------------------------------------------------------------

/// Compute `after - before`, elementwise.
///
/// Independently resampled rasters can differ by a pixel in each
/// dimension; both inputs are first cropped to the top-left submatrix of
/// the common minimum shape. Any other alignment policy changes results.
/// The output shape is `(min(rows), min(cols))`.
pub fn change_raster(before: &Raster<f32>, after: &Raster<f32>) -> Result<Raster<f32>> {
    let rows = before.rows().min(after.rows());
    let cols = before.cols().min(after.cols());

    let before = before.crop(rows, cols)?;
    let after = after.crop(rows, cols)?;

    let mut output = before.with_same_meta::<f32>(rows, cols);
    output.set_nodata(Some(f32::NAN));
    *output.data_mut() = after.data() - before.data();

    Ok(output)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Percentages of pixels falling in each change category.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryPercentages {
    /// change < -threshold
    pub loss: f64,
    /// change > threshold
    pub gain: f64,
    /// -threshold <= change <= threshold
    pub stable: f64,
}

/// Classify a change raster against a symmetric threshold.
///
/// Percentages are `matching / total * 100` with total = every pixel in
/// the raster; an empty raster yields all zeros rather than NaN. NaN
/// pixels match no category (they still count toward the total), the
/// same way masked comparisons behave in the source data.
pub fn classify_percentages(change: &Raster<f32>, threshold: f32) -> CategoryPercentages {
    percentages_of_view(change.view(), threshold)
}

/// Classification over an arbitrary sub-window view (used for zone
/// aggregation).
pub(crate) fn percentages_of_view(view: ArrayView2<'_, f32>, threshold: f32) -> CategoryPercentages {
    let total = view.len();
    if total == 0 {
        return CategoryPercentages::default();
    }

    let mut loss = 0usize;
    let mut gain = 0usize;
    let mut stable = 0usize;

    for &v in view.iter() {
        if v < -threshold {
            loss += 1;
        } else if v > threshold {
            gain += 1;
        } else if v >= -threshold {
            // The upper bound already failed, so this is the stable band;
            // NaN fails every comparison and lands in no bucket.
            stable += 1;
        }
    }

    let pct = |n: usize| n as f64 / total as f64 * 100.0;
    CategoryPercentages {
        loss: pct(loss),
        gain: pct(gain),
        stable: pct(stable),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
