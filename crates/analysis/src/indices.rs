//! Spectral indices
//!
//! Normalized-difference indices computed from pairs of aligned bands.
//! All indices operate on single-band rasters (one band per raster).

use ndarray::Array2;

use landshift_core::raster::Raster;
use landshift_core::{Error, Result};

/// Epsilon added to every denominator so that 0/0 pixels evaluate to 0
/// instead of dividing by zero. The value is shared by every index; do
/// not fold it into a per-pixel skip, the sign and magnitude of near-zero
/// sums must pass through unchanged.
pub const INDEX_EPSILON: f32 = 1e-10;

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Compute the normalized difference between two aligned bands:
///
/// `(band_a - band_b) / (band_a + band_b + ε)`
///
/// Operand order is part of the index definition; swapping flips the
/// sign convention. Results are nominally in [-1, 1] but are not
/// clamped (sensor noise and ε can push values slightly outside). NaN
/// cells in either input propagate to the output.
pub fn normalized_difference(band_a: &Raster<f32>, band_b: &Raster<f32>) -> Result<Raster<f32>> {
    check_dimensions(band_a, band_b)?;

    let (rows, cols) = band_a.shape();

    let data: Vec<f32> = band_a
        .data()
        .iter()
        .zip(band_b.data().iter())
        .map(|(&a, &b)| (a - b) / (a + b + INDEX_EPSILON))
        .collect();

    build_output(band_a, rows, cols, data)
}

// ---------------------------------------------------------------------------
// NDVI
// ---------------------------------------------------------------------------

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red + ε)`
///
/// Values range from -1 to 1:
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Bare soil: 0.1 to 0.2
/// - Water/clouds: -1.0 to 0.0
pub fn ndvi(nir: &Raster<f32>, red: &Raster<f32>) -> Result<Raster<f32>> {
    normalized_difference(nir, red)
}

// ---------------------------------------------------------------------------
// NDBI
// ---------------------------------------------------------------------------

/// Normalized Difference Built-up Index
///
/// `NDBI = (SWIR - NIR) / (SWIR + NIR + ε)`
///
/// Higher values indicate built-up and impervious surfaces; an increase
/// between two dates reads as urban growth.
pub fn ndbi(swir: &Raster<f32>, nir: &Raster<f32>) -> Result<Raster<f32>> {
    normalized_difference(swir, nir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_dimensions(a: &Raster<f32>, b: &Raster<f32>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

fn build_output(
    template: &Raster<f32>,
    rows: usize,
    cols: usize,
    data: Vec<f32>,
) -> Result<Raster<f32>> {
    let mut output = template.with_same_meta::<f32>(rows, cols);
    output.set_nodata(Some(f32::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_band(rows: usize, cols: usize, value: f32) -> Raster<f32> {
        Raster::filled(rows, cols, value)
    }

    #[test]
    fn test_normalized_difference_basic() {
        let a = make_band(5, 5, 0.8);
        let b = make_band(5, 5, 0.2);

        let result = normalized_difference(&a, &b).unwrap();
        let val = result.get(2, 2).unwrap();

        // (0.8 - 0.2) / (0.8 + 0.2) = 0.6
        assert_relative_eq!(val, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_identical_bands_give_zero() {
        // index(A, A) == 0 for all A, including zero bands: the epsilon
        // keeps the denominator away from zero so 0/0 never happens.
        for value in [0.0f32, 0.3, 1250.0] {
            let a = make_band(3, 3, value);
            let result = normalized_difference(&a, &a).unwrap();
            assert_eq!(result.get(1, 1).unwrap(), 0.0, "value {value}");
        }
    }

    #[test]
    fn test_operand_order_flips_sign() {
        // Swapping operands flips the sign convention, which is why the
        // NDVI/NDBI wrappers fix the argument order.
        let a = make_band(2, 2, 0.8);
        let b = make_band(2, 2, 0.2);

        let ab = normalized_difference(&a, &b).unwrap();
        let ba = normalized_difference(&b, &a).unwrap();

        assert!(ab.get(0, 0).unwrap() > 0.0);
        assert!(ba.get(0, 0).unwrap() < 0.0);
    }

    #[test]
    fn test_bounded_for_nonnegative_bands() {
        let mut a = Raster::new(10, 10);
        let mut b = Raster::new(10, 10);
        for row in 0..10 {
            for col in 0..10 {
                a.set(row, col, (row * 10 + col) as f32 * 0.01).unwrap();
                b.set(row, col, 0.5 - (row * 10 + col) as f32 * 0.003)
                    .unwrap();
            }
        }

        let result = normalized_difference(&a, &b).unwrap();
        for &v in result.data().iter() {
            assert!((-1.0..=1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_ndvi() {
        let nir = make_band(5, 5, 0.5);
        let red = make_band(5, 5, 0.1);

        let result = ndvi(&nir, &red).unwrap();
        let val = result.get(2, 2).unwrap();

        let expected = (0.5 - 0.1) / (0.5 + 0.1);
        assert_relative_eq!(val, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_ndvi_water() {
        // Water: Red > NIR → negative NDVI
        let nir = make_band(5, 5, 0.05);
        let red = make_band(5, 5, 0.15);

        let result = ndvi(&nir, &red).unwrap();
        assert!(result.get(2, 2).unwrap() < 0.0);
    }

    #[test]
    fn test_ndbi_builtup() {
        // Built-up surfaces: SWIR > NIR → positive NDBI
        let swir = make_band(5, 5, 0.4);
        let nir = make_band(5, 5, 0.25);

        let result = ndbi(&swir, &nir).unwrap();
        let expected = (0.4 - 0.25) / (0.4 + 0.25);
        assert_relative_eq!(result.get(2, 2).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_nan_propagates() {
        let mut nir = make_band(3, 3, 0.5);
        nir.set(1, 1, f32::NAN).unwrap();
        let red = make_band(3, 3, 0.1);

        let result = ndvi(&nir, &red).unwrap();
        assert!(result.get(1, 1).unwrap().is_nan());
        assert!(!result.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = make_band(5, 5, 1.0);
        let b = make_band(5, 10, 1.0);

        assert!(normalized_difference(&a, &b).is_err());
    }
}
