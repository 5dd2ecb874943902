//! Resampling primitives for bringing bands onto a common pixel grid.
//!
//! Sentinel-2 bands come at different native resolutions (10 m for
//! red/NIR, 20 m for SWIR). The change pipeline reads everything at a
//! reduced working resolution: same-resolution bands are decimated or
//! block-averaged by an integer factor, and the coarser SWIR band is
//! bilinearly resampled to the exact output shape of the finer bands.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster};

/// How a band is brought to the working resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    /// Keep every k-th pixel (stride subsampling).
    Decimate,
    /// Average each k x k block.
    Average,
}

fn check_factor(factor: usize) -> Result<()> {
    if factor == 0 {
        return Err(Error::InvalidParameter {
            name: "factor",
            value: factor.to_string(),
            reason: "resampling factor must be >= 1".to_string(),
        });
    }
    Ok(())
}

/// Output shape of an integer-factor downsample (partial edge blocks kept).
fn reduced(dim: usize, factor: usize) -> usize {
    (dim + factor - 1) / factor
}

/// Keep every `factor`-th pixel, starting at (0, 0).
pub fn decimate(input: &Raster<f32>, factor: usize) -> Result<Raster<f32>> {
    check_factor(factor)?;

    let (rows, cols) = input.shape();
    let out_rows = reduced(rows, factor);
    let out_cols = reduced(cols, factor);

    let mut output: Raster<f32> = input.with_same_meta(out_rows, out_cols);
    output.set_transform(input.transform().scaled(factor));
    output.set_nodata(input.nodata());

    for row in 0..out_rows {
        for col in 0..out_cols {
            let v = unsafe { input.get_unchecked(row * factor, col * factor) };
            output.set(row, col, v)?;
        }
    }

    Ok(output)
}

/// Average each `factor` x `factor` block. Partial blocks at the right and
/// bottom edges average over the pixels available. NaN cells are excluded
/// from the mean; an all-NaN block stays NaN.
pub fn downsample_mean(input: &Raster<f32>, factor: usize) -> Result<Raster<f32>> {
    check_factor(factor)?;

    let (rows, cols) = input.shape();
    let out_rows = reduced(rows, factor);
    let out_cols = reduced(cols, factor);

    let mut output: Raster<f32> = input.with_same_meta(out_rows, out_cols);
    output.set_transform(input.transform().scaled(factor));
    output.set_nodata(Some(f32::NAN));

    for row in 0..out_rows {
        let r0 = row * factor;
        let r1 = (r0 + factor).min(rows);
        for col in 0..out_cols {
            let c0 = col * factor;
            let c1 = (c0 + factor).min(cols);

            let mut sum = 0.0f64;
            let mut count = 0usize;
            for r in r0..r1 {
                for c in c0..c1 {
                    let v = unsafe { input.get_unchecked(r, c) };
                    if !v.is_nan() {
                        sum += v as f64;
                        count += 1;
                    }
                }
            }

            let mean = if count > 0 {
                (sum / count as f64) as f32
            } else {
                f32::NAN
            };
            output.set(row, col, mean)?;
        }
    }

    Ok(output)
}

/// Bilinearly resample to an explicit output shape.
///
/// Output pixel centers are mapped to fractional input coordinates and
/// interpolated from the four surrounding cells, clamped at the edges.
pub fn resize_bilinear(
    input: &Raster<f32>,
    out_rows: usize,
    out_cols: usize,
) -> Result<Raster<f32>> {
    let (rows, cols) = input.shape();
    if rows == 0 || cols == 0 || out_rows == 0 || out_cols == 0 {
        return Err(Error::InvalidDimensions {
            width: out_cols,
            height: out_rows,
        });
    }

    let row_scale = rows as f64 / out_rows as f64;
    let col_scale = cols as f64 / out_cols as f64;

    let mut output: Raster<f32> = input.with_same_meta(out_rows, out_cols);
    let gt = input.transform();
    output.set_transform(GeoTransform::new(
        gt.origin_x,
        gt.origin_y,
        gt.pixel_width * col_scale,
        gt.pixel_height * row_scale,
    ));
    output.set_nodata(Some(f32::NAN));

    for row in 0..out_rows {
        let src_row = ((row as f64 + 0.5) * row_scale - 0.5).max(0.0);
        let r1 = (src_row.floor() as usize).min(rows - 1);
        let r2 = (r1 + 1).min(rows - 1);
        let dy = (src_row - r1 as f64) as f32;

        for col in 0..out_cols {
            let src_col = ((col as f64 + 0.5) * col_scale - 0.5).max(0.0);
            let c1 = (src_col.floor() as usize).min(cols - 1);
            let c2 = (c1 + 1).min(cols - 1);
            let dx = (src_col - c1 as f64) as f32;

            let v11 = unsafe { input.get_unchecked(r1, c1) };
            let v12 = unsafe { input.get_unchecked(r1, c2) };
            let v21 = unsafe { input.get_unchecked(r2, c1) };
            let v22 = unsafe { input.get_unchecked(r2, c2) };

            let top = v11 * (1.0 - dx) + v12 * dx;
            let bottom = v21 * (1.0 - dx) + v22 * dx;
            output.set(row, col, top * (1.0 - dy) + bottom * dy)?;
        }
    }

    Ok(output)
}
