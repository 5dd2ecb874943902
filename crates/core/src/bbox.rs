//! Geographic bounding boxes and pixel-window mapping.
//!
//! A [`BoundingBox`] defines a query region in lon/lat degrees. It also
//! carries the linear coordinate→pixel mapping used for zone aggregation:
//! a sub-region's corners are interpolated against the overall query box
//! and the raster dimensions, floored and clamped to the raster bounds.

use crate::error::{Error, Result};

/// A geographic bounding box `[min_x, min_y, max_x, max_y]` (lon/lat).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// A rectangular pixel sub-window, end-exclusive on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl PixelWindow {
    /// Number of rows in the window.
    pub fn rows(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Number of columns in the window.
    pub fn cols(&self) -> usize {
        self.col_end - self.col_start
    }

    /// Whether the window covers zero pixels.
    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }
}

impl BoundingBox {
    /// Create a bounding box, validating that min < max on each axis.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        if !(min_x < max_x) || !(min_y < max_y) {
            return Err(Error::InvalidBBox {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Construct from a `[west, south, east, north]` slice.
    pub fn from_slice(coords: &[f64]) -> Result<Self> {
        if coords.len() != 4 {
            return Err(Error::Other(format!(
                "bounding box needs 4 coordinates, got {}",
                coords.len()
            )));
        }
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }

    /// As `[west, south, east, north]`, the STAC bbox ordering.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Width in degrees.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in degrees.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if two boxes intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Map a sub-region of this box into pixel indices of a raster that
    /// covers the whole box.
    ///
    /// Each corner coordinate is interpolated linearly:
    /// `pixel = (coord − min) / (max − min) × dim`, floored, then clamped
    /// to the raster bounds. The returned window is end-exclusive.
    ///
    /// This aggregates over the sub-region's bounding rectangle, not an
    /// exact geometry. Returns `None` when the clamped window is empty
    /// (sub-region entirely outside the box).
    pub fn pixel_window(
        &self,
        sub: &BoundingBox,
        rows: usize,
        cols: usize,
    ) -> Option<PixelWindow> {
        let col_of = |x: f64| ((x - self.min_x) / self.width() * cols as f64).floor();
        let row_of = |y: f64| ((y - self.min_y) / self.height() * rows as f64).floor();

        let clamp = |v: f64, dim: usize| -> usize {
            if v <= 0.0 {
                0
            } else if v >= dim as f64 {
                dim
            } else {
                v as usize
            }
        };

        let window = PixelWindow {
            row_start: clamp(row_of(sub.min_y), rows),
            row_end: clamp(row_of(sub.max_y), rows),
            col_start: clamp(col_of(sub.min_x), cols),
            col_end: clamp(col_of(sub.max_x), cols),
        };

        if window.is_empty() {
            None
        } else {
            Some(window)
        }
    }
}
