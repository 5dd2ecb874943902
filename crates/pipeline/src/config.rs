//! Analysis configuration
//!
//! One struct covers everything the near-identical dashboard variants
//! used to hard-code: region, time windows, cloud ceiling, working
//! resolution and thresholds. Each variant becomes a caller supplying a
//! different configuration.

use std::fmt;

use chrono::NaiveDate;

use landshift_analysis::ChangeThresholds;
use landshift_cloud::StacCatalog;
use landshift_core::raster::resample::Resampling;
use landshift_core::BoundingBox;

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Date ranges
// ---------------------------------------------------------------------------

/// An inclusive ISO date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, validating start <= end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PipelineError::Config(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The whole calendar year, Jan 1 through Dec 31.
    pub fn year(year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| PipelineError::Config(format!("invalid year {year}")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| PipelineError::Config(format!("invalid year {year}")))?;
        Ok(Self { start, end })
    }
}

impl fmt::Display for DateRange {
    /// STAC datetime interval form, e.g. `2019-01-01/2019-12-31`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Parameters for one change analysis.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Catalog to query.
    pub catalog: StacCatalog,
    /// Collection identifier (default `sentinel-2-l2a`).
    pub collection: String,
    /// Query region.
    pub bbox: BoundingBox,
    /// Earlier time window.
    pub before: DateRange,
    /// Later time window.
    pub after: DateRange,
    /// Cloud-cover ceiling in percent (default 10).
    pub max_cloud_cover: f64,
    /// Integer working-resolution factor applied to the 10 m bands
    /// (default 4, i.e. a 40 m working grid).
    pub downsample: usize,
    /// How the 10 m bands are reduced (default block averaging; the
    /// original scripts decimated). SWIR is always brought onto the
    /// resulting grid bilinearly.
    pub resampling: Resampling,
    /// Classification thresholds.
    pub thresholds: ChangeThresholds,
}

impl AnalysisConfig {
    /// Configuration with the defaults every dashboard variant shared.
    pub fn new(bbox: BoundingBox, before: DateRange, after: DateRange) -> Self {
        Self {
            catalog: StacCatalog::PlanetaryComputer,
            collection: "sentinel-2-l2a".to_string(),
            bbox,
            before,
            after,
            max_cloud_cover: 10.0,
            downsample: 4,
            resampling: Resampling::Average,
            thresholds: ChangeThresholds::default(),
        }
    }

    /// Validate the parts no constructor already checks.
    pub fn validate(&self) -> Result<()> {
        if self.downsample == 0 {
            return Err(PipelineError::Config(
                "downsample factor must be >= 1".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.max_cloud_cover) {
            return Err(PipelineError::Config(format!(
                "cloud cover ceiling {} outside [0, 100]",
                self.max_cloud_cover
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
