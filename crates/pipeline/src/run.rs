//! The change-detection pipeline.
//!
//! One run is: per time point, (cache get-or-compute) select a scene,
//! read red/NIR at the working resolution and SWIR onto the same grid,
//! compute NDVI and NDBI; then difference the two time points, classify
//! against the thresholds, and aggregate per zone when boundaries are
//! supplied. Band reads are sequential — the computation is synchronous
//! per request, and memoization plus single-flight dedup is the only
//! cross-request machinery.

use std::sync::Arc;

use tracing::{debug, info};

use landshift_analysis::boundary::BoundaryCollection;
use landshift_analysis::change::{change_raster, classify_percentages, CategoryPercentages};
use landshift_analysis::indices::{ndbi, ndvi};
use landshift_analysis::zonal::{zonal_change_stats, ZoneRecord};
use landshift_cloud::band_reader::{BandReader, BandReaderOptions, ReadTarget};
use landshift_cloud::scene::{select_scene, Band, Scene};
use landshift_cloud::stac_client::{StacClient, StacClientOptions};
use landshift_core::raster::Raster;

use crate::cache::{timepoint_key, CacheKey, IndexCache, MemoryCache};
use crate::config::{AnalysisConfig, DateRange};
use crate::error::Result;
use crate::single_flight::SingleFlight;

/// Bands every analysis reads.
const BANDS: [Band; 3] = [Band::Red, Band::Nir, Band::Swir];

/// Default number of cached timepoints.
const DEFAULT_CACHE_CAPACITY: usize = 32;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Identification of the scene behind one time point.
#[derive(Debug, Clone)]
pub struct SceneMeta {
    pub id: String,
    pub datetime: Option<String>,
    pub cloud_cover: Option<f64>,
}

impl From<&Scene> for SceneMeta {
    fn from(scene: &Scene) -> Self {
        Self {
            id: scene.id.clone(),
            datetime: scene.datetime.clone(),
            cloud_cover: scene.cloud_cover,
        }
    }
}

/// Index rasters for one (region, date range) timepoint. Cached and
/// shared; never mutated after construction.
#[derive(Debug)]
pub struct TimepointIndices {
    pub scene: SceneMeta,
    pub ndvi: Raster<f32>,
    pub ndbi: Raster<f32>,
}

/// Everything one analysis produces.
#[derive(Debug)]
pub struct ChangeAnalysis {
    pub before: SceneMeta,
    pub after: SceneMeta,
    /// NDVI(after) − NDVI(before), cropped to the common shape.
    pub vegetation_change: Raster<f32>,
    /// NDBI(after) − NDBI(before), cropped to the common shape.
    pub urban_change: Raster<f32>,
    /// Overall loss/gain/stable percentages of the vegetation change.
    pub vegetation: CategoryPercentages,
    /// Overall % of pixels with urban change above the threshold.
    pub urban_growth_pct: f64,
    /// Per-zone statistics, empty when no boundaries were supplied.
    pub zones: Vec<ZoneRecord>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The memoized change-detection pipeline.
///
/// Holds the catalog client, the band reader and the cache; construct
/// once per process and reuse across requests.
pub struct Pipeline {
    stac: StacClient,
    bands: BandReader,
    cache: Arc<dyn IndexCache<TimepointIndices>>,
    flights: SingleFlight<CacheKey>,
}

impl Pipeline {
    /// Pipeline with an in-memory cache of default capacity.
    pub fn new(catalog: landshift_cloud::StacCatalog) -> Result<Self> {
        Self::with_cache(catalog, Arc::new(MemoryCache::new(DEFAULT_CACHE_CAPACITY)))
    }

    /// Pipeline with an injected cache implementation.
    pub fn with_cache(
        catalog: landshift_cloud::StacCatalog,
        cache: Arc<dyn IndexCache<TimepointIndices>>,
    ) -> Result<Self> {
        let stac = StacClient::new(catalog, StacClientOptions::default())?;
        let bands = BandReader::new(BandReaderOptions::default())?;
        Ok(Self {
            stac,
            bands,
            cache,
            flights: SingleFlight::new(),
        })
    }

    /// Run a full change analysis.
    pub async fn run(&self, config: &AnalysisConfig) -> Result<ChangeAnalysis> {
        self.run_with_zones(config, None).await
    }

    /// Run a full change analysis with ward-level aggregation.
    pub async fn run_with_zones(
        &self,
        config: &AnalysisConfig,
        boundaries: Option<&BoundaryCollection>,
    ) -> Result<ChangeAnalysis> {
        config.validate()?;

        let before = self.indices_for(config, &config.before).await?;
        let after = self.indices_for(config, &config.after).await?;

        let vegetation_change = change_raster(&before.ndvi, &after.ndvi)?;
        let urban_change = change_raster(&before.ndbi, &after.ndbi)?;

        let vegetation =
            classify_percentages(&vegetation_change, config.thresholds.vegetation);
        let urban_growth_pct =
            classify_percentages(&urban_change, config.thresholds.urban).gain;

        let zones = match boundaries {
            Some(boundaries) => zonal_change_stats(
                &vegetation_change,
                Some(&urban_change),
                &config.bbox,
                boundaries,
                &config.thresholds,
            ),
            None => Vec::new(),
        };

        info!(
            before = %before.scene.id,
            after = %after.scene.id,
            loss_pct = vegetation.loss,
            gain_pct = vegetation.gain,
            growth_pct = urban_growth_pct,
            "change analysis complete"
        );

        Ok(ChangeAnalysis {
            before: before.scene.clone(),
            after: after.scene.clone(),
            vegetation_change,
            urban_change,
            vegetation,
            urban_growth_pct,
            zones,
        })
    }

    /// Get-or-compute the index rasters for one timepoint.
    ///
    /// A cache hit returns instantly without revalidation. On a miss the
    /// per-key flight lock serializes concurrent identical requests so
    /// the catalog and band assets are only fetched once.
    pub async fn indices_for(
        &self,
        config: &AnalysisConfig,
        range: &DateRange,
    ) -> Result<Arc<TimepointIndices>> {
        let key = timepoint_key(config, range);

        if let Some(hit) = self.cache.get(&key) {
            debug!(%range, "timepoint cache hit");
            return Ok(hit);
        }

        let _guard = self.flights.acquire(key).await;
        if let Some(hit) = self.cache.get(&key) {
            debug!(%range, "timepoint computed by concurrent request");
            return Ok(hit);
        }

        let computed = Arc::new(self.compute_indices(config, range).await?);
        self.cache.put(key, computed.clone());
        Ok(computed)
    }

    /// The uncached per-timepoint computation: search → sign → band
    /// reads (sequential) → index arithmetic.
    async fn compute_indices(
        &self,
        config: &AnalysisConfig,
        range: &DateRange,
    ) -> Result<TimepointIndices> {
        let datetime = range.to_string();
        let scene = select_scene(
            &self.stac,
            &config.collection,
            &config.bbox,
            &datetime,
            config.max_cloud_cover,
            &BANDS,
        )
        .await?;

        // The 10 m bands define the working grid.
        let target = ReadTarget::Factor {
            method: config.resampling,
            factor: config.downsample,
        };
        let red = self.bands.read_band(&scene, Band::Red, target).await?;
        let nir = self.bands.read_band(&scene, Band::Nir, target).await?;

        // SWIR is 20 m native; bilinear onto the exact NIR shape keeps
        // every band of the scene grid-aligned.
        let (rows, cols) = nir.shape();
        let swir = self
            .bands
            .read_band(&scene, Band::Swir, ReadTarget::Shape { rows, cols })
            .await?;

        let ndvi = ndvi(&nir, &red)?;
        let ndbi = ndbi(&swir, &nir)?;

        Ok(TimepointIndices {
            scene: SceneMeta::from(&scene),
            ndvi,
            ndbi,
        })
    }
}
