//! LandShift CLI - Sentinel-2 land-change analysis

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use landshift_analysis::boundary::BoundaryCollection;
use landshift_analysis::change::ChangeThresholds;
use landshift_analysis::export::{annotated_boundaries, write_zone_summary};
use landshift_cloud::stac_client::{StacCatalog, StacClient, StacClientOptions};
use landshift_cloud::stac_models::StacSearchParams;
use landshift_core::raster::resample::Resampling;
use landshift_core::BoundingBox;
use landshift_pipeline::{AnalysisConfig, DateRange, PipelineBlocking};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "landshift")]
#[command(author, version, about = "Sentinel-2 land-change analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a change analysis between two years
    Analyze {
        /// City preset (chennai, bengaluru, hyderabad, mumbai, delhi, pune)
        #[arg(long, conflicts_with = "bbox")]
        city: Option<String>,

        /// Query region as "west,south,east,north" (lon/lat degrees)
        #[arg(long)]
        bbox: Option<String>,

        /// Earlier year
        #[arg(long, default_value = "2019")]
        before_year: i32,

        /// Later year
        #[arg(long, default_value = "2024")]
        after_year: i32,

        /// Cloud-cover ceiling in percent
        #[arg(long, default_value = "10")]
        max_cloud: f64,

        /// Vegetation change threshold (0.1 to 0.4)
        #[arg(long, default_value = "0.2")]
        veg_threshold: f32,

        /// Urban change threshold (0.1 to 0.4)
        #[arg(long, default_value = "0.2")]
        urban_threshold: f32,

        /// Working-resolution factor for the 10 m bands
        #[arg(long, default_value = "4")]
        downsample: usize,

        /// Reduction method for the 10 m bands: average or decimate
        #[arg(long, default_value = "average")]
        resampling: String,

        /// STAC catalog: pc, es, or a custom URL
        #[arg(long, default_value = "pc")]
        catalog: String,

        /// Ward boundary GeoJSON for zone-level statistics
        #[arg(long)]
        boundaries: Option<PathBuf>,

        /// Write the zone summary table as CSV
        #[arg(long)]
        out_csv: Option<PathBuf>,

        /// Write the annotated boundaries as GeoJSON
        #[arg(long)]
        out_geojson: Option<PathBuf>,
    },
    /// List candidate scenes for a region and date interval
    Scenes {
        /// City preset (chennai, bengaluru, hyderabad, mumbai, delhi, pune)
        #[arg(long, conflicts_with = "bbox")]
        city: Option<String>,

        /// Query region as "west,south,east,north" (lon/lat degrees)
        #[arg(long)]
        bbox: Option<String>,

        /// Year to search
        #[arg(long, default_value = "2024")]
        year: i32,

        /// Cloud-cover ceiling in percent
        #[arg(long, default_value = "10")]
        max_cloud: f64,

        /// Maximum scenes to list
        #[arg(long, default_value = "10")]
        limit: u32,

        /// STAC catalog: pc, es, or a custom URL
        #[arg(long, default_value = "pc")]
        catalog: String,
    },
}

// ─── City presets ───────────────────────────────────────────────────────

/// Bounding boxes the dashboard variants shipped with.
fn city_bbox(name: &str) -> Option<[f64; 4]> {
    match name.to_lowercase().as_str() {
        "chennai" => Some([80.20, 12.90, 80.35, 13.15]),
        "bengaluru" | "bangalore" => Some([77.45, 12.85, 77.75, 13.10]),
        "hyderabad" => Some([78.35, 17.30, 78.60, 17.55]),
        "mumbai" => Some([72.75, 18.90, 73.00, 19.20]),
        "delhi" => Some([77.00, 28.40, 77.35, 28.75]),
        "pune" => Some([73.75, 18.45, 73.95, 18.65]),
        _ => None,
    }
}

fn resolve_region(city: Option<&str>, bbox: Option<&str>) -> Result<BoundingBox> {
    let coords = match (city, bbox) {
        (Some(city), _) => city_bbox(city)
            .with_context(|| format!("unknown city preset '{city}'"))?,
        (None, Some(bbox)) => parse_bbox(bbox)?,
        (None, None) => bail!("either --city or --bbox is required"),
    };
    BoundingBox::from_slice(&coords).context("invalid bounding box")
}

fn parse_resampling(text: &str) -> Result<Resampling> {
    match text.to_lowercase().as_str() {
        "average" | "mean" => Ok(Resampling::Average),
        "decimate" | "stride" => Ok(Resampling::Decimate),
        other => bail!("unknown resampling method '{other}' (use average or decimate)"),
    }
}

fn parse_bbox(text: &str) -> Result<[f64; 4]> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("cannot parse bbox '{text}'"))?;
    if parts.len() != 4 {
        bail!("bbox needs 4 comma-separated values, got {}", parts.len());
    }
    Ok([parts[0], parts[1], parts[2], parts[3]])
}

// ─── Entry point ────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting tracing subscriber")?;

    match cli.command {
        Commands::Analyze {
            city,
            bbox,
            before_year,
            after_year,
            max_cloud,
            veg_threshold,
            urban_threshold,
            downsample,
            resampling,
            catalog,
            boundaries,
            out_csv,
            out_geojson,
        } => run_analyze(AnalyzeArgs {
            region: resolve_region(city.as_deref(), bbox.as_deref())?,
            before_year,
            after_year,
            max_cloud,
            veg_threshold,
            urban_threshold,
            downsample,
            resampling: parse_resampling(&resampling)?,
            catalog,
            boundaries,
            out_csv,
            out_geojson,
        }),
        Commands::Scenes {
            city,
            bbox,
            year,
            max_cloud,
            limit,
            catalog,
        } => run_scenes(
            resolve_region(city.as_deref(), bbox.as_deref())?,
            year,
            max_cloud,
            limit,
            &catalog,
        ),
    }
}

// ─── Analyze ────────────────────────────────────────────────────────────

struct AnalyzeArgs {
    region: BoundingBox,
    before_year: i32,
    after_year: i32,
    max_cloud: f64,
    veg_threshold: f32,
    urban_threshold: f32,
    downsample: usize,
    resampling: Resampling,
    catalog: String,
    boundaries: Option<PathBuf>,
    out_csv: Option<PathBuf>,
    out_geojson: Option<PathBuf>,
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let thresholds = ChangeThresholds::new(args.veg_threshold, args.urban_threshold)
        .context("invalid thresholds")?;

    let mut config = AnalysisConfig::new(
        args.region,
        DateRange::year(args.before_year)?,
        DateRange::year(args.after_year)?,
    );
    config.catalog = StacCatalog::from_str_or_url(&args.catalog);
    config.max_cloud_cover = args.max_cloud;
    config.downsample = args.downsample;
    config.resampling = args.resampling;
    config.thresholds = thresholds;

    let boundaries = args
        .boundaries
        .as_ref()
        .map(|path| {
            BoundaryCollection::from_path(path)
                .with_context(|| format!("loading boundaries from {}", path.display()))
        })
        .transpose()?;

    if let Some(ref b) = boundaries {
        info!(zones = b.len(), "loaded boundary file");
    }

    let pipeline = PipelineBlocking::new(config.catalog.clone())
        .context("constructing pipeline")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!(
        "Analyzing {} → {} (first run downloads imagery; results are cached)",
        args.before_year, args.after_year
    ));

    let start = Instant::now();
    let result = pipeline.run_with_zones(&config, boundaries.as_ref());
    spinner.finish_and_clear();
    let analysis = result.context("change analysis failed")?;

    println!(
        "Scenes: {} ({}, cc {:.1}%) → {} ({}, cc {:.1}%)",
        analysis.before.id,
        analysis.before.datetime.as_deref().unwrap_or("-"),
        analysis.before.cloud_cover.unwrap_or(f64::NAN),
        analysis.after.id,
        analysis.after.datetime.as_deref().unwrap_or("-"),
        analysis.after.cloud_cover.unwrap_or(f64::NAN),
    );
    println!(
        "Grid: {}x{} pixels over [{:.2}, {:.2}, {:.2}, {:.2}]",
        analysis.vegetation_change.rows(),
        analysis.vegetation_change.cols(),
        args.region.min_x,
        args.region.min_y,
        args.region.max_x,
        args.region.max_y,
    );
    println!();
    println!("Vegetation loss:   {:6.2} %", analysis.vegetation.loss);
    println!("Vegetation gain:   {:6.2} %", analysis.vegetation.gain);
    println!("No change:         {:6.2} %", analysis.vegetation.stable);
    println!("Urban growth:      {:6.2} %", analysis.urban_growth_pct);

    if !analysis.zones.is_empty() {
        println!();
        println!(
            "{:<28} {:<12} {:>8} {:>8} {:>8}",
            "Ward", "Zone", "Loss %", "Gain %", "Growth %"
        );
        for zone in &analysis.zones {
            println!(
                "{:<28} {:<12} {:>8.2} {:>8.2} {:>8.2}",
                zone.ward, zone.zone, zone.loss_pct, zone.gain_pct, zone.growth_pct
            );
        }
    }

    if let Some(path) = args.out_csv {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_zone_summary(&analysis.zones, file).context("writing zone summary")?;
        info!(path = %path.display(), "wrote zone summary CSV");
    }

    if let Some(path) = args.out_geojson {
        let boundaries = boundaries
            .as_ref()
            .context("--out-geojson requires --boundaries")?;
        let annotated = annotated_boundaries(boundaries, &analysis.zones)
            .context("annotating boundaries")?;
        let text = serde_json::to_string_pretty(&annotated)?;
        std::fs::write(&path, text)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote annotated boundaries");
    }

    info!(elapsed = ?start.elapsed(), "done");
    Ok(())
}

// ─── Scenes ─────────────────────────────────────────────────────────────

fn run_scenes(
    region: BoundingBox,
    year: i32,
    max_cloud: f64,
    limit: u32,
    catalog: &str,
) -> Result<()> {
    let catalog = StacCatalog::from_str_or_url(catalog);
    let client = StacClient::new(catalog, StacClientOptions::default())
        .context("constructing STAC client")?;

    let range = DateRange::year(year)?;
    let params = StacSearchParams::new()
        .bbox(region.min_x, region.min_y, region.max_x, region.max_y)
        .datetime(&range.to_string())
        .collections(&["sentinel-2-l2a"])
        .cloud_cover_lt(max_cloud)
        .limit(limit);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    let results = rt
        .block_on(client.search(&params))
        .context("scene search failed")?;

    if results.is_empty() {
        println!("No scenes found for {year} with cloud cover < {max_cloud}%");
        return Ok(());
    }

    if let Some(matched) = results.number_matched {
        println!("{matched} scenes match; showing {}", results.len());
    }
    println!("{:<56} {:<22} {:>8}", "Scene", "Captured", "Cloud %");
    for item in &results.features {
        println!(
            "{:<56} {:<22} {:>8.1}",
            item.id,
            item.properties.datetime.as_deref().unwrap_or("-"),
            item.properties.eo_cloud_cover.unwrap_or(f64::NAN),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_presets_resolve() {
        let chennai = city_bbox("chennai").unwrap();
        assert_eq!(chennai, [80.20, 12.90, 80.35, 13.15]);
        assert!(city_bbox("Bengaluru").is_some());
        assert!(city_bbox("atlantis").is_none());
    }

    #[test]
    fn bbox_parsing() {
        assert_eq!(
            parse_bbox("80.20, 12.90, 80.35, 13.15").unwrap(),
            [80.20, 12.90, 80.35, 13.15]
        );
        assert!(parse_bbox("80.20,12.90").is_err());
        assert!(parse_bbox("a,b,c,d").is_err());
    }

    #[test]
    fn resampling_parsing() {
        assert_eq!(parse_resampling("average").unwrap(), Resampling::Average);
        assert_eq!(parse_resampling("Decimate").unwrap(), Resampling::Decimate);
        assert!(parse_resampling("cubic").is_err());
    }

    #[test]
    fn region_resolution_requires_input() {
        assert!(resolve_region(None, None).is_err());
        assert!(resolve_region(Some("chennai"), None).is_ok());
        assert!(resolve_region(None, Some("0,0,1,1")).is_ok());
    }
}
