//! Landsat scene importer.
//!
//! Expands downloaded scene archives, selects band files by naming
//! pattern, and imports each into the active GRASS session, reprojecting
//! and normalizing pixel types where required.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use grass_env::GrassEnvironment;
use landsat_ingestion::{
    CoordinateSystemInspector, ExtentPolicy, GeoTiffInspector, ImportOptions, PipelineConfig,
    PipelineLifecycle, RasterEnvironment,
};

#[derive(Parser, Debug)]
#[command(name = "landsat-import")]
#[command(about = "Imports Landsat scenes downloaded with landsat-download")]
struct Args {
    /// Directory with downloaded Landsat scene archives
    input: PathBuf,

    /// Directory archives are extracted into (default: input)
    #[arg(long)]
    unzip_dir: Option<PathBuf>,

    /// Band name pattern to import (regex fragment, default: all bands)
    #[arg(long)]
    pattern: Option<String>,

    /// File name pattern restricting archives and scene directories
    #[arg(long)]
    pattern_file: Option<String>,

    /// Output extent: the input data's own extent or the active region
    #[arg(long, default_value = "input", value_parser = parse_extent)]
    extent: ExtentPolicy,

    /// Maximum memory in MB used for raster row caching
    #[arg(long, default_value_t = landsat_ingestion::DEFAULT_MEMORY_MB)]
    memory: u32,

    /// Reproject raster data when its projection does not match
    #[arg(short = 'r', long)]
    reproject: bool,

    /// Link raster data instead of copying pixels
    #[arg(short = 'l', long)]
    link: bool,

    /// Override the projection check (use the environment's projection)
    #[arg(short = 'o', long)]
    override_projection_check: bool,

    /// Do not extract archives; files are already extracted
    #[arg(short = 'n', long)]
    no_unzip: bool,

    /// Print raster data to be imported and exit
    #[arg(short = 'p', long)]
    print: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_extent(s: &str) -> Result<ExtentPolicy, String> {
    s.parse()
}

fn main() {
    if let Err(err) = run() {
        eprintln!("ERROR: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = PipelineConfig {
        input_dir: args.input.clone(),
        working_dir: args.unzip_dir.clone(),
        band_pattern: args.pattern.clone(),
        file_pattern: args.pattern_file.clone(),
        skip_extraction: args.no_unzip,
        options: ImportOptions {
            allow_reproject: args.reproject,
            link_only: args.link,
            override_projection_check: args.override_projection_check,
            extent: args.extent,
            memory_mb: args.memory,
        },
    };

    let env = GrassEnvironment::new();
    let inspector = GeoTiffInspector;

    if args.extent == ExtentPolicy::Region {
        let region = env.current_region()?;
        debug!(
            north = region.north,
            south = region.south,
            east = region.east,
            west = region.west,
            "Imports bounded by the active region"
        );
    }

    let mut pipeline = PipelineLifecycle::new(config, &env, &inspector)?;

    if args.print {
        let result = print_candidates(&mut pipeline, &env, &inspector);
        pipeline.finalize();
        return result;
    }

    let result = pipeline.run();
    pipeline.finalize();
    let report = result?;

    info!(
        processed = report.processed(),
        imported = report.imported.len(),
        failed = report.failed.len(),
        "Import finished"
    );
    Ok(())
}

/// List candidate files with their projection-match verdict and EPSG
/// code, without importing anything.
fn print_candidates(
    pipeline: &mut PipelineLifecycle,
    env: &GrassEnvironment,
    inspector: &GeoTiffInspector,
) -> Result<()> {
    let files = pipeline.candidates()?;
    for file in &files {
        let matches = if env.check_projection(&file.path) { 1 } else { 0 };
        let epsg = inspector
            .native_system_id(&file.path)
            .map(|srs| srs.to_string())
            .unwrap_or_else(|_| "EPSG:unknown".to_string());
        println!("{} {} ({})", file.path.display(), matches, epsg);
    }
    Ok(())
}
