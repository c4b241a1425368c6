//! Landsat scene downloader.
//!
//! Searches the EarthExplorer catalog (dataset, area of interest, date
//! range, cloud cover) and downloads scene archives by identifier into an
//! output directory for landsat-import to ingest.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use landsat_catalog::{
    Credentials, DatasetCode, EarthExplorerClient, SceneCatalog, SearchFilter,
};
use landsat_common::BoundingBox;

#[derive(Parser, Debug)]
#[command(name = "landsat-download")]
#[command(about = "Downloads Landsat scenes from EarthExplorer")]
struct Args {
    /// Settings file with credentials: username on line 1, password on
    /// line 2 ('-' prompts on standard input)
    #[arg(short, long)]
    settings: String,

    /// Output directory for downloaded scene archives
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Area of interest as minx,miny,maxx,maxy in lon/lat degrees
    #[arg(long)]
    bbox: Option<String>,

    /// Landsat dataset to search
    #[arg(long, default_value = "LANDSAT_8_C1", value_parser = parse_dataset)]
    dataset: DatasetCode,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Maximum cloud cover percentage
    #[arg(long)]
    clouds: Option<u8>,

    /// Comma-separated list of scene ids to download
    #[arg(long)]
    id: Option<String>,

    /// List filtered scenes and exit
    #[arg(short, long)]
    list: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_dataset(s: &str) -> Result<DatasetCode, String> {
    s.parse()
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("ERROR: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
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

    let credentials = if args.settings == "-" {
        Credentials::prompt_stdin()?
    } else {
        Credentials::from_settings_file(&args.settings)?
    };

    let client = EarthExplorerClient::login(&credentials)
        .await
        .context("catalog login failed")?;

    let result = if args.list {
        list_scenes(&client, &args).await
    } else {
        download_scenes(&client, &args).await
    };

    client.logout().await.ok();
    result
}

async fn list_scenes(client: &EarthExplorerClient, args: &Args) -> Result<()> {
    let bbox = args
        .bbox
        .as_deref()
        .map(BoundingBox::from_cli_string)
        .transpose()
        .context("invalid --bbox")?;

    let filter = SearchFilter {
        dataset: args.dataset,
        bbox,
        start_date: args.start,
        end_date: args.end,
        max_cloud_cover: args.clouds,
    };

    let scenes = client.search(&filter).await?;
    println!("{} scenes found.", scenes.len());
    println!("ID DisplayID Date Clouds");
    for scene in &scenes {
        println!(
            "{} {} {} {}",
            scene.entity_id, scene.display_id, scene.acquisition_date, scene.cloud_cover
        );
    }

    Ok(())
}

async fn download_scenes(client: &EarthExplorerClient, args: &Args) -> Result<()> {
    let Some(ids) = args.id.as_deref() else {
        bail!("no scene ids given; use --id or list scenes with --list");
    };

    for id in ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let path = client.download_scene(id, args.dataset, &args.output).await?;
        info!(scene = id, path = %path.display(), "Scene downloaded");
    }

    Ok(())
}
