//! One-shot footprint lookup and area measurement from the command line.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rooftop::api::{compute_area, compute_polygon_area, resolve_footprint, AreaResponse, FootprintResponse};
use rooftop::config::Config;
use rooftop::FootprintResolver;

#[derive(Parser, Debug)]
#[command(name = "measure")]
#[command(about = "Resolve a building footprint and measure its roof area")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the building at a coordinate and measure it
    Footprint {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Measure a GeoJSON Polygon Feature from a file ("-" for stdin)
    Area {
        #[arg(default_value = "-")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let output = match args.command {
        Command::Footprint { lat, lon } => measure_footprint(&config, lat, lon).await?,
        Command::Area { file } => measure_file(&file)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn measure_footprint(config: &Config, lat: f64, lon: f64) -> Result<Value> {
    let resolver = FootprintResolver::from_config(&config.sources)?;
    let footprint = resolve_footprint(&resolver, lat, lon).await?;
    let area = compute_polygon_area(&footprint.polygon)?;

    info!(
        "Building from {} measures {:.2} m²",
        footprint.source, area.area_square_meters
    );

    Ok(json!({
        "footprint": FootprintResponse::new(lat, lon, &footprint),
        "area": AreaResponse::from(area),
    }))
}

fn measure_file(path: &Path) -> Result<Value> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read GeoJSON from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    let geojson: Value = serde_json::from_str(&raw).context("Invalid GeoJSON format")?;
    let area = compute_area(&geojson)?;
    Ok(serde_json::to_value(AreaResponse::from(area))?)
}
