//! nav-inspect — load a dataset through the data facade and report on it.
//!
//! ```text
//! nav-inspect data/server.ini
//! nav-inspect data/server.ini --lat 52.5200 --lon 13.4050 --zoom 16
//! ```
//!
//! File names in the ini resolve against the ini's own directory.  Set
//! `RUST_LOG=debug` to watch each loader.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nav_core::{FixedPointCoordinate, ZoomLevel};
use nav_facade::{DataFacade, InternalDataFacade, ServerConfig};
use nav_graph::QueryEdgeData;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
/// Inspect a preprocessed routing dataset.
struct Cli {
    /// Path to the server.ini naming the data files.
    config: PathBuf,

    /// Latitude in degrees of a point to snap.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in degrees of a point to snap.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Zoom level; below 14 tiny road fragments are ignored.
    #[arg(long, default_value_t = ZoomLevel::DEFAULT.0)]
    zoom: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = ServerConfig::load(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;
    let base_dir = cli.config.parent().unwrap_or(Path::new("."));

    let t0 = Instant::now();
    let facade = InternalDataFacade::<QueryEdgeData>::from_config(&config, base_dir)
        .context("loading dataset")?;
    info!(elapsed_ms = t0.elapsed().as_millis() as u64, "dataset loaded");

    println!("nodes:          {}", facade.node_count());
    println!("edges:          {}", facade.edge_count());
    println!("coordinates:    {}", facade.coordinates().len());
    println!("original edges: {}", facade.original_edges().len());
    println!("index pages:    {}", facade.spatial_index().page_count());
    println!("index segments: {}", facade.spatial_index().segment_count());
    println!("checksum:       {:#010x}", facade.checksum());
    println!("timestamp:      {}", facade.timestamp());

    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        let query = FixedPointCoordinate::from_degrees(lat, lon);
        if !query.is_valid() {
            bail!("coordinate {lat},{lon} is outside the valid range");
        }
        let zoom = ZoomLevel(cli.zoom);
        println!();
        println!("query:          {query} (zoom {})", zoom.0);

        match facade.nearest_endpoint(query, zoom)? {
            Some(c) => println!("endpoint:       {c} ({:.1} m)", query.distance_m(c)),
            None => println!("endpoint:       none"),
        }
        match facade.nearest_phantom(query, zoom)? {
            Some(p) => {
                println!("phantom:        {} on node {}", p.location, p.edge_based_node);
                println!("  ratio:        {:.3}", p.ratio);
                println!("  weights:      {} + {}", p.weight1, p.weight2);
                println!("  bearing:      {:.0}°", p.bearing());
                println!("  distance:     {:.1} m", query.distance_m(p.location));
            }
            None => println!("phantom:        none"),
        }
    }

    Ok(())
}
