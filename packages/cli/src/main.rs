#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the SIF map engine.
//!
//! Wires the composition root — sounding store, boundaries database,
//! layer snapshot, view controller — and drives one refresh, printing
//! the map-mode aggregation (and optionally one region's time series)
//! to stdout. Useful as a smoke check that the full stack works without
//! the rendering layer attached.

use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use sif_map_analytics::{PostgisSifStore, SifStore};
use sif_map_geography_models::{DateRange, LayerKind, RegionRef};
use sif_map_viewer::{ViewController, ViewEvent};

#[derive(Parser)]
#[command(name = "sif-map", about = "Aggregate SIF soundings by geographic layer")]
struct Args {
    /// Layer to aggregate: state, county, or grid
    #[arg(long, default_value = "county")]
    layer: String,

    /// Range start (YYYY-MM-DD); defaults to the standard initial window
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD), inclusive
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Also print the daily time series for this region id
    #[arg(long)]
    region: Option<String>,

    /// Print the full map source as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn parse_layer(text: &str) -> Result<LayerKind, String> {
    match text.to_ascii_lowercase().as_str() {
        "state" | "states" => Ok(LayerKind::State),
        "county" | "counties" => Ok(LayerKind::County),
        "grid" | "world" | "world-grid" => Ok(LayerKind::WorldGrid),
        other => Err(format!(
            "unknown layer '{other}': expected state, county, or grid"
        )),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let args = Args::parse();
    let kind = parse_layer(&args.layer)?;

    let db = sif_map_database::db::connect_from_env().await?;
    let store: Arc<dyn SifStore> = Arc::new(PostgisSifStore::new(db));

    let conn = sif_map_database::boundaries_db::open_default()?;
    let snapshot_path = sif_map_database::paths::layer_snapshot_path();
    let layers = Arc::new(
        sif_map_geography::load_or_build(&conn, store.as_ref(), &snapshot_path).await?,
    );

    log::info!("{} layer ready", kind.label());

    let (mut controller, sources) = ViewController::new(Arc::clone(&layers), store);
    controller.handle_event(ViewEvent::LayerChanged(kind)).await;

    if let (Some(start), Some(end)) = (args.start, args.end) {
        controller
            .handle_event(ViewEvent::DateRangeChanged(DateRange::new(start, end)))
            .await;
        // The second event inside the throttle window parks; apply it.
        controller.flush().await;
    }

    if let Some(region_id) = &args.region {
        let layer = layers.get(kind);
        let Some(index) = layer.regions().iter().position(|r| r.id == *region_id) else {
            return Err(format!("no region '{region_id}' in the {kind} layer").into());
        };
        controller
            .handle_event(ViewEvent::RegionTapped(RegionRef::Index(index)))
            .await;
    }

    let map = sources.map.borrow().clone();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        print_summary(&map);
    }

    if args.region.is_some() {
        let series = sources.series.borrow().clone();
        println!();
        println!("{}", series.title);
        for point in &series.points {
            println!("  {}  {:.4}", point.day, point.value);
        }
        if series.points.is_empty() {
            println!("  (insufficient data)");
        }
    }

    Ok(())
}

fn print_summary(map: &sif_map_viewer::MapData) {
    println!("{}", map.title);

    let with_data: Vec<(&str, f64)> = map
        .regions
        .iter()
        .filter_map(|r| r.value.map(|v| (r.name.as_str(), v)))
        .collect();

    println!(
        "{} regions, {} with data",
        map.regions.len(),
        with_data.len()
    );

    for (name, value) in with_data.iter().take(20) {
        println!("  {name}: {value:.4}");
    }
    if with_data.len() > 20 {
        println!("  ... {} more", with_data.len() - 20);
    }
}
