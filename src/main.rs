//! Citadel Walls - settlement generator
//!
//! Lays out a demo settlement, walls it in and prints a summary of the
//! fortifications as JSON or text.

use std::path::PathBuf;

use citadel_walls::building::{generate_settlement, SettlementConfig};
use citadel_walls::core::config::{set_config, GeomConfig, LotConfig, StreetConfig, WallConfig};
use citadel_walls::core::error::{GeomError, Result};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Citadel Walls - generate a walled settlement
#[derive(Parser, Debug)]
#[command(name = "citadel-walls")]
#[command(about = "Generate a walled settlement and report its fortifications")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Grid rows (overrides the config file)
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns (overrides the config file)
    #[arg(long)]
    cols: Option<usize>,

    /// Radius of the walled area in cells (overrides the config file)
    #[arg(long)]
    inner: Option<f64>,

    /// TOML file with [wall], [streets], [lots] and [settlement] sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Honour the wall's `real` flag instead of always building a real wall
    #[arg(long)]
    honor_real: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// Layout of the `--config` file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    wall: WallConfig,
    streets: StreetConfig,
    lots: LotConfig,
    settlement: SettlementConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<(GeomConfig, SettlementConfig)> {
    let file = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<ConfigFile>(&content)?
        }
        None => ConfigFile::default(),
    };

    let geom = GeomConfig {
        wall: file.wall,
        streets: file.streets,
        lots: file.lots,
    };
    geom.validate().map_err(GeomError::Config)?;
    Ok((geom, file.settlement))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("citadel_walls=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (mut geom, mut settings) = load_config(args.config.as_ref())?;
    if let Some(rows) = args.rows {
        settings.rows = rows;
    }
    if let Some(cols) = args.cols {
        settings.cols = cols;
    }
    if let Some(inner) = args.inner {
        settings.inner_radius = inner;
    }
    if args.honor_real {
        geom.wall.honor_real_flag = true;
    }

    if set_config(geom.clone()).is_err() {
        tracing::warn!("geometry config already initialised, keeping the existing one");
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, rows = settings.rows, cols = settings.cols, "generating settlement");

    let settlement = generate_settlement(&settings, &geom, seed)?;
    let summary = settlement.summary()?;

    match args.format.as_str() {
        "text" => {
            println!("Settlement");
            println!("==========");
            println!("Seed: {}", summary.seed);
            println!("Patches: {} ({} inner, {} enclosed)", summary.patches, summary.inner, summary.enclosed);
            println!("Bastions: {}", summary.bastions);
            println!("Wall: {} vertices, radius {:.1}", summary.wall_vertices, summary.radius);
            println!("Towers: {}", summary.towers);
            println!("Lots: {}", summary.lots);
            println!("Citadel: {}", if summary.citadel { "yes" } else { "no" });
            println!("Plaza: {}", if summary.plaza { "yes" } else { "no" });
            println!();
            println!("Gates:");
            for gate in &summary.gates {
                println!("  ({:.2}, {:.2})", gate.x, gate.y);
            }
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
