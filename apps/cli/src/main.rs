// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `tilegram` - export tilegrams from the command line.
//!
//! # Commands
//!
//! - `tilegram topojson` - quantized shared-arc TopoJSON with export metadata
//! - `tilegram delta` - delta-encoded TopoJSON of any polygonal GeoJSON
//! - `tilegram svg` - flat SVG image, one group per region
//! - `tilegram decode` - GeoJSON of one object of a TopoJSON file
//!
//! Logging goes to stderr and follows `RUST_LOG`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tilegram_core::{GeographyTable, HexGrid};
use tilegram_svg::{SvgExporter, SvgOptions};
use tilegram_topology::{encode, TopoJsonExporter, Topology};

mod config;
mod input;

use config::Config;
use input::{ColorTable, DEFAULT_FILL};

#[derive(Parser, Debug)]
#[command(name = "tilegram")]
#[command(about = "Export hexagon tilegrams to TopoJSON and SVG", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a tilegram document as quantized TopoJSON
    Topojson {
        #[command(flatten)]
        tiles: TileArgs,

        /// Geography table mapping region codes to names (JSON)
        #[arg(short, long)]
        geography_table: PathBuf,

        /// Quantization steps per axis (overrides TILEGRAM_QUANTIZATION)
        #[arg(short, long)]
        quantization: Option<u64>,

        /// Use the delta encoder instead of the shared-arc builder
        #[arg(long)]
        delta: bool,
    },
    /// Delta-encode a GeoJSON Feature or FeatureCollection
    Delta {
        /// GeoJSON input file, or `-` for standard input
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Name of the geometry collection (overrides TILEGRAM_OBJECT_ID)
        #[arg(long)]
        object_id: Option<String>,

        /// Output file (default: standard output)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a tilegram document as SVG
    Svg {
        #[command(flatten)]
        tiles: TileArgs,

        /// Region colors as a JSON object of region id to fill
        #[arg(short, long)]
        colors: Option<PathBuf>,

        /// Padding around the tiles in pixels
        #[arg(long, default_value = "0")]
        padding: f64,

        /// Tile outline color
        #[arg(long)]
        stroke: Option<String>,
    },
    /// Convert one object of a TopoJSON file back to GeoJSON
    Decode {
        /// TopoJSON input file, or `-` for standard input
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Object to decode (overrides TILEGRAM_OBJECT_ID)
        #[arg(long)]
        object_id: Option<String>,

        /// Output file (default: standard output)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Arguments shared by commands that read a tilegram document.
#[derive(Args, Debug)]
struct TileArgs {
    /// Tilegram document, or `-` for standard input
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Output file (default: standard output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Hexagon circumradius in pixels (overrides TILEGRAM_HEX_SIZE)
    #[arg(long)]
    hex_size: Option<f64>,

    /// Name of the geometry collection (overrides TILEGRAM_OBJECT_ID)
    #[arg(long)]
    object_id: Option<String>,
}

impl TileArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(hex_size) = self.hex_size {
            config.hex_size = hex_size;
        }
        if let Some(object_id) = &self.object_id {
            config.object_id = object_id.clone();
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tilegram=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    tracing::debug!(?config, "loaded configuration");

    run(cli.command, &mut config)
}

fn run(command: Command, config: &mut Config) -> Result<()> {
    match command {
        Command::Topojson {
            tiles,
            geography_table,
            quantization,
            delta,
        } => {
            tiles.apply(config);
            if let Some(q) = quantization {
                config.quantization = q;
            }
            let doc = input::parse_tile_document(&input::read_source(&tiles.input)?)?;
            let table = GeographyTable::from_json(&input::read_source(&geography_table)?)
                .with_context(|| format!("invalid geography table {}", geography_table.display()))?;

            let exporter = TopoJsonExporter::new(
                HexGrid::new(config.hex_size),
                table,
                config.export_config(),
            );
            let exported = if delta {
                exporter.encode_delta(&doc.tiles, &doc.dataset, &doc.geography)
            } else {
                exporter.export(&doc.tiles, &doc.dataset, doc.metric_per_tile, &doc.geography)
            };
            let topology = exported.context("export failed")?;
            input::write_output(tiles.output.as_deref(), &topology.to_json()?)
        }
        Command::Delta {
            input: source,
            object_id,
            output,
        } => {
            let object_id = object_id.unwrap_or_else(|| config.object_id.clone());
            let collection = input::parse_feature_collection(&input::read_source(&source)?)?;
            let topology = encode(&collection, &object_id).context("delta encoding failed")?;
            tracing::info!(
                features = collection.features.len(),
                arcs = topology.arcs.len(),
                "delta-encoded GeoJSON"
            );
            input::write_output(output.as_deref(), &topology.to_json()?)
        }
        Command::Svg {
            tiles,
            colors,
            padding,
            stroke,
        } => {
            tiles.apply(config);
            let doc = input::parse_tile_document(&input::read_source(&tiles.input)?)?;
            let colors = match &colors {
                Some(path) => input::parse_color_table(&input::read_source(path)?)?,
                None => ColorTable::new(),
            };

            let exporter = SvgExporter::with_options(
                HexGrid::new(config.hex_size),
                SvgOptions {
                    padding,
                    stroke,
                    ..SvgOptions::default()
                },
            );
            let svg = exporter.render(&doc.tiles, |region| fill_for(&colors, region));
            input::write_output(tiles.output.as_deref(), &svg)
        }
        Command::Decode {
            input: source,
            object_id,
            output,
        } => {
            let object_id = object_id.unwrap_or_else(|| config.object_id.clone());
            let topology = Topology::from_json(&input::read_source(&source)?)
                .context("invalid TopoJSON")?;
            let collection = topology
                .to_feature_collection(&object_id)
                .with_context(|| format!("failed to decode object {object_id:?}"))?;
            input::write_output(output.as_deref(), &serde_json::to_string(&collection)?)
        }
    }
}

fn fill_for(colors: &ColorTable, region: &str) -> String {
    colors
        .get(region)
        .cloned()
        .unwrap_or_else(|| DEFAULT_FILL.to_string())
}
