// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input documents and file helpers.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use geojson::{FeatureCollection, GeoJson};
use indexmap::IndexMap;
use serde::Deserialize;
use tilegram_core::{Dataset, MetricValue, Tile};

/// A tilegram as saved by the editor.
///
/// ```json
/// {
///   "geography": "us",
///   "metricPerTile": 500000,
///   "tiles": [{"id": "CA", "position": {"x": 0, "y": 0}}],
///   "dataset": [["CA", 39000000]]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileDocument {
    pub geography: String,
    #[serde(default = "default_metric_per_tile")]
    pub metric_per_tile: MetricValue,
    pub tiles: Vec<Tile>,
    pub dataset: Dataset,
}

fn default_metric_per_tile() -> MetricValue {
    1.0
}

/// Region id to fill color.
pub type ColorTable = IndexMap<String, String>;

/// Fill used for regions without a color.
pub const DEFAULT_FILL: &str = "#cccccc";

/// Reads `path`, or standard input when `path` is `-`.
pub fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Writes `text` to `path`, or to standard output when there is none.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

pub fn parse_tile_document(text: &str) -> Result<TileDocument> {
    serde_json::from_str(text).context("invalid tilegram document")
}

pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    match text.parse::<GeoJson>().context("invalid GeoJSON")? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => bail!("expected a Feature or FeatureCollection, got a bare geometry"),
    }
}

pub fn parse_color_table(text: &str) -> Result<ColorTable> {
    serde_json::from_str(text).context("invalid color table")
}
