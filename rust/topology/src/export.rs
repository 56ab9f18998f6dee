// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TopoJSON export of a tile set.

use geojson::FeatureCollection;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use tilegram_core::{Dataset, GeographyResource, GridGeometry, MetricValue, Tile, TileDimensions};

use crate::builder::{BuildOptions, PropertyTransform, QuantizingBuilder, TopologyBuilder};
use crate::encoder;
use crate::error::{Error, Result};
use crate::features::build_feature_collection;
use crate::number::{serialize_number, JsNumber};
use crate::types::{JsonObject, Topology};

/// Default name of the exported geometry collection.
pub const DEFAULT_OBJECT_ID: &str = "states";

/// Default quantization passed to the topology builder.
pub const DEFAULT_QUANTIZATION: u64 = 10_000_000_000;

/// Exporter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Name of the geometry collection under `objects`.
    pub object_id: String,
    /// Quantization steps per axis handed to the topology builder.
    pub quantization: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            object_id: DEFAULT_OBJECT_ID.to_string(),
            quantization: DEFAULT_QUANTIZATION,
        }
    }
}

/// Topology-level `properties` of an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    #[serde(serialize_with = "serialize_number")]
    pub tilegram_value_per_tile: MetricValue,
    pub tilegram_version: String,
    #[serde(serialize_with = "serialize_tile_size")]
    pub tilegram_tile_size: TileDimensions,
    pub tilegram_geography: String,
}

impl ExportMetadata {
    pub fn new(value_per_tile: MetricValue, tile_size: TileDimensions, geography: &str) -> Self {
        Self {
            tilegram_value_per_tile: value_per_tile,
            tilegram_version: env!("CARGO_PKG_VERSION").to_string(),
            tilegram_tile_size: tile_size,
            tilegram_geography: geography.to_string(),
        }
    }

    /// The metadata as a JSON object.
    pub fn to_properties(&self) -> Result<JsonObject> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(Error::Serialization(format!(
                "metadata serialized to {other}, expected an object"
            ))),
        }
    }
}

fn serialize_tile_size<S: Serializer>(size: &TileDimensions, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("width", &JsNumber(size.width))?;
    map.serialize_entry("height", &JsNumber(size.height))?;
    map.end()
}

/// Exports tile sets as TopoJSON.
///
/// The grid and geography collaborators turn tiles into named region
/// features; the builder turns those features into a shared-arc topology.
pub struct TopoJsonExporter<G, R, B = QuantizingBuilder> {
    grid: G,
    geography: R,
    builder: B,
    config: ExportConfig,
}

impl<G, R> TopoJsonExporter<G, R>
where
    G: GridGeometry,
    R: GeographyResource,
{
    pub fn new(grid: G, geography: R, config: ExportConfig) -> Self {
        Self::with_builder(grid, geography, QuantizingBuilder, config)
    }
}

impl<G, R, B> TopoJsonExporter<G, R, B>
where
    G: GridGeometry,
    R: GeographyResource,
    B: TopologyBuilder,
{
    pub fn with_builder(grid: G, geography: R, builder: B, config: ExportConfig) -> Self {
        Self {
            grid,
            geography,
            builder,
            config,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Region features before topology construction.
    pub fn to_geojson(
        &self,
        tiles: &[Tile],
        dataset: &Dataset,
        geography: &str,
    ) -> Result<FeatureCollection> {
        build_feature_collection(&self.grid, &self.geography, tiles, dataset, geography)
    }

    /// Exports `tiles` as a quantized shared-arc topology.
    ///
    /// Fails without output if any tile region is missing from `dataset` or
    /// from the geography table.
    pub fn export(
        &self,
        tiles: &[Tile],
        dataset: &Dataset,
        metric_per_tile: MetricValue,
        geography: &str,
    ) -> Result<Topology> {
        let collection = self.to_geojson(tiles, dataset, geography)?;
        let feature_count = collection.features.len();

        let mut objects = IndexMap::with_capacity(1);
        objects.insert(self.config.object_id.clone(), collection);
        let options = BuildOptions {
            property_transform: PropertyTransform::KeepProperties,
            quantization: Some(self.config.quantization),
        };
        let mut topology = self.builder.build(&objects, &options)?;

        let metadata =
            ExportMetadata::new(metric_per_tile, self.grid.tile_dimensions(), geography);
        topology.properties = Some(metadata.to_properties()?);

        tracing::info!(
            tiles = tiles.len(),
            features = feature_count,
            arcs = topology.arcs.len(),
            geography,
            "exported topology"
        );
        Ok(topology)
    }

    /// Exports `tiles` through the delta encoder: one arc per tile ring,
    /// identity transform, no metadata.
    pub fn encode_delta(
        &self,
        tiles: &[Tile],
        dataset: &Dataset,
        geography: &str,
    ) -> Result<Topology> {
        let collection = self.to_geojson(tiles, dataset, geography)?;
        let topology = encoder::encode(&collection, &self.config.object_id)?;
        tracing::debug!(
            tiles = tiles.len(),
            arcs = topology.arcs.len(),
            "delta-encoded topology"
        );
        Ok(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TopoGeometry, Transform};
    use geojson::{feature::Id, Value};
    use std::cell::RefCell;
    use tilegram_core::{GeoCodeTable, GeographyTable, HexGrid, RegionInfo};

    fn geography() -> GeographyTable {
        let mut codes = GeoCodeTable::new();
        for (code, name) in [("X", "Ecks"), ("Y", "Why"), ("Z", "Zed")] {
            codes.insert(code.to_string(), RegionInfo::new(name));
        }
        let mut table = GeographyTable::new();
        table.insert("test", codes);
        table
    }

    fn exporter() -> TopoJsonExporter<HexGrid, GeographyTable> {
        TopoJsonExporter::new(HexGrid::default(), geography(), ExportConfig::default())
    }

    /// Records the options it is called with and returns an empty topology.
    #[derive(Default)]
    struct RecordingBuilder {
        calls: RefCell<Vec<(Vec<String>, BuildOptions)>>,
    }

    impl TopologyBuilder for RecordingBuilder {
        fn build(
            &self,
            objects: &IndexMap<String, FeatureCollection>,
            options: &BuildOptions,
        ) -> Result<Topology> {
            self.calls
                .borrow_mut()
                .push((objects.keys().cloned().collect(), options.clone()));
            Ok(Topology {
                bbox: None,
                transform: Some(Transform::IDENTITY),
                objects: IndexMap::new(),
                arcs: Vec::new(),
                properties: None,
            })
        }
    }

    #[test]
    fn builder_receives_configured_options() {
        let config = ExportConfig {
            object_id: "regions".to_string(),
            quantization: 1_000,
        };
        let exporter = TopoJsonExporter::with_builder(
            HexGrid::default(),
            geography(),
            RecordingBuilder::default(),
            config,
        );
        let dataset = Dataset::from_pairs([("X", 1.0)]).unwrap();
        exporter
            .export(&[Tile::new("X", 0, 0)], &dataset, 1.0, "test")
            .unwrap();

        let calls = exporter.builder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec!["regions".to_string()]);
        assert_eq!(
            calls[0].1,
            BuildOptions {
                property_transform: PropertyTransform::KeepProperties,
                quantization: Some(1_000),
            }
        );
    }

    #[test]
    fn two_tile_region_exports_as_multipolygon() {
        let tiles = vec![Tile::new("X", 0, 0), Tile::new("X", 1, 0)];
        let dataset = Dataset::from_pairs([("X", 5.0)]).unwrap();
        let topology = exporter().export(&tiles, &dataset, 5.0, "test").unwrap();

        let object = topology.object(DEFAULT_OBJECT_ID).unwrap();
        assert_eq!(object.geometries().len(), 1);
        let x = &object.geometries()[0];
        assert_eq!(x.id, Some(serde_json::json!("X")));
        assert!(matches!(&x.geometry, TopoGeometry::MultiPolygon(parts) if parts.len() == 2));
        let properties = x.properties.as_ref().unwrap();
        assert_eq!(properties["tilegramValue"], serde_json::json!(5));
        assert_eq!(properties["name"], "Ecks");

        let decoded = topology.to_feature_collection(DEFAULT_OBJECT_ID).unwrap();
        match &decoded.features[0].geometry.as_ref().unwrap().value {
            Value::MultiPolygon(parts) => {
                for part in parts {
                    assert_eq!(part[0].first(), part[0].last());
                }
            }
            other => panic!("expected MultiPolygon, got {other:?}"),
        }
    }

    #[test]
    fn metadata_is_attached() {
        let dataset = Dataset::from_pairs([("X", 5.0)]).unwrap();
        let topology = exporter()
            .export(&[Tile::new("X", 0, 0)], &dataset, 250_000.0, "test")
            .unwrap();

        let properties = serde_json::to_value(topology.properties.unwrap()).unwrap();
        assert_eq!(properties["tilegramValuePerTile"], serde_json::json!(250000));
        assert_eq!(properties["tilegramVersion"], env!("CARGO_PKG_VERSION"));
        assert_eq!(properties["tilegramGeography"], "test");
        assert_eq!(properties["tilegramTileSize"]["height"], serde_json::json!(20));
        assert!(properties["tilegramTileSize"]["width"].is_f64());
    }

    #[test]
    fn empty_tiles_export_null_geometry() {
        let dataset = Dataset::from_pairs([("Y", 1.0)]).unwrap();
        let topology = exporter().export(&[], &dataset, 1.0, "test").unwrap();

        let geometries = topology.object(DEFAULT_OBJECT_ID).unwrap().geometries();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries[0].geometry, TopoGeometry::Null);
        assert_eq!(geometries[0].id, Some(serde_json::json!("Y")));
        assert!(topology.arcs.is_empty());
    }

    #[test]
    fn region_missing_from_dataset_aborts() {
        let tiles = vec![Tile::new("X", 0, 0), Tile::new("Z", 1, 0)];
        let dataset = Dataset::from_pairs([("X", 1.0)]).unwrap();
        let err = exporter().export(&tiles, &dataset, 1.0, "test").unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn export_is_deterministic() {
        let tiles = vec![
            Tile::new("X", 0, 0),
            Tile::new("Y", 1, 0),
            Tile::new("X", 0, 1),
            Tile::new("Z", 1, 1),
        ];
        let dataset = Dataset::from_pairs([("X", 2.0), ("Y", 1.0), ("Z", 1.0)]).unwrap();
        let first = exporter().export(&tiles, &dataset, 1.0, "test").unwrap();
        let second = exporter().export(&tiles, &dataset, 1.0, "test").unwrap();
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn delta_encoding_uses_object_id() {
        let tiles = vec![Tile::new("X", 0, 0), Tile::new("X", 1, 0), Tile::new("Y", 0, 1)];
        let dataset = Dataset::from_pairs([("X", 2.0), ("Y", 1.0)]).unwrap();
        let topology = exporter().encode_delta(&tiles, &dataset, "test").unwrap();

        assert_eq!(topology.transform, Some(Transform::IDENTITY));
        assert_eq!(topology.arcs.len(), 3);
        let geometries = topology.object(DEFAULT_OBJECT_ID).unwrap().geometries();
        assert_eq!(
            geometries[0].geometry,
            TopoGeometry::MultiPolygon(vec![vec![vec![0]], vec![vec![1]]])
        );
        assert_eq!(geometries[1].geometry, TopoGeometry::Polygon(vec![vec![2]]));

        let decoded = topology.to_feature_collection(DEFAULT_OBJECT_ID).unwrap();
        assert_eq!(decoded.features[1].id, Some(Id::String("Y".to_string())));
    }
}
