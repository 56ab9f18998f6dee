// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal delta-encoded topology.
//!
//! Every coordinate path becomes its own arc: no quantization, no shared-arc
//! detection, identity transform. A feature with one path is emitted as a
//! `Polygon` referencing one arc; a feature with several paths is emitted as
//! a `MultiPolygon` whose parts are single-ring, single-arc polygons.
//!
//! Only outer rings are read. Polygons with holes are rejected rather than
//! silently flattened.

use geojson::{Feature, FeatureCollection, Value};
use indexmap::IndexMap;
use rayon::prelude::*;
use tilegram_core::Position;

use crate::delta::encode_arc;
use crate::error::{Error, Result};
use crate::types::{ArcIndex, GeometryObject, JsonObject, TopoArc, TopoGeometry, Topology, Transform};

/// Arcs of one feature before indices are assigned.
struct EncodedFeature {
    id: Option<serde_json::Value>,
    properties: Option<JsonObject>,
    /// `None` for features without geometry.
    arcs: Option<Vec<TopoArc>>,
}

/// Encodes `collection` into a topology with a single geometry collection
/// named `object_name`.
///
/// Arc indices follow feature order, then path order within a feature. The
/// whole call fails if any feature is malformed or unsupported.
pub fn encode(collection: &FeatureCollection, object_name: &str) -> Result<Topology> {
    let encoded: Vec<EncodedFeature> = collection
        .features
        .par_iter()
        .enumerate()
        .map(|(index, feature)| encode_feature(index, feature))
        .collect::<Result<_>>()?;

    let total_arcs = encoded
        .iter()
        .map(|f| f.arcs.as_ref().map_or(0, Vec::len))
        .sum();
    let mut arcs: Vec<TopoArc> = Vec::with_capacity(total_arcs);
    let mut geometries = Vec::with_capacity(encoded.len());

    for feature in encoded {
        let geometry = match feature.arcs {
            None => TopoGeometry::Null,
            Some(feature_arcs) => {
                let first = arcs.len() as ArcIndex;
                let count = feature_arcs.len() as ArcIndex;
                arcs.extend(feature_arcs);
                let indices = first..first + count;
                if count > 1 {
                    TopoGeometry::MultiPolygon(indices.map(|i| vec![vec![i]]).collect())
                } else {
                    TopoGeometry::Polygon(vec![indices.collect()])
                }
            }
        };
        geometries.push(GeometryObject {
            geometry,
            id: feature.id,
            properties: feature.properties,
        });
    }

    tracing::debug!(
        object = object_name,
        features = geometries.len(),
        arcs = arcs.len(),
        "delta-encoded feature collection"
    );

    let mut objects = IndexMap::new();
    objects.insert(
        object_name.to_string(),
        GeometryObject::new(TopoGeometry::GeometryCollection(geometries)),
    );

    Ok(Topology {
        bbox: None,
        transform: Some(Transform::IDENTITY),
        objects,
        arcs,
        properties: None,
    })
}

fn encode_feature(index: usize, feature: &Feature) -> Result<EncodedFeature> {
    let arcs = match &feature.geometry {
        None => None,
        Some(geometry) => Some(
            feature_paths(index, &geometry.value)?
                .into_iter()
                .map(|path| encode_arc(&path))
                .collect(),
        ),
    };

    Ok(EncodedFeature {
        id: feature.id.as_ref().map(feature_id_to_json),
        properties: feature.properties.clone(),
        arcs,
    })
}

/// Collects the outer ring of every polygon part of a geometry.
fn feature_paths(index: usize, value: &Value) -> Result<Vec<Vec<Position>>> {
    let paths = match value {
        Value::Polygon(rings) => vec![outer_ring(index, rings)?],
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .map(|rings| outer_ring(index, rings))
            .collect::<Result<_>>()?,
        other => {
            return Err(Error::UnsupportedGeometry {
                feature: index,
                reason: format!("{} geometry", geometry_type_name(other)),
            })
        }
    };

    if paths.is_empty() {
        return Err(Error::MalformedGeometry {
            feature: index,
            reason: "no coordinate paths".to_string(),
        });
    }
    Ok(paths)
}

fn outer_ring(index: usize, rings: &[Vec<Vec<f64>>]) -> Result<Vec<Position>> {
    match rings {
        [] => Err(Error::MalformedGeometry {
            feature: index,
            reason: "polygon without rings".to_string(),
        }),
        [ring] => path_positions(index, ring),
        _ => Err(Error::UnsupportedGeometry {
            feature: index,
            reason: format!("polygon with {} holes", rings.len() - 1),
        }),
    }
}

/// Converts a GeoJSON ring into 2D positions, ignoring extra dimensions.
pub(crate) fn path_positions(index: usize, ring: &[Vec<f64>]) -> Result<Vec<Position>> {
    if ring.len() < 2 {
        return Err(Error::MalformedGeometry {
            feature: index,
            reason: format!("path with {} point(s)", ring.len()),
        });
    }
    ring.iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok([*x, *y]),
            _ => Err(Error::MalformedGeometry {
                feature: index,
                reason: format!("position with {} component(s)", p.len()),
            }),
        })
        .collect()
}

pub(crate) fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

pub(crate) fn feature_id_to_json(id: &geojson::feature::Id) -> serde_json::Value {
    match id {
        geojson::feature::Id::String(s) => serde_json::Value::String(s.clone()),
        geojson::feature::Id::Number(n) => serde_json::Value::Number(n.clone()),
    }
}
