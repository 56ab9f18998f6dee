// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TopoJSON document model.
//!
//! Geometry objects reference arcs by index. A negative index `i` refers to
//! arc `!i` (ones' complement) traversed in reverse.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tilegram_core::Position;

use crate::error::Error;
use crate::number;

/// Index into [`Topology::arcs`]; negative values mean "reversed".
pub type ArcIndex = i64;

/// Arc point sequence. Delta-encoded whenever the topology has a transform.
pub type TopoArc = Vec<Position>;

/// JSON object used for feature and topology properties.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Returns the arc a (possibly reversed) index refers to, and whether it is
/// reversed.
pub fn resolve_arc_index(index: ArcIndex) -> (usize, bool) {
    if index < 0 {
        ((!index) as usize, true)
    } else {
        (index as usize, false)
    }
}

/// Affine transform from quantized integer positions back to coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(serialize_with = "number::serialize_pair")]
    pub scale: [f64; 2],
    #[serde(serialize_with = "number::serialize_pair")]
    pub translate: [f64; 2],
}

impl Transform {
    /// Unit scale, zero translation.
    pub const IDENTITY: Transform = Transform {
        scale: [1.0, 1.0],
        translate: [0.0, 0.0],
    };

    /// Maps a quantized position to coordinates.
    pub fn apply(&self, p: Position) -> Position {
        [
            p[0] * self.scale[0] + self.translate[0],
            p[1] * self.scale[1] + self.translate[1],
        ]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A TopoJSON topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Topology {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_bbox"
    )]
    pub bbox: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    pub objects: IndexMap<String, GeometryObject>,
    #[serde(serialize_with = "number::serialize_arcs")]
    pub arcs: Vec<TopoArc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<JsonObject>,
}

impl Topology {
    /// Serializes the topology to compact JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a topology from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the named object.
    pub fn object(&self, name: &str) -> crate::Result<&GeometryObject> {
        self.objects
            .get(name)
            .ok_or_else(|| Error::ObjectNotFound(name.to_string()))
    }
}

/// Shape of a geometry object.
#[derive(Debug, Clone, PartialEq)]
pub enum TopoGeometry {
    /// `"type": null`, for features without geometry.
    Null,
    /// Rings of arc indices.
    Polygon(Vec<Vec<ArcIndex>>),
    /// Polygons of rings of arc indices.
    MultiPolygon(Vec<Vec<Vec<ArcIndex>>>),
    GeometryCollection(Vec<GeometryObject>),
}

impl TopoGeometry {
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            TopoGeometry::Null => None,
            TopoGeometry::Polygon(_) => Some("Polygon"),
            TopoGeometry::MultiPolygon(_) => Some("MultiPolygon"),
            TopoGeometry::GeometryCollection(_) => Some("GeometryCollection"),
        }
    }
}

/// A geometry object with optional id and properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometryObject", into = "RawGeometryObject")]
pub struct GeometryObject {
    pub geometry: TopoGeometry,
    pub id: Option<serde_json::Value>,
    pub properties: Option<JsonObject>,
}

impl GeometryObject {
    pub fn new(geometry: TopoGeometry) -> Self {
        Self {
            geometry,
            id: None,
            properties: None,
        }
    }

    /// Child geometries of a collection; empty for any other shape.
    pub fn geometries(&self) -> &[GeometryObject] {
        match &self.geometry {
            TopoGeometry::GeometryCollection(children) => children,
            _ => &[],
        }
    }
}

/// Wire layout of a geometry object.
#[derive(Serialize, Deserialize)]
struct RawGeometryObject {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arcs: Option<RawArcs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geometries: Option<Vec<GeometryObject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<JsonObject>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawArcs {
    Rings(Vec<Vec<ArcIndex>>),
    Polygons(Vec<Vec<Vec<ArcIndex>>>),
}

impl TryFrom<RawGeometryObject> for GeometryObject {
    type Error = Error;

    fn try_from(raw: RawGeometryObject) -> Result<Self, Error> {
        let missing_arcs = || Error::InvalidTopology("geometry without arcs".to_string());

        let geometry = match raw.kind.as_deref() {
            None => TopoGeometry::Null,
            Some("Polygon") => match raw.arcs.ok_or_else(missing_arcs)? {
                RawArcs::Rings(rings) => TopoGeometry::Polygon(rings),
                RawArcs::Polygons(_) => {
                    return Err(Error::InvalidTopology(
                        "Polygon arcs nested too deeply".to_string(),
                    ))
                }
            },
            Some("MultiPolygon") => match raw.arcs.ok_or_else(missing_arcs)? {
                RawArcs::Polygons(polygons) => TopoGeometry::MultiPolygon(polygons),
                // `[]` and `[[], ...]` parse as rings but are valid empty polygons.
                RawArcs::Rings(rings) if rings.iter().all(Vec::is_empty) => {
                    TopoGeometry::MultiPolygon(rings.into_iter().map(|_| Vec::new()).collect())
                }
                RawArcs::Rings(_) => {
                    return Err(Error::InvalidTopology(
                        "MultiPolygon arcs not nested deeply enough".to_string(),
                    ))
                }
            },
            Some("GeometryCollection") => {
                TopoGeometry::GeometryCollection(raw.geometries.unwrap_or_default())
            }
            Some(other) => {
                return Err(Error::InvalidTopology(format!(
                    "unsupported geometry type {other:?}"
                )))
            }
        };

        Ok(GeometryObject {
            geometry,
            id: raw.id,
            properties: raw.properties,
        })
    }
}

impl From<GeometryObject> for RawGeometryObject {
    fn from(object: GeometryObject) -> Self {
        let kind = object.geometry.type_name().map(str::to_string);
        let (arcs, geometries) = match object.geometry {
            TopoGeometry::Null => (None, None),
            TopoGeometry::Polygon(rings) => (Some(RawArcs::Rings(rings)), None),
            TopoGeometry::MultiPolygon(polygons) => (Some(RawArcs::Polygons(polygons)), None),
            TopoGeometry::GeometryCollection(children) => (None, Some(children)),
        };
        RawGeometryObject {
            kind,
            id: object.id,
            arcs,
            geometries,
            properties: object.properties,
        }
    }
}
