// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of topologies back into GeoJSON.
//!
//! Arcs of a topology with a transform are delta-encoded and quantized; arcs
//! of a topology without one hold absolute positions. Rings are stitched from
//! their arcs, dropping the first point of every arc after the first since
//! consecutive arcs share an endpoint.

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, Value};
use tilegram_core::Position;

use crate::delta::decode_arc_with;
use crate::error::{Error, Result};
use crate::types::{resolve_arc_index, ArcIndex, GeometryObject, TopoGeometry, Topology};

impl Topology {
    /// Absolute positions of every arc.
    pub fn decoded_arcs(&self) -> Vec<Vec<Position>> {
        match &self.transform {
            Some(transform) => self
                .arcs
                .iter()
                .map(|arc| decode_arc_with(arc, transform))
                .collect(),
            None => self.arcs.clone(),
        }
    }

    /// Reconstructs the named object as a GeoJSON feature collection.
    ///
    /// A geometry collection yields one feature per member; any other object
    /// yields a single feature.
    pub fn to_feature_collection(&self, object: &str) -> Result<FeatureCollection> {
        let object = self.object(object)?;
        let decoder = Decoder {
            arcs: self.decoded_arcs(),
        };

        let features = match &object.geometry {
            TopoGeometry::GeometryCollection(children) => children
                .iter()
                .map(|child| decoder.feature(child))
                .collect::<Result<_>>()?,
            _ => vec![decoder.feature(object)?],
        };

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }
}

/// Decodes a single geometry object of `topology`.
///
/// Decodes every arc of the topology; use
/// [`Topology::to_feature_collection`] for whole objects.
pub fn decode_geometry(topology: &Topology, object: &GeometryObject) -> Result<Option<Geometry>> {
    Decoder {
        arcs: topology.decoded_arcs(),
    }
    .geometry(object)
}

struct Decoder {
    arcs: Vec<Vec<Position>>,
}

impl Decoder {
    fn feature(&self, object: &GeometryObject) -> Result<Feature> {
        Ok(Feature {
            bbox: None,
            geometry: self.geometry(object)?,
            id: object.id.as_ref().and_then(json_to_feature_id),
            properties: object.properties.clone(),
            foreign_members: None,
        })
    }

    fn geometry(&self, object: &GeometryObject) -> Result<Option<Geometry>> {
        let value = match &object.geometry {
            TopoGeometry::Null => return Ok(None),
            TopoGeometry::Polygon(rings) => Value::Polygon(self.polygon(rings)?),
            TopoGeometry::MultiPolygon(polygons) => Value::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| self.polygon(rings))
                    .collect::<Result<_>>()?,
            ),
            TopoGeometry::GeometryCollection(children) => Value::GeometryCollection(
                children
                    .iter()
                    .filter_map(|child| self.geometry(child).transpose())
                    .collect::<Result<_>>()?,
            ),
        };
        Ok(Some(Geometry::new(value)))
    }

    fn polygon(&self, rings: &[Vec<ArcIndex>]) -> Result<Vec<Vec<Vec<f64>>>> {
        rings.iter().map(|ring| self.ring(ring)).collect()
    }

    fn ring(&self, indices: &[ArcIndex]) -> Result<Vec<Vec<f64>>> {
        let mut points: Vec<Vec<f64>> = Vec::new();
        for &index in indices {
            let (arc, reversed) = resolve_arc_index(index);
            let arc = self.arcs.get(arc).ok_or(Error::ArcOutOfRange(index))?;
            let skip = usize::from(!points.is_empty());
            if reversed {
                points.extend(arc.iter().rev().skip(skip).map(|p| p.to_vec()));
            } else {
                points.extend(arc.iter().skip(skip).map(|p| p.to_vec()));
            }
        }
        Ok(points)
    }
}

fn json_to_feature_id(id: &serde_json::Value) -> Option<Id> {
    match id {
        serde_json::Value::String(s) => Some(Id::String(s.clone())),
        serde_json::Value::Number(n) => Some(Id::Number(n.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transform;
    use indexmap::IndexMap;
    use serde_json::json;

    fn topology(geometry: TopoGeometry, arcs: Vec<Vec<Position>>, transform: Option<Transform>) -> Topology {
        let mut objects = IndexMap::new();
        objects.insert(
            "o".to_string(),
            GeometryObject {
                geometry,
                id: Some(json!("A")),
                properties: None,
            },
        );
        Topology {
            bbox: None,
            transform,
            objects,
            arcs,
            properties: None,
        }
    }

    #[test]
    fn absolute_arcs_without_transform() {
        let t = topology(
            TopoGeometry::Polygon(vec![vec![0]]),
            vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]],
            None,
        );
        let collection = t.to_feature_collection("o").unwrap();
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].id, Some(Id::String("A".to_string())));
        assert_eq!(
            collection.features[0].geometry.as_ref().unwrap().value,
            Value::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.0, 0.0]
            ]])
        );
    }

    #[test]
    fn reversed_arcs_and_shared_endpoints() {
        // Arc 0 runs (0,0) → (2,0); arc 1 runs (0,0) → (0,2) → (2,0).
        let arcs = vec![
            vec![[0.0, 0.0], [2.0, 0.0]],
            vec![[0.0, 0.0], [0.0, 2.0], [2.0, -2.0]],
        ];
        let t = topology(
            TopoGeometry::Polygon(vec![vec![0, !1]]),
            arcs,
            Some(Transform::IDENTITY),
        );
        let geometry = decode_geometry(&t, t.object("o").unwrap()).unwrap().unwrap();
        assert_eq!(
            geometry.value,
            Value::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![2.0, 0.0],
                vec![0.0, 2.0],
                vec![0.0, 0.0]
            ]])
        );
    }

    #[test]
    fn transform_is_applied() {
        let t = topology(
            TopoGeometry::Polygon(vec![vec![0]]),
            vec![vec![[1.0, 1.0], [1.0, 0.0], [-1.0, -1.0]]],
            Some(Transform {
                scale: [10.0, 0.5],
                translate: [100.0, 200.0],
            }),
        );
        assert_eq!(
            t.decoded_arcs(),
            vec![vec![[110.0, 200.5], [120.0, 200.5], [110.0, 200.0]]]
        );
    }

    #[test]
    fn null_geometry_decodes_to_none() {
        let t = topology(TopoGeometry::Null, vec![], None);
        let collection = t.to_feature_collection("o").unwrap();
        assert!(collection.features[0].geometry.is_none());
    }

    #[test]
    fn out_of_range_arc() {
        let t = topology(TopoGeometry::Polygon(vec![vec![3]]), vec![], None);
        assert!(matches!(
            t.to_feature_collection("o"),
            Err(Error::ArcOutOfRange(3))
        ));
        assert!(matches!(
            t.to_feature_collection("missing"),
            Err(Error::ObjectNotFound(_))
        ));
    }
}
