// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! General-purpose topology construction with shared arcs.
//!
//! [`QuantizingBuilder`] follows the usual TopoJSON pipeline:
//!
//! 1. Snap every position onto a `q × q` integer grid spanning the bounding
//!    box, dropping consecutive duplicates.
//! 2. Find junctions: points reached by different rings (or twice by the same
//!    ring) with different neighbors.
//! 3. Cut rings at junctions into arcs.
//! 4. Deduplicate arcs; an arc already stored in the opposite direction is
//!    referenced as `!index`.
//! 5. Delta-encode arcs.
//!
//! Two adjacent hexagons therefore share the arc along their common edge.

use geojson::{FeatureCollection, Value};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tilegram_core::Position;

use crate::delta::encode_arc;
use crate::encoder::{feature_id_to_json, geometry_type_name, path_positions};
use crate::error::{Error, Result};
use crate::types::{ArcIndex, GeometryObject, JsonObject, TopoArc, TopoGeometry, Topology, Transform};

/// What to keep from a feature's properties on its geometry object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyTransform {
    /// Copy the feature's `properties` object verbatim.
    #[default]
    KeepProperties,
    /// Emit geometry objects without properties.
    Drop,
}

/// Options for [`TopologyBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub property_transform: PropertyTransform,
    /// Number of grid steps per axis. `None` keeps absolute coordinates and
    /// emits no transform.
    pub quantization: Option<u64>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            property_transform: PropertyTransform::KeepProperties,
            quantization: Some(10_000),
        }
    }
}

/// Turns named feature collections into a topology.
pub trait TopologyBuilder {
    fn build(
        &self,
        objects: &IndexMap<String, FeatureCollection>,
        options: &BuildOptions,
    ) -> Result<Topology>;
}

/// Default [`TopologyBuilder`]: quantization plus shared-arc extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantizingBuilder;

impl TopologyBuilder for QuantizingBuilder {
    fn build(
        &self,
        objects: &IndexMap<String, FeatureCollection>,
        options: &BuildOptions,
    ) -> Result<Topology> {
        if let Some(q) = options.quantization {
            if q < 2 {
                return Err(Error::InvalidOptions(format!(
                    "quantization must be at least 2, got {q}"
                )));
            }
        }

        let mut plan = Plan::default();
        let planned_objects = objects
            .iter()
            .map(|(name, collection)| -> Result<_> {
                Ok((name.clone(), plan.add_collection(collection, options)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let bbox = plan.bbox();
        let transform = match (options.quantization, bbox) {
            (Some(q), Some(bbox)) => Some(plan.quantize(q, bbox)),
            (Some(_), None) => Some(Transform::IDENTITY),
            (None, _) => None,
        };

        let junctions = find_junctions(&plan.rings);
        let mut arcs = ArcTable::default();
        let ring_arcs: Vec<Vec<ArcIndex>> = plan
            .rings
            .iter()
            .map(|ring| cut_ring(ring, &junctions, &mut arcs))
            .collect();

        let arcs: Vec<TopoArc> = if transform.is_some() {
            arcs.arcs.iter().map(|arc| encode_arc(arc)).collect()
        } else {
            arcs.arcs
        };

        tracing::debug!(
            objects = planned_objects.len(),
            rings = ring_arcs.len(),
            junctions = junctions.len(),
            arcs = arcs.len(),
            "built shared-arc topology"
        );

        let objects = planned_objects
            .into_iter()
            .map(|(name, geometries)| {
                let geometries = geometries
                    .into_iter()
                    .map(|planned| planned.resolve(&ring_arcs))
                    .collect();
                (
                    name,
                    GeometryObject::new(TopoGeometry::GeometryCollection(geometries)),
                )
            })
            .collect();

        Ok(Topology {
            bbox,
            transform,
            objects,
            arcs,
            properties: None,
        })
    }
}

/// A feature whose rings are referenced by position in [`Plan::rings`].
struct PlannedGeometry {
    id: Option<serde_json::Value>,
    properties: Option<JsonObject>,
    shape: PlannedShape,
}

enum PlannedShape {
    Null,
    Polygon(Vec<usize>),
    MultiPolygon(Vec<Vec<usize>>),
}

impl PlannedGeometry {
    fn resolve(self, ring_arcs: &[Vec<ArcIndex>]) -> GeometryObject {
        let rings = |ids: Vec<usize>| -> Vec<Vec<ArcIndex>> {
            ids.into_iter().map(|r| ring_arcs[r].clone()).collect()
        };
        let geometry = match self.shape {
            PlannedShape::Null => TopoGeometry::Null,
            PlannedShape::Polygon(ids) => TopoGeometry::Polygon(rings(ids)),
            PlannedShape::MultiPolygon(polygons) => {
                TopoGeometry::MultiPolygon(polygons.into_iter().map(rings).collect())
            }
        };
        GeometryObject {
            geometry,
            id: self.id,
            properties: self.properties,
        }
    }
}

/// All rings of the input, flattened, plus the features referencing them.
#[derive(Default)]
struct Plan {
    rings: Vec<Vec<Position>>,
    features: usize,
}

impl Plan {
    fn add_collection(
        &mut self,
        collection: &FeatureCollection,
        options: &BuildOptions,
    ) -> Result<Vec<PlannedGeometry>> {
        collection
            .features
            .iter()
            .map(|feature| -> Result<PlannedGeometry> {
                let index = self.features;
                self.features += 1;
                let shape = match &feature.geometry {
                    None => PlannedShape::Null,
                    Some(geometry) => match &geometry.value {
                        Value::Polygon(rings) => {
                            PlannedShape::Polygon(self.add_rings(index, rings)?)
                        }
                        Value::MultiPolygon(polygons) => PlannedShape::MultiPolygon(
                            polygons
                                .iter()
                                .map(|rings| self.add_rings(index, rings))
                                .collect::<Result<_>>()?,
                        ),
                        other => {
                            return Err(Error::UnsupportedGeometry {
                                feature: index,
                                reason: format!("{} geometry", geometry_type_name(other)),
                            })
                        }
                    },
                };
                let properties = match options.property_transform {
                    PropertyTransform::KeepProperties => feature.properties.clone(),
                    PropertyTransform::Drop => None,
                };
                Ok(PlannedGeometry {
                    id: feature.id.as_ref().map(feature_id_to_json),
                    properties,
                    shape,
                })
            })
            .collect()
    }

    fn add_rings(&mut self, index: usize, rings: &[Vec<Vec<f64>>]) -> Result<Vec<usize>> {
        rings
            .iter()
            .map(|ring| -> Result<usize> {
                let mut points = path_positions(index, ring)?;
                if points.first() != points.last() {
                    points.push(points[0]);
                }
                self.rings.push(points);
                Ok(self.rings.len() - 1)
            })
            .collect()
    }

    /// `[min_x, min_y, max_x, max_y]` over all points, `None` if there are none.
    fn bbox(&self) -> Option<[f64; 4]> {
        let mut points = self.rings.iter().flatten();
        let first = points.next()?;
        Some(points.fold([first[0], first[1], first[0], first[1]], |b, p| {
            [b[0].min(p[0]), b[1].min(p[1]), b[2].max(p[0]), b[3].max(p[1])]
        }))
    }

    /// Snaps all rings onto the quantization grid and returns the transform
    /// that maps grid positions back.
    fn quantize(&mut self, q: u64, bbox: [f64; 4]) -> Transform {
        let steps = (q - 1) as f64;
        let kx = if bbox[2] > bbox[0] { steps / (bbox[2] - bbox[0]) } else { 1.0 };
        let ky = if bbox[3] > bbox[1] { steps / (bbox[3] - bbox[1]) } else { 1.0 };

        for ring in &mut self.rings {
            let original_len = ring.len();
            let mut quantized: Vec<Position> = Vec::with_capacity(original_len);
            for p in ring.iter() {
                // + 0.0 turns -0.0 into 0.0 so equal points hash equally.
                let qp = [
                    ((p[0] - bbox[0]) * kx).round() + 0.0,
                    ((p[1] - bbox[1]) * ky).round() + 0.0,
                ];
                if quantized.last() != Some(&qp) {
                    quantized.push(qp);
                }
            }
            // Collapsed rings keep four points so they stay valid rings.
            while quantized.len() < 4 && original_len >= 4 {
                quantized.push(quantized[0]);
            }
            *ring = quantized;
        }

        Transform {
            scale: [1.0 / kx, 1.0 / ky],
            translate: [bbox[0], bbox[1]],
        }
    }
}

type PointKey = (u64, u64);

fn key(p: &Position) -> PointKey {
    (p[0].to_bits(), p[1].to_bits())
}

/// Open vertex list of a closed ring (closing point dropped).
fn open(ring: &[Position]) -> &[Position] {
    match ring {
        [first, rest @ .., last] if first == last && !rest.is_empty() => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Points where two rings meet and then diverge.
fn find_junctions(rings: &[Vec<Position>]) -> FxHashSet<PointKey> {
    let mut neighbors: FxHashMap<PointKey, (PointKey, PointKey)> = FxHashMap::default();
    let mut junctions = FxHashSet::default();

    for ring in rings {
        let points = open(ring);
        let n = points.len();
        if n < 3 {
            continue;
        }
        for i in 0..n {
            let here = key(&points[i]);
            let previous = key(&points[(i + n - 1) % n]);
            let next = key(&points[(i + 1) % n]);
            match neighbors.get(&here) {
                None => {
                    neighbors.insert(here, (previous, next));
                }
                Some(&(p, q)) => {
                    let same = (p == previous && q == next) || (p == next && q == previous);
                    if !same {
                        junctions.insert(here);
                    }
                }
            }
        }
    }

    junctions
}

/// Deduplicated arcs in absolute (quantized) coordinates.
#[derive(Default)]
struct ArcTable {
    arcs: Vec<TopoArc>,
    index: FxHashMap<Vec<PointKey>, usize>,
}

impl ArcTable {
    /// Returns the index of `arc`, reusing an equal or reversed arc.
    fn intern(&mut self, arc: Vec<Position>) -> ArcIndex {
        let forward: Vec<PointKey> = arc.iter().map(key).collect();
        if let Some(&i) = self.index.get(&forward) {
            return i as ArcIndex;
        }
        let backward: Vec<PointKey> = forward.iter().rev().copied().collect();
        if let Some(&i) = self.index.get(&backward) {
            return !(i as ArcIndex);
        }
        let i = self.arcs.len();
        self.arcs.push(arc);
        self.index.insert(forward, i);
        i as ArcIndex
    }
}

/// Splits a closed ring at its junctions and interns the pieces.
fn cut_ring(
    ring: &[Position],
    junctions: &FxHashSet<PointKey>,
    arcs: &mut ArcTable,
) -> Vec<ArcIndex> {
    let points = open(ring);
    let cuts: SmallVec<[usize; 8]> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| junctions.contains(&key(p)))
        .map(|(i, _)| i)
        .collect();

    if cuts.is_empty() || points.len() < 3 {
        return vec![arcs.intern(ring.to_vec())];
    }

    // Rotate so the ring starts (and, closed again, ends) on a junction.
    let start = cuts[0];
    let n = points.len();
    let rotated: Vec<Position> = (0..=n).map(|i| points[(start + i) % n]).collect();

    let mut indices = Vec::with_capacity(cuts.len());
    let mut from = 0;
    for cut in cuts.iter().skip(1).copied().chain(std::iter::once(start + n)) {
        let to = cut - start;
        indices.push(arcs.intern(rotated[from..=to].to_vec()));
        from = to;
    }
    indices
}
