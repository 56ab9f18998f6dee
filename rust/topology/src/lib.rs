// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Tilegram Topology
//!
//! TopoJSON output for tilegrams.
//!
//! Two encoders are provided:
//!
//! - [`TopoJsonExporter::export`] assembles region features and hands them to
//!   a [`TopologyBuilder`] (by default [`QuantizingBuilder`], which quantizes
//!   coordinates and shares arcs between adjacent hexagons), then attaches
//!   export metadata.
//! - [`encode`] is the minimal delta encoder: one arc per coordinate path,
//!   identity transform, no deduplication. It accepts any polygonal GeoJSON.
//!
//! [`Topology::to_feature_collection`] turns either output back into GeoJSON.

pub mod builder;
pub mod decode;
pub mod delta;
pub mod encoder;
pub mod error;
pub mod export;
pub mod features;
mod number;
pub mod types;

pub use builder::{BuildOptions, PropertyTransform, QuantizingBuilder, TopologyBuilder};
pub use decode::decode_geometry;
pub use delta::{decode_arc, decode_arc_with, encode_arc};
pub use encoder::encode;
pub use error::{Error, Result};
pub use export::{
    ExportConfig, ExportMetadata, TopoJsonExporter, DEFAULT_OBJECT_ID, DEFAULT_QUANTIZATION,
};
pub use features::build_feature_collection;
pub use types::{
    resolve_arc_index, ArcIndex, GeometryObject, JsonObject, TopoArc, TopoGeometry, Topology,
    Transform,
};
