// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Tilegram Core
//!
//! Data model shared by the tilegram exporters: hexagon tiles assigned to
//! regions, the dataset listing every region expected in an export, and the
//! collaborators that turn grid offsets into pixel geometry and region codes
//! into display names.
//!
//! The pipeline starts with [`aggregate`], which groups tiles per region, and
//! [`build_region_geometry`], which turns each group into one closed hexagon
//! ring per tile. Rings are never merged: a region covering several tiles
//! becomes a multi-part geometry.

pub mod aggregate;
pub mod error;
pub mod geography;
pub mod grid;
pub mod model;
pub mod ring;

pub use aggregate::{aggregate, Aggregation};
pub use error::{Error, LookupTable, Result};
pub use geography::{GeoCodeTable, GeographyResource, GeographyTable, RegionInfo};
pub use grid::{GridGeometry, HexGrid, TileDimensions};
pub use model::{Dataset, DatasetEntry, MetricIndex, MetricValue, RegionId, Tile, TilePosition};
pub use ring::{build_region_geometry, build_ring, max_tile_y, Position, RegionGeometry, Ring};

// Re-export nalgebra types used by the grid trait
pub use nalgebra::{Point2, Vector2};
