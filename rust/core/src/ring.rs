// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-tile hexagon rings and per-region geometry.
//!
//! Grid rows grow downwards while exported geometry wants row 0 at the
//! bottom, so rings are built from a vertically flipped row. The flip
//! subtracts `max_y mod 2` so that every row keeps its parity and the odd-row
//! stagger of the grid survives the flip.

use crate::grid::GridGeometry;
use crate::model::{Tile, TilePosition};

/// A 2D coordinate `[x, y]`.
pub type Position = [f64; 2];

/// A closed polygon boundary: the first point is repeated as the last.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Position>,
}

impl Ring {
    /// Closes an open vertex list by appending its first vertex.
    ///
    /// Returns `None` for an empty list.
    pub fn close(mut vertices: Vec<Position>) -> Option<Self> {
        let first = *vertices.first()?;
        vertices.push(first);
        Some(Self { points: vertices })
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Position> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Geometry of one region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    /// The region is listed but no tile was assigned to it.
    Empty,
    /// Exactly one tile.
    Single(Ring),
    /// Two or more tiles, one ring each, in tile order.
    Multi(Vec<Ring>),
}

impl RegionGeometry {
    /// Number of rings carried by this geometry.
    pub fn ring_count(&self) -> usize {
        match self {
            RegionGeometry::Empty => 0,
            RegionGeometry::Single(_) => 1,
            RegionGeometry::Multi(rings) => rings.len(),
        }
    }
}

/// Largest tile row, or `None` when there are no tiles.
pub fn max_tile_y(tiles: &[Tile]) -> Option<i32> {
    tiles.iter().map(|t| t.position.y).max()
}

/// Builds the closed hexagon ring of `tile`.
///
/// `max_y` must be the largest row over the whole tile set (see
/// [`max_tile_y`]), not just over the tiles of one region.
pub fn build_ring<G: GridGeometry + ?Sized>(grid: &G, tile: &Tile, max_y: i32) -> Ring {
    let flipped_y = (max_y - tile.position.y) - max_y.rem_euclid(2);
    let center = grid.tile_center_point(TilePosition::new(tile.position.x, flipped_y));

    let vertices: Vec<Position> = grid
        .points_around(center)
        .into_iter()
        .map(|p| [p.x, p.y])
        .collect();

    // A grid that returns no vertices yields a degenerate single-point ring.
    Ring::close(vertices).unwrap_or_else(|| Ring {
        points: vec![[center.x, center.y]; 2],
    })
}

/// Builds the geometry of one region from its tiles.
///
/// `tiles` is `None` for dataset regions without tiles.
pub fn build_region_geometry<G: GridGeometry + ?Sized>(
    grid: &G,
    tiles: Option<&[&Tile]>,
    max_y: i32,
) -> RegionGeometry {
    match tiles {
        None | Some([]) => RegionGeometry::Empty,
        Some([tile]) => RegionGeometry::Single(build_ring(grid, tile, max_y)),
        Some(tiles) => RegionGeometry::Multi(
            tiles
                .iter()
                .map(|tile| build_ring(grid, tile, max_y))
                .collect(),
        ),
    }
}
