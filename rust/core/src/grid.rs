// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hexagon grid geometry.
//!
//! [`GridGeometry`] is the seam between tile offsets and pixel space. The
//! exporters never compute hexagon corners themselves; they ask the grid for
//! a tile's center and for the vertices around it, and close the ring.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::model::TilePosition;

/// Pixel size of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileDimensions {
    pub width: f64,
    pub height: f64,
}

/// Converts grid offsets into pixel geometry.
pub trait GridGeometry {
    /// Center of the tile at `position`. Rows may be negative.
    fn tile_center_point(&self, position: TilePosition) -> Point2<f64>;

    /// Polygon vertices around `center` in a fixed winding order. The
    /// returned ring is open: the first vertex is not repeated.
    fn points_around(&self, center: Point2<f64>) -> Vec<Point2<f64>>;

    /// Pixel dimensions of one tile.
    fn tile_dimensions(&self) -> TileDimensions;
}

/// Pointy-top hexagons in an odd-row offset layout: odd rows are shifted
/// right by half a tile width.
#[derive(Debug, Clone)]
pub struct HexGrid {
    radius: f64,
    corners: [Vector2<f64>; 6],
}

impl HexGrid {
    /// Creates a grid of hexagons with the given circumradius in pixels.
    pub fn new(radius: f64) -> Self {
        let half_width = radius * 3f64.sqrt() / 2.0;
        let half_radius = radius / 2.0;
        // Clockwise in screen space starting at the top corner.
        let corners = [
            Vector2::new(0.0, -radius),
            Vector2::new(half_width, -half_radius),
            Vector2::new(half_width, half_radius),
            Vector2::new(0.0, radius),
            Vector2::new(-half_width, half_radius),
            Vector2::new(-half_width, -half_radius),
        ];
        Self { radius, corners }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn width(&self) -> f64 {
        self.radius * 3f64.sqrt()
    }

    fn row_spacing(&self) -> f64 {
        self.radius * 1.5
    }
}

impl Default for HexGrid {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl GridGeometry for HexGrid {
    fn tile_center_point(&self, position: TilePosition) -> Point2<f64> {
        let width = self.width();
        // rem_euclid keeps negative rows on the right parity.
        let stagger = if position.y.rem_euclid(2) == 1 { 0.5 } else { 0.0 };
        Point2::new(
            width * (position.x as f64 + stagger) + width / 2.0,
            self.row_spacing() * position.y as f64 + self.radius,
        )
    }

    fn points_around(&self, center: Point2<f64>) -> Vec<Point2<f64>> {
        self.corners.iter().map(|offset| center + *offset).collect()
    }

    fn tile_dimensions(&self) -> TileDimensions {
        TileDimensions {
            width: self.width(),
            height: self.radius * 2.0,
        }
    }
}
