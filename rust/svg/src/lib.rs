// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Tilegram SVG
//!
//! Renders a tile set as a flat SVG image: one `<g>` per region, holding one
//! closed `<path>` per tile, filled with the region's color.
//!
//! Rows are laid out top to bottom in SVG's y-down space, so no flip is
//! applied. The view box is the bounding box of all hexagon corners, grown
//! by the configured padding.

pub mod error;

use std::io::Write;

use tilegram_core::{aggregate, Dataset, GridGeometry, Point2, Tile};

pub use error::{Error, Result};

/// Rendering options.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Space added around the tiles on every side.
    pub padding: f64,
    /// Outline color of each tile; `None` draws no outline.
    pub stroke: Option<String>,
    pub stroke_width: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            padding: 0.0,
            stroke: None,
            stroke_width: 1.0,
        }
    }
}

/// Renders tile sets with a grid collaborator.
pub struct SvgExporter<G> {
    grid: G,
    options: SvgOptions,
}

impl<G: GridGeometry> SvgExporter<G> {
    pub fn new(grid: G) -> Self {
        Self::with_options(grid, SvgOptions::default())
    }

    pub fn with_options(grid: G, options: SvgOptions) -> Self {
        Self { grid, options }
    }

    pub fn options(&self) -> &SvgOptions {
        &self.options
    }

    /// Renders `tiles` as a complete SVG document.
    ///
    /// Regions appear in first-seen tile order; `color` maps a region id to a
    /// fill value.
    pub fn render<F>(&self, tiles: &[Tile], color: F) -> String
    where
        F: Fn(&str) -> String,
    {
        let regions = aggregate(tiles, &Dataset::default());
        let polygons: Vec<(&str, Vec<Vec<Point2<f64>>>)> = regions
            .iter()
            .map(|(region, region_tiles)| {
                let hexagons = region_tiles
                    .iter()
                    .flatten()
                    .map(|tile| {
                        let center = self.grid.tile_center_point(tile.position);
                        self.grid.points_around(center)
                    })
                    .collect();
                (region.as_str(), hexagons)
            })
            .collect();

        let [min_x, min_y, max_x, max_y] = bounds(polygons.iter().flat_map(|(_, h)| h.iter().flatten()))
            .map(|[x0, y0, x1, y1]| {
                let p = self.options.padding;
                [x0 - p, y0 - p, x1 + p, y1 + p]
            })
            .unwrap_or([0.0; 4]);
        let width = max_x - min_x;
        let height = max_y - min_y;

        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">
"#,
            number(width),
            number(height),
            number(min_x),
            number(min_y),
            number(width),
            number(height),
        ));

        let stroke = match &self.options.stroke {
            Some(stroke) => format!(
                r#" stroke="{}" stroke-width="{}""#,
                escape(stroke),
                number(self.options.stroke_width)
            ),
            None => String::new(),
        };

        for (region, hexagons) in &polygons {
            let fill = escape(&color(region));
            svg.push_str(&format!("<g id=\"{}\">\n", escape(region)));
            for hexagon in hexagons {
                svg.push_str(&format!(
                    "<path d=\"{}\" fill=\"{fill}\"{stroke}/>\n",
                    path_data(hexagon)
                ));
            }
            svg.push_str("</g>\n");
        }
        svg.push_str("</svg>\n");

        tracing::debug!(
            tiles = tiles.len(),
            regions = polygons.len(),
            bytes = svg.len(),
            "rendered svg"
        );
        svg
    }

    /// Renders `tiles` into `out`.
    pub fn write_to<W, F>(&self, tiles: &[Tile], color: F, mut out: W) -> Result<()>
    where
        W: Write,
        F: Fn(&str) -> String,
    {
        out.write_all(self.render(tiles, color).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

fn bounds<'a>(points: impl Iterator<Item = &'a Point2<f64>>) -> Option<[f64; 4]> {
    points.fold(None, |acc, p| {
        Some(match acc {
            None => [p.x, p.y, p.x, p.y],
            Some([x0, y0, x1, y1]) => [x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)],
        })
    })
}

/// `M x,y L x,y ... Z` for a closed polygon.
fn path_data(points: &[Point2<f64>]) -> String {
    let mut d = String::with_capacity(points.len() * 16);
    for (i, p) in points.iter().enumerate() {
        d.push(if i == 0 { 'M' } else { 'L' });
        d.push_str(&number(p.x));
        d.push(',');
        d.push_str(&number(p.y));
    }
    if !points.is_empty() {
        d.push('Z');
    }
    d
}

/// Coordinate text with at most three decimals and no trailing zeros.
fn number(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0 + 0.0;
    format!("{rounded}")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegram_core::{HexGrid, TileDimensions, TilePosition, Vector2};

    /// Unit squares at integer offsets.
    struct SquareGrid;

    impl GridGeometry for SquareGrid {
        fn tile_center_point(&self, position: TilePosition) -> Point2<f64> {
            Point2::new(position.x as f64 + 0.5, position.y as f64 + 0.5)
        }

        fn points_around(&self, center: Point2<f64>) -> Vec<Point2<f64>> {
            [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)]
                .iter()
                .map(|&(dx, dy)| center + Vector2::new(dx, dy))
                .collect()
        }

        fn tile_dimensions(&self) -> TileDimensions {
            TileDimensions {
                width: 1.0,
                height: 1.0,
            }
        }
    }

    #[test]
    fn groups_paths_by_region() {
        let tiles = vec![
            Tile::new("A", 0, 0),
            Tile::new("B", 1, 0),
            Tile::new("A", 0, 1),
        ];
        let svg = SvgExporter::new(SquareGrid).render(&tiles, |region| {
            if region == "A" { "#f00".to_string() } else { "blue".to_string() }
        });

        assert_eq!(
            svg,
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2" viewBox="0 0 2 2">"#,
                "\n",
                "<g id=\"A\">\n",
                "<path d=\"M0,0L1,0L1,1L0,1Z\" fill=\"#f00\"/>\n",
                "<path d=\"M0,1L1,1L1,2L0,2Z\" fill=\"#f00\"/>\n",
                "</g>\n",
                "<g id=\"B\">\n",
                "<path d=\"M1,0L2,0L2,1L1,1Z\" fill=\"blue\"/>\n",
                "</g>\n",
                "</svg>\n",
            )
        );
    }

    #[test]
    fn padding_and_stroke() {
        let exporter = SvgExporter::with_options(
            SquareGrid,
            SvgOptions {
                padding: 2.0,
                stroke: Some("#fff".to_string()),
                stroke_width: 0.5,
            },
        );
        let svg = exporter.render(&[Tile::new("A", 0, 0)], |_| "red".to_string());
        assert!(svg.contains(r#"width="5" height="5" viewBox="-2 -2 5 5""#));
        assert!(svg.contains(r##"fill="red" stroke="#fff" stroke-width="0.5"/>"##));
    }

    #[test]
    fn empty_tile_set() {
        let svg = SvgExporter::new(SquareGrid).render(&[], |_| unreachable!());
        assert_eq!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"0\" height=\"0\" viewBox=\"0 0 0 0\">\n</svg>\n"
        );
    }

    #[test]
    fn attributes_are_escaped() {
        let svg = SvgExporter::new(SquareGrid).render(&[Tile::new("A&\"B", 0, 0)], |_| "<x>".to_string());
        assert!(svg.contains(r#"<g id="A&amp;&quot;B">"#));
        assert!(svg.contains(r#"fill="&lt;x&gt;""#));
    }

    #[test]
    fn hexagons_have_six_corners() {
        let svg = SvgExporter::new(HexGrid::default()).render(&[Tile::new("A", 0, 0)], |_| "red".to_string());
        let d = svg
            .split("d=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(d.matches('L').count(), 5);
        assert!(d.starts_with('M') && d.ends_with('Z'));
        // Pointy-top hexagon of radius 10 is 20 units tall.
        assert!(svg.contains("height=\"20\""));
    }

    #[test]
    fn compact_numbers() {
        assert_eq!(number(10.0), "10");
        assert_eq!(number(8.660254037844386), "8.66");
        assert_eq!(number(-0.0001), "0");
        assert_eq!(number(-1.25), "-1.25");
    }

    #[test]
    fn write_to_buffer() {
        let mut out = Vec::new();
        SvgExporter::new(SquareGrid)
            .write_to(&[Tile::new("A", 0, 0)], |_| "red".to_string(), &mut out)
            .unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("</svg>\n"));
    }
}
