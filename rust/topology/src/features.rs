// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region features: one GeoJSON feature per aggregated region.

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, Value};
use tilegram_core::{
    aggregate, build_region_geometry, max_tile_y, Dataset, GeographyResource, GridGeometry,
    RegionGeometry, Ring, Tile,
};

use crate::error::Result;
use crate::number::json_number;
use crate::types::JsonObject;

/// Builds the feature collection of a tile set.
///
/// Features follow aggregation order. Each carries the region name from
/// `geography` and its dataset metric as `tilegramValue`; the first region
/// missing from either aborts the build.
pub fn build_feature_collection<G, R>(
    grid: &G,
    geography_resource: &R,
    tiles: &[Tile],
    dataset: &Dataset,
    geography: &str,
) -> Result<FeatureCollection>
where
    G: GridGeometry + ?Sized,
    R: GeographyResource + ?Sized,
{
    let regions = aggregate(tiles, dataset);
    let metrics = dataset.metric_index();
    // With no tiles every region is empty and max_y is never used.
    let max_y = max_tile_y(tiles).unwrap_or(0);

    let features = regions
        .iter()
        .map(|(region, region_tiles)| -> Result<Feature> {
            let name = geography_resource.region_name(geography, region)?;
            let value = metrics.get(region)?;

            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), name.into());
            properties.insert("tilegramValue".to_string(), json_number(value));

            let geometry = build_region_geometry(grid, region_tiles.as_deref(), max_y);
            Ok(Feature {
                bbox: None,
                geometry: region_geometry_to_geojson(geometry),
                id: Some(Id::String(region.clone())),
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn region_geometry_to_geojson(geometry: RegionGeometry) -> Option<Geometry> {
    let value = match geometry {
        RegionGeometry::Empty => return None,
        RegionGeometry::Single(ring) => Value::Polygon(vec![ring_coordinates(ring)]),
        RegionGeometry::Multi(rings) => Value::MultiPolygon(
            rings
                .into_iter()
                .map(|ring| vec![ring_coordinates(ring)])
                .collect(),
        ),
    };
    Some(Geometry::new(value))
}

fn ring_coordinates(ring: Ring) -> Vec<Vec<f64>> {
    ring.into_points().into_iter().map(|p| p.to_vec()).collect()
}
