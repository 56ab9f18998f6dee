// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouping of tiles by region.

use indexmap::IndexMap;

use crate::model::{Dataset, RegionId, Tile};

/// Region id → tiles of that region, `None` for dataset regions without
/// tiles. Iteration order is insertion order.
pub type Aggregation<'a> = IndexMap<RegionId, Option<Vec<&'a Tile>>>;

/// Groups `tiles` by region and reconciles the result against `dataset`.
///
/// Tile ids come first, in the order they are first seen, with each list in
/// input tile order. Dataset regions that received no tile are appended
/// afterwards in dataset order, mapped to `None`. Regions that only appear in
/// `tiles` are kept; resolving their metric is the caller's concern.
pub fn aggregate<'a>(tiles: &'a [Tile], dataset: &Dataset) -> Aggregation<'a> {
    let mut regions: Aggregation<'a> = IndexMap::new();

    for tile in tiles {
        regions
            .entry(tile.id.clone())
            .or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
            .push(tile);
    }

    for region in dataset.regions() {
        if !regions.contains_key(region) {
            regions.insert(region.to_string(), None);
        }
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_regions_without_tiles_map_to_none() {
        let tiles = vec![Tile::new("A", 0, 0)];
        let dataset = Dataset::from_pairs([("A", 10.0), ("B", 20.0)]).unwrap();

        let regions = aggregate(&tiles, &dataset);

        let keys: Vec<&str> = regions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(regions["A"], Some(vec![&tiles[0]]));
        assert_eq!(regions["B"], None);
    }

    #[test]
    fn tile_order_is_preserved_within_region() {
        let tiles = vec![
            Tile::new("X", 2, 0),
            Tile::new("Y", 0, 1),
            Tile::new("X", 0, 0),
            Tile::new("X", 1, 0),
        ];
        let dataset = Dataset::from_pairs([("Y", 1.0), ("X", 2.0)]).unwrap();

        let regions = aggregate(&tiles, &dataset);

        // Tile ids first, in first-seen order, regardless of dataset order.
        let keys: Vec<&str> = regions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["X", "Y"]);

        let xs: Vec<i32> = regions["X"]
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.position.x)
            .collect();
        assert_eq!(xs, vec![2, 0, 1]);
    }

    #[test]
    fn regions_missing_from_dataset_are_kept() {
        let tiles = vec![Tile::new("Q", 0, 0)];
        let dataset = Dataset::from_pairs([("A", 1.0)]).unwrap();

        let regions = aggregate(&tiles, &dataset);

        let keys: Vec<&str> = regions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Q", "A"]);
    }

    #[test]
    fn empty_inputs() {
        let dataset = Dataset::default();
        assert!(aggregate(&[], &dataset).is_empty());

        let dataset = Dataset::from_pairs([("Y", 1.0)]).unwrap();
        let regions = aggregate(&[], &dataset);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions["Y"], None);
    }
}
