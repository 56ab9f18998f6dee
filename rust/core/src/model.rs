// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tiles and datasets.
//!
//! Tiles come out of the grid layout process and are never mutated here. A
//! dataset is the authoritative list of regions an export must contain,
//! whether or not any tile was assigned to them.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, LookupTable, Result};

/// Stable region code, e.g. a state abbreviation or FIPS code.
pub type RegionId = String;

/// Metric value attached to a region by the dataset.
pub type MetricValue = f64;

/// Offset coordinate of a tile in the hexagon grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
}

impl TilePosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One hexagon cell, assigned to exactly one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: RegionId,
    pub position: TilePosition,
}

impl Tile {
    pub fn new(id: impl Into<RegionId>, x: i32, y: i32) -> Self {
        Self {
            id: id.into(),
            position: TilePosition::new(x, y),
        }
    }
}

/// A `(region, value)` pair. Serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(RegionId, MetricValue)", into = "(RegionId, MetricValue)")]
pub struct DatasetEntry {
    pub region: RegionId,
    pub value: MetricValue,
}

impl From<(RegionId, MetricValue)> for DatasetEntry {
    fn from((region, value): (RegionId, MetricValue)) -> Self {
        Self { region, value }
    }
}

impl From<DatasetEntry> for (RegionId, MetricValue) {
    fn from(entry: DatasetEntry) -> Self {
        (entry.region, entry.value)
    }
}

/// Ordered list of region metrics with unique region ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DatasetEntry>", into = "Vec<DatasetEntry>")]
pub struct Dataset {
    entries: Vec<DatasetEntry>,
}

impl Dataset {
    /// Builds a dataset, rejecting repeated region ids.
    pub fn new(entries: Vec<DatasetEntry>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for entry in &entries {
            if !seen.insert(entry.region.as_str()) {
                return Err(Error::DuplicateRegion(entry.region.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Convenience constructor from `(id, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, MetricValue)>,
        S: Into<RegionId>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(region, value)| DatasetEntry {
                    region: region.into(),
                    value,
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Region ids in dataset order.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.region.as_str())
    }

    /// Builds a region → value index for repeated lookups.
    pub fn metric_index(&self) -> MetricIndex<'_> {
        MetricIndex {
            values: self
                .entries
                .iter()
                .map(|e| (e.region.as_str(), e.value))
                .collect(),
        }
    }
}

impl TryFrom<Vec<DatasetEntry>> for Dataset {
    type Error = Error;

    fn try_from(entries: Vec<DatasetEntry>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<Dataset> for Vec<DatasetEntry> {
    fn from(dataset: Dataset) -> Self {
        dataset.entries
    }
}

/// Hash index over a dataset's metric values.
#[derive(Debug)]
pub struct MetricIndex<'a> {
    values: FxHashMap<&'a str, MetricValue>,
}

impl MetricIndex<'_> {
    /// Returns the metric for `region`, failing with a lookup error.
    pub fn get(&self, region: &str) -> Result<MetricValue> {
        self.values.get(region).copied().ok_or_else(|| Error::Lookup {
            region: region.to_string(),
            table: LookupTable::Dataset,
        })
    }
}
