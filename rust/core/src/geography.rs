// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region-code-to-name tables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, LookupTable, Result};
use crate::model::RegionId;

/// Display information for one region code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub name: String,
    /// Any other columns of the source table, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RegionInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Region code → display information for one geography.
pub type GeoCodeTable = IndexMap<RegionId, RegionInfo>;

/// Source of region names, keyed by geography identifier.
pub trait GeographyResource {
    /// Returns the code table of `geography`, if known.
    fn geo_code_hash(&self, geography: &str) -> Option<&GeoCodeTable>;

    /// Resolves the display name of `region` in `geography`.
    fn region_name(&self, geography: &str, region: &str) -> Result<&str> {
        let table = self
            .geo_code_hash(geography)
            .ok_or_else(|| Error::UnknownGeography(geography.to_string()))?;
        table
            .get(region)
            .map(|info| info.name.as_str())
            .ok_or_else(|| Error::Lookup {
                region: region.to_string(),
                table: LookupTable::Geography,
            })
    }
}

/// In-memory set of code tables, loadable from JSON of the shape
/// `{"<geography>": {"<code>": {"name": "..."}}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeographyTable {
    tables: IndexMap<String, GeoCodeTable>,
}

impl GeographyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a set of code tables from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Registers (or replaces) the code table of `geography`.
    pub fn insert(&mut self, geography: impl Into<String>, table: GeoCodeTable) {
        self.tables.insert(geography.into(), table);
    }

    /// Known geography identifiers in registration order.
    pub fn geographies(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl GeographyResource for GeographyTable {
    fn geo_code_hash(&self, geography: &str) -> Option<&GeoCodeTable> {
        self.tables.get(geography)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: &str = r#"{
        "United States": {
            "CA": {"name": "California", "fips": "06"},
            "NY": {"name": "New York"}
        }
    }"#;

    #[test]
    fn parse_and_lookup() {
        let geography = GeographyTable::from_json(STATES).unwrap();
        assert_eq!(
            geography.geographies().collect::<Vec<_>>(),
            vec!["United States"]
        );
        assert_eq!(
            geography.region_name("United States", "CA").unwrap(),
            "California"
        );

        let ca = &geography.geo_code_hash("United States").unwrap()["CA"];
        assert_eq!(ca.extra.get("fips"), Some(&serde_json::json!("06")));
    }

    #[test]
    fn missing_region_is_a_lookup_error() {
        let geography = GeographyTable::from_json(STATES).unwrap();
        match geography.region_name("United States", "ZZ") {
            Err(Error::Lookup { region, table }) => {
                assert_eq!(region, "ZZ");
                assert_eq!(table, LookupTable::Geography);
            }
            other => panic!("expected lookup error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_geography() {
        let mut geography = GeographyTable::new();
        let mut table = GeoCodeTable::new();
        table.insert("A".to_string(), RegionInfo::new("Alpha"));
        geography.insert("Test", table);

        assert!(matches!(
            geography.region_name("Elsewhere", "A"),
            Err(Error::UnknownGeography(ref g)) if g == "Elsewhere"
        ));
        assert_eq!(geography.region_name("Test", "A").unwrap(), "Alpha");
    }
}
