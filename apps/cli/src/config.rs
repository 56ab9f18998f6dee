// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use tilegram_topology::{ExportConfig, DEFAULT_OBJECT_ID, DEFAULT_QUANTIZATION};

/// Default hexagon circumradius in pixels.
pub const DEFAULT_HEX_SIZE: f64 = 10.0;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name of the exported geometry collection.
    pub object_id: String,
    /// Quantization steps handed to the topology builder.
    pub quantization: u64,
    /// Hexagon circumradius in pixels.
    pub hex_size: f64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; unset or unparsable values fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            object_id: lookup("TILEGRAM_OBJECT_ID")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_OBJECT_ID.into()),
            quantization: lookup("TILEGRAM_QUANTIZATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_QUANTIZATION),
            hex_size: lookup("TILEGRAM_HEX_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|r: &f64| r.is_finite() && *r > 0.0)
                .unwrap_or(DEFAULT_HEX_SIZE),
        }
    }

    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            object_id: self.object_id.clone(),
            quantization: self.quantization,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
