// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON numbers the way TopoJSON consumers expect them: integral values are
//! written without a fractional part (`3`, not `3.0`).

use serde::{Serialize, Serializer};
use tilegram_core::Position;

/// Largest magnitude below which every integral f64 is an exact i64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// An f64 that serializes as an integer when it has no fractional part.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JsNumber(pub f64);

impl Serialize for JsNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.fract() == 0.0 && v.abs() < MAX_SAFE_INTEGER {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

/// Converts an f64 into a JSON value with the same integer rule.
pub(crate) fn json_number(v: f64) -> serde_json::Value {
    if v.fract() == 0.0 && v.abs() < MAX_SAFE_INTEGER {
        serde_json::Value::from(v as i64)
    } else {
        serde_json::Value::from(v)
    }
}

struct PointSer<'a>(&'a Position);

impl Serialize for PointSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [JsNumber(self.0[0]), JsNumber(self.0[1])].serialize(serializer)
    }
}

struct ArcSer<'a>(&'a [Position]);

impl Serialize for ArcSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(PointSer))
    }
}

pub(crate) fn serialize_number<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    JsNumber(*v).serialize(serializer)
}

pub(crate) fn serialize_pair<S: Serializer>(pair: &Position, serializer: S) -> Result<S::Ok, S::Error> {
    PointSer(pair).serialize(serializer)
}

pub(crate) fn serialize_arcs<S: Serializer>(
    arcs: &[Vec<Position>],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(arcs.iter().map(|arc| ArcSer(arc)))
}

pub(crate) fn serialize_bbox<S: Serializer>(
    bbox: &Option<[f64; 4]>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match bbox {
        Some(b) => serializer.collect_seq(b.iter().map(|v| JsNumber(*v))),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_have_no_fraction() {
        assert_eq!(serde_json::to_string(&JsNumber(3.0)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&JsNumber(-0.0)).unwrap(), "0");
        assert_eq!(serde_json::to_string(&JsNumber(-12.0)).unwrap(), "-12");
        assert_eq!(serde_json::to_string(&JsNumber(0.25)).unwrap(), "0.25");
    }

    #[test]
    fn arcs_serialize_as_nested_arrays() {
        let arcs = vec![vec![[1.0, 2.0], [0.5, -1.0]], vec![[3.0, 4.0]]];
        let mut out = Vec::new();
        serialize_arcs(&arcs, &mut serde_json::Serializer::new(&mut out)).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[[[1,2],[0.5,-1]],[[3,4]]]"
        );
    }

    #[test]
    fn json_number_values() {
        assert_eq!(json_number(5.0), serde_json::json!(5));
        assert_eq!(json_number(2.5), serde_json::json!(2.5));
    }
}
