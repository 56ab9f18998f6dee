// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delta coding of point sequences.
//!
//! The first point of an encoded arc is absolute; every later point is the
//! displacement from the previous original point. Decoding is a running sum
//! taken in the same left-to-right order.

use tilegram_core::Position;

use crate::types::Transform;

/// Delta-encodes `path`. The output has exactly as many points as the input.
pub fn encode_arc(path: &[Position]) -> Vec<Position> {
    let mut arc = Vec::with_capacity(path.len());
    if let Some(first) = path.first() {
        arc.push(*first);
    }
    arc.extend(
        path.windows(2)
            .map(|w| [w[1][0] - w[0][0], w[1][1] - w[0][1]]),
    );
    arc
}

/// Reconstructs absolute points from a delta-encoded arc.
pub fn decode_arc(arc: &[Position]) -> Vec<Position> {
    let mut x = 0.0;
    let mut y = 0.0;
    arc.iter()
        .map(|d| {
            x += d[0];
            y += d[1];
            [x, y]
        })
        .collect()
}

/// Decodes a delta-encoded arc and maps it through `transform`.
pub fn decode_arc_with(arc: &[Position], transform: &Transform) -> Vec<Position> {
    let mut x = 0.0;
    let mut y = 0.0;
    arc.iter()
        .map(|d| {
            x += d[0];
            y += d[1];
            transform.apply([x, y])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn displacements_are_relative_to_previous_point() {
        let path = [[10.0, 10.0], [12.0, 10.0], [13.0, 12.0], [10.0, 10.0]];
        assert_eq!(
            encode_arc(&path),
            vec![[10.0, 10.0], [2.0, 0.0], [1.0, 2.0], [-3.0, -2.0]]
        );
    }

    #[test]
    fn point_count_is_preserved() {
        assert!(encode_arc(&[]).is_empty());
        assert_eq!(encode_arc(&[[1.0, 2.0]]), vec![[1.0, 2.0]]);
        assert_eq!(encode_arc(&[[1.0, 2.0], [1.0, 2.0]]).len(), 2);
    }

    #[test]
    fn integer_round_trip_is_exact() {
        let path = [[0.0, 0.0], [5.0, -3.0], [5.0, 7.0], [-2.0, 4.0], [0.0, 0.0]];
        assert_eq!(decode_arc(&encode_arc(&path)), path.to_vec());
    }

    #[test]
    fn decode_with_transform() {
        let transform = Transform {
            scale: [0.5, 2.0],
            translate: [10.0, -1.0],
        };
        let decoded = decode_arc_with(&[[2.0, 1.0], [2.0, 1.0]], &transform);
        assert_eq!(decoded, vec![[11.0, 1.0], [12.0, 3.0]]);

        let identity = decode_arc_with(&[[2.0, 1.0], [2.0, 1.0]], &Transform::IDENTITY);
        assert_eq!(identity, vec![[2.0, 1.0], [4.0, 2.0]]);
    }

    proptest! {
        #[test]
        fn integer_paths_round_trip(
            path in prop::collection::vec((-100_000i32..100_000, -100_000i32..100_000), 2..64)
        ) {
            let path: Vec<Position> = path.into_iter().map(|(x, y)| [x as f64, y as f64]).collect();
            let arc = encode_arc(&path);
            prop_assert_eq!(arc.len(), path.len());
            prop_assert_eq!(decode_arc(&arc), path);
        }

        #[test]
        fn float_paths_round_trip(
            path in prop::collection::vec((-1.0e4f64..1.0e4, -1.0e4f64..1.0e4), 2..64)
        ) {
            let path: Vec<Position> = path.into_iter().map(|(x, y)| [x, y]).collect();
            let decoded = decode_arc(&encode_arc(&path));
            for (a, b) in decoded.iter().zip(&path) {
                assert_relative_eq!(a[0], b[0], epsilon = 1e-6);
                assert_relative_eq!(a[1], b[1], epsilon = 1e-6);
            }
        }
    }
}
