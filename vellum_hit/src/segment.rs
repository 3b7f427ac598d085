// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proximity tests for discrete anchor points (segments, handles).

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

use crate::{HitKind, HitParams, HitScore};

/// Test a query point against a set of candidate anchor points.
///
/// Returns the index of the closest candidate within
/// [`HitParams::tolerance`] together with its score, or `None` when every
/// candidate is out of reach. Ties go to the earlier candidate, which is why
/// callers order candidates by their fixed check priority.
pub fn nearest_point(
    candidates: impl IntoIterator<Item = Point>,
    pt: Point,
    kind: HitKind,
    params: &HitParams,
) -> Option<(usize, HitScore)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.into_iter().enumerate() {
        let dist = candidate.distance(pt);
        if dist <= params.tolerance && best.is_none_or(|(_, b)| dist < b) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, distance)| (i, HitScore { distance, kind }))
}
