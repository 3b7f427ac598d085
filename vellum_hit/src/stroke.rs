// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke-oriented helpers for precise hit testing.
//!
//! These are small building blocks rather than a full stroke model; joins,
//! caps, and variable widths are composed by higher layers.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Line, ParamCurveNearest, Point, Rect};

use crate::{HitKind, HitParams, HitScore, PreciseHitTest};

/// A stroked line segment (centerline + half-width).
///
/// The test compares the distance from the query point to the centerline
/// against the half-width plus [`HitParams::tolerance`].
#[derive(Clone, Copy, Debug)]
pub struct StrokedLine {
    /// The centerline segment in local coordinates.
    pub line: Line,
    /// Half of the stroke width in local units.
    pub half_width: f64,
}

impl PreciseHitTest for StrokedLine {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let dist = self.line.nearest(pt, 0.0).distance_sq.sqrt();
        let limit = self.half_width + params.tolerance;
        (dist <= limit).then_some(HitScore {
            distance: dist,
            kind: HitKind::Stroke,
        })
    }
}

/// The stroked outline of an axis-aligned rectangle.
///
/// Matches points near any of the four edges; interior points away from the
/// outline miss. This is the stroke test for placed rectangular content.
#[derive(Clone, Copy, Debug)]
pub struct RectOutline {
    /// The rectangle whose outline is stroked, in local coordinates.
    pub rect: Rect,
    /// Half of the stroke width in local units.
    pub half_width: f64,
}

impl RectOutline {
    fn edges(&self) -> [Line; 4] {
        let Rect { x0, y0, x1, y1 } = self.rect;
        [
            Line::new((x0, y0), (x1, y0)),
            Line::new((x1, y0), (x1, y1)),
            Line::new((x1, y1), (x0, y1)),
            Line::new((x0, y1), (x0, y0)),
        ]
    }
}

impl PreciseHitTest for RectOutline {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let limit = self.half_width + params.tolerance;
        let mut best: Option<f64> = None;
        for edge in self.edges() {
            let dist = edge.nearest(pt, 0.0).distance_sq.sqrt();
            if dist <= limit && best.is_none_or(|b| dist < b) {
                best = Some(dist);
            }
        }
        best.map(|distance| HitScore {
            distance,
            kind: HitKind::Stroke,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroked_line_hit_and_miss() {
        let stroked = StrokedLine {
            line: Line::new((0.0, 0.0), (10.0, 0.0)),
            half_width: 1.0,
        };
        let params = HitParams::default();

        assert!(stroked.hit_test_local(Point::new(5.0, 0.0), &params).is_some());
        assert!(stroked.hit_test_local(Point::new(5.0, 0.5), &params).is_some());
        assert!(stroked.hit_test_local(Point::new(5.0, 5.0), &params).is_none());
    }

    #[test]
    fn rect_outline_hits_edges_not_interior() {
        let outline = RectOutline {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            half_width: 0.5,
        };
        let params = HitParams::default();

        // On the top edge.
        let edge = outline
            .hit_test_local(Point::new(5.0, 0.2), &params)
            .expect("expected edge hit");
        assert_eq!(edge.kind, HitKind::Stroke);

        // Deep interior misses the outline.
        assert!(outline.hit_test_local(Point::new(5.0, 5.0), &params).is_none());
    }

    #[test]
    fn rect_outline_tolerance_extends_reach() {
        let outline = RectOutline {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            half_width: 0.5,
        };
        let miss = outline.hit_test_local(Point::new(5.0, -2.0), &HitParams::default());
        assert!(miss.is_none());

        let hit = outline.hit_test_local(Point::new(5.0, -2.0), &HitParams::with_tolerance(2.0));
        assert!(hit.is_some());
    }
}
