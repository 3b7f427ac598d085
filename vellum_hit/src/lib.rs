// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vellum Hit: geometry-level precise hit testing utilities.
//!
//! This crate provides the narrow-phase vocabulary used by the Vellum scene
//! graph when a point query reaches leaf content: what kind of feature was
//! hit, at what distance, and a trait shapes implement to answer the query in
//! their own local coordinates. It is deliberately decoupled from the scene
//! tree; the tree does the broad-phase culling (rough bounds, back-to-front
//! traversal) and hands the transformed local point down here.
//!
//! # Typical usage
//!
//! - Transform the query point into a shape's local coordinates.
//! - Call [`PreciseHitTest::hit_test_local`] on the shape.
//! - Use the returned [`HitScore`] for scoring and tie-breaking; richer
//!   metadata (which segment, which bounds corner) is carried by the scene
//!   layer's own hit-result record.
//!
//! # Key types
//!
//! - [`HitParams`] – the per-query tolerance.
//! - [`HitScore`] – `{ distance, kind }`, lower distance preferred.
//! - [`HitKind`] – the feature taxonomy of a vector document: fill, stroke,
//!   segment point, handle, raw pixel, bounds corner, geometric center.
//! - [`PreciseHitTest`] – implemented by local-space shapes.
//!
//! The [`stroke`] module holds stroke-oriented helpers ([`stroke::StrokedLine`],
//! [`stroke::RectOutline`]); the [`segment`] module holds proximity tests for
//! discrete anchor points.

#![no_std]

use core::cmp::Ordering;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Shape};

pub mod segment;
pub mod stroke;

/// Kind of feature matched by a precise hit test.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum HitKind {
    /// The interior/fill of a shape.
    Fill,
    /// The stroked outline of a shape.
    Stroke,
    /// A curve segment anchor point.
    Segment,
    /// A segment handle or other control affordance.
    Handle,
    /// An opaque pixel of placed raster content.
    Pixel,
    /// A named position on a bounding rectangle.
    Bounds,
    /// The geometric center of a bounding rectangle.
    Center,
}

/// Parameters controlling precise hit tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct HitParams {
    /// Match distance in local units.
    ///
    /// Points within this distance of a feature count as hits. Zero means
    /// exact containment only.
    pub tolerance: f64,
}

impl HitParams {
    /// Construct parameters with the given tolerance.
    #[must_use]
    pub const fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

/// Score returned from a precise hit.
///
/// Lower distance is a better (closer) hit for tie-breaking.
#[derive(Clone, Copy, Debug)]
pub struct HitScore {
    /// Geometric distance in local coordinate space; 0 for containment.
    pub distance: f64,
    /// Classification of what was hit.
    pub kind: HitKind,
}

impl HitScore {
    /// A containment hit of the given kind at distance 0.
    #[must_use]
    pub const fn contained(kind: HitKind) -> Self {
        Self {
            distance: 0.0,
            kind,
        }
    }

    /// Compare two scores, preferring smaller distance; ties keep original order.
    #[must_use]
    pub fn cmp_distance(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// Trait for precise 2D hit testing in local coordinates.
///
/// Implementors should treat [`HitParams::tolerance`] as an inclusive radius.
pub trait PreciseHitTest {
    /// Perform a precise hit test against `pt` in the shape's local
    /// coordinate space.
    ///
    /// Returns `Some(HitScore)` when the point is considered a hit, `None`
    /// for a miss. A miss is an ordinary outcome, never an error.
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore>;
}

impl PreciseHitTest for Rect {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let inflated = if params.tolerance > 0.0 {
            self.inflate(params.tolerance, params.tolerance)
        } else {
            *self
        };
        if !inflated.contains(pt) {
            return None;
        }
        // Distance to the original rect edge; interior points score 0.
        let dx = (self.x0 - pt.x).max(pt.x - self.x1).max(0.0);
        let dy = (self.y0 - pt.y).max(pt.y - self.y1).max(0.0);
        Some(HitScore {
            distance: (dx * dx + dy * dy).sqrt(),
            kind: HitKind::Fill,
        })
    }
}

/// Generic precise hit test for any [`kurbo::Shape`].
///
/// A fallback built on the shape's `contains` and `bounding_box`. There is
/// deliberately no blanket `impl<T: Shape>`, so engines can specialize their
/// own shapes without coherence trouble.
pub fn hit_test_shape<S: Shape>(shape: &S, pt: Point, params: &HitParams) -> Option<HitScore> {
    let bounds = shape.bounding_box();
    let inflated = if params.tolerance > 0.0 {
        bounds.inflate(params.tolerance, params.tolerance)
    } else {
        bounds
    };
    if !inflated.contains(pt) {
        return None;
    }
    if shape.contains(pt) {
        Some(HitScore::contained(HitKind::Fill))
    } else if params.tolerance > 0.0 {
        Some(HitScore {
            distance: params.tolerance,
            kind: HitKind::Fill,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_hit_inside() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let score = r
            .hit_test_local(Point::new(5.0, 5.0), &HitParams::default())
            .expect("expected hit");
        assert_eq!(score.kind, HitKind::Fill);
        assert_eq!(score.distance, 0.0);
    }

    #[test]
    fn rect_miss_outside_without_tolerance() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(
            r.hit_test_local(Point::new(11.0, 5.0), &HitParams::default())
                .is_none()
        );
    }

    #[test]
    fn rect_hit_with_tolerance_scores_edge_distance() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let score = r
            .hit_test_local(Point::new(10.5, 5.0), &HitParams::with_tolerance(1.0))
            .expect("expected tolerant hit");
        assert!((score.distance - 0.5).abs() < 1e-9);
    }

    #[test]
    fn shape_fallback_circle() {
        let c = kurbo::Circle::new((0.0, 0.0), 5.0);
        assert!(hit_test_shape(&c, Point::new(1.0, 1.0), &HitParams::default()).is_some());
        assert!(hit_test_shape(&c, Point::new(10.0, 0.0), &HitParams::default()).is_none());
    }

    #[test]
    fn score_ordering_prefers_closer() {
        let near = HitScore {
            distance: 0.5,
            kind: HitKind::Stroke,
        };
        let far = HitScore {
            distance: 2.0,
            kind: HitKind::Stroke,
        };
        assert_eq!(near.cmp_distance(&far), Ordering::Less);
    }
}
