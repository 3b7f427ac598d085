// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: node identifiers, flags, bounds kinds, and styling carriers.

use kurbo::{Point, Rect};

/// Identifier for a node in a [`Scene`](crate::Scene).
///
/// This is a small, copyable handle that stays stable across updates but
/// becomes invalid when the underlying slot is reused. It consists of a slot
/// index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that
///   slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new,
///   distinct `NodeId`.
///
/// Stale `NodeId`s never alias a different live node because the generation
/// must match; this gives every node a process-unique observable identity
/// without a global counter. Use [`Scene::is_alive`](crate::Scene::is_alive)
/// to check whether a `NodeId` still refers to a live node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-node attribute flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// Node participates in rendering, bounds aggregation, and hit testing.
        const VISIBLE   = 1 << 0;
        /// Node is locked against interactive editing; hit testing skips it.
        const LOCKED    = 1 << 1;
        /// Node is part of the current selection.
        const SELECTED  = 1 << 2;
        /// Node is a guide: visible to editing tools but not document content.
        const GUIDE     = 1 << 3;
        /// Node serves as its container's clip mask.
        const CLIP_MASK = 1 << 4;
    }
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Compositing mode carried per node.
///
/// The scene core only stores and forwards the mode; compositing itself
/// happens in the drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Source-over compositing.
    #[default]
    Normal,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
    /// Overlay blend.
    Overlay,
    /// Darken blend.
    Darken,
    /// Lighten blend.
    Lighten,
    /// Difference blend.
    Difference,
}

/// The bounds variants a query may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundsKind {
    /// Geometric bounds of the content, excluding stroke.
    Bounds,
    /// Bounds including stroke extents.
    Stroke,
    /// Bounds including editing handles.
    Handle,
    /// Conservative over-approximation used for fast rejection.
    Rough,
}

impl BoundsKind {
    /// Number of distinct bounds kinds; sizes the per-node cache array.
    pub(crate) const COUNT: usize = 4;

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Bounds => 0,
            Self::Stroke => 1,
            Self::Handle => 2,
            Self::Rough => 3,
        }
    }
}

/// A named position on a bounding rectangle, used by bounds hit testing.
///
/// [`BoundsPosition::ALL`] lists the eight positions in their fixed check
/// order; the geometric center is tested separately and first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundsPosition {
    /// Top-left corner.
    TopLeft,
    /// Midpoint of the top edge.
    TopCenter,
    /// Top-right corner.
    TopRight,
    /// Midpoint of the left edge.
    LeftCenter,
    /// Midpoint of the right edge.
    RightCenter,
    /// Bottom-left corner.
    BottomLeft,
    /// Midpoint of the bottom edge.
    BottomCenter,
    /// Bottom-right corner.
    BottomRight,
}

impl BoundsPosition {
    /// The eight positions in their fixed hit-test check order.
    pub const ALL: [Self; 8] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::LeftCenter,
        Self::RightCenter,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// The point this position names on `rect`.
    #[must_use]
    pub fn point(self, rect: Rect) -> Point {
        let cx = (rect.x0 + rect.x1) / 2.0;
        let cy = (rect.y0 + rect.y1) / 2.0;
        match self {
            Self::TopLeft => Point::new(rect.x0, rect.y0),
            Self::TopCenter => Point::new(cx, rect.y0),
            Self::TopRight => Point::new(rect.x1, rect.y0),
            Self::LeftCenter => Point::new(rect.x0, cy),
            Self::RightCenter => Point::new(rect.x1, cy),
            Self::BottomLeft => Point::new(rect.x0, rect.y1),
            Self::BottomCenter => Point::new(cx, rect.y1),
            Self::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }
}

/// Opaque styling value carried by every node.
///
/// The scene core reads only what bounds computation needs (the stroke
/// width); everything else is payload for renderers and outer layers.
/// Assignment replaces the whole object and raises a style change; there is
/// no field-level styling API here.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    /// Stroke width in local units; contributes to stroke bounds.
    pub stroke_width: f64,
    /// Whether the stroke is painted; an unstroked node has plain bounds
    /// equal to its stroke bounds.
    pub stroked: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_width: 1.0,
            stroked: false,
        }
    }
}

impl Style {
    /// The stroke padding this style adds around geometric bounds.
    #[must_use]
    pub(crate) fn stroke_padding(&self) -> f64 {
        if self.stroked {
            self.stroke_width / 2.0
        } else {
            0.0
        }
    }
}
