// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounds computation and the lazy bounds cache.
//!
//! Bounds are computed on demand, in the parent's coordinate space, and
//! cached per [`BoundsKind`] on the node they describe. A composite node
//! aggregates its children in a single downward pass that composes matrices
//! as it goes, so only the aggregate caches; every node visited along the way
//! records the cache owner in its dependents list, which is how a later
//! change anywhere in the subtree finds and clears the stale aggregate.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::node::NodeKind;
use crate::scene::Scene;
use crate::types::{BoundsKind, ItemFlags, NodeId};
use crate::util::transform_rect_bbox;

/// Padding added around stroke bounds for the rough variant, covering
/// selection handles and antialiasing fringe.
const ROUGH_PADDING: f64 = 4.0;

impl Scene {
    /// The node's bounds of the requested kind, in its parent's coordinate
    /// space. `None` for stale ids.
    ///
    /// An empty composite reports [`Rect::ZERO`].
    pub fn bounds(&mut self, id: NodeId, kind: BoundsKind) -> Option<Rect> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.cached_bounds(id, kind, None, None))
    }

    /// The node's bounds of the requested kind under an explicit transform
    /// instead of its own matrix. Results for foreign transforms are not
    /// cached.
    pub fn bounds_with(&mut self, id: NodeId, kind: BoundsKind, matrix: Affine) -> Option<Rect> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.cached_bounds(id, kind, Some(matrix), None))
    }

    /// Bounds including stroke extents. Shorthand for
    /// [`BoundsKind::Stroke`].
    pub fn stroke_bounds(&mut self, id: NodeId) -> Option<Rect> {
        self.bounds(id, BoundsKind::Stroke)
    }

    /// Bounds including editing handles. Shorthand for
    /// [`BoundsKind::Handle`].
    pub fn handle_bounds(&mut self, id: NodeId) -> Option<Rect> {
        self.bounds(id, BoundsKind::Handle)
    }

    /// Conservative over-approximation used for fast rejection. Shorthand
    /// for [`BoundsKind::Rough`].
    pub fn rough_bounds(&mut self, id: NodeId) -> Option<Rect> {
        self.bounds(id, BoundsKind::Rough)
    }

    /// The center of the node's plain bounds, in parent space.
    ///
    /// Cached separately so repeated position reads during interactive drags
    /// do not re-derive the rectangle.
    pub fn position(&mut self, id: NodeId) -> Option<Point> {
        if let Some(cached) = self.node_opt(id)?.cached_position {
            return Some(cached);
        }
        let center = self.bounds(id, BoundsKind::Bounds)?.center();
        self.node_mut(id).cached_position = Some(center);
        Some(center)
    }

    /// Move the node so its plain-bounds center lands on `position`.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> bool {
        let Some(current) = self.position(id) else {
            return false;
        };
        self.translate(id, position - current)
    }

    /// Bounds lookup with caching and dependency registration.
    ///
    /// `matrix` is the transform to apply to local content; `None` means the
    /// node's own matrix, which is the cacheable case. `cache_owner` is the
    /// node whose cache the result will end up in when this call is part of
    /// a composite aggregation.
    pub(crate) fn cached_bounds(
        &mut self,
        id: NodeId,
        kind: BoundsKind,
        matrix: Option<Affine>,
        cache_owner: Option<NodeId>,
    ) -> Rect {
        let node = self.node(id);
        let own = node.matrix;
        let cacheable = matrix.is_none_or(|m| m == own);
        let effective = matrix.unwrap_or(own);

        if let Some(owner) = cache_owner
            && owner != id
            && !node.dependents.contains(&owner)
        {
            self.node_mut(id).dependents.push(owner);
        }
        if cacheable && let Some(cached) = self.node(id).bounds_cache[kind.index()] {
            return cached;
        }

        let owner_for_children = cache_owner.or_else(|| cacheable.then_some(id));
        let rect = self.compute_bounds(id, kind, effective, owner_for_children);

        if cacheable {
            let node = self.node_mut(id);
            node.bounds_cache[kind.index()] = Some(rect);
            if kind == BoundsKind::Bounds {
                node.cached_position = Some(rect.center());
            }
        }
        rect
    }

    fn compute_bounds(
        &mut self,
        id: NodeId,
        kind: BoundsKind,
        effective: Affine,
        owner: Option<NodeId>,
    ) -> Rect {
        match self.node(id).kind.clone() {
            NodeKind::Group | NodeKind::Layer => {
                // A clipped container shows nothing outside its mask.
                if let Some(clip) = self.clip_mask_child(id) {
                    let child_matrix = effective * self.node(clip).matrix;
                    return self.cached_bounds(clip, kind, Some(child_matrix), owner);
                }
                let children = self.node(id).children.clone();
                let mut acc: Option<Rect> = None;
                for child in children {
                    if !self.node(child).flags.contains(ItemFlags::VISIBLE) {
                        continue;
                    }
                    let child_matrix = effective * self.node(child).matrix;
                    let r = self.cached_bounds(child, kind, Some(child_matrix), owner);
                    acc = Some(match acc {
                        Some(a) => a.union(r),
                        None => r,
                    });
                }
                acc.unwrap_or(Rect::ZERO)
            }
            NodeKind::Raster { size } => {
                let local = Rect::new(0.0, 0.0, size.width, size.height);
                let local = match kind {
                    BoundsKind::Bounds | BoundsKind::Handle => local,
                    BoundsKind::Stroke => local.inflate(
                        self.node(id).style.stroke_padding(),
                        self.node(id).style.stroke_padding(),
                    ),
                    BoundsKind::Rough => {
                        let pad = self.node(id).style.stroke_padding() + ROUGH_PADDING;
                        local.inflate(pad, pad)
                    }
                };
                transform_rect_bbox(effective, local)
            }
            NodeKind::Symbol { definition } => {
                if !self.is_alive(definition) {
                    return Rect::ZERO;
                }
                let def_matrix = effective * self.node(definition).matrix;
                self.cached_bounds(definition, kind, Some(def_matrix), owner)
            }
        }
    }

    /// Invalidate this node's cached bounds and, transitively, every cache
    /// owner registered as depending on it.
    ///
    /// Taking the dependents list out before recursing both consumes the
    /// registrations (owners re-register on the next computation) and bounds
    /// the walk on cyclic registrations.
    pub(crate) fn clear_bounds_cache(&mut self, id: NodeId) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        node.clear_own_bounds();
        let dependents = core::mem::take(&mut node.dependents);
        for dependent in dependents {
            self.clear_bounds_cache(dependent);
        }
    }

    /// Snapshot this node's cached rectangles mapped through `m`, for
    /// restoration after an axis-aligned transform. Returns `None` when
    /// nothing is cached.
    pub(crate) fn capture_transformed_cache(
        &self,
        id: NodeId,
        m: Affine,
    ) -> Option<TransformedCache> {
        let node = self.node_opt(id)?;
        if node.bounds_cache.iter().all(Option::is_none) && node.cached_position.is_none() {
            return None;
        }
        let mut rects = [None; BoundsKind::COUNT];
        for (slot, cached) in rects.iter_mut().zip(node.bounds_cache.iter()) {
            *slot = cached.map(|r| transform_rect_bbox(m, r));
        }
        Some(TransformedCache {
            rects,
            position: node.cached_position.map(|p| m * p),
        })
    }

    pub(crate) fn restore_cache(&mut self, id: NodeId, cache: TransformedCache) {
        if let Some(node) = self.node_opt_mut(id) {
            node.bounds_cache = cache.rects;
            node.cached_position = cache.position;
        }
    }

    /// Translate the node by `delta` in parent space.
    pub fn translate(&mut self, id: NodeId, delta: Vec2) -> bool {
        self.transform(id, Affine::translate(delta))
    }
}

/// Cached rectangles re-expressed in post-transform coordinates.
pub(crate) struct TransformedCache {
    rects: [Option<Rect>; BoundsKind::COUNT],
    position: Option<Point>,
}
