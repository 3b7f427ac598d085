// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point queries against the scene, topmost match first.
//!
//! The tree walk is the broad phase: it culls with rough bounds, threads the
//! query point through inverted matrices into each node's local space, and
//! visits front-to-back. The narrow phase is delegated to `vellum_hit`.

use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect};
use vellum_hit::stroke::RectOutline;
use vellum_hit::{HitKind, HitParams, PreciseHitTest, segment};

use crate::node::NodeKind;
use crate::scene::Scene;
use crate::types::{BoundsKind, BoundsPosition, ItemFlags, NodeId};

/// What a [`Scene::hit_test`] query should consider a hit.
///
/// Filters apply uniformly to every node, layers included. Invisible and
/// locked nodes prune their whole subtree; the guide and selection filters
/// are evaluated per match, so an ineligible container's children are still
/// tested.
#[derive(Clone, Debug)]
pub struct HitOptions {
    /// Match distance in scene-local units.
    pub tolerance: f64,
    /// Match fills and raster pixels.
    pub fill: bool,
    /// Match stroked outlines.
    pub stroke: bool,
    /// Match anchor points of content that exposes them. The built-in leaf
    /// kinds carry no anchors; this exists for content kinds layered on top.
    pub segments: bool,
    /// Match control handles of content that exposes them.
    pub handles: bool,
    /// Match the eight positions on handle bounds.
    pub bounds: bool,
    /// Match the center of handle bounds, checked before the eight positions.
    pub center: bool,
    /// Include guide nodes in the result set.
    pub guides: bool,
    /// Only report selected nodes.
    pub selected_only: bool,
}

impl Default for HitOptions {
    fn default() -> Self {
        Self {
            tolerance: 2.0,
            fill: true,
            stroke: true,
            segments: true,
            handles: false,
            bounds: false,
            center: false,
            guides: false,
            selected_only: false,
        }
    }
}

/// A successful point query.
#[derive(Clone, Debug)]
pub struct HitResult {
    /// The matched node. For symbol content this is the placed instance,
    /// never a node inside the shared definition.
    pub node: NodeId,
    /// What feature of the node matched.
    pub kind: HitKind,
    /// The hit location in scene space; for bounds hits, the handle point.
    pub point: Point,
    /// Which bounds position matched, for [`HitKind::Bounds`] hits.
    pub bounds_position: Option<BoundsPosition>,
}

impl Scene {
    /// Find the topmost node at `point` (scene space), or `None`.
    ///
    /// Layers are consulted from the top of the paint order down; within a
    /// container, children from last (frontmost) to first.
    pub fn hit_test(&mut self, point: Point, options: &HitOptions) -> Option<HitResult> {
        let layers: Vec<NodeId> = self.layers().to_vec();
        for layer in layers.into_iter().rev() {
            if let Some(hit) = self.hit_test_node(layer, point, Affine::IDENTITY, options) {
                return Some(hit);
            }
        }
        None
    }

    fn hit_test_node(
        &mut self,
        id: NodeId,
        parent_point: Point,
        to_parent_scene: Affine,
        options: &HitOptions,
    ) -> Option<HitResult> {
        let node = self.node_opt(id)?;
        let flags = node.flags;
        if !flags.contains(ItemFlags::VISIBLE) || flags.contains(ItemFlags::LOCKED) {
            return None;
        }
        let matrix = node.matrix;
        if matrix.determinant() == 0.0 {
            // Degenerate transform, nothing visible to hit.
            return None;
        }
        let kind = node.kind.clone();
        let local = matrix.inverse() * parent_point;
        let to_scene = to_parent_scene * matrix;

        let eligible = (options.guides || !flags.contains(ItemFlags::GUIDE))
            && (!options.selected_only || flags.contains(ItemFlags::SELECTED));

        if !kind.is_container() {
            let rough = self
                .cached_bounds(id, BoundsKind::Rough, Some(Affine::IDENTITY), None)
                .inflate(options.tolerance, options.tolerance);
            if !rough.contains(local) {
                return None;
            }
        }

        if eligible
            && (options.center || options.bounds)
            && let Some(hit) = self.hit_test_positions(id, local, to_scene, options)
        {
            return Some(hit);
        }

        match kind {
            NodeKind::Group | NodeKind::Layer => {
                let clip = self.clip_mask_child(id);
                if let Some(clip) = clip {
                    let clip_matrix = self.node(clip).matrix;
                    let gate = self
                        .cached_bounds(clip, BoundsKind::Bounds, Some(clip_matrix), None)
                        .inflate(options.tolerance, options.tolerance);
                    if !gate.contains(local) {
                        return None;
                    }
                }
                let children = self.node(id).children.clone();
                for child in children.into_iter().rev() {
                    // The mask shapes the group; it is not content.
                    if Some(child) == clip {
                        continue;
                    }
                    if let Some(hit) = self.hit_test_node(child, local, to_scene, options) {
                        return Some(hit);
                    }
                }
                None
            }
            NodeKind::Raster { size } => {
                if !eligible {
                    return None;
                }
                let rect = Rect::new(0.0, 0.0, size.width, size.height);
                let params = HitParams::with_tolerance(options.tolerance);
                let style = self.node(id).style.clone();
                if options.stroke && style.stroked {
                    let outline = RectOutline {
                        rect,
                        half_width: style.stroke_width / 2.0,
                    };
                    if outline.hit_test_local(local, &params).is_some() {
                        return Some(HitResult {
                            node: id,
                            kind: HitKind::Stroke,
                            point: to_scene * local,
                            bounds_position: None,
                        });
                    }
                }
                if options.fill && rect.hit_test_local(local, &params).is_some() {
                    return Some(HitResult {
                        node: id,
                        kind: HitKind::Pixel,
                        point: to_scene * local,
                        bounds_position: None,
                    });
                }
                None
            }
            NodeKind::Symbol { definition } => {
                if !self.is_alive(definition) {
                    return None;
                }
                let inner = self.hit_test_node(definition, local, to_scene, options)?;
                // Report the instance; the definition is shared internals.
                Some(HitResult {
                    node: id,
                    ..inner
                })
            }
        }
    }

    /// The center-then-corners shortcut on handle bounds, in local space.
    fn hit_test_positions(
        &mut self,
        id: NodeId,
        local: Point,
        to_scene: Affine,
        options: &HitOptions,
    ) -> Option<HitResult> {
        let handle = self.cached_bounds(id, BoundsKind::Handle, Some(Affine::IDENTITY), None);
        let params = HitParams::with_tolerance(options.tolerance);
        if options.center {
            let center = handle.center();
            if local.distance(center) <= options.tolerance {
                return Some(HitResult {
                    node: id,
                    kind: HitKind::Center,
                    point: to_scene * center,
                    bounds_position: None,
                });
            }
        }
        if options.bounds {
            let candidates = BoundsPosition::ALL.map(|pos| pos.point(handle));
            if let Some((i, _)) =
                segment::nearest_point(candidates, local, HitKind::Bounds, &params)
            {
                let pos = BoundsPosition::ALL[i];
                return Some(HitResult {
                    node: id,
                    kind: HitKind::Bounds,
                    point: to_scene * pos.point(handle),
                    bounds_position: Some(pos),
                });
            }
        }
        None
    }
}
