// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform application and the matrix-push machinery.

use kurbo::{Affine, Point};

use crate::scene::Scene;
use crate::types::NodeId;
use crate::util::is_axis_aligned;
use vellum_change::ChangeFlags;

impl Scene {
    /// Prepend `m` to the node's matrix, moving it in parent space.
    ///
    /// When `m` is axis-aligned (translation, scaling, quadrant rotation)
    /// the node's cached bounds are remapped through `m` instead of being
    /// discarded, so a drag does not force recomputation on every frame.
    /// Ancestor caches are invalidated either way.
    pub fn transform(&mut self, id: NodeId, m: Affine) -> bool {
        self.transform_with(id, m, false)
    }

    /// Like [`Scene::transform`], optionally pushing the result down into
    /// content.
    ///
    /// With `apply_to_content` set, container matrices are distributed onto
    /// children and reset to identity; leaf nodes keep the composed matrix.
    pub fn transform_with(&mut self, id: NodeId, m: Affine, apply_to_content: bool) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let captured = if is_axis_aligned(m) {
            self.capture_transformed_cache(id, m)
        } else {
            None
        };
        {
            let node = self.node_mut(id);
            node.matrix = m * node.matrix;
        }
        if apply_to_content {
            self.apply_matrix(id);
        }
        self.changed(id, ChangeFlags::GEOMETRY_APPEARANCE);
        if let Some(cache) = captured {
            self.restore_cache(id, cache);
        }
        true
    }

    /// Replace the node's matrix outright.
    pub fn set_matrix(&mut self, id: NodeId, m: Affine) -> bool {
        match self.node_opt_mut(id) {
            Some(node) => {
                if node.matrix != m {
                    node.matrix = m;
                    self.changed(id, ChangeFlags::GEOMETRY_APPEARANCE);
                }
                true
            }
            None => false,
        }
    }

    /// Push a container's matrix down into its children and reset it to
    /// identity. Leaves have nothing to push into and report `false`.
    ///
    /// The scene-space rendering of the subtree is unchanged by this
    /// operation; only the distribution of the transform across the
    /// hierarchy moves.
    pub fn apply_matrix(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node_opt(id) else {
            return false;
        };
        if !node.kind.is_container() {
            return false;
        }
        let m = node.matrix;
        if m == Affine::IDENTITY {
            return true;
        }
        let children = node.children.clone();
        for child in children {
            self.transform_with(child, m, true);
        }
        self.node_mut(id).matrix = Affine::IDENTITY;
        self.changed(id, ChangeFlags::GEOMETRY_APPEARANCE);
        true
    }

    /// Rotate the node by `angle` radians around `center` (parent space).
    pub fn rotate_about(&mut self, id: NodeId, angle: f64, center: Point) -> bool {
        self.transform(id, Affine::rotate_about(angle, center))
    }

    /// Scale the node around `center` (parent space).
    pub fn scale_about(&mut self, id: NodeId, sx: f64, sy: f64, center: Point) -> bool {
        let m = Affine::translate(center.to_vec2())
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate(-center.to_vec2());
        self.transform(id, m)
    }

    /// Shear the node around `center` (parent space).
    pub fn shear_about(&mut self, id: NodeId, kx: f64, ky: f64, center: Point) -> bool {
        let m = Affine::translate(center.to_vec2())
            * Affine::skew(kx, ky)
            * Affine::translate(-center.to_vec2());
        self.transform(id, m)
    }

    /// The node's transform composed down from scene space.
    #[must_use]
    pub fn scene_matrix(&self, id: NodeId) -> Option<Affine> {
        let mut node = self.node_opt(id)?;
        let mut m = node.matrix;
        while let Some(parent) = node.parent {
            node = self.node_opt(parent)?;
            m = node.matrix * m;
        }
        Some(m)
    }
}
