// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The paint-order traversal and the surface abstraction it draws into.
//!
//! The scene does not rasterize. [`Scene::draw`] walks the tree bottom layer
//! first, children back to front, and issues commands to a caller-provided
//! [`Surface`]. Opacity accumulates multiplicatively down the tree; isolation
//! groups are opened only where a non-normal blend mode requires compositing
//! against a separate backdrop.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::RefCell;
use kurbo::{Affine, Rect, Size};

use crate::node::NodeKind;
use crate::scene::Scene;
use crate::types::{BlendMode, BoundsKind, ItemFlags, NodeId};

/// Per-node drawing state handed to the surface.
#[derive(Clone, Copy, Debug)]
pub struct DrawParams {
    /// Accumulated transform from local space to scene space.
    pub transform: Affine,
    /// Accumulated opacity in `[0, 1]`.
    pub opacity: f64,
    /// The node's blend mode.
    pub blend_mode: BlendMode,
}

/// Receiver of drawing commands, implemented by renderers.
///
/// Push/pop pairs are balanced by the traversal; a surface can maintain a
/// simple stack.
pub trait Surface {
    /// Open an isolation group that composites with `params` on pop.
    fn push_group(&mut self, params: &DrawParams);
    /// Close the innermost isolation group.
    fn pop_group(&mut self);
    /// Restrict subsequent drawing to `rect` under `transform`.
    fn push_clip(&mut self, rect: Rect, transform: Affine);
    /// Remove the innermost clip.
    fn pop_clip(&mut self);
    /// Draw a raster node's content, occupying `(0,0)..(w,h)` locally.
    fn draw_raster(&mut self, node: NodeId, size: Size, params: &DrawParams);
}

impl Scene {
    /// Emit the whole scene to `surface` in paint order.
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        let layers: Vec<NodeId> = self.layers().to_vec();
        for layer in layers {
            self.draw_node(layer, Affine::IDENTITY, 1.0, surface);
        }
    }

    fn draw_node(
        &mut self,
        id: NodeId,
        parent_transform: Affine,
        parent_opacity: f64,
        surface: &mut dyn Surface,
    ) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        if !node.flags.contains(ItemFlags::VISIBLE) {
            return;
        }
        let opacity = parent_opacity * node.opacity;
        if opacity <= 0.0 {
            return;
        }
        let transform = parent_transform * node.matrix;
        let blend_mode = node.blend_mode;
        let kind = node.kind.clone();
        let params = DrawParams {
            transform,
            opacity,
            blend_mode,
        };

        match kind {
            NodeKind::Group | NodeKind::Layer => {
                let isolated = blend_mode != BlendMode::Normal;
                if isolated {
                    surface.push_group(&params);
                }
                let clip = self.clip_mask_child(id);
                if let Some(clip_node) = clip {
                    let clip_matrix = self.node(clip_node).matrix;
                    let clip_rect =
                        self.cached_bounds(clip_node, BoundsKind::Bounds, Some(Affine::IDENTITY), None);
                    surface.push_clip(clip_rect, transform * clip_matrix);
                }
                let children = self.node(id).children.clone();
                for child in children {
                    if Some(child) == clip {
                        continue;
                    }
                    self.draw_node(child, transform, opacity, surface);
                }
                if clip.is_some() {
                    surface.pop_clip();
                }
                if isolated {
                    surface.pop_group();
                }
            }
            NodeKind::Raster { size } => {
                surface.draw_raster(id, size, &params);
            }
            NodeKind::Symbol { definition } => {
                if self.is_alive(definition) {
                    self.draw_node(definition, transform, opacity, surface);
                }
            }
        }
    }
}

/// A pool of reusable offscreen surfaces.
///
/// Renderers that composite isolation groups or raster caches burn through
/// scratch surfaces every frame; allocating them fresh each time dominates
/// frame cost. The pool hands out surfaces through an RAII guard that
/// returns them on drop, and grows by one whenever it is empty.
pub struct SurfacePool<S> {
    free: RefCell<Vec<S>>,
    make: Box<dyn Fn() -> S>,
}

impl<S> core::fmt::Debug for SurfacePool<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfacePool")
            .field("idle", &self.free.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<S> SurfacePool<S> {
    /// Create an empty pool backed by a surface factory.
    pub fn new(make: impl Fn() -> S + 'static) -> Self {
        Self {
            free: RefCell::new(Vec::new()),
            make: Box::new(make),
        }
    }

    /// Take a surface from the pool, constructing one if none is idle.
    pub fn acquire(&self) -> PooledSurface<'_, S> {
        let surface = self
            .free
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| (self.make)());
        PooledSurface {
            pool: self,
            surface: Some(surface),
        }
    }

    /// Number of surfaces currently idle in the pool.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.free.borrow().len()
    }
}

/// RAII handle to a pooled surface; returns it to the pool on drop.
#[derive(Debug)]
pub struct PooledSurface<'a, S> {
    pool: &'a SurfacePool<S>,
    surface: Option<S>,
}

impl<S> core::ops::Deref for PooledSurface<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface.as_ref().expect("surface present until drop")
    }
}

impl<S> core::ops::DerefMut for PooledSurface<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface.as_mut().expect("surface present until drop")
    }
}

impl<S> Drop for PooledSurface<'_, S> {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.pool.free.borrow_mut().push(surface);
        }
    }
}
