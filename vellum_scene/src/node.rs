// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Internal node storage.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use kurbo::{Affine, Point, Rect, Size};
use smallvec::SmallVec;

use crate::types::{BlendMode, BoundsKind, ItemFlags, NodeId, Style};

/// The closed set of node variants.
///
/// Container-ness is a property of the kind: groups and layers own children,
/// raster and symbol nodes are leaf content whose bounds come from intrinsic
/// size. A layer with no parent lives in the scene's top-level list; once
/// nested under another container it behaves exactly like a group.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Plain container; bounds are the union of visible children.
    Group,
    /// Top-level container, registered with the scene when un-parented.
    Layer,
    /// Placed raster content with intrinsic pixel size.
    Raster {
        /// Intrinsic content size; local content occupies `(0,0)..(w,h)`.
        size: Size,
    },
    /// Placed instance of a shared symbol definition.
    Symbol {
        /// The definition root this instance renders.
        definition: NodeId,
    },
}

impl NodeKind {
    /// Whether nodes of this kind own a child list.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Group | Self::Layer)
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) kind: NodeKind,
    pub(crate) matrix: Affine,
    pub(crate) flags: ItemFlags,
    pub(crate) opacity: f64,
    pub(crate) blend_mode: BlendMode,
    pub(crate) style: Style,
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<NodeId>,
    /// Position in the parent's child list, or in the scene's layer list for
    /// an un-parented layer. Kept dense and consistent at all times.
    pub(crate) index: usize,
    /// Child list; meaningful only for container kinds.
    pub(crate) children: Vec<NodeId>,
    /// Per-name holder lists for this node's children, in assignment order.
    /// The most recent holder answers the singular lookup.
    pub(crate) named_children: HashMap<String, Vec<NodeId>>,
    /// Cached bounds per kind, valid while no relevant change occurred.
    pub(crate) bounds_cache: [Option<Rect>; BoundsKind::COUNT],
    /// Center of cached plain bounds, invalidated together with them.
    pub(crate) cached_position: Option<Point>,
    /// Cache owners whose cached bounds aggregated through this subtree.
    /// Non-owning; cleared as a unit on invalidation.
    pub(crate) dependents: SmallVec<[NodeId; 4]>,
    /// Cached clip-mask answer for container kinds: `None` means not yet
    /// computed, `Some(None)` means "no clip child".
    pub(crate) clip_child: Option<Option<NodeId>>,
}

impl Node {
    pub(crate) fn new(generation: u32, kind: NodeKind) -> Self {
        Self {
            generation,
            kind,
            matrix: Affine::IDENTITY,
            flags: ItemFlags::default(),
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            style: Style::default(),
            name: None,
            parent: None,
            index: 0,
            children: Vec::new(),
            named_children: HashMap::new(),
            bounds_cache: [None; BoundsKind::COUNT],
            cached_position: None,
            dependents: SmallVec::new(),
            clip_child: None,
        }
    }

    pub(crate) fn clear_own_bounds(&mut self) {
        self.bounds_cache = [None; BoundsKind::COUNT];
        self.cached_position = None;
    }
}
