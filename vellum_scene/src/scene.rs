// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene arena: node ownership, tree mutation, and change notification.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};
use kurbo::{Affine, Size};
use smallvec::SmallVec;
use vellum_change::{ChangeFlags, ChangeSet};

use crate::event::{EventHooks, EventKind, EventRegistry, RemoveOnMask};
use crate::node::{Node, NodeKind};
use crate::types::{BlendMode, ItemFlags, NodeId, Style};

/// A retained scene of drawable nodes.
///
/// The scene owns the node arena and the document-level state the node
/// hierarchy consumes: the ordered top-level layer list, the active layer,
/// the per-frame [`ChangeSet`], the redraw flag, and the event registries.
/// Nodes are addressed by generational [`NodeId`] handles; stale handles are
/// rejected by every operation, never dereferenced.
///
/// All operations are synchronous and run to completion; the scene assumes a
/// single logical thread of control (callers serialize access).
///
/// ## Example
///
/// ```rust
/// use kurbo::Size;
/// use vellum_scene::Scene;
///
/// let mut scene = Scene::new();
/// let group = scene.insert_group(None); // lands in an auto-created layer
/// let raster = scene.insert_raster(Some(group), Size::new(64.0, 64.0));
///
/// assert_eq!(scene.parent_of(raster), Some(group));
/// assert_eq!(scene.layers().len(), 1);
/// ```
pub struct Scene {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// Un-parented top-level containers, in paint order.
    layers: Vec<NodeId>,
    active_layer: Option<NodeId>,
    /// Selection bookkeeping mirrored from the per-node SELECTED flag.
    selected: HashSet<NodeId>,
    /// Definition root -> placed instances.
    symbol_instances: HashMap<NodeId, SmallVec<[NodeId; 2]>>,
    changes: ChangeSet<NodeId>,
    redraw_needed: bool,
    pub(crate) events: EventRegistry,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("layers", &self.layers.len())
            .field("active_layer", &self.active_layer)
            .field("selected", &self.selected.len())
            .field("pending_changes", &self.changes.len())
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a new empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            layers: Vec::new(),
            active_layer: None,
            selected: HashSet::new(),
            symbol_instances: HashMap::new(),
            changes: ChangeSet::new(),
            redraw_needed: false,
            events: EventRegistry::new(),
        }
    }

    // --- allocation and liveness ---

    #[expect(
        clippy::cast_possible_truncation,
        reason = "Node ids use 32-bit slot indices."
    )]
    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, kind));
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, kind)));
            self.generations.push(generation);
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is live if its slot exists and its generation matches the
    /// current generation stored in that slot.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Access a node; panics if `id` is stale. Callers check liveness first.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    pub(crate) fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        (n.generation == id.1).then_some(n)
    }

    // --- construction ---

    /// Insert a new top-level layer at the end of the layer list.
    ///
    /// The first layer inserted becomes the active layer.
    pub fn insert_layer(&mut self) -> NodeId {
        let id = self.alloc(NodeKind::Layer);
        let index = self.layers.len();
        self.layers.push(id);
        self.node_mut(id).index = index;
        if self.active_layer.is_none() {
            self.active_layer = Some(id);
        }
        self.changed(id, ChangeFlags::INSERTION_APPEARANCE);
        id
    }

    /// Insert a new empty group.
    ///
    /// With `parent = None` the group lands in the active layer, which is
    /// created on demand.
    pub fn insert_group(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::Group);
        self.attach_default(id, parent);
        id
    }

    /// Insert placed raster content with the given intrinsic size.
    pub fn insert_raster(&mut self, parent: Option<NodeId>, size: Size) -> NodeId {
        let id = self.alloc(NodeKind::Raster { size });
        self.attach_default(id, parent);
        id
    }

    /// Register `root` as a symbol definition so instances can be placed.
    ///
    /// The root is typically a detached node (not part of any layer). Returns
    /// `false` for stale ids and for symbol-instance nodes, which cannot
    /// define symbols.
    pub fn define_symbol(&mut self, root: NodeId) -> bool {
        match self.node_opt(root) {
            Some(n) if !matches!(n.kind, NodeKind::Symbol { .. }) => {
                self.symbol_instances.entry(root).or_default();
                true
            }
            _ => false,
        }
    }

    /// Insert a placed instance of a registered symbol definition.
    ///
    /// Returns `None` when `definition` is stale or unregistered, or when
    /// placement would nest the instance inside its own definition subtree,
    /// directly or through a chain of nested symbols.
    pub fn insert_symbol(&mut self, parent: Option<NodeId>, definition: NodeId) -> Option<NodeId> {
        if !self.is_alive(definition) || !self.symbol_instances.contains_key(&definition) {
            return None;
        }
        let target = parent
            .filter(|p| self.is_alive(*p) && self.node(*p).kind.is_container())
            .unwrap_or_else(|| self.ensure_active_layer());
        // A definition whose expansion reaches back to an ancestor of the
        // placement would expand forever.
        let mut definitions = HashSet::new();
        definitions.insert(definition);
        self.reachable_definitions(definition, &mut definitions);
        if self.placement_closes_expansion_cycle(target, &definitions) {
            return None;
        }
        let id = self.alloc(NodeKind::Symbol { definition });
        self.symbol_instances
            .get_mut(&definition)
            .expect("checked above")
            .push(id);
        let inserted = self.add_child(target, id);
        debug_assert!(inserted, "placement target checked above");
        Some(id)
    }

    /// The placed instances of a symbol definition.
    #[must_use]
    pub fn instances_of(&self, definition: NodeId) -> &[NodeId] {
        self.symbol_instances
            .get(&definition)
            .map_or(&[], |v| v.as_slice())
    }

    /// Construct a detached group, not registered anywhere.
    ///
    /// Used for building symbol definitions or staging subtrees before
    /// insertion via [`Scene::insert_child`].
    pub fn new_detached_group(&mut self) -> NodeId {
        self.alloc(NodeKind::Group)
    }

    fn attach_default(&mut self, id: NodeId, parent: Option<NodeId>) {
        let parent = parent
            .filter(|p| self.is_alive(*p) && self.node(*p).kind.is_container())
            .unwrap_or_else(|| self.ensure_active_layer());
        let inserted = self.add_child(parent, id);
        debug_assert!(inserted, "default container must accept children");
    }

    /// The active layer, creating one if the scene has none.
    pub fn ensure_active_layer(&mut self) -> NodeId {
        match self.active_layer.filter(|l| self.is_alive(*l)) {
            Some(layer) => layer,
            None => self.insert_layer(),
        }
    }

    // --- tree mutation ---

    /// Append `id` to the end of `parent`'s child list.
    ///
    /// See [`Scene::insert_child`] for the full contract.
    pub fn add_child(&mut self, parent: NodeId, id: NodeId) -> bool {
        let index = match self.node_opt(parent) {
            Some(n) => n.children.len(),
            None => return false,
        };
        self.insert_child(parent, index, id)
    }

    /// Splice `id` into `parent`'s child list at `index` (clamped to the end).
    ///
    /// Detaches `id` from its current parent or from the layer list first.
    /// Returns `false` without mutating anything when `parent` is a leaf
    /// kind, either id is stale, or the insertion would create a cycle.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, id: NodeId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(id) || parent == id {
            return false;
        }
        if !self.node(parent).kind.is_container() {
            return false;
        }
        if self.is_ancestor_of(id, parent) {
            return false;
        }
        let mut definitions = HashSet::new();
        self.reachable_definitions(id, &mut definitions);
        if !definitions.is_empty() && self.placement_closes_expansion_cycle(parent, &definitions) {
            return false;
        }
        self.detach(id);

        let index = index.min(self.node(parent).children.len());
        self.node_mut(parent).children.insert(index, id);
        self.node_mut(id).parent = Some(parent);
        self.reindex_children(parent, index);

        if let Some(name) = self.node(id).name.clone() {
            self.register_name(parent, name, id);
        }
        self.changed(id, ChangeFlags::INSERTION_APPEARANCE);
        self.changed(parent, ChangeFlags::CHILDREN);
        true
    }

    /// Remove a contiguous range `[from, to)` of `parent`'s children.
    ///
    /// Each removed subtree is deselected, unhooked from name/selection/event
    /// bookkeeping, and destroyed. Remaining children are reindexed and a
    /// single hierarchy change is raised if anything was removed. Returns the
    /// number of children removed.
    pub fn remove_children(&mut self, parent: NodeId, from: usize, to: usize) -> usize {
        let Some(n) = self.node_opt(parent) else {
            return 0;
        };
        if !n.kind.is_container() {
            return 0;
        }
        let len = n.children.len();
        let from = from.min(len);
        let to = to.min(len);
        if from >= to {
            return 0;
        }

        let removed: Vec<NodeId> = self.node(parent).children[from..to].to_vec();
        for &child in &removed {
            if let Some(name) = self.node(child).name.clone() {
                self.unregister_name(parent, &name, child);
            }
        }
        self.node_mut(parent).children.drain(from..to);
        self.reindex_children(parent, from);
        for child in removed.iter().copied() {
            self.node_mut(child).parent = None;
            self.free_subtree(child);
        }
        self.changed(parent, ChangeFlags::CHILDREN);
        removed.len()
    }

    /// Remove every child of `parent`.
    pub fn remove_all_children(&mut self, parent: NodeId) -> usize {
        let len = match self.node_opt(parent) {
            Some(n) => n.children.len(),
            None => return 0,
        };
        self.remove_children(parent, 0, len)
    }

    /// Remove this node (and its subtree) from the scene.
    ///
    /// Detaches from the parent, or from the layer list for an un-parented
    /// layer, then destroys the subtree. Returns `false` when `id` is stale
    /// or already detached (a detached node is not removable; it is simply
    /// not anywhere).
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        if !self.detach(id) {
            return false;
        }
        self.free_subtree(id);
        true
    }

    /// Detach `id` from wherever it is registered, without destroying it.
    ///
    /// Returns `false` when the node was already detached.
    fn detach(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node_opt(id) else {
            return false;
        };
        if let Some(parent) = node.parent {
            if let Some(name) = self.node(id).name.clone() {
                self.unregister_name(parent, &name, id);
            }
            let index = self.node(id).index;
            {
                let p = self.node_mut(parent);
                debug_assert!(
                    p.children.get(index) == Some(&id),
                    "child index out of sync with parent list"
                );
                p.children.remove(index);
            }
            self.reindex_children(parent, index);
            self.node_mut(id).parent = None;
            self.changed(parent, ChangeFlags::CHILDREN);
            true
        } else if let Some(pos) = self.layers.iter().position(|l| *l == id) {
            self.layers.remove(pos);
            let tail: Vec<NodeId> = self.layers[pos..].to_vec();
            for (offset, layer) in tail.into_iter().enumerate() {
                self.node_mut(layer).index = pos + offset;
            }
            if self.active_layer == Some(id) {
                self.active_layer = self.layers.last().copied();
            }
            self.redraw_needed = true;
            true
        } else {
            false
        }
    }

    fn reindex_children(&mut self, parent: NodeId, from: usize) {
        let tail: Vec<NodeId> = self.node(parent).children[from..].to_vec();
        for (offset, child) in tail.into_iter().enumerate() {
            self.node_mut(child).index = from + offset;
        }
    }

    /// Destroy a detached subtree: free slots and excise every piece of
    /// scene-level bookkeeping that could otherwise hold a stale id.
    fn free_subtree(&mut self, root: NodeId) {
        let mut stack = alloc::vec![root];
        while let Some(id) = stack.pop() {
            if !self.is_alive(id) {
                continue;
            }
            stack.extend(self.node(id).children.iter().copied());

            self.selected.remove(&id);
            self.changes.remove_key(id);
            self.events.remove_node(id);
            let placed_definition = match self.node(id).kind {
                NodeKind::Symbol { definition } => Some(definition),
                _ => None,
            };
            if let Some(definition) = placed_definition {
                if let Some(instances) = self.symbol_instances.get_mut(&definition) {
                    instances.retain(|i| *i != id);
                }
            } else {
                // A destroyed definition root leaves its instances rendering
                // nothing; they check liveness on use.
                self.symbol_instances.remove(&id);
            }

            self.nodes[id.idx()] = None;
            self.free_list.push(id.idx());
        }
    }

    fn is_ancestor_of(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.node_opt(node).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /// Collect every definition root whose content becomes visible when the
    /// subtree at `root` is expanded, following nested instances.
    fn reachable_definitions(&self, root: NodeId, out: &mut HashSet<NodeId>) {
        let mut stack = alloc::vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node_opt(id) else {
                continue;
            };
            if let NodeKind::Symbol { definition } = node.kind
                && self.is_alive(definition)
                && out.insert(definition)
            {
                stack.push(definition);
            }
            stack.extend(node.children.iter().copied());
        }
    }

    /// Whether placing content that expands to `definitions` under `parent`
    /// would nest a definition inside its own expansion.
    fn placement_closes_expansion_cycle(
        &self,
        parent: NodeId,
        definitions: &HashSet<NodeId>,
    ) -> bool {
        let mut current = Some(parent);
        while let Some(node) = current {
            if definitions.contains(&node) {
                return true;
            }
            current = self.node_opt(node).and_then(|n| n.parent);
        }
        false
    }

    // --- layer list ---

    /// The ordered top-level layer list, in paint order.
    #[must_use]
    pub fn layers(&self) -> &[NodeId] {
        &self.layers
    }

    /// The layer new nodes default into.
    #[must_use]
    pub fn active_layer(&self) -> Option<NodeId> {
        self.active_layer
    }

    /// Make `id` the active layer. Fails for anything but a live,
    /// un-parented layer.
    pub fn activate_layer(&mut self, id: NodeId) -> bool {
        if self.layers.contains(&id) && self.is_alive(id) {
            self.active_layer = Some(id);
            true
        } else {
            false
        }
    }

    /// Re-splice `id` directly above `other` in the layer list.
    pub fn move_layer_above(&mut self, id: NodeId, other: NodeId) -> bool {
        self.move_layer(id, other, 1)
    }

    /// Re-splice `id` directly below `other` in the layer list.
    pub fn move_layer_below(&mut self, id: NodeId, other: NodeId) -> bool {
        self.move_layer(id, other, 0)
    }

    fn move_layer(&mut self, id: NodeId, other: NodeId, offset: usize) -> bool {
        if id == other || !self.is_alive(id) || !self.is_alive(other) {
            return false;
        }
        let Some(pos) = self.layers.iter().position(|l| *l == id) else {
            return false;
        };
        if !self.layers.contains(&other) {
            return false;
        }
        self.layers.remove(pos);
        let anchor = self
            .layers
            .iter()
            .position(|l| *l == other)
            .expect("anchor layer checked above");
        self.layers.insert(anchor + offset, id);
        let from = pos.min(anchor);
        let tail: Vec<NodeId> = self.layers[from..].to_vec();
        for (off, layer) in tail.into_iter().enumerate() {
            self.node_mut(layer).index = from + off;
        }
        self.changed(id, ChangeFlags::INSERTION_APPEARANCE);
        true
    }

    // --- change notification ---

    /// The sole path by which a mutation becomes visible to caching and
    /// redraw logic. Invalidation only marks caches stale; nothing is
    /// recomputed here.
    pub(crate) fn changed(&mut self, id: NodeId, flags: ChangeFlags) {
        self.apply_change(id, flags);
        if self.symbol_instances.is_empty() {
            return;
        }

        // Forward to placed instances when the changed node, or an ancestor
        // reached on the way up, is a registered definition root. Forwarded
        // instances join the worklist so nested symbols propagate too; the
        // visited set makes each instance receive the change once and bounds
        // the walk.
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut worklist = alloc::vec![id];
        while let Some(start) = worklist.pop() {
            let mut current = Some(start);
            while let Some(node) = current {
                if let Some(instances) = self.symbol_instances.get(&node) {
                    let instances: SmallVec<[NodeId; 2]> = instances.clone();
                    for instance in instances {
                        if self.is_alive(instance) && visited.insert(instance) {
                            self.apply_change(instance, flags);
                            worklist.push(instance);
                        }
                    }
                }
                current = self.node_opt(node).and_then(|n| n.parent);
            }
        }
    }

    fn apply_change(&mut self, id: NodeId, flags: ChangeFlags) {
        if flags.invalidates_own_bounds() {
            self.node_mut(id).clear_own_bounds();
        }
        if flags.invalidates_parent_bounds() {
            if let Some(parent) = self.node(id).parent {
                self.clear_bounds_cache(parent);
            }
        }
        if flags.intersects(ChangeFlags::HIERARCHY | ChangeFlags::CLIPPING) {
            // This node is itself the parent of the structural change; its
            // aggregate and its clip answer are both derived from children.
            self.clear_bounds_cache(id);
            self.node_mut(id).clip_child = None;
        }
        if flags.contains(ChangeFlags::APPEARANCE) {
            self.redraw_needed = true;
        }
        self.changes.record(id, flags);
    }

    // --- flag and attribute setters ---

    /// Set node visibility.
    ///
    /// Visibility participates in bounds aggregation (invisible children are
    /// excluded from a container's union), so this also raises a geometry
    /// change to keep ancestor caches sound.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if self.set_flag(id, ItemFlags::VISIBLE, visible) {
            self.changed(
                id,
                ChangeFlags::ATTRIBUTE_APPEARANCE | ChangeFlags::GEOMETRY,
            );
        }
    }

    /// Lock or unlock the node against interactive editing.
    pub fn set_locked(&mut self, id: NodeId, locked: bool) {
        if self.set_flag(id, ItemFlags::LOCKED, locked) {
            self.changed(id, ChangeFlags::ATTRIBUTE_APPEARANCE);
        }
    }

    /// Mark the node as a guide.
    pub fn set_guide(&mut self, id: NodeId, guide: bool) {
        if self.set_flag(id, ItemFlags::GUIDE, guide) {
            self.changed(id, ChangeFlags::ATTRIBUTE_APPEARANCE);
        }
    }

    /// Designate the node as its container's clip mask.
    ///
    /// The container consults the flag lazily; see
    /// [`Scene::clip_mask_child`].
    pub fn set_clip_mask(&mut self, id: NodeId, clip: bool) {
        if self.set_flag(id, ItemFlags::CLIP_MASK, clip) {
            self.changed(id, ChangeFlags::ATTRIBUTE_APPEARANCE);
            if let Some(parent) = self.node_opt(id).and_then(|n| n.parent) {
                self.changed(parent, ChangeFlags::CLIP_APPEARANCE);
            }
        }
    }

    /// Returns true when the flag value actually changed.
    fn set_flag(&mut self, id: NodeId, flag: ItemFlags, value: bool) -> bool {
        match self.node_opt_mut(id) {
            Some(n) if n.flags.contains(flag) != value => {
                n.flags.set(flag, value);
                true
            }
            _ => false,
        }
    }

    /// Set node opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) {
        let opacity = opacity.clamp(0.0, 1.0);
        if let Some(n) = self.node_opt_mut(id)
            && n.opacity != opacity
        {
            n.opacity = opacity;
            self.changed(id, ChangeFlags::ATTRIBUTE_APPEARANCE);
        }
    }

    /// Set the node's blend mode.
    pub fn set_blend_mode(&mut self, id: NodeId, mode: BlendMode) {
        if let Some(n) = self.node_opt_mut(id)
            && n.blend_mode != mode
        {
            n.blend_mode = mode;
            self.changed(id, ChangeFlags::ATTRIBUTE_APPEARANCE);
        }
    }

    /// Replace the node's style object wholesale.
    ///
    /// A stroke-width difference additionally raises a stroke change, since
    /// stroke bounds cached on ancestors depend on it.
    pub fn set_style(&mut self, id: NodeId, style: Style) {
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if n.style == style {
            return;
        }
        let stroke_changed = n.style.stroke_padding() != style.stroke_padding();
        n.style = style;
        let flags = if stroke_changed {
            ChangeFlags::STYLE_APPEARANCE | ChangeFlags::STROKE_APPEARANCE
        } else {
            ChangeFlags::STYLE_APPEARANCE
        };
        self.changed(id, flags);
    }

    /// Report that a raster node's pixels were modified in place.
    pub fn notify_pixels_changed(&mut self, id: NodeId) {
        if self
            .node_opt(id)
            .is_some_and(|n| matches!(n.kind, NodeKind::Raster { .. }))
        {
            self.changed(id, ChangeFlags::PIXELS_APPEARANCE);
        }
    }

    // --- naming ---

    /// Assign or clear the node's name, maintaining the parent's name lookup.
    pub fn set_name(&mut self, id: NodeId, name: Option<&str>) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let old = self.node(id).name.clone();
        if old.as_deref() == name {
            return true;
        }
        let parent = self.node(id).parent;
        if let (Some(p), Some(old)) = (parent, old.as_deref()) {
            self.unregister_name(p, old, id);
        }
        self.node_mut(id).name = name.map(String::from);
        if let (Some(p), Some(new)) = (parent, name) {
            self.register_name(p, String::from(new), id);
        }
        self.changed(id, ChangeFlags::ATTRIBUTE);
        true
    }

    /// Look up a child of `parent` by name.
    ///
    /// When several children share the name, the most recently assigned
    /// holder answers.
    #[must_use]
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node_opt(parent)?
            .named_children
            .get(name)?
            .last()
            .copied()
    }

    /// All children of `parent` currently holding `name`, in assignment order.
    #[must_use]
    pub fn children_named(&self, parent: NodeId, name: &str) -> &[NodeId] {
        self.node_opt(parent)
            .and_then(|n| n.named_children.get(name))
            .map_or(&[], |v| v.as_slice())
    }

    fn register_name(&mut self, parent: NodeId, name: String, id: NodeId) {
        self.node_mut(parent)
            .named_children
            .entry(name)
            .or_default()
            .push(id);
    }

    fn unregister_name(&mut self, parent: NodeId, name: &str, id: NodeId) {
        let p = self.node_mut(parent);
        if let Some(holders) = p.named_children.get_mut(name) {
            holders.retain(|h| *h != id);
            if holders.is_empty() {
                p.named_children.remove(name);
            }
        }
    }

    // --- selection ---

    /// Select or deselect the node, recursing into container children.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) {
        self.set_selected_with(id, selected, true);
    }

    /// Select or deselect the node, optionally without recursing.
    pub fn set_selected_with(&mut self, id: NodeId, selected: bool, with_children: bool) {
        if !self.is_alive(id) {
            return;
        }
        let mut stack = alloc::vec![id];
        while let Some(current) = stack.pop() {
            if self.set_flag(current, ItemFlags::SELECTED, selected) {
                if selected {
                    self.selected.insert(current);
                } else {
                    self.selected.remove(&current);
                }
                self.changed(current, ChangeFlags::ATTRIBUTE_APPEARANCE);
            }
            if with_children {
                stack.extend(self.node(current).children.iter().copied());
            }
        }
    }

    /// Whether this node or any of its descendants is selected.
    #[must_use]
    pub fn is_selected(&self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let mut stack = alloc::vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if node.flags.contains(ItemFlags::SELECTED) {
                return true;
            }
            stack.extend(node.children.iter().copied());
        }
        false
    }

    /// Iterate the directly selected node ids, in no particular order.
    pub fn selected_items(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.selected.iter().copied()
    }

    // --- clipping ---

    /// The child currently serving as this container's clip mask.
    ///
    /// The answer is cached and invalidated by hierarchy and clipping
    /// changes. The first child carrying the clip-mask flag wins.
    pub fn clip_mask_child(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.node_opt(id)?;
        if !node.kind.is_container() {
            return None;
        }
        if let Some(cached) = node.clip_child {
            return cached;
        }
        let answer = node
            .children
            .iter()
            .copied()
            .find(|c| {
                self.node_opt(*c)
                    .is_some_and(|n| n.flags.contains(ItemFlags::CLIP_MASK))
            });
        self.node_mut(id).clip_child = Some(answer);
        answer
    }

    // --- events ---

    /// Install the capability hooks for an event kind.
    pub fn set_event_hooks(&mut self, kind: EventKind, hooks: EventHooks) {
        self.events.set_hooks(kind, hooks);
    }

    /// Register interest of `id` in `kind`; the install hook fires on the
    /// node's 0→1 handler-count transition for that kind.
    pub fn add_handler(&mut self, id: NodeId, kind: EventKind) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.events.add_handler(id, kind);
        true
    }

    /// Drop one registered interest of `id` in `kind`; the uninstall hook
    /// fires on the 1→0 transition.
    pub fn remove_handler(&mut self, id: NodeId, kind: EventKind) -> bool {
        self.is_alive(id) && self.events.remove_handler(id, kind)
    }

    /// Current handler count of `id` for `kind`.
    #[must_use]
    pub fn handler_count(&self, id: NodeId, kind: EventKind) -> u32 {
        self.events.handler_count(id, kind)
    }

    /// Nodes subscribed to per-frame callbacks.
    pub fn frame_subscribers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.events.subscribers(EventKind::Frame)
    }

    /// Schedule this node for removal on the next matching interaction.
    ///
    /// The external input dispatcher drains these sets via
    /// [`Scene::drain_remove_on`] and performs the removals.
    pub fn remove_on(&mut self, id: NodeId, mask: RemoveOnMask) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.events.remove_on(id, mask);
        true
    }

    /// Drain the pending-removal set for one interaction kind.
    pub fn drain_remove_on(&mut self, mask: RemoveOnMask) -> Vec<NodeId> {
        self.events.drain_remove_on(mask)
    }

    // --- document surface ---

    /// The per-frame change set, coalesced by node identity.
    #[must_use]
    pub fn changes(&self) -> &ChangeSet<NodeId> {
        &self.changes
    }

    /// Drain the per-frame change set, typically once per redraw.
    pub fn drain_changes(&mut self) -> Vec<(NodeId, ChangeFlags)> {
        self.changes.drain().collect()
    }

    /// Whether any appearance-affecting change occurred since the last
    /// [`Scene::take_redraw_needed`].
    #[must_use]
    pub fn redraw_needed(&self) -> bool {
        self.redraw_needed
    }

    /// Consume the redraw flag.
    pub fn take_redraw_needed(&mut self) -> bool {
        core::mem::take(&mut self.redraw_needed)
    }

    // --- read accessors ---

    /// The node's local transform.
    #[must_use]
    pub fn matrix(&self, id: NodeId) -> Option<Affine> {
        self.node_opt(id).map(|n| n.matrix)
    }

    /// The node's attribute flags.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> Option<ItemFlags> {
        self.node_opt(id).map(|n| n.flags)
    }

    /// The node's opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> Option<f64> {
        self.node_opt(id).map(|n| n.opacity)
    }

    /// The node's blend mode.
    #[must_use]
    pub fn blend_mode(&self, id: NodeId) -> Option<BlendMode> {
        self.node_opt(id).map(|n| n.blend_mode)
    }

    /// The node's style.
    #[must_use]
    pub fn style(&self, id: NodeId) -> Option<&Style> {
        self.node_opt(id).map(|n| &n.style)
    }

    /// The node's name, if assigned.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id)?.name.as_deref()
    }

    /// The node's kind.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node_opt(id).map(|n| &n.kind)
    }

    /// The parent of a node, or `None` for roots, layers, and stale ids.
    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// The children of a node, or an empty slice for leaves and stale ids.
    #[must_use]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The node's position in its parent's child list, or in the layer list
    /// for an un-parented layer.
    #[must_use]
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.node_opt(id).map(|n| n.index)
    }

    /// The next sibling above this node in paint order.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node_opt(id)?;
        let parent = node.parent?;
        self.node(parent).children.get(node.index + 1).copied()
    }

    /// The previous sibling below this node in paint order.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node_opt(id)?;
        let parent = node.parent?;
        node.index
            .checked_sub(1)
            .and_then(|i| self.node(parent).children.get(i).copied())
    }
}
