// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event-interest bookkeeping.
//!
//! The scene does not dispatch input itself; an outer layer does. What the
//! scene tracks is which nodes are interested in which event kinds, so that
//! expensive input machinery (native listeners, animation timers) can be
//! installed exactly when the first handler for a kind appears on a node and
//! torn down when the last one goes away.

use alloc::boxed::Box;
use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};

use crate::types::NodeId;

/// The event kinds a node can register interest in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer pressed over the node.
    PointerDown,
    /// Pointer released over the node.
    PointerUp,
    /// Pointer moved while pressed.
    PointerDrag,
    /// Pointer moved unpressed.
    PointerMove,
    /// Per-frame tick.
    Frame,
}

impl EventKind {
    pub(crate) const COUNT: usize = 5;

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::PointerDown => 0,
            Self::PointerUp => 1,
            Self::PointerDrag => 2,
            Self::PointerMove => 3,
            Self::Frame => 4,
        }
    }
}

bitflags::bitflags! {
    /// Interaction kinds a node can be scheduled for removal on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RemoveOnMask: u8 {
        /// Remove on the next pointer press.
        const DOWN = 1 << 0;
        /// Remove on the next pointer release.
        const UP   = 1 << 1;
        /// Remove on the next drag movement.
        const DRAG = 1 << 2;
        /// Remove on the next unpressed movement.
        const MOVE = 1 << 3;
    }
}

impl RemoveOnMask {
    const BITS_ORDER: [Self; 4] = [Self::DOWN, Self::UP, Self::DRAG, Self::MOVE];
}

/// Install/uninstall callbacks for one event kind.
///
/// `install` fires on a node's 0→1 handler-count transition for the kind,
/// `uninstall` on 1→0 (including node destruction). Transitions strictly in
/// between fire nothing.
pub struct EventHooks {
    install: Box<dyn FnMut(NodeId)>,
    uninstall: Box<dyn FnMut(NodeId)>,
}

impl EventHooks {
    /// Bundle an install and uninstall callback.
    pub fn new(
        install: impl FnMut(NodeId) + 'static,
        uninstall: impl FnMut(NodeId) + 'static,
    ) -> Self {
        Self {
            install: Box::new(install),
            uninstall: Box::new(uninstall),
        }
    }
}

impl core::fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventHooks").finish_non_exhaustive()
    }
}

/// Per-node handler counts, capability hooks, and pending-removal sets.
pub(crate) struct EventRegistry {
    hooks: [Option<EventHooks>; EventKind::COUNT],
    counts: HashMap<NodeId, [u32; EventKind::COUNT]>,
    remove_on: [HashSet<NodeId>; 4],
}

impl core::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("tracked_nodes", &self.counts.len())
            .finish_non_exhaustive()
    }
}

impl EventRegistry {
    pub(crate) fn new() -> Self {
        Self {
            hooks: [None, None, None, None, None],
            counts: HashMap::new(),
            remove_on: [
                HashSet::new(),
                HashSet::new(),
                HashSet::new(),
                HashSet::new(),
            ],
        }
    }

    /// Install the hooks for a kind. Hooks apply to transitions from here
    /// on; existing registrations are not replayed.
    pub(crate) fn set_hooks(&mut self, kind: EventKind, hooks: EventHooks) {
        self.hooks[kind.index()] = Some(hooks);
    }

    pub(crate) fn add_handler(&mut self, id: NodeId, kind: EventKind) {
        let counts = self.counts.entry(id).or_insert([0; EventKind::COUNT]);
        let slot = &mut counts[kind.index()];
        *slot += 1;
        if *slot == 1
            && let Some(hooks) = self.hooks[kind.index()].as_mut()
        {
            (hooks.install)(id);
        }
    }

    pub(crate) fn remove_handler(&mut self, id: NodeId, kind: EventKind) -> bool {
        let Some(counts) = self.counts.get_mut(&id) else {
            return false;
        };
        let slot = &mut counts[kind.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        let emptied = *slot == 0;
        if counts.iter().all(|c| *c == 0) {
            self.counts.remove(&id);
        }
        if emptied
            && let Some(hooks) = self.hooks[kind.index()].as_mut()
        {
            (hooks.uninstall)(id);
        }
        true
    }

    pub(crate) fn handler_count(&self, id: NodeId, kind: EventKind) -> u32 {
        self.counts
            .get(&id)
            .map_or(0, |counts| counts[kind.index()])
    }

    pub(crate) fn subscribers(&self, kind: EventKind) -> impl Iterator<Item = NodeId> + '_ {
        self.counts
            .iter()
            .filter(move |(_, counts)| counts[kind.index()] > 0)
            .map(|(id, _)| *id)
    }

    pub(crate) fn remove_on(&mut self, id: NodeId, mask: RemoveOnMask) {
        for (i, bit) in RemoveOnMask::BITS_ORDER.into_iter().enumerate() {
            if mask.contains(bit) {
                self.remove_on[i].insert(id);
            }
        }
    }

    pub(crate) fn drain_remove_on(&mut self, mask: RemoveOnMask) -> Vec<NodeId> {
        let mut drained = HashSet::new();
        for (i, bit) in RemoveOnMask::BITS_ORDER.into_iter().enumerate() {
            if mask.contains(bit) {
                drained.extend(self.remove_on[i].drain());
            }
        }
        drained.into_iter().collect()
    }

    /// Forget a destroyed node, firing uninstall hooks for every kind it
    /// still had handlers for.
    pub(crate) fn remove_node(&mut self, id: NodeId) {
        if let Some(counts) = self.counts.remove(&id) {
            for (i, count) in counts.into_iter().enumerate() {
                if count > 0
                    && let Some(hooks) = self.hooks[i].as_mut()
                {
                    (hooks.uninstall)(id);
                }
            }
        }
        for set in &mut self.remove_on {
            set.remove(&id);
        }
    }
}
