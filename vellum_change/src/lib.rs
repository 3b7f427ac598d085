// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vellum Change: change-flag taxonomy and per-frame change coalescing.
//!
//! Every mutation of a Vellum scene is described by a [`ChangeFlags`] bitmask
//! telling caching and redraw logic *what kind* of thing changed: tree
//! structure, geometry, stroke parameters, styling, attributes, content,
//! pixels, or clipping. Derived composite masks additionally carry the
//! `APPEARANCE` bit, which is what redraw scheduling keys off.
//!
//! [`ChangeSet`] accumulates these reports per frame, keyed by node identity,
//! so that a node changed several times between two redraws is reported once
//! with the union of its flags. A generation counter bumps on every mutation
//! and lets callers detect that the set changed since a previous observation.
//!
//! ## Example
//!
//! ```rust
//! use vellum_change::{ChangeFlags, ChangeSet};
//!
//! let mut changes = ChangeSet::<u32>::new();
//! changes.record(7, ChangeFlags::GEOMETRY_APPEARANCE);
//! changes.record(7, ChangeFlags::STYLE_APPEARANCE);
//!
//! // One entry, combined flags.
//! assert_eq!(changes.len(), 1);
//! let flags = changes.get(7).unwrap();
//! assert!(flags.contains(ChangeFlags::GEOMETRY));
//! assert!(flags.contains(ChangeFlags::STYLE));
//! assert!(flags.contains(ChangeFlags::APPEARANCE));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod set;

pub use set::ChangeSet;

bitflags::bitflags! {
    /// Bitmask describing what aspect of a node changed.
    ///
    /// The base bits classify the change; the derived `*_APPEARANCE`
    /// composites are what mutation paths actually raise, since every
    /// visually relevant change also sets [`ChangeFlags::APPEARANCE`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u16 {
        /// Anything that affects rendered output.
        const APPEARANCE = 1 << 0;
        /// The child list of a node changed (insertion, removal, reorder).
        const HIERARCHY = 1 << 1;
        /// The node was inserted into or removed from a parent.
        const INSERTION = 1 << 2;
        /// Geometry changed: transform, placement, or intrinsic extents.
        const GEOMETRY = 1 << 3;
        /// Stroke parameters that affect stroke bounds changed.
        const STROKE = 1 << 4;
        /// The node's style object was reassigned.
        const STYLE = 1 << 5;
        /// A non-geometric attribute changed (visibility, lock, selection...).
        const ATTRIBUTE = 1 << 6;
        /// The node's content changed (e.g. a symbol definition edit).
        const CONTENT = 1 << 7;
        /// Raster pixels changed.
        const PIXELS = 1 << 8;
        /// Clip-mask designation changed.
        const CLIPPING = 1 << 9;

        /// Child list changed, appearance affected.
        const CHILDREN = Self::HIERARCHY.bits() | Self::APPEARANCE.bits();
        /// Insertion or removal, appearance affected.
        const INSERTION_APPEARANCE = Self::INSERTION.bits() | Self::APPEARANCE.bits();
        /// Geometry changed, appearance affected.
        const GEOMETRY_APPEARANCE = Self::GEOMETRY.bits() | Self::APPEARANCE.bits();
        /// Stroke changed, appearance affected.
        const STROKE_APPEARANCE = Self::STROKE.bits() | Self::GEOMETRY.bits() | Self::APPEARANCE.bits();
        /// Style reassigned, appearance affected.
        const STYLE_APPEARANCE = Self::STYLE.bits() | Self::APPEARANCE.bits();
        /// Attribute changed, appearance affected.
        const ATTRIBUTE_APPEARANCE = Self::ATTRIBUTE.bits() | Self::APPEARANCE.bits();
        /// Content changed, appearance affected.
        const CONTENT_APPEARANCE = Self::CONTENT.bits() | Self::APPEARANCE.bits();
        /// Pixels changed, appearance affected.
        const PIXELS_APPEARANCE = Self::PIXELS.bits() | Self::APPEARANCE.bits();
        /// Clipping changed, appearance affected.
        const CLIP_APPEARANCE = Self::CLIPPING.bits() | Self::APPEARANCE.bits();
    }
}

impl ChangeFlags {
    /// Returns true if this change invalidates cached bounds of the node itself.
    #[inline]
    #[must_use]
    pub const fn invalidates_own_bounds(self) -> bool {
        self.intersects(Self::GEOMETRY)
    }

    /// Returns true if this change invalidates bounds an ancestor may have
    /// cached by aggregating through the node.
    #[inline]
    #[must_use]
    pub const fn invalidates_parent_bounds(self) -> bool {
        self.intersects(Self::GEOMETRY.union(Self::STROKE))
    }
}
