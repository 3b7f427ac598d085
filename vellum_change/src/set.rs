// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame change accumulation keyed by node identity.

use core::hash::Hash;

use hashbrown::HashMap;

use crate::ChangeFlags;

/// Accumulated per-frame changes, one entry per key with unioned flags.
///
/// A node reported several times between two drains appears once, with the
/// union of all its flags. The generation counter increments on every
/// mutation and can be used to detect that the set changed since a previous
/// observation.
///
/// # Type Parameters
///
/// - `K`: the key type, typically a node identifier. Must be `Copy + Eq + Hash`.
///
/// # Example
///
/// ```
/// use vellum_change::{ChangeFlags, ChangeSet};
///
/// let mut changes = ChangeSet::<u32>::new();
/// changes.record(1, ChangeFlags::GEOMETRY_APPEARANCE);
/// changes.record(2, ChangeFlags::CHILDREN);
/// changes.record(1, ChangeFlags::ATTRIBUTE_APPEARANCE);
///
/// assert_eq!(changes.len(), 2);
///
/// // Drain returns and clears the accumulated entries.
/// let drained: Vec<_> = changes.drain().collect();
/// assert_eq!(drained.len(), 2);
/// assert!(changes.is_empty());
/// ```
#[derive(Debug)]
pub struct ChangeSet<K>
where
    K: Copy + Eq + Hash,
{
    entries: HashMap<K, ChangeFlags>,
    /// Generation counter, incremented on each mutation.
    generation: u64,
}

impl<K> Default for ChangeSet<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ChangeSet<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates a new empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
        }
    }

    /// Returns the current generation.
    ///
    /// The generation is incremented on every mutation (record, drain,
    /// clear, key removal).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Records a change, unioning `flags` into any existing entry for `key`.
    ///
    /// Returns `true` if the key was newly inserted, `false` if an existing
    /// entry was extended.
    pub fn record(&mut self, key: K, flags: ChangeFlags) -> bool {
        self.generation = self.generation.wrapping_add(1);
        match self.entries.entry(key) {
            hashbrown::hash_map::Entry::Occupied(mut e) => {
                *e.get_mut() |= flags;
                false
            }
            hashbrown::hash_map::Entry::Vacant(e) => {
                e.insert(flags);
                true
            }
        }
    }

    /// Returns the accumulated flags for `key`, if any change was recorded.
    #[must_use]
    pub fn get(&self, key: K) -> Option<ChangeFlags> {
        self.entries.get(&key).copied()
    }

    /// Returns `true` if any change was recorded for `key`.
    #[must_use]
    pub fn is_changed(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the number of keys with recorded changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no changes are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over recorded `(key, flags)` pairs without clearing them.
    pub fn iter(&self) -> impl Iterator<Item = (K, ChangeFlags)> + '_ {
        self.entries.iter().map(|(k, f)| (*k, *f))
    }

    /// Drains and returns the recorded `(key, flags)` pairs.
    ///
    /// After this call the set is empty; typically invoked once per frame by
    /// the redraw scheduler.
    pub fn drain(&mut self) -> impl Iterator<Item = (K, ChangeFlags)> + '_ {
        self.generation = self.generation.wrapping_add(1);
        self.entries.drain()
    }

    /// Removes the entry for a specific key.
    ///
    /// Used when a node is destroyed so a stale id is never reported.
    pub fn remove_key(&mut self, key: K) {
        if self.entries.remove(&key).is_some() {
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Clears all recorded changes.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.entries.clear();
    }
}

impl<K> Clone for ChangeSet<K>
where
    K: Copy + Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            generation: self.generation,
        }
    }
}
