// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Dense set with O(1) membership, insertion, and swap-remove
//!
//! Items live contiguously in a `Vec` for fast iteration, with a sparse
//! `HashMap` from item to its dense index. Insertions append. Removal moves
//! the last item into the vacated slot, so iteration order is insertion order
//! only until the first removal.
//!
//! # Example
//!
//! ```
//! use scene_runtime::IndexedSet;
//!
//! let mut set = IndexedSet::new();
//! assert!(set.add('a'));
//! assert!(set.add('b'));
//! assert!(set.add('c'));
//! assert!(!set.add('a'));
//!
//! assert!(set.remove(&'a'));
//! assert_eq!(set.as_slice(), &['c', 'b']);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Index;

/// A set with O(1) lookup by item and by position
#[derive(Debug, Clone)]
pub struct IndexedSet<T> {
    /// Mapping from item to dense array index
    indices: HashMap<T, usize>,
    /// Items stored densely in iteration order
    items: Vec<T>,
}

impl<T> IndexedSet<T>
where
    T: Eq + Hash + Clone,
{
    /// Create a new empty set
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new set with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        IndexedSet {
            indices: HashMap::with_capacity(capacity),
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of items in the set
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check whether `item` is a member
    pub fn contains(&self, item: &T) -> bool {
        self.indices.contains_key(item)
    }

    /// Dense position of `item`, if present
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.indices.get(item).copied()
    }

    /// Item at dense position `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Append `item`
    ///
    /// Returns false without modifying the set if `item` is already present.
    pub fn add(&mut self, item: T) -> bool {
        if self.indices.contains_key(&item) {
            return false;
        }
        self.indices.insert(item.clone(), self.items.len());
        self.items.push(item);

        debug_assert_eq!(self.indices.len(), self.items.len());
        true
    }

    /// Append an item the caller knows is absent
    ///
    /// # Panics
    ///
    /// Panics if `item` is already present.
    pub fn add_or_die(&mut self, item: T) {
        assert!(self.add(item), "IndexedSet::add_or_die: item already present");
    }

    /// Remove `item`, backfilling its slot with the last item
    ///
    /// Returns false if `item` was not present.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(index) = self.indices.remove(item) else {
            return false;
        };

        let last_index = self.items.len() - 1;
        if index != last_index {
            self.items.swap(index, last_index);
            // The former last item now lives at `index`
            let moved = self.items[index].clone();
            self.indices.insert(moved, index);
        }
        self.items.pop();

        debug_assert_eq!(self.indices.len(), self.items.len());
        true
    }

    /// Remove an item the caller knows is present
    ///
    /// # Panics
    ///
    /// Panics if `item` is absent.
    pub fn remove_or_die(&mut self, item: &T) {
        assert!(self.remove(item), "IndexedSet::remove_or_die: item not present");
    }

    /// Remove every item
    pub fn clear(&mut self) {
        self.indices.clear();
        self.items.clear();
    }

    /// Reorder the backing storage and rebuild the position index
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.items.sort_by(compare);
        self.rebuild_indices();
    }

    /// Reorder by a derived key
    pub fn sort_by_key<K, F>(&mut self, key: F)
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        self.items.sort_by_key(key);
        self.rebuild_indices();
    }

    /// Iterate in dense storage order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// View the dense storage
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Copy the items out, e.g. to iterate while the set may change
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }

    /// Remove every item, yielding them in storage order
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.indices.clear();
        self.items.drain(..)
    }

    fn rebuild_indices(&mut self) {
        for (index, item) in self.items.iter().enumerate() {
            if let Some(slot) = self.indices.get_mut(item) {
                *slot = index;
            }
        }
    }
}

impl<T> Default for IndexedSet<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for IndexedSet<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a IndexedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for IndexedSet<T>
where
    T: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = IndexedSet::new();
        for item in iter {
            set.add(item);
        }
        set
    }
}
