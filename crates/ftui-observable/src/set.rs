#![forbid(unsafe_code)]

//! Observable hash set.
//!
//! A set is an [`ObservableCollection`] over a [`HashSet`]. Duplicate adds
//! are rejected silently by the set and therefore raise nothing. The set
//! algebra below applies each operation as one batch and raises a single
//! event listing only the items that actually changed.

use std::collections::HashSet;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

use ftui_collections::Result;

use crate::collection::ObservableCollection;

/// Change-notifying hash set.
pub type ObservableSet<T, S = RandomState> = ObservableCollection<T, HashSet<T, S>>;

impl<T, S> ObservableCollection<T, HashSet<T, S>>
where
    T: Clone + Eq + Hash + 'static,
    S: BuildHasher,
{
    /// Add every item of `other`. One `Add` lists the new members.
    pub fn union_with(&self, other: impl IntoIterator<Item = T>) -> Result<usize> {
        self.add_range(other)
    }

    /// Remove every item of `other`. One `Remove` lists the dropped members.
    pub fn except_with(&self, other: impl IntoIterator<Item = T>) -> Result<usize> {
        self.remove_items(other)
    }

    /// Keep only items also in `other`. One `Remove` lists the dropped members.
    pub fn intersect_with(&self, other: impl IntoIterator<Item = T>) -> Result<usize> {
        let keep: HashSet<T> = other.into_iter().collect();
        let doomed: Vec<T> = self
            .with_source(|set| set.iter().filter(|x| !keep.contains(*x)).cloned().collect());
        self.remove_items(doomed)
    }

    /// Whether every member is also in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &HashSet<T, S>) -> bool {
        self.with_source(|set| set.is_subset(other))
    }
}
