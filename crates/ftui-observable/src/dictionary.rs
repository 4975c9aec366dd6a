#![forbid(unsafe_code)]

//! Observable ordered dictionary.
//!
//! An [`ObservableOrderedMap<K, V>`] is an [`ObservableKeyedList`] whose items
//! are `(K, V)` pairs stored in an [`OrderedMap`]. Positional events carry
//! whole pairs, so a value update appears as a `Replace` of the old pair by
//! the new one at the key's position.

use std::hash::Hash;

use ftui_collections::{OrderedMap, Result};

use crate::keyed::ObservableKeyedList;

/// Change-notifying order-preserving dictionary.
pub type ObservableOrderedMap<K, V> = ObservableKeyedList<K, (K, V), OrderedMap<K, V>>;

impl<K, V> ObservableKeyedList<K, (K, V), OrderedMap<K, V>>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    /// Copy of the value stored under `key`.
    pub fn value_of(&self, key: &K) -> Result<V> {
        self.with_source(|map| map.value_for(key).cloned())
    }

    #[must_use]
    pub fn try_value_of(&self, key: &K) -> Option<V> {
        self.with_source(|map| map.get(key).cloned())
    }

    /// Update the value under `key` in place, or append a new entry.
    pub fn set_value(&self, key: K, value: V) -> Result<()> {
        self.upsert((key, value))
    }

    /// Insert a new entry at `index`. Fails with `DuplicateKey` if present.
    pub fn insert_at(&self, index: usize, key: K, value: V) -> Result<()> {
        self.insert(index, (key, value)).map(|_| ())
    }

    /// Remove the entry under `key`. Returns whether it was present.
    pub fn remove_key(&self, key: &K) -> Result<bool> {
        self.remove_by_key(key)
    }

    /// Values in positional order.
    #[must_use]
    pub fn values(&self) -> Vec<V> {
        self.with_source(|map| map.values().cloned().collect())
    }
}
