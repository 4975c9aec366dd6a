#![forbid(unsafe_code)]

//! Order-preserving hash map with positional access.
//!
//! # Design
//!
//! [`OrderedMap<K, V>`] keeps two structures in lockstep:
//!
//! - `entries`: a hash index from key to value (O(1) lookup).
//! - `order`: a `Vec<K>` where `order[i]` is the key at position `i`.
//!
//! ```text
//! insert(0, "a", 1); insert(1, "b", 2); insert(0, "c", 3)
//!
//!   order:   [ "c", "a", "b" ]
//!   entries: { "a" => 1, "b" => 2, "c" => 3 }
//! ```
//!
//! # Performance
//!
//! | Operation            | Complexity |
//! |----------------------|------------|
//! | `get()` / `value_for()` | O(1)    |
//! | `value_at()`         | O(1)       |
//! | `push()`             | O(1) amortized |
//! | `insert()`           | O(n)       |
//! | `remove()` / `remove_at()` | O(n) |
//! | `index_of_key()`     | O(n)       |
//!
//! `index_of_key` scans the order vector. Callers needing frequent reverse
//! lookups should keep their own secondary index.
//!
//! # Invariants
//!
//! 1. The key set of `entries` equals the key set of `order`; `order` has no
//!    duplicates.
//! 2. Every mutation checks its preconditions before touching either
//!    structure, so a failed call leaves the map unchanged.
//! 3. `version` increments on every successful mutation, including
//!    value-only updates that leave `order` untouched.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use crate::capability::{Container, KeyedContainer, PositionalContainer};
use crate::error::{CollectionError, Result, check_index, check_insert_index};

const DESYNC: &str = "ordered map key missing from hash index";

/// Hash map that remembers a caller-controlled order of its keys.
#[derive(Clone)]
pub struct OrderedMap<K, V, S = FxBuildHasher> {
    entries: HashMap<K, V, S>,
    order: Vec<K>,
    version: u64,
}

impl<K, V> OrderedMap<K, V, FxBuildHasher> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher)
    }

    /// Create an empty map with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            order: Vec::with_capacity(capacity),
            version: 0,
        }
    }
}

impl<K, V, S> OrderedMap<K, V, S> {
    /// Create an empty map using `hasher` for the key index.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            entries: HashMap::with_hasher(hasher),
            order: Vec::new(),
            version: 0,
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Modification counter. Bumps on every successful mutation.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Keys in positional order.
    pub fn keys(&self) -> std::slice::Iter<'_, K> {
        self.order.iter()
    }

    /// Keys in positional order, as a slice.
    #[must_use]
    pub fn key_slice(&self) -> &[K] {
        &self.order
    }

    /// Key at `index`.
    pub fn key_at(&self, index: usize) -> Result<&K> {
        self.order.get(index).ok_or(CollectionError::OutOfRange {
            index,
            len: self.order.len(),
        })
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.touch();
    }

    #[inline]
    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Clone + Eq + Hash,
    S: BuildHasher,
{
    /// Create a map holding a copy of `other`, in the same order.
    #[must_use]
    pub fn from_ordered<S2>(other: &OrderedMap<K, V, S2>) -> Self
    where
        V: Clone,
        S: Default,
        S2: BuildHasher,
    {
        let mut map = Self::with_hasher(S::default());
        map.entries.reserve(other.len());
        map.order.reserve(other.len());
        for (key, value) in other {
            map.order.push(key.clone());
            map.entries.insert(key.clone(), value.clone());
        }
        map
    }

    /// Whether `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.entries.contains_key(key)
    }

    /// Value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.entries.get(key)
    }

    /// Mutable value stored under `key`.
    ///
    /// Mutating through the returned reference does not bump the version.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.entries.get_mut(key)
    }

    /// Value stored under `key`, failing with [`CollectionError::KeyNotFound`].
    pub fn value_for<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.entries.get(key).ok_or(CollectionError::KeyNotFound)
    }

    /// Value at `index`.
    pub fn value_at(&self, index: usize) -> Result<&V> {
        let key = self.key_at(index)?;
        self.entries
            .get(key)
            .ok_or(CollectionError::Inconsistent(DESYNC))
    }

    /// Key and value at `index`.
    pub fn entry_at(&self, index: usize) -> Result<(&K, &V)> {
        let key = self.key_at(index)?;
        self.entries
            .get_key_value(key)
            .ok_or(CollectionError::Inconsistent(DESYNC))
    }

    /// Position of `key`, by linear scan of the order vector.
    pub fn index_of_key<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.order
            .iter()
            .position(|k| <K as Borrow<Q>>::borrow(k) == key)
    }

    /// Insert a new entry at `index` (`0..=len`).
    ///
    /// Fails with [`CollectionError::OutOfRange`] or
    /// [`CollectionError::DuplicateKey`] without modifying the map.
    pub fn insert(&mut self, index: usize, key: K, value: V) -> Result<()> {
        check_insert_index(index, self.order.len())?;
        if self.entries.contains_key(&key) {
            return Err(CollectionError::DuplicateKey);
        }
        self.order.insert(index, key.clone());
        self.entries.insert(key, value);
        self.touch();
        Ok(())
    }

    /// Append a new entry.
    pub fn push(&mut self, key: K, value: V) -> Result<()> {
        self.insert(self.order.len(), key, value)
    }

    /// Remove the entry at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<(K, V)> {
        check_index(index, self.order.len())?;
        let entry = self
            .entries
            .remove_entry(&self.order[index])
            .ok_or(CollectionError::Inconsistent(DESYNC))?;
        self.order.remove(index);
        self.touch();
        Ok(entry)
    }

    /// Remove the entry stored under `key`, returning it.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.index_of_key(key)?;
        let entry = self.entries.remove_entry(key)?;
        self.order.remove(index);
        self.touch();
        Some(entry)
    }

    /// Remove the entry stored under `key`. Returns whether it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).is_some()
    }

    /// Replace the value at `index`, returning the previous value.
    ///
    /// Order is unchanged but the version still bumps, so anything holding a
    /// version snapshot sees the write.
    pub fn set_value_at(&mut self, index: usize, value: V) -> Result<V> {
        check_index(index, self.order.len())?;
        let slot = self
            .entries
            .get_mut(&self.order[index])
            .ok_or(CollectionError::Inconsistent(DESYNC))?;
        let old = std::mem::replace(slot, value);
        self.touch();
        Ok(old)
    }

    /// Update the value under `key` in place, or append a new entry.
    ///
    /// Returns the previous value when the key was already present.
    pub fn set_value_for(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.entries.get_mut(&key) {
            let old = std::mem::replace(slot, value);
            self.touch();
            return Some(old);
        }
        self.order.push(key.clone());
        self.entries.insert(key, value);
        self.touch();
        None
    }

    /// Replace both key and value at `index`, returning the previous entry.
    ///
    /// Fails with [`CollectionError::DuplicateKey`] if `key` is present at a
    /// different position.
    pub fn replace_entry_at(&mut self, index: usize, key: K, value: V) -> Result<(K, V)> {
        check_index(index, self.order.len())?;
        if self.order[index] == key {
            let old = self.set_value_at(index, value)?;
            return Ok((key, old));
        }
        if self.entries.contains_key(&key) {
            return Err(CollectionError::DuplicateKey);
        }
        let old_value = self
            .entries
            .remove(&self.order[index])
            .ok_or(CollectionError::Inconsistent(DESYNC))?;
        let old_key = std::mem::replace(&mut self.order[index], key.clone());
        self.entries.insert(key, value);
        self.touch();
        Ok((old_key, old_value))
    }

    /// Mutable value at `index`. Bumps the version.
    pub fn value_at_mut(&mut self, index: usize) -> Result<&mut V> {
        check_index(index, self.order.len())?;
        self.touch();
        self.entries
            .get_mut(&self.order[index])
            .ok_or(CollectionError::Inconsistent(DESYNC))
    }

    /// Entries in positional order.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            keys: self.order.iter(),
            entries: &self.entries,
        }
    }

    /// Values in positional order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<K, V> Default for OrderedMap<K, V, FxBuildHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> std::fmt::Debug for OrderedMap<K, V, S>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
    V: std::fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for OrderedMap<K, V, S>
where
    K: Clone + Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Clone + Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set_value_for(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Clone + Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedMap<K, V, S>
where
    K: Clone + Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`OrderedMap`] in positional order.
pub struct Iter<'a, K, V, S> {
    keys: std::slice::Iter<'a, K>,
    entries: &'a HashMap<K, V, S>,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        self.entries.get_key_value(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K, V, S> DoubleEndedIterator for Iter<'_, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let key = self.keys.next_back()?;
        self.entries.get_key_value(key)
    }
}

impl<K, V, S> ExactSizeIterator for Iter<'_, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
}

// ---------------------------------------------------------------------------
// Capabilities: items are `(K, V)` pairs.
// ---------------------------------------------------------------------------

impl<K, V, S> Container<(K, V)> for OrderedMap<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone + PartialEq,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        self.order.len()
    }

    fn contains(&self, item: &(K, V)) -> bool {
        self.entries.get(&item.0) == Some(&item.1)
    }

    fn to_vec(&self) -> Vec<(K, V)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn add(&mut self, item: (K, V)) -> Result<()> {
        self.push(item.0, item.1)
    }

    fn remove(&mut self, item: &(K, V)) -> Result<bool> {
        if !Container::contains(self, item) {
            return Ok(false);
        }
        Ok(OrderedMap::remove(self, &item.0))
    }

    fn clear(&mut self) -> Result<()> {
        OrderedMap::clear(self);
        Ok(())
    }
}

impl<K, V, S> PositionalContainer<(K, V)> for OrderedMap<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone + PartialEq,
    S: BuildHasher,
{
    fn index_of(&self, item: &(K, V)) -> Option<usize> {
        if !Container::contains(self, item) {
            return None;
        }
        self.index_of_key(&item.0)
    }

    fn get(&self, index: usize) -> Result<(K, V)> {
        self.entry_at(index).map(|(k, v)| (k.clone(), v.clone()))
    }

    fn insert(&mut self, index: usize, item: (K, V)) -> Result<()> {
        OrderedMap::insert(self, index, item.0, item.1)
    }

    fn remove_at(&mut self, index: usize) -> Result<(K, V)> {
        OrderedMap::remove_at(self, index)
    }

    fn set(&mut self, index: usize, item: (K, V)) -> Result<(K, V)> {
        self.replace_entry_at(index, item.0, item.1)
    }
}

impl<K, V, S> KeyedContainer<K, (K, V)> for OrderedMap<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    fn key_of(&self, item: &(K, V)) -> K {
        item.0.clone()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn try_get_by_key(&self, key: &K) -> Option<(K, V)> {
        self.entries
            .get_key_value(key)
            .map(|(k, v)| (k.clone(), v.clone()))
    }

    fn remove_by_key(&mut self, key: &K) -> Result<bool> {
        Ok(OrderedMap::remove(self, key))
    }

    fn keys(&self) -> Vec<K> {
        self.order.clone()
    }
}

// ---------------------------------------------------------------------------
// Persistence: serialized as a map in positional order.
// ---------------------------------------------------------------------------

#[cfg(feature = "serde")]
mod persist {
    use std::fmt;
    use std::hash::{BuildHasher, Hash};
    use std::marker::PhantomData;

    use serde::de::{Deserialize, Deserializer, Error, MapAccess, Visitor};
    use serde::ser::{Serialize, SerializeMap, Serializer};

    use super::OrderedMap;

    impl<K, V, S> Serialize for OrderedMap<K, V, S>
    where
        K: Serialize + Clone + Eq + Hash,
        V: Serialize,
        S: BuildHasher,
    {
        fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (k, v) in self {
                map.serialize_entry(k, v)?;
            }
            map.end()
        }
    }

    struct OrderedMapVisitor<K, V, S>(PhantomData<fn() -> OrderedMap<K, V, S>>);

    impl<'de, K, V, S> Visitor<'de> for OrderedMapVisitor<K, V, S>
    where
        K: Deserialize<'de> + Clone + Eq + Hash,
        V: Deserialize<'de>,
        S: BuildHasher + Default,
    {
        type Value = OrderedMap<K, V, S>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map with unique keys")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = OrderedMap::with_hasher(S::default());
            while let Some((k, v)) = access.next_entry()? {
                map.push(k, v).map_err(A::Error::custom)?;
            }
            Ok(map)
        }
    }

    impl<'de, K, V, S> Deserialize<'de> for OrderedMap<K, V, S>
    where
        K: Deserialize<'de> + Clone + Eq + Hash,
        V: Deserialize<'de>,
        S: BuildHasher + Default,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
        }
    }

}
