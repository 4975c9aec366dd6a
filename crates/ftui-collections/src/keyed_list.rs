#![forbid(unsafe_code)]

//! Order-preserving keyed list.
//!
//! [`KeyedList<K, T>`] stores items whose key is derived from the item
//! itself by a plain function pointer. Positional order is caller-controlled
//! and lookups by key are O(1), both provided by an [`OrderedMap`].
//!
//! # Example
//!
//! ```
//! use ftui_collections::KeyedList;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Tab { id: u32, title: &'static str }
//!
//! let mut tabs = KeyedList::new(|t: &Tab| t.id);
//! tabs.push(Tab { id: 7, title: "logs" }).unwrap();
//! tabs.insert(0, Tab { id: 3, title: "home" }).unwrap();
//!
//! assert_eq!(tabs.get(0).map(|t| t.title), Some("home"));
//! assert_eq!(tabs.get_by_key(&7).map(|t| t.title), Some("logs"));
//! assert!(tabs.push(Tab { id: 3, title: "dup" }).is_err());
//! ```

use std::hash::Hash;

use crate::capability::{Container, KeyedContainer, PositionalContainer};
use crate::error::Result;
use crate::ordered_map::OrderedMap;

/// Items in caller-controlled order, each reachable by a derived key.
///
/// The key function is a plain `fn` so the list carries no captured state.
#[derive(Clone)]
pub struct KeyedList<K, T> {
    map: OrderedMap<K, T>,
    key_of: fn(&T) -> K,
}

impl<K, T> KeyedList<K, T>
where
    K: Clone + Eq + Hash,
{
    /// Create an empty list that keys items with `key_of`.
    #[must_use]
    pub fn new(key_of: fn(&T) -> K) -> Self {
        Self {
            map: OrderedMap::new(),
            key_of,
        }
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Key function in use.
    #[must_use]
    pub fn key_fn(&self) -> fn(&T) -> K {
        self.key_of
    }

    /// Item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.map.value_at(index).ok()
    }

    /// Item stored under `key`.
    #[must_use]
    pub fn get_by_key(&self, key: &K) -> Option<&T> {
        self.map.get(key)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Position of `key` (linear).
    #[must_use]
    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        self.map.index_of_key(key)
    }

    /// Append an item. Fails with `DuplicateKey` if its key is present.
    pub fn push(&mut self, item: T) -> Result<()> {
        let key = (self.key_of)(&item);
        self.map.push(key, item)
    }

    /// Insert an item at `index`.
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        let key = (self.key_of)(&item);
        self.map.insert(index, key, item)
    }

    /// Remove and return the item at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.map.remove_at(index).map(|(_, item)| item)
    }

    /// Remove the item stored under `key`.
    pub fn remove_key(&mut self, key: &K) -> Option<T> {
        self.map.remove_entry(key).map(|(_, item)| item)
    }

    /// Replace the item at `index`. The new item may carry a different key,
    /// as long as that key is not used elsewhere.
    pub fn set(&mut self, index: usize, item: T) -> Result<T> {
        let key = (self.key_of)(&item);
        self.map
            .replace_entry_at(index, key, item)
            .map(|(_, old)| old)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Items in positional order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.map.values()
    }

    /// Keys in positional order.
    pub fn keys(&self) -> std::slice::Iter<'_, K> {
        self.map.keys()
    }
}

impl<K, T> std::fmt::Debug for KeyedList<K, T>
where
    K: Clone + Eq + Hash,
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, T> Container<T> for KeyedList<K, T>
where
    K: Clone + Eq + Hash,
    T: Clone + PartialEq,
{
    fn len(&self) -> usize {
        self.map.len()
    }

    fn contains(&self, item: &T) -> bool {
        self.map.get(&(self.key_of)(item)) == Some(item)
    }

    fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn add(&mut self, item: T) -> Result<()> {
        self.push(item)
    }

    fn remove(&mut self, item: &T) -> Result<bool> {
        if !Container::contains(self, item) {
            return Ok(false);
        }
        Ok(self.map.remove(&(self.key_of)(item)))
    }

    fn clear(&mut self) -> Result<()> {
        self.map.clear();
        Ok(())
    }
}

impl<K, T> PositionalContainer<T> for KeyedList<K, T>
where
    K: Clone + Eq + Hash,
    T: Clone + PartialEq,
{
    fn index_of(&self, item: &T) -> Option<usize> {
        if !Container::contains(self, item) {
            return None;
        }
        self.map.index_of_key(&(self.key_of)(item))
    }

    fn get(&self, index: usize) -> Result<T> {
        self.map.value_at(index).cloned()
    }

    fn insert(&mut self, index: usize, item: T) -> Result<()> {
        KeyedList::insert(self, index, item)
    }

    fn remove_at(&mut self, index: usize) -> Result<T> {
        KeyedList::remove_at(self, index)
    }

    fn set(&mut self, index: usize, item: T) -> Result<T> {
        KeyedList::set(self, index, item)
    }
}

impl<K, T> KeyedContainer<K, T> for KeyedList<K, T>
where
    K: Clone + Eq + Hash,
    T: Clone,
{
    fn key_of(&self, item: &T) -> K {
        (self.key_of)(item)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn try_get_by_key(&self, key: &K) -> Option<T> {
        self.map.get(key).cloned()
    }

    fn remove_by_key(&mut self, key: &K) -> Result<bool> {
        Ok(self.map.remove(key))
    }

    fn keys(&self) -> Vec<K> {
        self.map.key_slice().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectionError;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: u32,
        label: &'static str,
    }

    fn row(id: u32, label: &'static str) -> Row {
        Row { id, label }
    }

    fn rows() -> KeyedList<u32, Row> {
        let mut list = KeyedList::new(|r: &Row| r.id);
        list.push(row(1, "one")).unwrap();
        list.push(row(2, "two")).unwrap();
        list.push(row(3, "three")).unwrap();
        list
    }

    #[test]
    fn positional_and_keyed_access_agree() {
        let list = rows();
        for (i, key) in list.keys().enumerate() {
            assert_eq!(list.get(i), list.get_by_key(key));
        }
        assert_eq!(list.index_of_key(&3), Some(2));
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut list = rows();
        assert_eq!(list.push(row(2, "again")), Err(CollectionError::DuplicateKey));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn set_can_rekey() {
        let mut list = rows();
        let old = list.set(0, row(10, "ten")).unwrap();
        assert_eq!(old, row(1, "one"));
        assert!(!list.contains_key(&1));
        assert_eq!(list.index_of_key(&10), Some(0));
        assert_eq!(list.set(0, row(3, "clash")), Err(CollectionError::DuplicateKey));
    }

    #[test]
    fn container_contains_compares_whole_item() {
        let list = rows();
        assert!(Container::contains(&list, &row(2, "two")));
        assert!(!Container::contains(&list, &row(2, "other")));
        assert_eq!(PositionalContainer::index_of(&list, &row(3, "three")), Some(2));
    }

    #[test]
    fn remove_paths() {
        let mut list = rows();
        assert_eq!(list.remove_key(&2), Some(row(2, "two")));
        assert_eq!(KeyedContainer::remove_by_key(&mut list, &2), Ok(false));
        assert_eq!(list.remove_at(0), Ok(row(1, "one")));
        assert_eq!(KeyedContainer::keys(&list), vec![3]);
    }
}
