#![forbid(unsafe_code)]

//! Capability traits for mutable containers.
//!
//! Concrete containers implement only the capabilities they support:
//!
//! - [`Container`]: count, membership, snapshot, add/remove/clear.
//! - [`PositionalContainer`]: index-based access on top of [`Container`].
//! - [`KeyedContainer`]: key-based access, independent of position but
//!   composable with it.
//!
//! Decorators and adapters (read-only views, converters, observable
//! wrappers) are generic over these traits, so any combination composes
//! without an inheritance chain.
//!
//! # Acceptance
//!
//! A source may silently reject an item (a set refusing a duplicate, a list
//! with a custom admission rule). Rejection is observed through [`Container::len`]:
//! `add` returning `Ok(())` without the count growing means the item was not
//! accepted. Callers that need to know compare the count before and after.

use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};

use crate::error::{CollectionError, Result, check_index, check_insert_index};

/// Mutable container capability.
pub trait Container<T> {
    /// Number of items.
    fn len(&self) -> usize;

    /// Whether the container holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an equal item is present.
    fn contains(&self, item: &T) -> bool;

    /// Copy every item, in enumeration order.
    fn to_vec(&self) -> Vec<T>;

    /// Add an item. The source may reject it silently (count unchanged).
    fn add(&mut self, item: T) -> Result<()>;

    /// Remove the first equal item. Returns whether anything was removed.
    fn remove(&mut self, item: &T) -> Result<bool>;

    /// Remove every item.
    fn clear(&mut self) -> Result<()>;

    /// Whether every mutator is refused.
    fn is_read_only(&self) -> bool {
        false
    }
}

/// Positional container capability.
pub trait PositionalContainer<T>: Container<T> {
    /// Position of the first equal item.
    fn index_of(&self, item: &T) -> Option<usize>;

    /// Copy of the item at `index`.
    fn get(&self, index: usize) -> Result<T>;

    /// Insert at `index` (`0..=len`). The source may reject it silently.
    fn insert(&mut self, index: usize, item: T) -> Result<()>;

    /// Remove and return the item at `index`.
    fn remove_at(&mut self, index: usize) -> Result<T>;

    /// Replace the item at `index`, returning the previous one.
    fn set(&mut self, index: usize, item: T) -> Result<T>;
}

/// Keyed container capability.
pub trait KeyedContainer<K, T> {
    /// Key under which `item` is (or would be) stored.
    fn key_of(&self, item: &T) -> K;

    /// Whether `key` is present.
    fn contains_key(&self, key: &K) -> bool;

    /// Copy of the item stored under `key`, if any.
    fn try_get_by_key(&self, key: &K) -> Option<T>;

    /// Copy of the item stored under `key`.
    fn get_by_key(&self, key: &K) -> Result<T> {
        self.try_get_by_key(key).ok_or(CollectionError::KeyNotFound)
    }

    /// Remove the item stored under `key`. Returns whether it was present.
    fn remove_by_key(&mut self, key: &K) -> Result<bool>;

    /// Every key, in enumeration order.
    fn keys(&self) -> Vec<K>;
}

// ---------------------------------------------------------------------------
// Vec
// ---------------------------------------------------------------------------

impl<T: Clone + PartialEq> Container<T> for Vec<T> {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        <[T]>::contains(self, item)
    }

    fn to_vec(&self) -> Vec<T> {
        self.clone()
    }

    fn add(&mut self, item: T) -> Result<()> {
        self.push(item);
        Ok(())
    }

    fn remove(&mut self, item: &T) -> Result<bool> {
        match self.iter().position(|x| x == item) {
            Some(idx) => {
                Vec::remove(self, idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear(&mut self) -> Result<()> {
        Vec::clear(self);
        Ok(())
    }
}

impl<T: Clone + PartialEq> PositionalContainer<T> for Vec<T> {
    fn index_of(&self, item: &T) -> Option<usize> {
        self.iter().position(|x| x == item)
    }

    fn get(&self, index: usize) -> Result<T> {
        <[T]>::get(self, index)
            .cloned()
            .ok_or(CollectionError::OutOfRange {
                index,
                len: <[T]>::len(self),
            })
    }

    fn insert(&mut self, index: usize, item: T) -> Result<()> {
        check_insert_index(index, <[T]>::len(self))?;
        Vec::insert(self, index, item);
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> Result<T> {
        check_index(index, <[T]>::len(self))?;
        Ok(Vec::remove(self, index))
    }

    fn set(&mut self, index: usize, item: T) -> Result<T> {
        check_index(index, <[T]>::len(self))?;
        Ok(std::mem::replace(&mut self[index], item))
    }
}

// ---------------------------------------------------------------------------
// Sets
// ---------------------------------------------------------------------------

impl<T, S> Container<T> for HashSet<T, S>
where
    T: Clone + Eq + Hash,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        HashSet::contains(self, item)
    }

    fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn add(&mut self, item: T) -> Result<()> {
        self.insert(item);
        Ok(())
    }

    fn remove(&mut self, item: &T) -> Result<bool> {
        Ok(HashSet::remove(self, item))
    }

    fn clear(&mut self) -> Result<()> {
        HashSet::clear(self);
        Ok(())
    }
}

impl<T: Clone + Ord> Container<T> for BTreeSet<T> {
    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        BTreeSet::contains(self, item)
    }

    fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn add(&mut self, item: T) -> Result<()> {
        self.insert(item);
        Ok(())
    }

    fn remove(&mut self, item: &T) -> Result<bool> {
        Ok(BTreeSet::remove(self, item))
    }

    fn clear(&mut self) -> Result<()> {
        BTreeSet::clear(self);
        Ok(())
    }
}
