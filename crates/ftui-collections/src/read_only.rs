#![forbid(unsafe_code)]

//! Read-only view over any container.
//!
//! [`ReadOnly<S>`] forwards every read to the wrapped source and refuses
//! every mutation with [`CollectionError::UnsupportedOperation`]. It owns the
//! source; use [`ReadOnly::into_inner`] to get it back.

use crate::capability::{Container, KeyedContainer, PositionalContainer};
use crate::error::{CollectionError, Result};

/// A container that refuses mutation.
#[derive(Debug, Clone, Default)]
pub struct ReadOnly<S> {
    source: S,
}

impl<S> ReadOnly<S> {
    /// Wrap `source`.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Shared access to the wrapped source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Unwrap, returning the source.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.source
    }
}

#[inline]
fn refuse<R>(op: &'static str) -> Result<R> {
    Err(CollectionError::UnsupportedOperation(op))
}

impl<T, S: Container<T>> Container<T> for ReadOnly<S> {
    fn len(&self) -> usize {
        self.source.len()
    }

    fn contains(&self, item: &T) -> bool {
        self.source.contains(item)
    }

    fn to_vec(&self) -> Vec<T> {
        self.source.to_vec()
    }

    fn add(&mut self, _item: T) -> Result<()> {
        refuse("add")
    }

    fn remove(&mut self, _item: &T) -> Result<bool> {
        refuse("remove")
    }

    fn clear(&mut self) -> Result<()> {
        refuse("clear")
    }

    fn is_read_only(&self) -> bool {
        true
    }
}

impl<T, S: PositionalContainer<T>> PositionalContainer<T> for ReadOnly<S> {
    fn index_of(&self, item: &T) -> Option<usize> {
        self.source.index_of(item)
    }

    fn get(&self, index: usize) -> Result<T> {
        self.source.get(index)
    }

    fn insert(&mut self, _index: usize, _item: T) -> Result<()> {
        refuse("insert")
    }

    fn remove_at(&mut self, _index: usize) -> Result<T> {
        refuse("remove_at")
    }

    fn set(&mut self, _index: usize, _item: T) -> Result<T> {
        refuse("set")
    }
}

impl<K, T, S: KeyedContainer<K, T>> KeyedContainer<K, T> for ReadOnly<S> {
    fn key_of(&self, item: &T) -> K {
        self.source.key_of(item)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.source.contains_key(key)
    }

    fn try_get_by_key(&self, key: &K) -> Option<T> {
        self.source.try_get_by_key(key)
    }

    fn remove_by_key(&mut self, _key: &K) -> Result<bool> {
        refuse("remove_by_key")
    }

    fn keys(&self) -> Vec<K> {
        self.source.keys()
    }
}
