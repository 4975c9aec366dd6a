#![forbid(unsafe_code)]

//! Element-type converting view.
//!
//! [`Converted<S, T, U>`] exposes a source of `T` as a container of `U`.
//! Reads convert with `to`. Writes convert back with `from`; a view built
//! without a back-converter refuses writes with
//! [`CollectionError::UnsupportedOperation`].
//!
//! Both converters are plain `fn` pointers, so a view never captures state.

use std::marker::PhantomData;

use crate::capability::{Container, PositionalContainer};
use crate::error::{CollectionError, Result};

/// A container of `U` backed by a source of `T`.
pub struct Converted<S, T, U> {
    source: S,
    to: fn(&T) -> U,
    from: Option<fn(&U) -> T>,
    _marker: PhantomData<fn(T) -> U>,
}

impl<S, T, U> Converted<S, T, U> {
    /// Read-write view converting with `to` and back with `from`.
    #[must_use]
    pub fn new(source: S, to: fn(&T) -> U, from: fn(&U) -> T) -> Self {
        Self {
            source,
            to,
            from: Some(from),
            _marker: PhantomData,
        }
    }

    /// One-way view; every mutator is refused.
    #[must_use]
    pub fn one_way(source: S, to: fn(&T) -> U) -> Self {
        Self {
            source,
            to,
            from: None,
            _marker: PhantomData,
        }
    }

    /// Shared access to the wrapped source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Unwrap, returning the source.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.source
    }

    fn back(&self, op: &'static str) -> Result<fn(&U) -> T> {
        self.from.ok_or(CollectionError::UnsupportedOperation(op))
    }
}

impl<S: std::fmt::Debug, T, U> std::fmt::Debug for Converted<S, T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converted")
            .field("source", &self.source)
            .field("two_way", &self.from.is_some())
            .finish()
    }
}

impl<S, T, U> Container<U> for Converted<S, T, U>
where
    S: Container<T>,
    U: PartialEq,
{
    fn len(&self) -> usize {
        self.source.len()
    }

    fn contains(&self, item: &U) -> bool {
        match self.from {
            Some(from) => self.source.contains(&from(item)),
            None => self.source.to_vec().iter().any(|t| (self.to)(t) == *item),
        }
    }

    fn to_vec(&self) -> Vec<U> {
        self.source.to_vec().iter().map(self.to).collect()
    }

    fn add(&mut self, item: U) -> Result<()> {
        let from = self.back("add")?;
        self.source.add(from(&item))
    }

    fn remove(&mut self, item: &U) -> Result<bool> {
        let from = self.back("remove")?;
        self.source.remove(&from(item))
    }

    fn clear(&mut self) -> Result<()> {
        self.back("clear")?;
        self.source.clear()
    }

    fn is_read_only(&self) -> bool {
        self.from.is_none() || self.source.is_read_only()
    }
}

impl<S, T, U> PositionalContainer<U> for Converted<S, T, U>
where
    S: PositionalContainer<T>,
    U: PartialEq,
{
    fn index_of(&self, item: &U) -> Option<usize> {
        match self.from {
            Some(from) => self.source.index_of(&from(item)),
            None => self
                .source
                .to_vec()
                .iter()
                .position(|t| (self.to)(t) == *item),
        }
    }

    fn get(&self, index: usize) -> Result<U> {
        self.source.get(index).map(|t| (self.to)(&t))
    }

    fn insert(&mut self, index: usize, item: U) -> Result<()> {
        let from = self.back("insert")?;
        self.source.insert(index, from(&item))
    }

    fn remove_at(&mut self, index: usize) -> Result<U> {
        self.back("remove_at")?;
        self.source.remove_at(index).map(|t| (self.to)(&t))
    }

    fn set(&mut self, index: usize, item: U) -> Result<U> {
        let from = self.back("set")?;
        self.source.set(index, from(&item)).map(|t| (self.to)(&t))
    }
}
