#![forbid(unsafe_code)]

//! Observable decorator over a [`PositionalContainer`].
//!
//! [`ObservableList`] adds positional operations to
//! [`ObservableCollection`]. Events carry the index at which the change
//! happened wherever the affected items are contiguous:
//!
//! | Operation | Event | Index |
//! |-----------|-------|-------|
//! | `add`, `add_range` | `Add` | old length |
//! | `insert`, `insert_range` | `Add` | insertion index |
//! | `remove`, `remove_at` | `Remove` | former position |
//! | `remove_range` | `Remove` | start of the removed run |
//! | `remove_items`, `remove_all` | `Remove` | none |
//! | `replace_at`, `replace` | `Replace` | position |
//! | `move_at`, `move_item` | `Move` | old and new position |
//! | `clear` | `Reset`, or `Remove` at 0 | |

use ftui_collections::{CollectionError, Container, PositionalContainer, Result};
use tracing::debug;

use crate::collection::ObservableCollection;
use crate::config::ObservableConfig;
use crate::event::{ChangeItems, CollectionChange};
use crate::notifier::{ChangeNotifier, ResetSection};

/// Change-notifying wrapper around a positional container.
///
/// Cloning creates another handle to the same list.
pub struct ObservableList<T, S> {
    base: ObservableCollection<T, S>,
}

impl<T, S> Clone for ObservableList<T, S> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<T, S: std::fmt::Debug> std::fmt::Debug for ObservableList<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObservableList").field(&self.base).finish()
    }
}

impl<T: 'static, S> ObservableList<T, S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_config(source, ObservableConfig::default())
    }

    #[must_use]
    pub fn with_config(source: S, config: ObservableConfig) -> Self {
        Self {
            base: ObservableCollection::with_config(source, config),
        }
    }

    /// The unordered view of this list. Shares state and notifier.
    #[must_use]
    pub fn as_collection(&self) -> &ObservableCollection<T, S> {
        &self.base
    }

    #[must_use]
    pub fn config(&self) -> ObservableConfig {
        self.base.config()
    }

    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier<T> {
        self.base.notifier()
    }

    pub fn reset_section(&self) -> Result<ResetSection<T>> {
        self.base.reset_section()
    }

    pub fn with_source<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.base.with_source(f)
    }

    /// Recover the source if this is the last handle.
    pub fn try_into_source(self) -> std::result::Result<S, Self> {
        self.base.try_into_source().map_err(|base| Self { base })
    }
}

impl<T, S> ObservableList<T, S>
where
    T: Clone + PartialEq + 'static,
    S: PositionalContainer<T>,
{
    #[must_use]
    pub fn len(&self) -> usize {
        self.base.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.base.contains(item)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.base.to_vec()
    }

    /// Copy of the item at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.base.source().get(index)
    }

    /// Position of the first equal item.
    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.base.source().index_of(item)
    }

    /// Append `item`. Returns whether the source accepted it.
    pub fn add(&self, item: T) -> Result<bool> {
        self.insert_collected(None, vec![item]).map(|n| n > 0)
    }

    /// Insert `item` at `index` (`0..=len`).
    pub fn insert(&self, index: usize, item: T) -> Result<bool> {
        self.insert_collected(Some(index), vec![item]).map(|n| n > 0)
    }

    /// Append several items. Returns how many were accepted.
    pub fn add_range(&self, items: impl IntoIterator<Item = T>) -> Result<usize> {
        self.insert_collected(None, items.into_iter().collect())
    }

    /// Insert several items starting at `index`, keeping their order.
    pub fn insert_range(&self, index: usize, items: impl IntoIterator<Item = T>) -> Result<usize> {
        self.insert_collected(Some(index), items.into_iter().collect())
    }

    /// Insert `items` at `index`, or at the end when `index` is `None`.
    fn insert_collected(&self, index: Option<usize>, items: Vec<T>) -> Result<usize> {
        self.notifier().check_reentrancy()?;

        let mut inserted = ChangeItems::new();
        let (anchor, outcome) = {
            let mut source = self.base.source_mut()?;
            let len = source.len();
            let anchor = index.unwrap_or(len);
            if anchor > len {
                return Err(CollectionError::OutOfRange { index: anchor, len });
            }
            let mut at = anchor;
            let mut outcome = Ok(());
            for item in items {
                let before = source.len();
                if let Err(err) = source.insert(at, item.clone()) {
                    outcome = Err(err);
                    break;
                }
                if source.len() > before {
                    inserted.push(item);
                    at += 1;
                }
            }
            (anchor, outcome)
        };

        let count = inserted.len();
        if count > 0 {
            self.base.raise(
                CollectionChange::Add {
                    items: inserted,
                    index: Some(anchor),
                },
                true,
            );
        }
        outcome.map(|()| count)
    }

    /// Remove and return the item at `index`.
    pub fn remove_at(&self, index: usize) -> Result<T> {
        self.notifier().check_reentrancy()?;
        let item = self.base.source_mut()?.remove_at(index)?;
        self.base
            .raise(CollectionChange::removed(item.clone(), Some(index)), true);
        Ok(item)
    }

    /// Remove the first item equal to `item`. Returns whether one was found.
    pub fn remove(&self, item: &T) -> Result<bool> {
        self.notifier().check_reentrancy()?;
        let (index, removed) = {
            let mut source = self.base.source_mut()?;
            let Some(index) = source.index_of(item) else {
                return Ok(false);
            };
            (index, source.remove_at(index)?)
        };
        self.base
            .raise(CollectionChange::removed(removed, Some(index)), true);
        Ok(true)
    }

    /// Remove `count` items starting at `index`, returned in list order.
    ///
    /// Fails with [`CollectionError::OutOfRange`] if `index > len` and with
    /// [`CollectionError::RangeExceedsSize`] if the run passes the end.
    pub fn remove_range(&self, index: usize, count: usize) -> Result<Vec<T>> {
        self.notifier().check_reentrancy()?;

        let mut removed = Vec::new();
        let (end, outcome) = {
            let mut source = self.base.source_mut()?;
            let len = source.len();
            if index > len {
                return Err(CollectionError::OutOfRange { index, len });
            }
            let end = index
                .checked_add(count)
                .ok_or(CollectionError::InvalidArgument("index + count overflows"))?;
            if end > len {
                return Err(CollectionError::RangeExceedsSize { index, count, len });
            }

            let mut outcome = Ok(());
            for at in (index..end).rev() {
                match source.remove_at(at) {
                    Ok(item) => removed.push(item),
                    Err(err) => {
                        outcome = Err(err);
                        break;
                    }
                }
            }
            (end, outcome)
        };

        removed.reverse();
        if !removed.is_empty() {
            // Back-to-front removal: a partial run is the tail of the range.
            self.base.raise(
                CollectionChange::Remove {
                    items: removed.iter().cloned().collect(),
                    index: Some(end - removed.len()),
                },
                true,
            );
        }
        outcome.map(|()| removed)
    }

    /// Remove each listed item once. One unanchored `Remove`.
    pub fn remove_items(&self, items: impl IntoIterator<Item = T>) -> Result<usize> {
        self.base.remove_items(items)
    }

    /// Remove every item matching `predicate`. Returns how many went.
    ///
    /// The predicate sees a snapshot, so it may read the list. If it mutates
    /// the list through another handle, nothing is removed and the call
    /// fails with [`CollectionError::ReentrancyNotAllowed`].
    pub fn remove_all(&self, mut predicate: impl FnMut(&T) -> bool) -> Result<usize> {
        self.notifier().check_reentrancy()?;

        let snapshot = self.to_vec();
        let doomed: Vec<usize> = snapshot
            .iter()
            .enumerate()
            .filter(|(_, item)| predicate(item))
            .map(|(i, _)| i)
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        let mut removed = Vec::with_capacity(doomed.len());
        let outcome = {
            let mut source = self.base.source_mut()?;
            if source.to_vec() != snapshot {
                debug!("list changed while remove_all predicate ran");
                return Err(CollectionError::ReentrancyNotAllowed);
            }
            let mut outcome = Ok(());
            for &at in doomed.iter().rev() {
                match source.remove_at(at) {
                    Ok(item) => removed.push(item),
                    Err(err) => {
                        outcome = Err(err);
                        break;
                    }
                }
            }
            outcome
        };

        removed.reverse();
        let count = removed.len();
        if count > 0 {
            self.base.raise(
                CollectionChange::Remove {
                    items: removed.into_iter().collect(),
                    index: None,
                },
                true,
            );
        }
        outcome.map(|()| count)
    }

    /// Remove every item. `Remove` events are anchored at 0.
    pub fn clear(&self) -> Result<()> {
        self.base.clear_anchored(Some(0))
    }

    /// Overwrite the item at `index`, returning the previous one.
    pub fn replace_at(&self, index: usize, new: T) -> Result<T> {
        self.notifier().check_reentrancy()?;
        let old = self.base.source_mut()?.set(index, new.clone())?;
        self.base.raise(
            CollectionChange::Replace {
                old: old.clone(),
                new,
                index: Some(index),
            },
            false,
        );
        Ok(old)
    }

    /// Swap `old` for `new` in place.
    ///
    /// On [`CollectionError::ItemNotAddable`] the old item is back at its
    /// original index, so the order is unchanged.
    pub fn replace(&self, old: &T, new: T) -> Result<()> {
        self.notifier().check_reentrancy()?;
        let (index, removed) = {
            let mut source = self.base.source_mut()?;
            let Some(index) = source.index_of(old) else {
                return Err(CollectionError::ItemNotRemovable);
            };
            let removed = source.remove_at(index)?;
            let before = source.len();
            let accepted = source.insert(index, new.clone()).is_ok() && source.len() > before;
            if !accepted {
                source.insert(index, removed)?;
                return Err(CollectionError::ItemNotAddable);
            }
            (index, removed)
        };
        self.base.raise(
            CollectionChange::Replace {
                old: removed,
                new,
                index: Some(index),
            },
            false,
        );
        Ok(())
    }

    /// Move the first item equal to `item` to `new_index`.
    pub fn move_item(&self, item: &T, new_index: usize) -> Result<()> {
        let current = self.index_of(item).ok_or(CollectionError::ItemNotFound)?;
        self.move_at(current, new_index)
    }

    /// Move the item at `current` to `new_index`.
    ///
    /// Both indices must be below `len`. Equal indices are a no-op.
    pub fn move_at(&self, current: usize, new_index: usize) -> Result<()> {
        self.notifier().check_reentrancy()?;
        let item = {
            let mut source = self.base.source_mut()?;
            let len = source.len();
            for index in [current, new_index] {
                if index >= len {
                    return Err(CollectionError::OutOfRange { index, len });
                }
            }
            if current == new_index {
                return Ok(());
            }
            let item = source.remove_at(current)?;
            let before = source.len();
            let reinserted =
                source.insert(new_index, item.clone()).is_ok() && source.len() > before;
            if !reinserted {
                source.insert(current, item)?;
                return Err(CollectionError::ItemNotAddable);
            }
            item
        };
        self.base.raise(
            CollectionChange::Move {
                item,
                old_index: current,
                new_index,
            },
            false,
        );
        Ok(())
    }
}

impl<T, S> Container<T> for ObservableList<T, S>
where
    T: Clone + PartialEq + 'static,
    S: PositionalContainer<T>,
{
    fn len(&self) -> usize {
        ObservableList::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        ObservableList::contains(self, item)
    }

    fn to_vec(&self) -> Vec<T> {
        ObservableList::to_vec(self)
    }

    fn add(&mut self, item: T) -> Result<()> {
        ObservableList::add(self, item).map(|_| ())
    }

    fn remove(&mut self, item: &T) -> Result<bool> {
        ObservableList::remove(self, item)
    }

    fn clear(&mut self) -> Result<()> {
        ObservableList::clear(self)
    }

    fn is_read_only(&self) -> bool {
        self.base.source().is_read_only()
    }
}

impl<T, S> PositionalContainer<T> for ObservableList<T, S>
where
    T: Clone + PartialEq + 'static,
    S: PositionalContainer<T>,
{
    fn index_of(&self, item: &T) -> Option<usize> {
        ObservableList::index_of(self, item)
    }

    fn get(&self, index: usize) -> Result<T> {
        ObservableList::get(self, index)
    }

    fn insert(&mut self, index: usize, item: T) -> Result<()> {
        ObservableList::insert(self, index, item).map(|_| ())
    }

    fn remove_at(&mut self, index: usize) -> Result<T> {
        ObservableList::remove_at(self, index)
    }

    fn set(&mut self, index: usize, item: T) -> Result<T> {
        self.replace_at(index, item)
    }
}
