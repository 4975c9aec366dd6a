#![forbid(unsafe_code)]

//! Observable decorator over any [`Container`].
//!
//! [`ObservableCollection<T, S>`] owns a source container `S` and turns every
//! successful mutation into notifications on its [`ChangeNotifier`]:
//!
//! 1. `"Count"`, if the item count changed;
//! 2. `"Item[]"`, always;
//! 3. the [`CollectionChange`] itself.
//!
//! The source is fully mutated and its borrow released before the first
//! notification, so listeners can read the collection (and, with a single
//! collection listener, mutate it).
//!
//! # Example
//!
//! ```
//! use ftui_observable::{ChangeAction, ObservableCollection};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let tags = ObservableCollection::new(Vec::<&str>::new());
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! tags.notifier()
//!     .subscribe_collection_changed(move |c| sink.borrow_mut().push(c.action()));
//!
//! tags.add("urgent").unwrap();
//! tags.clear().unwrap();
//! assert_eq!(*seen.borrow(), vec![ChangeAction::Add, ChangeAction::Reset]);
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use ftui_collections::{CollectionError, Container, Result};

use crate::config::ObservableConfig;
use crate::event::{COUNT_PROPERTY, ChangeItems, CollectionChange, INDEXER_PROPERTY};
use crate::notifier::{ChangeNotifier, ResetSection};

struct Shared<T, S> {
    source: RefCell<S>,
    notifier: ChangeNotifier<T>,
    config: ObservableConfig,
}

/// Change-notifying wrapper around a container.
///
/// Cloning creates another handle to the same collection.
pub struct ObservableCollection<T, S> {
    shared: Rc<Shared<T, S>>,
}

impl<T, S> Clone for ObservableCollection<T, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T, S: std::fmt::Debug> std::fmt::Debug for ObservableCollection<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ObservableCollection");
        match self.shared.source.try_borrow() {
            Ok(source) => s.field("source", &*source),
            Err(_) => s.field("source", &"<mutating>"),
        };
        s.field("config", &self.shared.config).finish()
    }
}

impl<T: 'static, S> ObservableCollection<T, S> {
    /// Wrap `source` with the default configuration.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_config(source, ObservableConfig::default())
    }

    /// Wrap `source` with an explicit configuration.
    #[must_use]
    pub fn with_config(source: S, config: ObservableConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                source: RefCell::new(source),
                notifier: ChangeNotifier::new(),
                config,
            }),
        }
    }

    /// Configuration fixed at construction.
    #[must_use]
    pub fn config(&self) -> ObservableConfig {
        self.shared.config
    }

    /// The notifier carrying this collection's events.
    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier<T> {
        &self.shared.notifier
    }

    /// Open a reset section on this collection's notifier.
    ///
    /// Fails with [`CollectionError::ConcurrentResetNotAllowed`] if one is
    /// already open.
    pub fn reset_section(&self) -> Result<ResetSection<T>> {
        self.shared.notifier.begin_reset()
    }

    /// Run `f` with shared access to the source.
    ///
    /// Mutating the collection from inside `f` fails with
    /// [`CollectionError::ReentrancyNotAllowed`].
    pub fn with_source<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.shared.source.borrow())
    }

    /// Recover the source if this is the last handle.
    pub fn try_into_source(self) -> std::result::Result<S, Self> {
        Rc::try_unwrap(self.shared)
            .map(|shared| shared.source.into_inner())
            .map_err(|shared| Self { shared })
    }

    pub(crate) fn source(&self) -> Ref<'_, S> {
        self.shared.source.borrow()
    }

    pub(crate) fn source_mut(&self) -> Result<RefMut<'_, S>> {
        self.shared
            .source
            .try_borrow_mut()
            .map_err(|_| CollectionError::ReentrancyNotAllowed)
    }

    /// Announce a completed mutation.
    pub(crate) fn raise(&self, change: CollectionChange<T>, count_changed: bool) {
        let notifier = &self.shared.notifier;
        if count_changed {
            notifier.notify_property_changed(COUNT_PROPERTY);
        }
        notifier.notify_property_changed(INDEXER_PROPERTY);
        notifier.notify_collection_changed(change);
    }
}

impl<T, S> ObservableCollection<T, S>
where
    T: Clone + PartialEq + 'static,
    S: Container<T>,
{
    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source().len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source().is_empty()
    }

    /// Whether an equal item is present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.source().contains(item)
    }

    /// Snapshot of every item in enumeration order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.source().to_vec()
    }

    /// Add `item`. Returns whether the source accepted it.
    ///
    /// `Add` is raised only when the count grew.
    pub fn add(&self, item: T) -> Result<bool> {
        self.shared.notifier.check_reentrancy()?;
        let accepted = {
            let mut source = self.source_mut()?;
            let before = source.len();
            source.add(item.clone())?;
            source.len() > before
        };
        if accepted {
            self.raise(CollectionChange::added(item, None), true);
        }
        Ok(accepted)
    }

    /// Remove the first item equal to `item`. Returns whether one was removed.
    pub fn remove(&self, item: &T) -> Result<bool> {
        self.shared.notifier.check_reentrancy()?;
        let removed = self.source_mut()?.remove(item)?;
        if removed {
            self.raise(CollectionChange::removed(item.clone(), None), true);
        }
        Ok(removed)
    }

    /// Remove every item.
    ///
    /// Raises a single `Reset`, or with
    /// [`treat_clear_as_remove`](ObservableConfig::treat_clear_as_remove) a
    /// single `Remove` listing every cleared item. Clearing an empty
    /// collection raises nothing.
    pub fn clear(&self) -> Result<()> {
        self.clear_anchored(None)
    }

    pub(crate) fn clear_anchored(&self, anchor: Option<usize>) -> Result<()> {
        self.shared.notifier.check_reentrancy()?;
        let cleared = {
            let mut source = self.source_mut()?;
            if source.is_empty() {
                return Ok(());
            }
            let snapshot = self
                .shared
                .config
                .treat_clear_as_remove
                .then(|| source.to_vec());
            source.clear()?;
            snapshot
        };
        match cleared {
            Some(items) => self.raise(
                CollectionChange::Remove {
                    items: items.into_iter().collect(),
                    index: anchor,
                },
                true,
            ),
            None => self.raise(CollectionChange::Reset, true),
        }
        Ok(())
    }

    /// Swap `old` for `new`.
    ///
    /// Fails with [`CollectionError::ItemNotRemovable`] if `old` is absent.
    /// If the source rejects `new`, the source is restored to its prior item
    /// sequence and the call fails with [`CollectionError::ItemNotAddable`].
    pub fn replace(&self, old: &T, new: T) -> Result<()> {
        self.shared.notifier.check_reentrancy()?;
        {
            let mut source = self.source_mut()?;
            if !source.contains(old) {
                return Err(CollectionError::ItemNotRemovable);
            }
            // Ordered sources would append a re-added `old`, so roll back
            // from a full snapshot.
            let snapshot = source.to_vec();
            if !source.remove(old)? {
                return Err(CollectionError::ItemNotRemovable);
            }
            let before = source.len();
            let accepted = source.add(new.clone()).is_ok() && source.len() > before;
            if !accepted {
                source.clear()?;
                for item in snapshot {
                    source.add(item)?;
                }
                return Err(CollectionError::ItemNotAddable);
            }
        }
        self.raise(
            CollectionChange::Replace {
                old: old.clone(),
                new,
                index: None,
            },
            false,
        );
        Ok(())
    }

    /// Add several items. Returns how many the source accepted.
    ///
    /// One `Add` lists the accepted items. If the source fails partway, the
    /// items already accepted are announced before the error is returned.
    pub fn add_range(&self, items: impl IntoIterator<Item = T>) -> Result<usize> {
        let items: Vec<T> = items.into_iter().collect();
        self.shared.notifier.check_reentrancy()?;

        let mut accepted = ChangeItems::new();
        let outcome = {
            let mut source = self.source_mut()?;
            let mut outcome = Ok(());
            for item in items {
                let before = source.len();
                if let Err(err) = source.add(item.clone()) {
                    outcome = Err(err);
                    break;
                }
                if source.len() > before {
                    accepted.push(item);
                }
            }
            outcome
        };

        let count = accepted.len();
        if count > 0 {
            self.raise(
                CollectionChange::Add {
                    items: accepted,
                    index: None,
                },
                true,
            );
        }
        outcome.map(|()| count)
    }

    /// Remove each listed item once. Returns how many were removed.
    ///
    /// One `Remove` lists the removed items; absent items are skipped.
    pub fn remove_items(&self, items: impl IntoIterator<Item = T>) -> Result<usize> {
        let items: Vec<T> = items.into_iter().collect();
        self.shared.notifier.check_reentrancy()?;

        let mut removed = ChangeItems::new();
        let outcome = {
            let mut source = self.source_mut()?;
            let mut outcome = Ok(());
            for item in items {
                match source.remove(&item) {
                    Ok(true) => removed.push(item),
                    Ok(false) => {}
                    Err(err) => {
                        outcome = Err(err);
                        break;
                    }
                }
            }
            outcome
        };

        let count = removed.len();
        if count > 0 {
            self.raise(
                CollectionChange::Remove {
                    items: removed,
                    index: None,
                },
                true,
            );
        }
        outcome.map(|()| count)
    }
}

impl<T, S> Container<T> for ObservableCollection<T, S>
where
    T: Clone + PartialEq + 'static,
    S: Container<T>,
{
    fn len(&self) -> usize {
        ObservableCollection::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        ObservableCollection::contains(self, item)
    }

    fn to_vec(&self) -> Vec<T> {
        ObservableCollection::to_vec(self)
    }

    fn add(&mut self, item: T) -> Result<()> {
        ObservableCollection::add(self, item).map(|_| ())
    }

    fn remove(&mut self, item: &T) -> Result<bool> {
        ObservableCollection::remove(self, item)
    }

    fn clear(&mut self) -> Result<()> {
        ObservableCollection::clear(self)
    }

    fn is_read_only(&self) -> bool {
        self.source().is_read_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeAction;
    use ftui_collections::{KeyedList, ReadOnly};
    use std::collections::HashSet;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Record both channels into one ordered log.
    fn record<T: std::fmt::Debug + 'static, S>(col: &ObservableCollection<T, S>) -> Log {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        col.notifier()
            .subscribe_property_changed(move |name| sink.borrow_mut().push(format!("P:{name}")));
        let sink = Rc::clone(&log);
        col.notifier().subscribe_collection_changed(move |c| {
            sink.borrow_mut()
                .push(format!("C:{}:{:?}", c.action().as_str(), c.new_items()))
        });
        log
    }

    /// Vec that refuses a specific value without failing.
    #[derive(Debug, Default)]
    struct Picky(Vec<i32>);

    impl Container<i32> for Picky {
        fn len(&self) -> usize {
            self.0.len()
        }
        fn contains(&self, item: &i32) -> bool {
            self.0.contains(item)
        }
        fn to_vec(&self) -> Vec<i32> {
            self.0.clone()
        }
        fn add(&mut self, item: i32) -> Result<()> {
            if item != 13 {
                self.0.push(item);
            }
            Ok(())
        }
        fn remove(&mut self, item: &i32) -> Result<bool> {
            Container::remove(&mut self.0, item)
        }
        fn clear(&mut self) -> Result<()> {
            self.0.clear();
            Ok(())
        }
    }

    #[test]
    fn add_raises_count_indexer_then_add() {
        let col = ObservableCollection::new(Vec::<i32>::new());
        let log = record(&col);
        assert_eq!(col.add(7), Ok(true));
        assert_eq!(*log.borrow(), vec!["P:Count", "P:Item[]", "C:add:[7]"]);
    }

    #[test]
    fn rejected_add_is_silent() {
        let col = ObservableCollection::new(HashSet::new());
        col.add(1).unwrap();
        let log = record(&col);
        assert_eq!(col.add(1), Ok(false));
        assert!(log.borrow().is_empty());
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn remove_missing_is_silent() {
        let col = ObservableCollection::new(vec![1, 2]);
        let log = record(&col);
        assert_eq!(col.remove(&9), Ok(false));
        assert!(log.borrow().is_empty());
        assert_eq!(col.remove(&2), Ok(true));
        assert_eq!(log.borrow().last().map(String::as_str), Some("C:remove:[]"));
    }

    #[test]
    fn clear_empty_is_noop() {
        let col = ObservableCollection::new(Vec::<i32>::new());
        let log = record(&col);
        col.clear().unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn clear_raises_reset_by_default() {
        let col = ObservableCollection::new(vec![1, 2, 3]);
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        col.notifier()
            .subscribe_collection_changed(move |c| sink.borrow_mut().push(c.clone()));
        col.clear().unwrap();
        assert_eq!(*changes.borrow(), vec![CollectionChange::Reset]);
        assert!(col.is_empty());
    }

    #[test]
    fn clear_as_remove_lists_every_item() {
        let col = ObservableCollection::with_config(
            vec!['a', 'b', 'c'],
            ObservableConfig::clear_as_remove(),
        );
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        col.notifier()
            .subscribe_collection_changed(move |c| sink.borrow_mut().push(c.clone()));
        col.clear().unwrap();

        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action(), ChangeAction::Remove);
        assert_eq!(changes[0].old_items(), &['a', 'b', 'c']);
    }

    #[test]
    fn replace_swaps_and_keeps_count() {
        let col = ObservableCollection::new(vec![1, 2]);
        let log = record(&col);
        col.replace(&1, 5).unwrap();
        assert_eq!(*log.borrow(), vec!["P:Item[]", "C:replace:[5]"]);
        assert!(col.contains(&5) && !col.contains(&1));
    }

    #[test]
    fn replace_missing_old_fails() {
        let col = ObservableCollection::new(vec![1]);
        assert_eq!(col.replace(&9, 2), Err(CollectionError::ItemNotRemovable));
    }

    #[test]
    fn replace_rejected_new_restores_old() {
        let col = ObservableCollection::new(Picky(vec![1, 2]));
        let log = record(&col);
        assert_eq!(col.replace(&1, 13), Err(CollectionError::ItemNotAddable));
        assert!(col.contains(&1));
        assert_eq!(col.len(), 2);
        assert!(log.borrow().is_empty());
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: u32,
        name: &'static str,
    }

    #[test]
    fn replace_rejected_by_keyed_source_keeps_order() {
        let mut rows = KeyedList::new(|r: &Row| r.id);
        for (id, name) in [(1, "a"), (2, "b"), (3, "c")] {
            rows.push(Row { id, name }).unwrap();
        }
        let col = ObservableCollection::<Row, _>::new(rows);
        let before = col.to_vec();
        let log = record(&col);

        assert_eq!(
            col.replace(&Row { id: 1, name: "a" }, Row { id: 2, name: "dup" }),
            Err(CollectionError::ItemNotAddable)
        );
        assert_eq!(col.to_vec(), before);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn add_range_lists_only_accepted() {
        let col = ObservableCollection::new(Picky::default());
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        col.notifier()
            .subscribe_collection_changed(move |c| sink.borrow_mut().push(c.clone()));

        assert_eq!(col.add_range([1, 13, 2]), Ok(2));
        assert_eq!(changes.borrow()[0].new_items(), &[1, 2]);

        assert_eq!(col.add_range([13]), Ok(0));
        assert_eq!(col.add_range(std::iter::empty()), Ok(0));
        assert_eq!(changes.borrow().len(), 1);
    }

    #[test]
    fn remove_items_lists_only_removed() {
        let col = ObservableCollection::new(vec![1, 2, 3, 4]);
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        col.notifier()
            .subscribe_collection_changed(move |c| sink.borrow_mut().push(c.clone()));

        assert_eq!(col.remove_items([4, 9, 2]), Ok(2));
        assert_eq!(changes.borrow()[0].old_items(), &[4, 2]);
        assert_eq!(col.to_vec(), vec![1, 3]);
    }

    #[test]
    fn read_only_source_refuses_without_events() {
        let col = ObservableCollection::new(ReadOnly::new(vec![1]));
        let log = record(&col);
        assert_eq!(
            col.add(2),
            Err(CollectionError::UnsupportedOperation("add"))
        );
        assert!(col.clear().is_err());
        assert!(log.borrow().is_empty());
        assert!(Container::is_read_only(&col));
    }

    #[test]
    fn listener_can_read_during_notification() {
        let col = ObservableCollection::new(Vec::<i32>::new());
        let observed = Rc::new(RefCell::new(Vec::new()));
        let reader = col.clone();
        let sink = Rc::clone(&observed);
        col.notifier()
            .subscribe_collection_changed(move |_| sink.borrow_mut().push(reader.len()));
        col.add(1).unwrap();
        col.add(2).unwrap();
        assert_eq!(*observed.borrow(), vec![1, 2]);
    }

    #[test]
    fn single_listener_may_mutate() {
        let col = ObservableCollection::new(Vec::<i32>::new());
        let writer = col.clone();
        col.notifier().subscribe_collection_changed(move |c| {
            if c.new_items() == [1] {
                writer.add(2).unwrap();
            }
        });
        col.add(1).unwrap();
        assert_eq!(col.to_vec(), vec![1, 2]);
    }

    #[test]
    fn mutation_inside_with_source_is_refused() {
        let col = ObservableCollection::new(vec![1]);
        let result = col.with_source(|_| col.add(2));
        assert_eq!(result, Err(CollectionError::ReentrancyNotAllowed));
    }

    #[test]
    fn reset_section_batches_mutations() {
        let col = ObservableCollection::new(Vec::<i32>::new());
        let log = record(&col);
        {
            let _section = col.reset_section().unwrap();
            col.add_range([1, 2, 3]).unwrap();
            col.remove(&2).unwrap();
        }
        assert_eq!(*log.borrow(), vec!["P:Count", "P:Item[]", "C:reset:[]"]);
    }

    #[test]
    fn try_into_source_needs_last_handle() {
        let col = ObservableCollection::<i32, _>::new(vec![1]);
        let other = col.clone();
        let col = col.try_into_source().unwrap_err();
        drop(other);
        assert_eq!(col.try_into_source().unwrap(), vec![1]);
    }
}
