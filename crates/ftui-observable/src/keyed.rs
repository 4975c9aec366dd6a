#![forbid(unsafe_code)]

//! Observable list with key-based access.
//!
//! [`ObservableKeyedList<K, T, S>`] is an [`ObservableList`] whose source is
//! also a [`KeyedContainer`]. Every positional operation is available through
//! `Deref`; this type adds lookups by key, removal by key and upsert.

use std::marker::PhantomData;
use std::ops::Deref;

use ftui_collections::{CollectionError, KeyedContainer, PositionalContainer, Result};
use tracing::error;

use crate::config::ObservableConfig;
use crate::list::ObservableList;

/// Change-notifying wrapper around a keyed, positional container.
pub struct ObservableKeyedList<K, T, S> {
    list: ObservableList<T, S>,
    _key: PhantomData<fn() -> K>,
}

impl<K, T, S> Clone for ObservableKeyedList<K, T, S> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            _key: PhantomData,
        }
    }
}

impl<K, T, S: std::fmt::Debug> std::fmt::Debug for ObservableKeyedList<K, T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObservableKeyedList").field(&self.list).finish()
    }
}

impl<K, T, S> Deref for ObservableKeyedList<K, T, S> {
    type Target = ObservableList<T, S>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

impl<K, T: 'static, S> ObservableKeyedList<K, T, S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_config(source, ObservableConfig::default())
    }

    #[must_use]
    pub fn with_config(source: S, config: ObservableConfig) -> Self {
        Self {
            list: ObservableList::with_config(source, config),
            _key: PhantomData,
        }
    }

    /// Positional view. Shares state and notifier.
    #[must_use]
    pub fn as_list(&self) -> &ObservableList<T, S> {
        &self.list
    }
}

impl<K, T, S> ObservableKeyedList<K, T, S>
where
    T: Clone + PartialEq + 'static,
    S: PositionalContainer<T> + KeyedContainer<K, T>,
{
    /// Key the source derives for `item`.
    pub fn key_of(&self, item: &T) -> K {
        self.with_source(|s| s.key_of(item))
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.with_source(|s| s.contains_key(key))
    }

    /// Copy of the item stored under `key`.
    pub fn get_by_key(&self, key: &K) -> Result<T> {
        self.with_source(|s| s.get_by_key(key))
    }

    #[must_use]
    pub fn try_get_by_key(&self, key: &K) -> Option<T> {
        self.with_source(|s| s.try_get_by_key(key))
    }

    /// Every key in positional order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.with_source(|s| s.keys())
    }

    /// Position of the item stored under `key`.
    #[must_use]
    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        self.with_source(|s| s.try_get_by_key(key).and_then(|item| s.index_of(&item)))
    }

    /// Remove the item stored under `key`, raising a positional `Remove`.
    ///
    /// Returns `Ok(false)` if the key is absent. A key whose item cannot be
    /// located or removed means the source's key index and order disagree;
    /// that is reported as [`CollectionError::Inconsistent`].
    pub fn remove_by_key(&self, key: &K) -> Result<bool> {
        self.notifier().check_reentrancy()?;
        let Some(item) = self.try_get_by_key(key) else {
            return Ok(false);
        };
        let Some(index) = self.index_of(&item) else {
            error!("keyed item present but not positioned");
            return Err(CollectionError::Inconsistent(
                "keyed item present but not positioned",
            ));
        };
        match self.list.remove_at(index) {
            Ok(_) => Ok(true),
            Err(
                err @ (CollectionError::UnsupportedOperation(_)
                | CollectionError::ReentrancyNotAllowed),
            ) => Err(err),
            Err(err) => {
                error!(index, error = %err, "keyed removal failed");
                Err(CollectionError::Inconsistent("keyed removal failed"))
            }
        }
    }

    /// Replace the item sharing `item`'s key in place, or append it.
    pub fn upsert(&self, item: T) -> Result<()> {
        let key = self.key_of(&item);
        match self.index_of_key(&key) {
            Some(index) => self.list.replace_at(index, item).map(|_| ()),
            None => self.list.add(item).map(|_| ()),
        }
    }
}

impl<K, T, S> KeyedContainer<K, T> for ObservableKeyedList<K, T, S>
where
    T: Clone + PartialEq + 'static,
    S: PositionalContainer<T> + KeyedContainer<K, T>,
{
    fn key_of(&self, item: &T) -> K {
        ObservableKeyedList::key_of(self, item)
    }

    fn contains_key(&self, key: &K) -> bool {
        ObservableKeyedList::contains_key(self, key)
    }

    fn try_get_by_key(&self, key: &K) -> Option<T> {
        ObservableKeyedList::try_get_by_key(self, key)
    }

    fn remove_by_key(&mut self, key: &K) -> Result<bool> {
        ObservableKeyedList::remove_by_key(self, key)
    }

    fn keys(&self) -> Vec<K> {
        ObservableKeyedList::keys(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChangeAction, CollectionChange};
    use ftui_collections::{Container, KeyedList};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tracing_test::traced_test;

    #[derive(Clone, Debug, PartialEq)]
    struct Job {
        id: u32,
        state: &'static str,
    }

    fn job(id: u32, state: &'static str) -> Job {
        Job { id, state }
    }

    fn jobs() -> ObservableKeyedList<u32, Job, KeyedList<u32, Job>> {
        let list = ObservableKeyedList::new(KeyedList::new(|j: &Job| j.id));
        list.add_range([job(1, "queued"), job(2, "running"), job(3, "queued")])
            .unwrap();
        list
    }

    fn capture(
        list: &ObservableKeyedList<u32, Job, KeyedList<u32, Job>>,
    ) -> Rc<RefCell<Vec<CollectionChange<Job>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        list.notifier()
            .subscribe_collection_changed(move |c| sink.borrow_mut().push(c.clone()));
        log
    }

    /// Keyed source whose key index can disagree with its order.
    #[derive(Debug, Default)]
    struct Drifting {
        items: Vec<u32>,
        ghost: Option<u32>,
    }

    impl Container<u32> for Drifting {
        fn len(&self) -> usize {
            self.items.len()
        }
        fn contains(&self, item: &u32) -> bool {
            self.items.contains(item)
        }
        fn to_vec(&self) -> Vec<u32> {
            self.items.clone()
        }
        fn add(&mut self, item: u32) -> Result<()> {
            self.items.push(item);
            Ok(())
        }
        fn remove(&mut self, item: &u32) -> Result<bool> {
            Container::remove(&mut self.items, item)
        }
        fn clear(&mut self) -> Result<()> {
            self.items.clear();
            Ok(())
        }
    }

    impl PositionalContainer<u32> for Drifting {
        fn index_of(&self, item: &u32) -> Option<usize> {
            self.items.index_of(item)
        }
        fn get(&self, index: usize) -> Result<u32> {
            PositionalContainer::get(&self.items, index)
        }
        fn insert(&mut self, index: usize, item: u32) -> Result<()> {
            PositionalContainer::insert(&mut self.items, index, item)
        }
        fn remove_at(&mut self, index: usize) -> Result<u32> {
            self.items.remove_at(index)
        }
        fn set(&mut self, index: usize, item: u32) -> Result<u32> {
            PositionalContainer::set(&mut self.items, index, item)
        }
    }

    impl KeyedContainer<u32, u32> for Drifting {
        fn key_of(&self, item: &u32) -> u32 {
            *item
        }
        fn contains_key(&self, key: &u32) -> bool {
            self.items.contains(key) || self.ghost == Some(*key)
        }
        fn try_get_by_key(&self, key: &u32) -> Option<u32> {
            self.contains_key(key).then_some(*key)
        }
        fn remove_by_key(&mut self, key: &u32) -> Result<bool> {
            Container::remove(self, key)
        }
        fn keys(&self) -> Vec<u32> {
            self.items.clone()
        }
    }

    #[test]
    fn key_lookups() {
        let list = jobs();
        assert!(list.contains_key(&2));
        assert_eq!(list.get_by_key(&2).map(|j| j.state), Ok("running"));
        assert_eq!(list.get_by_key(&9), Err(CollectionError::KeyNotFound));
        assert_eq!(list.try_get_by_key(&9), None);
        assert_eq!(list.index_of_key(&3), Some(2));
        assert_eq!(list.keys(), vec![1, 2, 3]);
    }

    #[test]
    fn remove_by_key_raises_anchored_remove() {
        let list = jobs();
        let log = capture(&list);
        assert_eq!(list.remove_by_key(&2), Ok(true));
        assert_eq!(list.remove_by_key(&2), Ok(false));
        assert_eq!(
            *log.borrow(),
            vec![CollectionChange::removed(job(2, "running"), Some(1))]
        );
        assert_eq!(list.keys(), vec![1, 3]);
    }

    #[test]
    fn upsert_replaces_or_appends() {
        let list = jobs();
        let log = capture(&list);
        list.upsert(job(1, "done")).unwrap();
        list.upsert(job(4, "queued")).unwrap();

        let actions: Vec<_> = log.borrow().iter().map(CollectionChange::action).collect();
        assert_eq!(actions, vec![ChangeAction::Replace, ChangeAction::Add]);
        assert_eq!(list.get(0).map(|j| j.state), Ok("done"));
        assert_eq!(list.index_of_key(&4), Some(3));
    }

    #[test]
    fn duplicate_key_add_fails_without_event() {
        let list = jobs();
        let log = capture(&list);
        assert_eq!(
            list.add(job(1, "again")),
            Err(CollectionError::DuplicateKey)
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    #[traced_test]
    fn unpositioned_key_is_inconsistent() {
        let list: ObservableKeyedList<u32, u32, Drifting> = ObservableKeyedList::new(Drifting {
            items: vec![1, 2],
            ghost: Some(7),
        });
        assert!(matches!(
            list.remove_by_key(&7),
            Err(CollectionError::Inconsistent(_))
        ));
        assert!(logs_contain("keyed item present but not positioned"));
        assert_eq!(list.remove_by_key(&1), Ok(true));
    }
}
