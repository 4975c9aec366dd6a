#![forbid(unsafe_code)]

//! Notification capability traits.
//!
//! Generic code that only needs to observe a container takes
//! `impl NotifyChanged<T>`; code that also vetoes changes takes
//! `impl PreviewChanges<T>`. Both are implemented by every observable
//! decorator. A [`ReadOnly`] view over an observable passes notifications
//! through but does not expose previewing.

use ftui_collections::ReadOnly;

use crate::collection::ObservableCollection;
use crate::event::{CollectionChange, PendingChange, Preview};
use crate::keyed::ObservableKeyedList;
use crate::list::ObservableList;
use crate::notifier::{ChangeNotifier, ListenerId, OwnerId};

/// Property-changed and collection-changed channels.
pub trait NotifyChanged<T: 'static> {
    /// The notifier carrying this container's events.
    fn notifier(&self) -> &ChangeNotifier<T>;

    fn subscribe_property_changed<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&str) + 'static,
    {
        self.notifier().subscribe_property_changed(callback)
    }

    fn unsubscribe_property_changed(&self, id: ListenerId) -> bool {
        self.notifier().unsubscribe_property_changed(id)
    }

    fn subscribe_collection_changed<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&CollectionChange<T>) + 'static,
    {
        self.notifier().subscribe_collection_changed(callback)
    }

    fn unsubscribe_collection_changed(&self, id: ListenerId) -> bool {
        self.notifier().unsubscribe_collection_changed(id)
    }
}

/// Veto access: previewers run before any listener sees a change.
pub trait PreviewChanges<T: 'static>: NotifyChanged<T> {
    fn add_previewer<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(PendingChange<'_, T>) -> Preview + 'static,
    {
        self.notifier().add_previewer(callback)
    }

    fn add_previewer_owned<F>(&self, owner: OwnerId, callback: F) -> ListenerId
    where
        F: Fn(PendingChange<'_, T>) -> Preview + 'static,
    {
        self.notifier().add_previewer_owned(owner, callback)
    }

    fn remove_previewer(&self, id: ListenerId) -> bool {
        self.notifier().remove_previewer(id)
    }

    fn remove_previewers_owned_by(&self, owner: OwnerId) -> usize {
        self.notifier().remove_previewers_owned_by(owner)
    }
}

impl<T: 'static> NotifyChanged<T> for ChangeNotifier<T> {
    fn notifier(&self) -> &ChangeNotifier<T> {
        self
    }
}

impl<T: 'static> PreviewChanges<T> for ChangeNotifier<T> {}

impl<T: 'static, S> NotifyChanged<T> for ObservableCollection<T, S> {
    fn notifier(&self) -> &ChangeNotifier<T> {
        ObservableCollection::notifier(self)
    }
}

impl<T: 'static, S> PreviewChanges<T> for ObservableCollection<T, S> {}

impl<T: 'static, S> NotifyChanged<T> for ObservableList<T, S> {
    fn notifier(&self) -> &ChangeNotifier<T> {
        ObservableList::notifier(self)
    }
}

impl<T: 'static, S> PreviewChanges<T> for ObservableList<T, S> {}

impl<K, T: 'static, S> NotifyChanged<T> for ObservableKeyedList<K, T, S> {
    fn notifier(&self) -> &ChangeNotifier<T> {
        self.as_list().notifier()
    }
}

impl<K, T: 'static, S> PreviewChanges<T> for ObservableKeyedList<K, T, S> {}

impl<T: 'static, S: NotifyChanged<T>> NotifyChanged<T> for ReadOnly<S> {
    fn notifier(&self) -> &ChangeNotifier<T> {
        self.source().notifier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeAction;
    use ftui_collections::{CollectionError, Container};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn watch<T: 'static>(source: &impl NotifyChanged<T>) -> Rc<RefCell<Vec<ChangeAction>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        source.subscribe_collection_changed(move |c| sink.borrow_mut().push(c.action()));
        log
    }

    #[test]
    fn read_only_view_observes_source() {
        let list = ObservableList::new(vec![1, 2]);
        let mut view = ReadOnly::new(list.clone());
        let log = watch(&view);

        list.add(3).unwrap();
        assert_eq!(
            Container::add(&mut view, 4),
            Err(CollectionError::UnsupportedOperation("add"))
        );
        assert_eq!(*log.borrow(), vec![ChangeAction::Add]);
        assert_eq!(Container::len(&view), 3);
    }

    #[test]
    fn owner_scoped_previewers_through_trait() {
        let col = ObservableCollection::new(Vec::<i32>::new());
        let owner = OwnerId::new();
        col.add_previewer_owned(owner, |_| Preview::Veto);
        let log = watch(&col);

        col.add(1).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(col.len(), 1);

        assert_eq!(col.remove_previewers_owned_by(owner), 1);
        col.add(2).unwrap();
        assert_eq!(*log.borrow(), vec![ChangeAction::Add]);
    }

    #[test]
    fn unsubscribe_through_trait() {
        let col = ObservableCollection::new(Vec::<u8>::new());
        let hits = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&hits);
        let id = NotifyChanged::subscribe_property_changed(&col, move |_| {
            *sink.borrow_mut() += 1;
        });
        col.add(1).unwrap();
        assert!(NotifyChanged::unsubscribe_property_changed(&col, id));
        col.add(2).unwrap();
        assert_eq!(*hits.borrow(), 2);
    }
}
