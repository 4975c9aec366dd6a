#![forbid(unsafe_code)]

//! Change events delivered by observable decorators.
//!
//! Two channels exist:
//!
//! - **Property changed**: a property name. Decorators raise
//!   [`COUNT_PROPERTY`] when the item count changes and
//!   [`INDEXER_PROPERTY`] on every content change.
//! - **Collection changed**: a [`CollectionChange`] describing what happened.
//!
//! Previewers see either kind as a [`PendingChange`] before delivery and
//! answer with a [`Preview`].

use smallvec::SmallVec;

/// Property raised when the item count changes.
pub const COUNT_PROPERTY: &str = "Count";

/// Property raised whenever item content changes.
pub const INDEXER_PROPERTY: &str = "Item[]";

/// Item payload of an `Add` or `Remove`. Single-item changes stay inline.
pub type ChangeItems<T> = SmallVec<[T; 1]>;

/// Kind of collection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    Add,
    Remove,
    Replace,
    Move,
    Reset,
}

impl ChangeAction {
    /// Stable lowercase name, used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Move => "move",
            Self::Reset => "reset",
        }
    }
}

/// A collection change, carrying the payload its action requires.
///
/// Indices are `None` when the position is unknown or the affected items
/// are not contiguous.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange<T> {
    /// Items were added, starting at `index` when known.
    Add {
        items: ChangeItems<T>,
        index: Option<usize>,
    },
    /// Items were removed, previously starting at `index` when known.
    Remove {
        items: ChangeItems<T>,
        index: Option<usize>,
    },
    /// `old` was replaced by `new` at a shared `index`.
    Replace {
        old: T,
        new: T,
        index: Option<usize>,
    },
    /// `item` moved from `old_index` to `new_index`.
    Move {
        item: T,
        old_index: usize,
        new_index: usize,
    },
    /// Contents changed wholesale; re-read everything.
    Reset,
}

impl<T> CollectionChange<T> {
    /// Single-item `Add`.
    #[must_use]
    pub fn added(item: T, index: Option<usize>) -> Self {
        Self::Add {
            items: smallvec::smallvec![item],
            index,
        }
    }

    /// Single-item `Remove`.
    #[must_use]
    pub fn removed(item: T, index: Option<usize>) -> Self {
        Self::Remove {
            items: smallvec::smallvec![item],
            index,
        }
    }

    /// Kind of this change.
    #[must_use]
    pub const fn action(&self) -> ChangeAction {
        match self {
            Self::Add { .. } => ChangeAction::Add,
            Self::Remove { .. } => ChangeAction::Remove,
            Self::Replace { .. } => ChangeAction::Replace,
            Self::Move { .. } => ChangeAction::Move,
            Self::Reset => ChangeAction::Reset,
        }
    }

    /// Items now present because of this change.
    #[must_use]
    pub fn new_items(&self) -> &[T] {
        match self {
            Self::Add { items, .. } => items,
            Self::Replace { new, .. } => std::slice::from_ref(new),
            Self::Move { item, .. } => std::slice::from_ref(item),
            Self::Remove { .. } | Self::Reset => &[],
        }
    }

    /// Items no longer present (or no longer at their old position).
    #[must_use]
    pub fn old_items(&self) -> &[T] {
        match self {
            Self::Remove { items, .. } => items,
            Self::Replace { old, .. } => std::slice::from_ref(old),
            Self::Move { item, .. } => std::slice::from_ref(item),
            Self::Add { .. } | Self::Reset => &[],
        }
    }

    /// Position of the new items.
    #[must_use]
    pub const fn new_index(&self) -> Option<usize> {
        match self {
            Self::Add { index, .. } | Self::Replace { index, .. } => *index,
            Self::Move { new_index, .. } => Some(*new_index),
            Self::Remove { .. } | Self::Reset => None,
        }
    }

    /// Former position of the old items.
    #[must_use]
    pub const fn old_index(&self) -> Option<usize> {
        match self {
            Self::Remove { index, .. } | Self::Replace { index, .. } => *index,
            Self::Move { old_index, .. } => Some(*old_index),
            Self::Add { .. } | Self::Reset => None,
        }
    }
}

/// A change about to be delivered, as shown to previewers.
pub enum PendingChange<'a, T> {
    Property(&'a str),
    Collection(&'a CollectionChange<T>),
}

impl<T> Clone for PendingChange<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PendingChange<'_, T> {}

impl<T> PendingChange<'_, T> {
    /// Property name or action name, for logging.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Property(name) => name,
            Self::Collection(change) => change.action().as_str(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PendingChange<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Property(name) => f.debug_tuple("Property").field(name).finish(),
            Self::Collection(change) => f.debug_tuple("Collection").field(change).finish(),
        }
    }
}

/// A previewer's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preview {
    /// Let the change through to the next previewer and then to listeners.
    Allow,
    /// Suppress the change entirely.
    Veto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_follow_action() {
        let add = CollectionChange::added('a', Some(2));
        assert_eq!(add.action(), ChangeAction::Add);
        assert_eq!(add.new_items(), &['a']);
        assert!(add.old_items().is_empty());
        assert_eq!(add.new_index(), Some(2));
        assert_eq!(add.old_index(), None);

        let replace = CollectionChange::Replace {
            old: 'x',
            new: 'y',
            index: Some(0),
        };
        assert_eq!(replace.old_items(), &['x']);
        assert_eq!(replace.new_items(), &['y']);
        assert_eq!(replace.new_index(), replace.old_index());

        let mv = CollectionChange::Move {
            item: 'm',
            old_index: 1,
            new_index: 4,
        };
        assert_eq!(mv.old_index(), Some(1));
        assert_eq!(mv.new_index(), Some(4));

        let reset: CollectionChange<char> = CollectionChange::Reset;
        assert!(reset.new_items().is_empty() && reset.old_items().is_empty());
    }

    #[test]
    fn pending_change_label() {
        let change = CollectionChange::removed(1, None);
        assert_eq!(PendingChange::Collection(&change).label(), "remove");
        assert_eq!(PendingChange::<i32>::Property("Count").label(), "Count");
    }
}
