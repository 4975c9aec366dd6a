#![forbid(unsafe_code)]

//! Change-notifying container decorators.
//!
//! # Role in FrankenTUI
//! `ftui-observable` turns the plain containers of `ftui-collections` into
//! bindable models: widgets subscribe to a decorator and re-render on the
//! changes it reports, without polling or diffing.
//!
//! # Primary responsibilities
//! - **ChangeNotifier**: listener registry, veto-capable preview chain,
//!   reentrancy monitor, and batched reset sections.
//! - **Decorators**: [`ObservableCollection`], [`ObservableList`] and
//!   [`ObservableKeyedList`], plus the [`ObservableSet`] and
//!   [`ObservableOrderedMap`] shapes built on them.
//! - **Events**: [`CollectionChange`] payloads and the `"Count"` /
//!   `"Item[]"` property channel.
//!
//! # How it fits in the system
//! A decorator owns its source and is shared by cloning the handle (same
//! model as the reactive `Observable`). Everything is single-threaded and
//! synchronous: listeners run inside the mutating call, after the source
//! has been updated.
//!
//! # Example
//!
//! ```
//! use ftui_observable::{ObservableList, Preview, PendingChange, PreviewChanges};
//!
//! let rows = ObservableList::new(vec!["alpha", "beta"]);
//!
//! // Refuse to announce anything while a drag is in progress.
//! rows.add_previewer(|change| match change {
//!     PendingChange::Property(_) => Preview::Allow,
//!     PendingChange::Collection(_) => Preview::Veto,
//! });
//!
//! rows.move_at(0, 1).unwrap();
//! assert_eq!(rows.to_vec(), vec!["beta", "alpha"]);
//! ```

pub mod capability;
pub mod collection;
pub mod config;
pub mod dictionary;
pub mod event;
pub mod keyed;
pub mod list;
pub mod notifier;
pub mod set;

pub use capability::{NotifyChanged, PreviewChanges};
pub use collection::ObservableCollection;
pub use config::ObservableConfig;
pub use dictionary::ObservableOrderedMap;
pub use event::{
    COUNT_PROPERTY, ChangeAction, ChangeItems, CollectionChange, INDEXER_PROPERTY, PendingChange,
    Preview,
};
pub use ftui_collections::{CollectionError, Result};
pub use keyed::ObservableKeyedList;
pub use list::ObservableList;
pub use notifier::{ChangeNotifier, ListenerId, OwnerId, ResetSection};
pub use set::ObservableSet;
