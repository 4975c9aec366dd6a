#![forbid(unsafe_code)]

//! Change notifier: listener registry, preview chain, reentrancy monitor,
//! and deferred reset sections.
//!
//! # Design
//!
//! A [`ChangeNotifier<T>`] is a cheap `Clone` handle onto shared,
//! reference-counted state (`Rc<..>`), like the reactive `Observable`.
//! Each observable decorator owns exactly one notifier and drives it after
//! every successful mutation.
//!
//! Delivery of one change:
//!
//! ```text
//! notify_*(change)
//!   ├─ reset section open? ── yes ─> record (name / structural flag), return
//!   ├─ previewers, in subscription order ── first Veto ─> drop change, return
//!   └─ listeners, in registration order (collection: monitor held)
//! ```
//!
//! # Failure Modes
//!
//! - **Reentrant mutation**: while a collection change is being delivered to
//!   two or more listeners, [`ChangeNotifier::check_reentrancy`] fails with
//!   [`CollectionError::ReentrancyNotAllowed`]. With a single listener the
//!   nested mutation is allowed: nobody else can observe the interleaving.
//! - **Nested reset section**: [`ChangeNotifier::begin_reset`] fails with
//!   [`CollectionError::ConcurrentResetNotAllowed`] while one is open.
//!
//! # Invariants
//!
//! 1. Listeners and previewers run in registration order.
//! 2. While a reset section is open, nothing is delivered.
//! 3. Closing a section delivers each distinct pending property once (first
//!    seen first), then a single `Reset` if any collection change was held.
//! 4. Listener lists are snapshotted before delivery, so listeners may
//!    subscribe or unsubscribe while being called.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use ftui_collections::{CollectionError, Result};
use tracing::{debug, debug_span, trace};

use crate::event::{CollectionChange, PendingChange, Preview};

type PropertyCallback = Rc<dyn Fn(&str)>;
type CollectionCallback<T> = Rc<dyn Fn(&CollectionChange<T>)>;
type PreviewCallback<T> = Rc<dyn Fn(PendingChange<'_, T>) -> Preview>;

/// Handle returned by every subscription; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identity tag for previewers that can be removed in bulk.
///
/// Every call to [`OwnerId::new`] yields a process-unique value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a fresh owner identity.
    #[must_use]
    pub fn new() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

struct Previewer<T> {
    id: ListenerId,
    owner: Option<OwnerId>,
    callback: PreviewCallback<T>,
}

/// Changes held back while a reset section is open.
#[derive(Debug, Default)]
struct Deferred {
    /// Distinct property names, first-seen order.
    properties: Vec<String>,
    /// Whether any collection change was held back.
    structural: bool,
}

struct NotifierInner<T> {
    next_id: Cell<u64>,
    property_listeners: RefCell<Vec<(ListenerId, PropertyCallback)>>,
    collection_listeners: RefCell<Vec<(ListenerId, CollectionCallback<T>)>>,
    /// Created on first previewer registration.
    previewers: RefCell<Option<Vec<Previewer<T>>>>,
    /// Depth of in-flight collection deliveries.
    monitor: Cell<usize>,
    /// Single-slot claim for the open reset section.
    reset_claimed: AtomicBool,
    deferred: RefCell<Option<Deferred>>,
}

/// Per-decorator notification hub.
///
/// Cloning a `ChangeNotifier` creates a new handle to the **same** state.
pub struct ChangeNotifier<T> {
    inner: Rc<NotifierInner<T>>,
}

impl<T> Clone for ChangeNotifier<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field(
                "property_listeners",
                &self.inner.property_listeners.borrow().len(),
            )
            .field(
                "collection_listeners",
                &self.inner.collection_listeners.borrow().len(),
            )
            .field("previewers", &self.previewer_count())
            .field("notifying", &self.is_notifying())
            .field("deferring", &self.is_deferring())
            .finish()
    }
}

impl<T: 'static> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChangeNotifier<T> {
    /// Number of registered previewers.
    #[must_use]
    pub fn previewer_count(&self) -> usize {
        self.inner.previewers.borrow().as_ref().map_or(0, Vec::len)
    }

    /// Whether a collection change is currently being delivered.
    #[must_use]
    pub fn is_notifying(&self) -> bool {
        self.inner.monitor.get() > 0
    }

    /// Whether a reset section is open.
    #[must_use]
    pub fn is_deferring(&self) -> bool {
        self.inner.deferred.borrow().is_some()
    }
}

impl<T: 'static> ChangeNotifier<T> {
    /// Create a notifier with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(NotifierInner {
                next_id: Cell::new(1),
                property_listeners: RefCell::new(Vec::new()),
                collection_listeners: RefCell::new(Vec::new()),
                previewers: RefCell::new(None),
                monitor: Cell::new(0),
                reset_claimed: AtomicBool::new(false),
                deferred: RefCell::new(None),
            }),
        }
    }

    fn next_id(&self) -> ListenerId {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        ListenerId(id)
    }

    // ── Listener registry ───────────────────────────────────────────────

    /// Register a property-changed listener.
    pub fn subscribe_property_changed(&self, callback: impl Fn(&str) + 'static) -> ListenerId {
        let id = self.next_id();
        self.inner
            .property_listeners
            .borrow_mut()
            .push((id, Rc::new(callback)));
        id
    }

    /// Remove a property-changed listener. Returns whether it was registered.
    pub fn unsubscribe_property_changed(&self, id: ListenerId) -> bool {
        remove_by_id(&mut self.inner.property_listeners.borrow_mut(), id)
    }

    /// Register a collection-changed listener.
    pub fn subscribe_collection_changed(
        &self,
        callback: impl Fn(&CollectionChange<T>) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.inner
            .collection_listeners
            .borrow_mut()
            .push((id, Rc::new(callback)));
        id
    }

    /// Remove a collection-changed listener. Returns whether it was registered.
    pub fn unsubscribe_collection_changed(&self, id: ListenerId) -> bool {
        remove_by_id(&mut self.inner.collection_listeners.borrow_mut(), id)
    }

    /// Number of property-changed listeners.
    #[must_use]
    pub fn property_listener_count(&self) -> usize {
        self.inner.property_listeners.borrow().len()
    }

    /// Number of collection-changed listeners.
    #[must_use]
    pub fn collection_listener_count(&self) -> usize {
        self.inner.collection_listeners.borrow().len()
    }

    // ── Previewers ──────────────────────────────────────────────────────

    /// Register a previewer consulted before every delivery.
    pub fn add_previewer(
        &self,
        callback: impl Fn(PendingChange<'_, T>) -> Preview + 'static,
    ) -> ListenerId {
        self.push_previewer(None, Rc::new(callback))
    }

    /// Register a previewer tagged with `owner`, removable in bulk with
    /// [`remove_previewers_owned_by`](Self::remove_previewers_owned_by).
    pub fn add_previewer_owned(
        &self,
        owner: OwnerId,
        callback: impl Fn(PendingChange<'_, T>) -> Preview + 'static,
    ) -> ListenerId {
        self.push_previewer(Some(owner), Rc::new(callback))
    }

    fn push_previewer(&self, owner: Option<OwnerId>, callback: PreviewCallback<T>) -> ListenerId {
        let id = self.next_id();
        self.inner
            .previewers
            .borrow_mut()
            .get_or_insert_with(Vec::new)
            .push(Previewer {
                id,
                owner,
                callback,
            });
        id
    }

    /// Remove one previewer. Returns whether it was registered.
    pub fn remove_previewer(&self, id: ListenerId) -> bool {
        let mut previewers = self.inner.previewers.borrow_mut();
        let Some(list) = previewers.as_mut() else {
            return false;
        };
        let before = list.len();
        list.retain(|p| p.id != id);
        list.len() != before
    }

    /// Remove every previewer tagged with `owner`. Returns how many went.
    pub fn remove_previewers_owned_by(&self, owner: OwnerId) -> usize {
        let mut previewers = self.inner.previewers.borrow_mut();
        let Some(list) = previewers.as_mut() else {
            return 0;
        };
        let before = list.len();
        list.retain(|p| p.owner != Some(owner));
        before - list.len()
    }

    // ── Reentrancy ──────────────────────────────────────────────────────

    /// Fail if a mutation now would interleave with a delivery that more
    /// than one listener is observing.
    pub fn check_reentrancy(&self) -> Result<()> {
        if self.is_notifying() {
            let listeners = self.collection_listener_count();
            if listeners > 1 {
                debug!(listeners, "reentrant mutation refused");
                return Err(CollectionError::ReentrancyNotAllowed);
            }
        }
        Ok(())
    }

    // ── Delivery ────────────────────────────────────────────────────────

    /// Announce that property `name` changed.
    pub fn notify_property_changed(&self, name: &str) {
        if let Some(deferred) = self.inner.deferred.borrow_mut().as_mut() {
            if !deferred.properties.iter().any(|p| p == name) {
                deferred.properties.push(name.to_owned());
            }
            trace!(property = name, "property change deferred");
            return;
        }

        if !self.preview(PendingChange::Property(name)) {
            return;
        }

        let listeners: Vec<PropertyCallback> = self
            .inner
            .property_listeners
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for cb in &listeners {
            cb(name);
        }
    }

    /// Announce a collection change.
    pub fn notify_collection_changed(&self, change: CollectionChange<T>) {
        if let Some(deferred) = self.inner.deferred.borrow_mut().as_mut() {
            deferred.structural = true;
            trace!(
                action = change.action().as_str(),
                "collection change deferred"
            );
            return;
        }
        self.deliver_collection(&change);
    }

    fn deliver_collection(&self, change: &CollectionChange<T>) {
        if !self.preview(PendingChange::Collection(change)) {
            return;
        }

        let listeners: Vec<CollectionCallback<T>> = self
            .inner
            .collection_listeners
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        if listeners.is_empty() {
            return;
        }

        let _monitor = MonitorGuard::enter(&self.inner.monitor);
        for cb in &listeners {
            cb(change);
        }
    }

    /// Run the preview chain. Returns `false` if some previewer vetoed.
    fn preview(&self, change: PendingChange<'_, T>) -> bool {
        let previewers: Vec<(ListenerId, PreviewCallback<T>)> =
            match self.inner.previewers.borrow().as_ref() {
                Some(list) if !list.is_empty() => list
                    .iter()
                    .map(|p| (p.id, Rc::clone(&p.callback)))
                    .collect(),
                _ => return true,
            };

        for (id, cb) in previewers {
            if cb(change) == Preview::Veto {
                trace!(previewer = id.get(), change = change.label(), "change vetoed");
                return false;
            }
        }
        true
    }

    // ── Reset sections ──────────────────────────────────────────────────

    /// Open a reset section. Until the returned guard drops, nothing is
    /// delivered; on drop the held changes are flushed as one batch.
    pub fn begin_reset(&self) -> Result<ResetSection<T>> {
        if self
            .inner
            .reset_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("reset section refused: one is already open");
            return Err(CollectionError::ConcurrentResetNotAllowed);
        }
        *self.inner.deferred.borrow_mut() = Some(Deferred::default());
        trace!("reset section opened");
        Ok(ResetSection {
            notifier: self.clone(),
        })
    }

    fn end_reset(&self) {
        // The slot frees before the flush so flush listeners may open a new
        // section.
        let deferred = {
            let _release = ClaimRelease(&self.inner.reset_claimed);
            self.inner.deferred.borrow_mut().take()
        };
        let Some(deferred) = deferred else {
            return;
        };

        let _span = debug_span!(
            "reset_flush",
            properties = deferred.properties.len(),
            structural = deferred.structural
        )
        .entered();
        for name in &deferred.properties {
            self.notify_property_changed(name);
        }
        if deferred.structural {
            self.deliver_collection(&CollectionChange::Reset);
        }
    }
}

fn remove_by_id<C>(list: &mut Vec<(ListenerId, C)>, id: ListenerId) -> bool {
    let before = list.len();
    list.retain(|(lid, _)| *lid != id);
    list.len() != before
}

/// Holds the reentrancy monitor for the duration of a delivery.
struct MonitorGuard<'a> {
    monitor: &'a Cell<usize>,
}

impl<'a> MonitorGuard<'a> {
    fn enter(monitor: &'a Cell<usize>) -> Self {
        monitor.set(monitor.get() + 1);
        Self { monitor }
    }
}

impl Drop for MonitorGuard<'_> {
    fn drop(&mut self) {
        self.monitor.set(self.monitor.get().saturating_sub(1));
    }
}

/// Releases the reset slot on every exit path.
struct ClaimRelease<'a>(&'a AtomicBool);

impl Drop for ClaimRelease<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// RAII guard for an open reset section.
///
/// Dropping the guard (normally, through `?`, or while unwinding) flushes
/// every held change as one batch and frees the notifier for the next
/// section.
#[must_use = "dropping a ResetSection immediately flushes it"]
pub struct ResetSection<T: 'static> {
    notifier: ChangeNotifier<T>,
}

impl<T: 'static> ResetSection<T> {
    /// Close the section now. Equivalent to dropping it.
    pub fn close(self) {}
}

impl<T: 'static> Drop for ResetSection<T> {
    fn drop(&mut self) {
        self.notifier.end_reset();
    }
}

impl<T: 'static> std::fmt::Debug for ResetSection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetSection").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
