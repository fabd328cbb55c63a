#![forbid(unsafe_code)]

//! Insertion-ordered collection with `added` / `removed` notification.
//!
//! Items are typically `Rc` handles to model entities. Identity is decided by
//! the caller through a predicate, so the list never needs `PartialEq` on the
//! item type (two containers with equal contents are still two containers).
//!
//! Listeners run after the interior borrow is released: a listener may read
//! the list it is observing, and the item it receives is already present
//! (for `added`) or already gone (for `removed`). Dropping a listener's
//! guard from inside another listener takes effect at once.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::observable::Subscription;

type ListenerRc<T> = Rc<dyn Fn(&T)>;
type ListenerWeak<T> = Weak<dyn Fn(&T)>;

struct ListInner<T> {
    items: Vec<T>,
    added: Vec<ListenerWeak<T>>,
    removed: Vec<ListenerWeak<T>>,
}

/// Shared observable collection. Cloning shares the same storage.
pub struct ObservableList<T> {
    inner: Rc<RefCell<ListInner<T>>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObservableList")
            .field("len", &inner.items.len())
            .field("added_listeners", &inner.added.len())
            .field("removed_listeners", &inner.removed.len())
            .finish()
    }
}

impl<T: Clone + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> ObservableList<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                items: Vec::new(),
                added: Vec::new(),
                removed: Vec::new(),
            })),
        }
    }

    /// Append an item and notify `added` listeners.
    pub fn push(&self, item: T) {
        self.inner.borrow_mut().items.push(item.clone());
        let listeners = Self::live(&mut self.inner.borrow_mut().added);
        Self::dispatch(&listeners, &item);
    }

    /// Remove the first item matching `pred` and notify `removed` listeners.
    ///
    /// Returns the removed item, or `None` when nothing matched.
    pub fn remove_by(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        let item = {
            let mut inner = self.inner.borrow_mut();
            let pos = inner.items.iter().position(&pred)?;
            inner.items.remove(pos)
        };
        let listeners = Self::live(&mut self.inner.borrow_mut().removed);
        Self::dispatch(&listeners, &item);
        Some(item)
    }

    /// Clone of the current items in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.borrow().items.clone()
    }

    /// First item matching `pred`.
    #[must_use]
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.inner.borrow().items.iter().find(|item| pred(*item)).cloned()
    }

    /// Visit each item in insertion order.
    ///
    /// The list is borrowed for the duration; `f` must not mutate it.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        for item in &self.inner.borrow().items {
            f(item);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    /// Listen for additions. Dropping the guard unsubscribes.
    pub fn on_added(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let strong: ListenerRc<T> = Rc::new(listener);
        self.inner.borrow_mut().added.push(Rc::downgrade(&strong));
        Subscription::hold(strong)
    }

    /// Listen for removals. Dropping the guard unsubscribes.
    pub fn on_removed(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let strong: ListenerRc<T> = Rc::new(listener);
        self.inner.borrow_mut().removed.push(Rc::downgrade(&strong));
        Subscription::hold(strong)
    }

    /// Live `added` + `removed` listener count.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        let inner = self.inner.borrow();
        inner
            .added
            .iter()
            .chain(inner.removed.iter())
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    fn live(listeners: &mut Vec<ListenerWeak<T>>) -> Vec<ListenerWeak<T>> {
        listeners.retain(|w| w.strong_count() > 0);
        listeners.clone()
    }

    /// A listener unsubscribed by an earlier one in the same round is skipped.
    fn dispatch(listeners: &[ListenerWeak<T>], item: &T) {
        for weak in listeners {
            if let Some(listener) = weak.upgrade() {
                listener(item);
            }
        }
    }
}
