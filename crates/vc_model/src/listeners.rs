//! Provide a reusable listener registry for [`Observable`] implementors.
//!
//! # Dispatch
//!
//! - Listeners are invoked in registration order.
//! - No borrow is held while a listener runs, so listeners may mutate the
//!   object graph and subscribe or unsubscribe freely.
//! - A listener removed during a dispatch is not invoked afterwards by that
//!   dispatch, a listener added during a dispatch is not invoked by it.
//!
//! [`Observable`]: crate::Observable

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use slotmap::{Key, SlotMap};

use crate::{ListenerKey, Topic};

// -----------------------------------------------------------------------------
// Dispatcher

struct Entry<E: ?Sized, T> {
    tag: T,
    /// Registration sequence, orders the dispatch.
    seq: u64,
    listener: Rc<dyn Fn(&E)>,
}

/// Callbacks taking an `&E`, keyed by `K`, each carrying a `T` tag that
/// dispatches can filter on.
///
/// [`ListenerSet`] is the instance used by observable objects, tagged with
/// the [`Topic`] each listener is registered for.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use vc_model::{Dispatcher, ListenerKey};
///
/// let total = Rc::new(Cell::new(0));
/// let t = total.clone();
/// let dispatcher: Dispatcher<ListenerKey, i32> = Dispatcher::new();
/// dispatcher.insert((), Rc::new(move |n: &i32| t.set(t.get() + n)));
///
/// dispatcher.emit(&2);
/// dispatcher.emit(&3);
/// assert_eq!(total.get(), 5);
/// ```
pub struct Dispatcher<K: Key, E: ?Sized, T = ()> {
    entries: RefCell<SlotMap<K, Entry<E, T>>>,
    next_seq: Cell<u64>,
}

impl<K: Key, E: ?Sized, T> Dispatcher<K, E, T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(SlotMap::with_key()),
            next_seq: Cell::new(0),
        }
    }

    pub fn insert(&self, tag: T, listener: Rc<dyn Fn(&E)>) -> K {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.entries
            .borrow_mut()
            .insert(Entry { tag, seq, listener })
    }

    #[inline]
    pub fn remove(&self, key: K) -> bool {
        self.entries.borrow_mut().remove(key).is_some()
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.entries.borrow().contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of listeners whose tag satisfies `filter`.
    pub fn count_where(&self, filter: impl Fn(&T) -> bool) -> usize {
        self.entries
            .borrow()
            .values()
            .filter(|entry| filter(&entry.tag))
            .count()
    }

    /// Removes every listener. Keys handed out earlier stay invalid.
    pub fn clear(&self) {
        // Dropped after the borrow ends, a listener's drop may reenter.
        let drained: Vec<_> = self.entries.borrow_mut().drain().collect();
        drop(drained);
    }

    /// Invokes every listener whose tag satisfies `filter`.
    pub fn emit_where(&self, event: &E, filter: impl Fn(&T) -> bool) {
        let mut snapshot: Vec<(u64, K, Rc<dyn Fn(&E)>)> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, entry)| filter(&entry.tag))
            .map(|(key, entry)| (entry.seq, key, entry.listener.clone()))
            .collect();
        snapshot.sort_unstable_by_key(|(seq, ..)| *seq);

        for (_, key, listener) in snapshot {
            // An earlier listener may have removed this one.
            if self.contains(key) {
                listener(event);
            }
        }
    }
}

impl<K: Key, E: ?Sized> Dispatcher<K, E> {
    /// Invokes every listener.
    #[inline]
    pub fn emit(&self, event: &E) {
        self.emit_where(event, |_| true);
    }
}

impl<K: Key, E: ?Sized, T> Default for Dispatcher<K, E, T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, E: ?Sized, T> fmt::Debug for Dispatcher<K, E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ListenerSet

/// The listeners of one observable object, keyed by [`ListenerKey`].
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use vc_model::{ListenerSet, Topic};
///
/// let set = ListenerSet::new();
/// let hits = Rc::new(Cell::new(0));
/// let hits2 = hits.clone();
///
/// let key = set.insert(Topic::Add, Rc::new(move |_| hits2.set(hits2.get() + 1)));
/// set.emit(&Topic::Add);
/// set.emit(&Topic::Remove);
/// assert_eq!(hits.get(), 1);
///
/// assert!(set.remove(key));
/// set.emit(&Topic::Add);
/// assert_eq!(hits.get(), 1);
/// ```
pub type ListenerSet = Dispatcher<ListenerKey, Topic, Topic>;

impl ListenerSet {
    /// Number of listeners registered for `topic`.
    #[inline]
    pub fn count(&self, topic: &Topic) -> usize {
        self.count_where(|tag| tag == topic)
    }

    /// Invokes every listener registered for `topic`.
    #[inline]
    pub fn emit(&self, topic: &Topic) {
        self.emit_where(topic, |tag| tag == topic);
    }
}

// -----------------------------------------------------------------------------
// Tests
