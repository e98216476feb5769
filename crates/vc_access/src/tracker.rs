//! Provide [`ChangeTracker`], the live binding of an accessor to a root.
//!
//! # Rebinding
//!
//! Any notification from an observed object may have replaced an object
//! further down the chain, so the whole subscription set is considered
//! stale. The tracker tears every record down and subscribes the chain
//! again against the current object graph, then re-evaluates the path and
//! emits a [`ChangeEvent`] if the value changed. Change listeners therefore
//! always run against a tracker observing the chain they were told about.
//!
//! A notification arriving while the tracker is already handling one is
//! not processed recursively. It marks the tracker dirty and the running
//! handler rebinds and evaluates once more before returning.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use vc_model::{Dispatcher, Listener, Value};

use crate::{AccessError, Accessor, BindError, SubscriptionRecord, accessor_for};

// -----------------------------------------------------------------------------
// ChangeEvent

/// The payload of the `change` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// The new value, `None` if the path resolves to nothing.
    pub value: Option<Value>,
}

/// A callback registered with [`ChangeTracker::on_change`].
pub type ChangeListener = Rc<dyn Fn(&ChangeEvent)>;

slotmap::new_key_type! {
    /// Identifies one `change` listener of a [`ChangeTracker`].
    pub struct ChangeListenerKey;
}

// -----------------------------------------------------------------------------
// Inner

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Subscriptions match the current chain.
    Bound,
    /// A notification is being handled.
    Rebinding,
    Disposed,
}

struct Inner {
    root: Value,
    accessor: Accessor,
    last: RefCell<Option<Value>>,
    records: RefCell<Vec<SubscriptionRecord>>,
    listeners: Dispatcher<ChangeListenerKey, ChangeEvent>,
    state: Cell<State>,
    dirty: Cell<bool>,
    /// The listener installed on the object graph.
    hook: Listener,
}

impl Inner {
    fn notify(&self) {
        match self.state.get() {
            State::Bound => {}
            State::Rebinding => {
                self.dirty.set(true);
                return;
            }
            State::Disposed => return,
        }

        self.state.set(State::Rebinding);
        loop {
            self.dirty.set(false);
            self.rebind();
            self.refresh();
            // A change listener may have disposed the tracker.
            if self.state.get() == State::Disposed {
                return;
            }
            if !self.dirty.get() {
                break;
            }
        }
        self.state.set(State::Bound);
    }

    /// Re-evaluates the path and emits if the value changed.
    fn refresh(&self) {
        let value = match self.accessor.get(&self.root) {
            Ok(value) => value,
            Err(e) => {
                log::error!("ChangeTracker(`{}`) -> {e}", self.accessor);
                return;
            }
        };
        let changed = *self.last.borrow() != value;
        *self.last.borrow_mut() = value.clone();
        if changed {
            self.listeners.emit(&ChangeEvent { value });
        }
    }

    /// Replaces every record with a fresh subscription of the chain.
    fn rebind(&self) {
        let released: usize = {
            let old = core::mem::take(&mut *self.records.borrow_mut());
            old.into_iter().map(SubscriptionRecord::detach).sum()
        };

        let mut records = Vec::new();
        if let Err(e) = self.accessor.subscribe_into(&self.root, &self.hook, &mut records) {
            log::error!("ChangeTracker(`{}`) -> {e}", self.accessor);
        }
        log::trace!(
            "ChangeTracker(`{}`) rebound: released {released} listeners, observing {} objects",
            self.accessor,
            records.len(),
        );
        *self.records.borrow_mut() = records;

        #[cfg(all(debug_assertions, feature = "debug"))]
        self.verify();
    }

    /// Checks the records against the current dependencies of the chain.
    #[cfg(all(debug_assertions, feature = "debug"))]
    fn verify(&self) {
        let mut expected = Vec::new();
        let walked = self.accessor.walk(&self.root, &mut |dep| {
            expected.push((dep.target(), dep.topics()));
        });
        // The chain is only observed up to the failing link.
        if let Err(e) = walked {
            log::debug!(
                "ChangeTracker(`{}`) checked up to an error: {e}",
                self.accessor
            );
        }

        let records = self.records.borrow();
        let matches = records.len() == expected.len()
            && records.iter().zip(&expected).all(|(record, (target, topics))| {
                Rc::ptr_eq(record.target(), target) && record.topics().eq(topics.iter())
            });
        if !matches {
            log::error!(
                "ChangeTracker(`{}`) holds {} records, the chain depends on {} objects",
                self.accessor,
                records.len(),
                expected.len(),
            );
        }
    }

    fn dispose(&self) {
        self.state.set(State::Disposed);
        let records = core::mem::take(&mut *self.records.borrow_mut());
        let released: usize = records.into_iter().map(SubscriptionRecord::detach).sum();
        // Listeners may hold the tracker, clearing them breaks the cycle.
        self.listeners.clear();
        log::debug!(
            "ChangeTracker(`{}`) disposed, released {released} listeners",
            self.accessor
        );
    }
}

// -----------------------------------------------------------------------------
// ChangeTracker

/// Tracks the value a path resolves to from a fixed root.
///
/// Emits one [`ChangeEvent`] each time a notification from the object graph
/// changes the resolved value, compared with [`Value`] equality. Replacing
/// an intermediate object moves the subscriptions to the new object, the
/// replaced one is no longer observed.
///
/// Listeners are only removed by [`dispose`](Self::dispose): a tracker that
/// is dropped without being disposed leaves inert listeners on the graph.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use vc_access::change_tracker_for;
/// use vc_model::{Model, Value};
///
/// let m1 = Model::with_attrs([("name", Value::from("Manufacturer 1"))]);
/// let m2 = Model::with_attrs([("name", Value::from("Manufacturer 2"))]);
/// let product = Model::with_attrs([("manufacturer", Value::from(m1.clone()))]);
///
/// let tracker = change_tracker_for(Value::from(product.clone()), "manufacturer.name").unwrap();
/// let events = Rc::new(RefCell::new(Vec::new()));
/// let e = events.clone();
/// tracker.on_change(move |event| e.borrow_mut().push(event.value.clone()));
///
/// m1.set("name", "New Name!");
/// product.set("manufacturer", m2.clone());
/// m1.set("name", "ignored");
///
/// assert_eq!(
///     *events.borrow(),
///     [Some(Value::from("New Name!")), Some(Value::from("Manufacturer 2"))],
/// );
/// tracker.dispose();
/// ```
#[derive(Clone)]
pub struct ChangeTracker(Rc<Inner>);

impl ChangeTracker {
    /// Evaluates `accessor` against `root` and subscribes the chain.
    pub fn new(root: Value, accessor: Accessor) -> Result<Self, AccessError> {
        let value = accessor.get(&root)?;

        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            Inner {
                root,
                accessor,
                last: RefCell::new(value),
                records: RefCell::new(Vec::new()),
                listeners: Dispatcher::new(),
                state: Cell::new(State::Bound),
                dirty: Cell::new(false),
                hook: Rc::new(move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.notify();
                    }
                }),
            }
        });

        let mut records = Vec::new();
        if let Err(e) = inner
            .accessor
            .subscribe_into(&inner.root, &inner.hook, &mut records)
        {
            records.into_iter().for_each(|r| {
                r.detach();
            });
            return Err(e);
        }
        log::debug!(
            "ChangeTracker(`{}`) bound, observing {} objects",
            inner.accessor,
            records.len()
        );
        *inner.records.borrow_mut() = records;

        Ok(Self(inner))
    }

    #[inline]
    pub fn root(&self) -> &Value {
        &self.0.root
    }

    #[inline]
    pub fn accessor(&self) -> &Accessor {
        &self.0.accessor
    }

    /// Registers a listener for the `change` event.
    pub fn on_change<F>(&self, listener: F) -> ChangeListenerKey
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        if self.is_disposed() {
            log::warn!("ChangeTracker(`{}`) used after dispose", self.0.accessor);
        }
        self.0.listeners.insert((), Rc::new(listener))
    }

    /// Removes a `change` listener, returns `false` if it was not registered.
    #[inline]
    pub fn off_change(&self, key: ChangeListenerKey) -> bool {
        self.0.listeners.remove(key)
    }

    /// Reads the current value through the chain, ignoring the cache.
    pub fn get_value(&self) -> Result<Option<Value>, AccessError> {
        self.warn_if_disposed();
        self.0.accessor.get(&self.0.root)
    }

    /// Assigns the value through the leaf link.
    ///
    /// Fails with [`AccessError::Unsupported`] unless the path ends with an
    /// attribute.
    pub fn set_value(&self, value: impl Into<Value>) -> Result<(), AccessError> {
        self.warn_if_disposed();
        self.0.accessor.set(&self.0.root, value.into())
    }

    /// Returns `true` if the path currently resolves to a value.
    #[inline]
    pub fn has_value(&self) -> Result<bool, AccessError> {
        self.get_value().map(|value| value.is_some())
    }

    /// Number of objects currently observed.
    #[inline]
    pub fn observed_count(&self) -> usize {
        self.0.records.borrow().len()
    }

    /// Removes every listener from the object graph and every `change`
    /// listener. The tracker is inert afterwards.
    pub fn dispose(&self) {
        if self.is_disposed() {
            log::warn!("ChangeTracker(`{}`) disposed twice", self.0.accessor);
            return;
        }
        self.0.dispose();
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.0.state.get() == State::Disposed
    }

    #[inline]
    fn warn_if_disposed(&self) {
        if self.is_disposed() {
            log::warn!("ChangeTracker(`{}`) used after dispose", self.0.accessor);
        }
    }
}

impl fmt::Debug for ChangeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeTracker")
            .field("path", &format_args!("{}", self.0.accessor))
            .field("last", &self.0.last.borrow())
            .field("records", &self.0.records.borrow().len())
            .field("state", &self.0.state.get())
            .finish()
    }
}

/// Parses `path` and tracks it from `root`.
///
/// Fails with [`BindError::Syntax`] for a malformed path, and with
/// [`BindError::Access`] if the path cannot be evaluated against `root`.
pub fn change_tracker_for(root: Value, path: &str) -> Result<ChangeTracker, BindError> {
    let accessor = accessor_for(path)?;
    Ok(ChangeTracker::new(root, accessor)?)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ChangeTracker, change_tracker_for};
    use crate::{AccessError, BindError, LinkKind, accessor_for};
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use vc_model::{Collection, Model, Topic, Value};

    type Events = Rc<RefCell<Vec<Option<Value>>>>;

    fn record(tracker: &ChangeTracker) -> Events {
        let events: Events = Rc::new(RefCell::new(Vec::new()));
        let e = events.clone();
        tracker.on_change(move |event| e.borrow_mut().push(event.value.clone()));
        events
    }

    fn review(title: &str, date: &str) -> Rc<Model> {
        Model::with_attrs([
            ("title", Value::from(title)),
            ("date", Value::from(date)),
        ])
    }

    fn reviews() -> (Rc<Collection>, [Rc<Model>; 3]) {
        let items = [
            review("Review 1", "2010-01-01"),
            review("Review 2", "2010-02-01"),
            review("Review 3", "2010-03-01"),
        ];
        let reviews = Collection::sorted_by_attr("date", items.clone().map(Value::from));
        (reviews, items)
    }

    #[test]
    fn manufacturer_scenario() {
        let m1 = Model::with_attrs([("name", Value::from("Manufacturer 1"))]);
        let m2 = Model::with_attrs([("name", Value::from("Manufacturer 2"))]);
        let product = Model::with_attrs([
            ("name", Value::from("Product 1")),
            ("manufacturer", Value::from(m1.clone())),
        ]);

        let tracker = change_tracker_for(Value::from(product.clone()), "manufacturer.name").unwrap();
        let events = record(&tracker);
        assert_eq!(tracker.observed_count(), 2);

        m1.set("name", "New Name!");
        assert_eq!(*events.borrow(), [Some(Value::from("New Name!"))]);

        product.set("manufacturer", m2.clone());
        assert_eq!(events.borrow().len(), 2);
        assert_eq!(events.borrow()[1], Some(Value::from("Manufacturer 2")));

        m1.set("name", "Old manufacturer");
        assert_eq!(events.borrow().len(), 2);
        assert_eq!(m1.listener_count(&Topic::change("name")), 0);
        assert_eq!(m2.listener_count(&Topic::change("name")), 1);

        m2.set("name", "Manufacturer 2b");
        assert_eq!(events.borrow()[2], Some(Value::from("Manufacturer 2b")));

        tracker.dispose();
        assert!(tracker.is_disposed());
        assert_eq!(m2.listener_count(&Topic::change("name")), 0);
        assert_eq!(product.listener_count(&Topic::change("manufacturer")), 0);
    }

    #[test]
    fn equal_replacement_is_deduplicated() {
        let m1 = Model::with_attrs([("name", Value::from("Same"))]);
        let m2 = Model::with_attrs([("name", Value::from("Same"))]);
        let product = Model::with_attrs([("manufacturer", Value::from(m1))]);

        let tracker = change_tracker_for(Value::from(product.clone()), "manufacturer.name").unwrap();
        let events = record(&tracker);

        product.set("manufacturer", m2.clone());
        assert!(events.borrow().is_empty());

        // Still rebound onto the replacement.
        m2.set("name", "Different");
        assert_eq!(*events.borrow(), [Some(Value::from("Different"))]);
        tracker.dispose();
    }

    #[test]
    fn removing_tracked_index_shifts_next_item() {
        let (reviews, items) = reviews();
        let product = Model::with_attrs([("reviews", Value::from(reviews.clone()))]);

        let tracker = change_tracker_for(Value::from(product), "reviews[1].title").unwrap();
        let events = record(&tracker);
        assert_eq!(tracker.get_value().unwrap(), Some(Value::from("Review 2")));

        reviews.remove(&Value::from(items[1].clone()));
        assert_eq!(*events.borrow(), [Some(Value::from("Review 3"))]);

        // The removed review is no longer observed.
        items[1].set("title", "ghost");
        assert_eq!(events.borrow().len(), 1);
        assert_eq!(items[1].listener_count(&Topic::change("title")), 0);

        items[2].set("title", "Review 3b");
        assert_eq!(events.borrow()[1], Some(Value::from("Review 3b")));
        tracker.dispose();
    }

    #[test]
    fn sorted_insert_before_tracked_index() {
        let (reviews, _) = reviews();
        let product = Model::with_attrs([("reviews", Value::from(reviews.clone()))]);

        let tracker = change_tracker_for(Value::from(product), "reviews[1].title").unwrap();
        let events = record(&tracker);

        // Sorts after the tracked item, nothing moves.
        reviews.add(review("Review 4", "2011-01-01"));
        assert!(events.borrow().is_empty());

        reviews.add(review("Review 0", "2010-01-15"));
        assert_eq!(*events.borrow(), [Some(Value::from("Review 0"))]);
        tracker.dispose();
    }

    #[test]
    fn unmoved_occupant_does_not_notify() {
        let (reviews, items) = reviews();
        let tracker = change_tracker_for(Value::from(reviews.clone()), "[0].title").unwrap();
        let events = record(&tracker);

        let last = Value::from(items[2].clone());
        reviews.remove(&last);
        reviews.add(last);
        assert!(events.borrow().is_empty());
        assert_eq!(tracker.get_value().unwrap(), Some(Value::from("Review 1")));
        tracker.dispose();
    }

    #[test]
    fn root_collection_path() {
        let (reviews, items) = reviews();
        let tracker = change_tracker_for(Value::from(reviews.clone()), "[1].title").unwrap();
        let events = record(&tracker);

        items[1].set("title", "Changed");
        reviews.reset([Value::from(items[2].clone())]);
        assert_eq!(
            *events.borrow(),
            [Some(Value::from("Changed")), None]
        );
        assert!(!tracker.has_value().unwrap());
        tracker.dispose();
    }

    #[test]
    fn unset_intermediate_model() {
        let m1 = Model::with_attrs([("name", Value::from("Manufacturer 1"))]);
        let product = Model::with_attrs([("manufacturer", Value::from(m1.clone()))]);

        let tracker = change_tracker_for(Value::from(product.clone()), "manufacturer.name").unwrap();
        let events = record(&tracker);
        assert!(tracker.has_value().unwrap());

        product.unset("manufacturer");
        assert_eq!(*events.borrow(), [None]);
        assert!(!tracker.has_value().unwrap());
        assert_eq!(tracker.observed_count(), 1);
        assert_eq!(m1.listener_count(&Topic::change("name")), 0);

        product.set("manufacturer", m1);
        assert_eq!(events.borrow()[1], Some(Value::from("Manufacturer 1")));
        tracker.dispose();
    }

    #[test]
    fn set_value_round_trip() {
        let m1 = Model::new();
        let product = Model::with_attrs([("manufacturer", Value::from(m1.clone()))]);
        let tracker = change_tracker_for(Value::from(product), "manufacturer.name").unwrap();
        let events = record(&tracker);

        tracker.set_value("Acme").unwrap();
        assert_eq!(m1.get("name"), Some(Value::from("Acme")));
        assert_eq!(tracker.get_value().unwrap(), Some(Value::from("Acme")));
        assert_eq!(*events.borrow(), [Some(Value::from("Acme"))]);
        tracker.dispose();
    }

    #[test]
    fn set_value_on_collection_item_is_unsupported() {
        let (reviews, _) = reviews();
        let product = Model::with_attrs([("reviews", Value::from(reviews))]);
        let tracker = change_tracker_for(Value::from(product), "reviews[1]").unwrap();

        assert_eq!(
            tracker.set_value(Value::from(Model::new())),
            Err(AccessError::Unsupported {
                kind: LinkKind::CollectionItem
            })
        );
        tracker.dispose();
    }

    #[test]
    fn bind_errors() {
        let product = Value::from(Model::with_attrs([("name", Value::from("Product 1"))]));

        assert!(matches!(
            change_tracker_for(product.clone(), "name[0"),
            Err(BindError::Syntax(_))
        ));
        assert!(matches!(
            change_tracker_for(product, "name.first"),
            Err(BindError::Access(AccessError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn off_change_and_dispose() {
        let m1 = Model::with_attrs([("name", Value::from("a"))]);
        let tracker = change_tracker_for(Value::from(m1.clone()), "name").unwrap();
        let events = record(&tracker);
        let other = record(&tracker);
        let key = tracker.on_change(|_| {});
        assert!(tracker.off_change(key));
        assert!(!tracker.off_change(key));

        m1.set("name", "b");
        assert_eq!(events.borrow().len(), 1);
        assert_eq!(other.borrow().len(), 1);

        tracker.dispose();
        m1.set("name", "c");
        assert_eq!(events.borrow().len(), 1);
        assert_eq!(m1.listener_count(&Topic::change("name")), 0);
        tracker.dispose();
    }

    #[test]
    fn listener_mutation_is_not_recursive() {
        let m1 = Model::with_attrs([("name", Value::from("a")), ("count", Value::from(0))]);
        let tracker = change_tracker_for(Value::from(m1.clone()), "name").unwrap();
        let events = record(&tracker);

        // Normalizes the value once from inside the handler.
        let weak = Rc::downgrade(&m1);
        tracker.on_change(move |event| {
            if event.value == Some(Value::from("raw")) {
                if let Some(model) = weak.upgrade() {
                    model.set("name", "clean");
                }
            }
        });

        m1.set("name", "raw");
        assert_eq!(
            *events.borrow(),
            [Some(Value::from("raw")), Some(Value::from("clean"))]
        );
        assert_eq!(m1.listener_count(&Topic::change("name")), 1);
        tracker.dispose();
    }

    #[test]
    fn listener_mutation_on_replacement_is_tracked() {
        let m1 = Model::with_attrs([("name", Value::from("Manufacturer 1"))]);
        let m2 = Model::with_attrs([("name", Value::from("Manufacturer 2"))]);
        let product = Model::with_attrs([("manufacturer", Value::from(m1))]);

        let tracker = change_tracker_for(Value::from(product.clone()), "manufacturer.name").unwrap();
        let events = record(&tracker);

        // Normalizes the replacement it was just told about.
        let weak = Rc::downgrade(&m2);
        tracker.on_change(move |event| {
            if event.value == Some(Value::from("Manufacturer 2")) {
                if let Some(model) = weak.upgrade() {
                    model.set("name", "normalized");
                }
            }
        });

        product.set("manufacturer", m2.clone());
        assert_eq!(
            *events.borrow(),
            [Some(Value::from("Manufacturer 2")), Some(Value::from("normalized"))]
        );
        assert_eq!(events.borrow().last().cloned(), Some(tracker.get_value().unwrap()));
        assert_eq!(m2.listener_count(&Topic::change("name")), 1);

        // The cache holds the normalized value, writing the old one back emits.
        m2.set("name", "Manufacturer 2");
        assert_eq!(events.borrow().len(), 4);
        assert_eq!(events.borrow()[3], Some(Value::from("normalized")));
        tracker.dispose();
    }

    #[test]
    fn type_mismatch_after_replacement_keeps_outer_records() {
        let m1 = Model::with_attrs([("name", Value::from("Manufacturer 1"))]);
        let m2 = Model::with_attrs([("name", Value::from("Manufacturer 2"))]);
        let product = Model::with_attrs([("manufacturer", Value::from(m1.clone()))]);

        let tracker = change_tracker_for(Value::from(product.clone()), "manufacturer.name").unwrap();
        let events = record(&tracker);

        product.set("manufacturer", "unknown");
        assert!(events.borrow().is_empty());
        assert_eq!(tracker.observed_count(), 1);
        assert_eq!(m1.listener_count(&Topic::change("name")), 0);
        assert!(matches!(
            tracker.get_value(),
            Err(AccessError::TypeMismatch { expected: "model", .. })
        ));

        product.set("manufacturer", m2.clone());
        assert_eq!(*events.borrow(), [Some(Value::from("Manufacturer 2"))]);
        assert_eq!(tracker.observed_count(), 2);
        assert_eq!(m2.listener_count(&Topic::change("name")), 1);
        tracker.dispose();
    }

    #[test]
    fn listener_may_dispose() {
        let m1 = Model::with_attrs([("name", Value::from("a"))]);
        let tracker = change_tracker_for(Value::from(m1.clone()), "name").unwrap();
        let handle = tracker.clone();
        tracker.on_change(move |_| handle.dispose());

        m1.set("name", "b");
        assert!(tracker.is_disposed());
        assert_eq!(m1.listener_count(&Topic::change("name")), 0);
    }

    #[test]
    fn accessor_is_shared_between_trackers() {
        let accessor = accessor_for("name").unwrap();
        let a = Model::with_attrs([("name", Value::from("a"))]);
        let b = Model::with_attrs([("name", Value::from("b"))]);

        let ta = ChangeTracker::new(Value::from(a.clone()), accessor.clone()).unwrap();
        let tb = ChangeTracker::new(Value::from(b.clone()), accessor).unwrap();
        let ea = record(&ta);
        let eb = record(&tb);

        a.set("name", "a2");
        assert_eq!(ea.borrow().len(), 1);
        assert!(eb.borrow().is_empty());
        ta.dispose();
        tb.dispose();
    }
}
