//! Provide [`Collection`], an observable ordered sequence of values.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::cmp::Ordering;
use core::fmt;

use crate::{Listener, ListenerKey, ListenerSet, Observable, OrderedContainer, Topic, Value};

type Comparator = Box<dyn Fn(&Value, &Value) -> Ordering>;

// -----------------------------------------------------------------------------
// Collection

/// An observable, ordered sequence of values.
///
/// A collection created with a comparator keeps its items sorted: [`add`]
/// places a new item after every item comparing equal to it, so insertion
/// order is preserved among equal keys.
///
/// Fires [`Topic::Add`] and [`Topic::Remove`] for single item changes and
/// [`Topic::Reset`] when the whole content is replaced or reordered. All
/// notifications happen after the change is applied.
///
/// # Examples
///
/// ```
/// use vc_model::{Collection, Model, Value};
///
/// let reviews = Collection::sorted_by_attr("date", []);
/// for date in ["2010-02", "2010-01", "2010-03"] {
///     reviews.add(Model::with_attrs([("date", Value::from(date))]));
/// }
///
/// let first = reviews.at(0).unwrap();
/// let first = first.as_model().unwrap();
/// assert_eq!(first.field("date"), Some(Value::from("2010-01")));
/// ```
///
/// [`add`]: Collection::add
pub struct Collection {
    items: RefCell<Vec<Value>>,
    comparator: Option<Comparator>,
    listeners: ListenerSet,
}

impl Collection {
    /// Creates an empty, unsorted collection.
    #[inline]
    pub fn new() -> Rc<Self> {
        Self::from_items([])
    }

    /// Creates an unsorted collection holding `items` in the given order.
    pub fn from_items(items: impl IntoIterator<Item = Value>) -> Rc<Self> {
        Rc::new(Self {
            items: RefCell::new(items.into_iter().collect()),
            comparator: None,
            listeners: ListenerSet::new(),
        })
    }

    /// Creates a collection kept sorted by `comparator`.
    ///
    /// The initial items are sorted stably.
    pub fn with_comparator<F>(comparator: F, items: impl IntoIterator<Item = Value>) -> Rc<Self>
    where
        F: Fn(&Value, &Value) -> Ordering + 'static,
    {
        let mut items: Vec<Value> = items.into_iter().collect();
        items.sort_by(&comparator);
        Rc::new(Self {
            items: RefCell::new(items),
            comparator: Some(Box::new(comparator)),
            listeners: ListenerSet::new(),
        })
    }

    /// Creates a collection of models kept sorted by the field `name`.
    ///
    /// Items that are not models, or whose fields cannot be ordered, compare
    /// equal.
    pub fn sorted_by_attr<I>(name: &str, items: I) -> Rc<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let name: Box<str> = Box::from(name);
        Self::with_comparator(
            move |a, b| {
                let key = |v: &Value| v.as_model().and_then(|m| m.field(&name));
                match (key(a), key(b)) {
                    (Some(a), Some(b)) => a.compare(&b).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                }
            },
            items,
        )
    }

    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.comparator.is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    #[inline]
    pub fn at(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    /// Returns the position of `item`, compared by [`Value`] equality.
    pub fn index_of(&self, item: &Value) -> Option<usize> {
        self.items.borrow().iter().position(|v| v == item)
    }

    #[inline]
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    /// Adds an item and returns the position it landed at.
    ///
    /// Unsorted collections append, sorted ones insert after the last item
    /// not greater than `item`.
    pub fn add(&self, item: impl Into<Value>) -> usize {
        let item = item.into();
        let index = {
            let mut items = self.items.borrow_mut();
            let index = match &self.comparator {
                Some(cmp) => items.partition_point(|v| cmp(v, &item) != Ordering::Greater),
                None => items.len(),
            };
            items.insert(index, item);
            index
        };
        self.listeners.emit(&Topic::Add);
        index
    }

    /// Inserts an item at `index`, clamped to the length.
    ///
    /// Sorted collections own their order, the item is placed with
    /// [`add`](Self::add) instead.
    pub fn insert(&self, index: usize, item: impl Into<Value>) -> usize {
        if self.is_sorted() {
            return self.add(item);
        }
        let index = {
            let mut items = self.items.borrow_mut();
            let index = index.min(items.len());
            items.insert(index, item.into());
            index
        };
        self.listeners.emit(&Topic::Add);
        index
    }

    /// Removes the first occurrence of `item`, returning its former position.
    pub fn remove(&self, item: &Value) -> Option<usize> {
        let index = self.index_of(item)?;
        self.remove_at(index).map(|_| index)
    }

    /// Removes and returns the item at `index`.
    pub fn remove_at(&self, index: usize) -> Option<Value> {
        let removed = {
            let mut items = self.items.borrow_mut();
            (index < items.len()).then(|| items.remove(index))
        };
        if removed.is_some() {
            self.listeners.emit(&Topic::Remove);
        }
        removed
    }

    /// Replaces the whole content.
    pub fn reset(&self, items: impl IntoIterator<Item = Value>) {
        {
            let mut new_items: Vec<Value> = items.into_iter().collect();
            if let Some(cmp) = &self.comparator {
                new_items.sort_by(|a, b| cmp(a, b));
            }
            *self.items.borrow_mut() = new_items;
        }
        self.listeners.emit(&Topic::Reset);
    }

    /// Re-sorts the items, for use after a sort key changed in place.
    ///
    /// Does nothing on unsorted collections.
    pub fn sort(&self) {
        let Some(cmp) = &self.comparator else {
            return;
        };
        self.items.borrow_mut().sort_by(|a, b| cmp(a, b));
        self.listeners.emit(&Topic::Reset);
    }

    /// Number of listeners registered for `topic`.
    #[inline]
    pub fn listener_count(&self, topic: &Topic) -> usize {
        self.listeners.count(topic)
    }
}

impl Observable for Collection {
    #[inline]
    fn subscribe(&self, topic: Topic, listener: Listener) -> ListenerKey {
        self.listeners.insert(topic, listener)
    }

    #[inline]
    fn unsubscribe(&self, key: ListenerKey) -> bool {
        self.listeners.remove(key)
    }
}

impl OrderedContainer for Collection {
    #[inline]
    fn len(&self) -> usize {
        Collection::len(self)
    }

    #[inline]
    fn at(&self, index: usize) -> Option<Value> {
        Collection::at(self, index)
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("items", &self.items.borrow())
            .field("sorted", &self.is_sorted())
            .field("listeners", &self.listeners)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
