//! Provide [`Model`], a free-form observable attribute store.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use crate::{FieldContainer, Listener, ListenerKey, ListenerSet, Observable, Topic, Value};

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x95EE04C4F326B271);

type AttrMap = HashMap<Box<str>, Value, FixedState>;

// -----------------------------------------------------------------------------
// Model

/// An observable set of named attributes.
///
/// Any attribute name is accepted, assigning an unknown name creates it.
/// Assigning a value equal to the current one is a no-op, otherwise
/// [`Topic::Change`] fires once per changed attribute, after every
/// assignment of the call has been applied.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use vc_model::{Model, Observable, Topic, Value};
///
/// let product = Model::with_attrs([("name", Value::from("Product 1"))]);
/// let changes = Rc::new(Cell::new(0));
/// let c = changes.clone();
/// product.subscribe(Topic::change("name"), Rc::new(move |_| c.set(c.get() + 1)));
///
/// product.set("name", "Product 1");
/// assert_eq!(changes.get(), 0);
///
/// product.set("name", "New Name!");
/// assert_eq!(changes.get(), 1);
/// assert_eq!(product.get("name"), Some(Value::from("New Name!")));
/// ```
pub struct Model {
    attrs: RefCell<AttrMap>,
    listeners: ListenerSet,
}

impl Model {
    /// Creates an empty model.
    #[inline]
    pub fn new() -> Rc<Self> {
        Self::with_attrs(core::iter::empty::<(&str, Value)>())
    }

    /// Creates a model with initial attributes, no listener is notified.
    pub fn with_attrs<I, K>(attrs: I) -> Rc<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<Box<str>>,
    {
        let mut map = AttrMap::with_hasher(FIXED_HASH_STATE);
        map.extend(attrs.into_iter().map(|(k, v)| (k.into(), v)));
        Rc::new(Self {
            attrs: RefCell::new(map),
            listeners: ListenerSet::new(),
        })
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.attrs.borrow().contains_key(name)
    }

    /// Assigns a single attribute.
    #[inline]
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.set_many([(name, value.into())]);
    }

    /// Assigns several attributes, then notifies about each changed one
    /// in the order given.
    pub fn set_many<'a>(&self, attrs: impl IntoIterator<Item = (&'a str, Value)>) {
        let mut changed: Vec<Topic> = Vec::new();
        {
            let mut map = self.attrs.borrow_mut();
            for (name, value) in attrs {
                match map.get_mut(name) {
                    Some(old) if *old == value => continue,
                    Some(old) => *old = value,
                    None => {
                        map.insert(Box::from(name), value);
                    }
                }
                let topic = Topic::change(name);
                if !changed.contains(&topic) {
                    changed.push(topic);
                }
            }
        }
        for topic in &changed {
            self.listeners.emit(topic);
        }
    }

    /// Removes an attribute, notifying if it was present.
    pub fn unset(&self, name: &str) {
        let removed = self.attrs.borrow_mut().remove(name).is_some();
        if removed {
            self.listeners.emit(&Topic::change(name));
        }
    }

    /// Number of listeners registered for `topic`.
    #[inline]
    pub fn listener_count(&self, topic: &Topic) -> usize {
        self.listeners.count(topic)
    }
}

impl Observable for Model {
    #[inline]
    fn subscribe(&self, topic: Topic, listener: Listener) -> ListenerKey {
        self.listeners.insert(topic, listener)
    }

    #[inline]
    fn unsubscribe(&self, key: ListenerKey) -> bool {
        self.listeners.remove(key)
    }
}

impl FieldContainer for Model {
    #[inline]
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name)
    }

    #[inline]
    fn set_field(&self, name: &str, value: Value) {
        self.set(name, value);
    }

    #[inline]
    fn unset_field(&self, name: &str) {
        self.unset(name);
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("attrs", &self.attrs.borrow().len())
            .field("listeners", &self.listeners)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
