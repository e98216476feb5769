//! Provide the capability interfaces an object graph implements to be
//! addressable by model paths.
//!
//! - [`FieldContainer`]: an object with named, observable fields (a model).
//! - [`OrderedContainer`]: an ordered, observable sequence (a collection).
//!
//! Both are [`Observable`]: a listener subscribes to one [`Topic`] and gets
//! a [`ListenerKey`] back, which is the only handle able to remove it again.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use crate::Value;

// -----------------------------------------------------------------------------
// Topic

/// An event an [`Observable`] can notify about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The named field of a model changed.
    Change(Box<str>),
    /// An item was added to a collection.
    Add,
    /// An item was removed from a collection.
    Remove,
    /// The whole content of a collection was replaced or reordered.
    Reset,
}

impl Topic {
    #[inline]
    pub fn change(name: &str) -> Self {
        Self::Change(Box::from(name))
    }

    /// The topics that can move items of a collection to another position.
    pub const STRUCTURAL: [Topic; 3] = [Topic::Add, Topic::Remove, Topic::Reset];
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Change(name) => write!(f, "change:{name}"),
            Self::Add => f.write_str("add"),
            Self::Remove => f.write_str("remove"),
            Self::Reset => f.write_str("reset"),
        }
    }
}

// -----------------------------------------------------------------------------
// Listener

/// A callback invoked with the topic that fired.
pub type Listener = Rc<dyn Fn(&Topic)>;

slotmap::new_key_type! {
    /// Identifies one subscription on one [`Observable`].
    pub struct ListenerKey;
}

// -----------------------------------------------------------------------------
// Capability traits

/// An object that notifies listeners about [`Topic`]s.
pub trait Observable {
    /// Registers `listener` for `topic`.
    fn subscribe(&self, topic: Topic, listener: Listener) -> ListenerKey;

    /// Removes a listener, returns `false` if it was not registered.
    fn unsubscribe(&self, key: ListenerKey) -> bool;
}

/// An observable object with named fields.
///
/// Implementors fire [`Topic::Change`] with the field name whenever the
/// value of that field changes.
pub trait FieldContainer: Observable {
    /// Returns the current value of a field, `None` if it is absent.
    fn field(&self, name: &str) -> Option<Value>;

    /// Assigns a field, creating it if it does not exist.
    fn set_field(&self, name: &str, value: Value);

    /// Removes a field.
    fn unset_field(&self, name: &str);
}

/// An observable ordered sequence of values.
///
/// Implementors fire [`Topic::Add`], [`Topic::Remove`] and [`Topic::Reset`]
/// whenever the item at some position may have changed.
pub trait OrderedContainer: Observable {
    fn len(&self) -> usize;

    /// Returns the item at `index`, `None` when out of range.
    fn at(&self, index: usize) -> Option<Value>;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// -----------------------------------------------------------------------------
// Tests
