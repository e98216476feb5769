//! Provide reversible subscriptions on the object graph.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use vc_model::{Listener, ListenerKey, Observable, Topic};

// -----------------------------------------------------------------------------
// SubscriptionRecord

/// One observed object together with the listener keys registered on it.
///
/// Detaching a record removes exactly the listeners it registered.
pub struct SubscriptionRecord {
    target: Rc<dyn Observable>,
    entries: Vec<(Topic, ListenerKey)>,
}

impl SubscriptionRecord {
    /// Registers `listener` on `target` for every topic.
    pub fn attach<I>(target: Rc<dyn Observable>, topics: I, listener: &Listener) -> Self
    where
        I: IntoIterator<Item = Topic>,
    {
        let entries = topics
            .into_iter()
            .map(|topic| {
                let key = target.subscribe(topic.clone(), listener.clone());
                (topic, key)
            })
            .collect();
        Self { target, entries }
    }

    #[inline]
    pub fn target(&self) -> &Rc<dyn Observable> {
        &self.target
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.entries.iter().map(|(topic, _)| topic)
    }

    /// Removes the listeners, returns how many were still registered.
    pub fn detach(self) -> usize {
        self.entries
            .into_iter()
            .filter(|(_, key)| self.target.unsubscribe(*key))
            .count()
    }
}

impl fmt::Debug for SubscriptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRecord")
            .field("target", &Rc::as_ptr(&self.target).cast::<()>())
            .field("topics", &self.topics().collect::<Vec<_>>())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Unsubscribe

/// The handle returned by [`Accessor::subscribe`].
///
/// Nothing is removed on drop: the listeners stay registered until
/// [`unsubscribe`](Self::unsubscribe) is called.
///
/// [`Accessor::subscribe`]: crate::Accessor::subscribe
#[must_use = "listeners stay registered until `unsubscribe` is called"]
#[derive(Debug, Default)]
pub struct Unsubscribe {
    records: Vec<SubscriptionRecord>,
}

impl Unsubscribe {
    #[inline]
    pub(crate) fn new(records: Vec<SubscriptionRecord>) -> Self {
        Self { records }
    }

    /// Number of observed objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn records(&self) -> &[SubscriptionRecord] {
        &self.records
    }

    /// Removes every listener, returns how many were still registered.
    pub fn unsubscribe(self) -> usize {
        self.records.into_iter().map(SubscriptionRecord::detach).sum()
    }
}

// -----------------------------------------------------------------------------
// Tests
