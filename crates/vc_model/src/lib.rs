//! The observable object graph model paths are resolved against.
//!
//! Two capability interfaces decouple path resolution from any concrete
//! object model:
//!
//! - [`FieldContainer`]: named fields, fires [`Topic::Change`].
//! - [`OrderedContainer`]: indexed items, fires [`Topic::Add`],
//!   [`Topic::Remove`] and [`Topic::Reset`].
//!
//! [`Model`] and [`Collection`] are ready-made implementations, and
//! [`ListenerSet`] is the listener registry both are built on, an instance
//! of the generic [`Dispatcher`].
//!
//! Everything here is single threaded: values are shared with `Rc`, and
//! listeners run synchronously on the thread that caused the change.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod collection;
mod listeners;
mod model;
mod observe;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use collection::Collection;
pub use listeners::{Dispatcher, ListenerSet};
pub use model::Model;
pub use observe::{FieldContainer, Listener, ListenerKey, Observable, OrderedContainer, Topic};
pub use value::{Value, ValueKind};
