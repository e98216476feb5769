//! Resolve and track model paths against an observable object graph.
//!
//! - [`Accessor`]: a reusable chain of links that gets, sets and subscribes
//!   the value a path addresses from any root.
//! - [`ChangeTracker`]: binds an accessor to one root and emits a
//!   [`ChangeEvent`] whenever the addressed value changes, following the
//!   path as intermediate models and collection items are replaced.
//!
//! # Examples
//!
//! ```
//! use vc_access::{accessor_for, change_tracker_for};
//! use vc_model::{Collection, Model, Value};
//!
//! let reviews = Collection::from_items([
//!     Value::from(Model::with_attrs([("title", Value::from("Review 1"))])),
//!     Value::from(Model::with_attrs([("title", Value::from("Review 2"))])),
//! ]);
//! let product = Value::from(Model::with_attrs([("reviews", Value::from(reviews.clone()))]));
//!
//! let title = accessor_for("reviews[1].title").unwrap();
//! assert_eq!(title.get(&product).unwrap(), Some(Value::from("Review 2")));
//!
//! let tracker = change_tracker_for(product, "reviews[1].title").unwrap();
//! reviews.remove_at(0);
//! assert_eq!(tracker.get_value().unwrap(), None);
//! tracker.dispose();
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod accessor;
mod builder;
mod error;
mod subscription;
mod tracker;

// -----------------------------------------------------------------------------
// Exports

pub use accessor::{Accessor, LinkKind};
pub use builder::{accessor_for, build};
pub use error::{AccessError, BindError};
pub use subscription::{SubscriptionRecord, Unsubscribe};
pub use tracker::{
    ChangeEvent, ChangeListener, ChangeListenerKey, ChangeTracker, change_tracker_for,
};
