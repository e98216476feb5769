//! Parse model paths such as `manufacturer.address.phones[0].number`.
//!
//! A model path addresses a leaf value through a chain of attribute names
//! and collection indices. This crate turns the path text into an ordered
//! sequence of typed [`ExprNode`]s, it does not know anything about the
//! objects the path is later resolved against.
//!
//! - [`parse`]: parses into borrowed nodes, for one-off use.
//! - [`Path`]: an owned node sequence, parsed once and shared.
//! - [`PathParser`]: the streaming parser both are built on.
//!
//! # Syntax
//!
//! - Attribute: `name` for the first node, `.name` for the others.
//!   Names start with a letter or `_`, then letters, digits and `_`.
//! - Collection item: `[Number]`, e.g. `[1]`.
//!
//! Whitespace is stripped around the whole path. Whitespace anywhere else,
//! including inside the brackets, is a [`ParseError`].
//!
//! # Examples
//!
//! ```
//! use vc_path::{Expr, parse};
//!
//! let nodes = parse("reviews[1].title").unwrap();
//! assert_eq!(nodes[0].expr, Expr::Attribute("reviews".into()));
//! assert_eq!(nodes[1].expr, Expr::CollectionItem(1));
//!
//! let err = parse("reviews name").unwrap_err();
//! assert_eq!(err.offset, 7);
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

mod error;
mod node;
mod parser;
mod path;

// -----------------------------------------------------------------------------
// Exports

pub use error::ParseError;
pub use node::{Expr, ExprNode, NodeKind};
pub use parser::{PathParser, parse};
pub use path::Path;
