use thiserror::Error;
use vc_model::ValueKind;
use vc_path::{ExprNode, ParseError};

use crate::LinkKind;

// -----------------------------------------------------------------------------
// Error

/// An error raised while evaluating an [`Accessor`] against an object graph.
///
/// Absence is never an error: a link whose parent resolves to nothing
/// resolves to nothing as well.
///
/// [`Accessor`]: crate::Accessor
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("`{expr}` expected a {expected} but found a {actual}")]
    TypeMismatch {
        expr: ExprNode<'static>,
        expected: &'static str,
        actual: ValueKind,
    },

    #[error("Setting a value is not supported by {kind} accessors")]
    Unsupported { kind: LinkKind },

    #[error("Cannot set `{expr}` because its parent value is absent")]
    MissingParent { expr: ExprNode<'static> },
}

/// An error raised while creating an accessor or a change tracker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BindError {
    #[error(transparent)]
    Syntax(#[from] ParseError<'static>),

    #[error(transparent)]
    Access(#[from] AccessError),
}

// -----------------------------------------------------------------------------
// Tests
