//! Provide the expression nodes produced by the parser.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

// -----------------------------------------------------------------------------
// Expr

/// A **singular** step within a model path.
///
/// # Examples
///
/// ```
/// use vc_path::Expr;
///
/// let attr = Expr::Attribute("name".into());
/// assert_eq!(format!("{attr}"), ".name");
///
/// let item = Expr::CollectionItem(3);
/// assert_eq!(format!("{item}"), "[3]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expr<'a> {
    /// Reads a named attribute of a model.
    ///
    /// Example: the `name` of `manufacturer.name`
    Attribute(Cow<'a, str>),
    /// Reads the item at a fixed position of a collection or array.
    ///
    /// Example: the `1` of `reviews[1]`
    CollectionItem(usize),
}

/// The kind of an [`Expr`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    Attribute,
    CollectionItem,
}

impl fmt::Display for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Attribute(name) => write!(f, ".{name}"),
            Expr::CollectionItem(index) => write!(f, "[{index}]"),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Attribute => "Attribute",
            NodeKind::CollectionItem => "CollectionItem",
        })
    }
}

impl<'a> Expr<'a> {
    /// Converts this into an "owned" value.
    #[inline]
    pub fn into_owned(self) -> Expr<'static> {
        match self {
            Self::Attribute(name) => Expr::Attribute(Cow::Owned(name.into_owned())),
            Self::CollectionItem(index) => Expr::CollectionItem(index),
        }
    }

    /// Returns the [`NodeKind`] of this expression.
    #[inline]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Attribute(_) => NodeKind::Attribute,
            Self::CollectionItem(_) => NodeKind::CollectionItem,
        }
    }
}

// -----------------------------------------------------------------------------
// ExprNode

/// An [`Expr`] together with the source text it was parsed from.
///
/// `text` and `offset` only serve diagnostics, they take no part in access.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprNode<'a> {
    pub expr: Expr<'a>,
    /// Source text of this node, e.g. `.name`, `name` or `[1]`.
    pub text: Cow<'a, str>,
    /// Character offset of this node in its path.
    pub offset: usize,
}

impl<'a> ExprNode<'a> {
    /// Creates an attribute node.
    ///
    /// The text is derived from the name, with a leading `.` unless `first`.
    pub fn attribute(name: impl Into<Cow<'a, str>>, first: bool) -> Self {
        let name = name.into();
        let text = if first {
            name.clone()
        } else {
            let mut text = String::with_capacity(name.len() + 1);
            text.push('.');
            text.push_str(&name);
            Cow::Owned(text)
        };
        Self {
            expr: Expr::Attribute(name),
            text,
            offset: 0,
        }
    }

    /// Creates a collection item node.
    pub fn collection_item(index: usize) -> Self {
        Self {
            expr: Expr::CollectionItem(index),
            text: Cow::Owned(alloc::format!("[{index}]")),
            offset: 0,
        }
    }

    /// Converts this into an "owned" value.
    #[inline]
    pub fn into_owned(self) -> ExprNode<'static> {
        ExprNode {
            expr: self.expr.into_owned(),
            text: Cow::Owned(self.text.into_owned()),
            offset: self.offset,
        }
    }

    #[inline]
    pub const fn kind(&self) -> NodeKind {
        self.expr.kind()
    }

    /// Returns the attribute name, if this is an attribute node.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        match &self.expr {
            Expr::Attribute(name) => Some(name),
            Expr::CollectionItem(_) => None,
        }
    }

    /// Returns the index, if this is a collection item node.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        match self.expr {
            Expr::Attribute(_) => None,
            Expr::CollectionItem(index) => Some(index),
        }
    }
}

impl fmt::Display for ExprNode<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Expr, ExprNode, NodeKind};
    use alloc::string::ToString;

    #[test]
    fn attribute_text() {
        assert_eq!(ExprNode::attribute("name", true).text, "name");
        assert_eq!(ExprNode::attribute("name", false).text, ".name");
        assert_eq!(ExprNode::attribute("name", false).name(), Some("name"));
    }

    #[test]
    fn collection_item_text() {
        let node = ExprNode::collection_item(12);
        assert_eq!(node.to_string(), "[12]");
        assert_eq!(node.index(), Some(12));
        assert_eq!(node.kind(), NodeKind::CollectionItem);
        assert_eq!(node.name(), None);
    }

    #[test]
    fn expr_kind() {
        assert_eq!(Expr::Attribute("a".into()).kind(), NodeKind::Attribute);
        assert_eq!(Expr::CollectionItem(0).kind(), NodeKind::CollectionItem);
    }
}
