//! Provide the owned, reusable node sequence of a model path.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::{Expr, ExprNode, ParseError, PathParser};

// -----------------------------------------------------------------------------
// Path

/// A parsed model path, a thin wrapper over `Box<[ExprNode<'static>]>`.
///
/// The path is parsed only once and can then be shared by any number of
/// accessors. Its `Display` impl renders the normalized path text.
///
/// # Examples
///
/// ```
/// use vc_path::Path;
///
/// let path = Path::parse(" manufacturer.phones[01].number ").unwrap();
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.to_string(), "manufacturer.phones[1].number");
///
/// let path: Path = "[0].title".parse().unwrap();
/// assert_eq!(path.to_string(), "[0].title");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Box<[ExprNode<'static>]>);

impl From<Box<[ExprNode<'static>]>> for Path {
    #[inline]
    fn from(value: Box<[ExprNode<'static>]>) -> Self {
        Self(value)
    }
}

impl From<Vec<ExprNode<'static>>> for Path {
    #[inline]
    fn from(value: Vec<ExprNode<'static>>) -> Self {
        Self(value.into_boxed_slice())
    }
}

impl Path {
    /// Parses the path string and creates a [`Path`].
    ///
    /// This function will create a `String` for each node.
    pub fn parse(path: &str) -> Result<Self, ParseError<'_>> {
        let mut nodes = Vec::new();
        for res in PathParser::new(path) {
            nodes.push(res?.into_owned());
        }
        Ok(Self(nodes.into_boxed_slice()))
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty (identity) path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[ExprNode<'static>] {
        &self.0
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, ExprNode<'static>> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a ExprNode<'static>;
    type IntoIter = core::slice::Iter<'a, ExprNode<'static>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for Path {
    type Err = ParseError<'static>;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(ParseError::into_owned)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.0.iter().enumerate() {
            match &node.expr {
                Expr::Attribute(name) if i == 0 => f.write_str(name)?,
                expr => fmt::Display::fmt(expr, f)?,
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Serde

#[cfg(feature = "serde")]
mod serde_impls {
    use alloc::string::ToString;
    use core::fmt;

    use serde_core::de::{Error, Visitor};
    use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Path;

    impl Serialize for Path {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_string())
        }
    }

    struct PathVisitor;

    impl<'de> Visitor<'de> for PathVisitor {
        type Value = Path;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a model path string")
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
            Path::parse(v).map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for Path {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_str(PathVisitor)
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
