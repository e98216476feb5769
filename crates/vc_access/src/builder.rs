//! Provide the construction of accessor chains from parsed paths.

use vc_path::{ExprNode, ParseError, Path};

use crate::{Accessor, BindError};

/// Folds `nodes` left to right into one accessor, starting from the root.
///
/// # Examples
///
/// ```
/// use vc_access::{LinkKind, build};
///
/// let nodes = vc_path::parse("reviews[1].title").unwrap();
/// let accessor = build(nodes);
/// assert_eq!(accessor.kind(), LinkKind::Attribute);
/// assert_eq!(accessor.to_string(), "reviews[1].title");
/// ```
pub fn build<'a, I>(nodes: I) -> Accessor
where
    I: IntoIterator<Item = ExprNode<'a>>,
{
    nodes.into_iter().fold(Accessor::root(), Accessor::join)
}

impl From<&Path> for Accessor {
    #[inline]
    fn from(path: &Path) -> Self {
        build(path.iter().cloned())
    }
}

/// Parses `path` and builds its accessor.
///
/// A malformed path fails with [`BindError::Syntax`].
pub fn accessor_for(path: &str) -> Result<Accessor, BindError> {
    let path = Path::parse(path).map_err(ParseError::into_owned)?;
    Ok(Accessor::from(&path))
}

// -----------------------------------------------------------------------------
// Tests
