//! Provide the composable accessor chain.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use vc_model::{FieldContainer, Listener, Observable, OrderedContainer, Topic, Value};
use vc_path::{Expr, ExprNode};

use crate::{AccessError, SubscriptionRecord, Unsubscribe};

// -----------------------------------------------------------------------------
// LinkKind

/// The kind of an accessor link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkKind {
    Root,
    Attribute,
    CollectionItem,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Root => "root",
            Self::Attribute => "attribute",
            Self::CollectionItem => "collection item",
        })
    }
}

// -----------------------------------------------------------------------------
// Dependency

/// An observable object a link currently depends on.
pub(crate) enum Dependency<'a> {
    Field(&'a Rc<dyn FieldContainer>, &'a str),
    Items(&'a Rc<dyn OrderedContainer>),
}

impl Dependency<'_> {
    pub(crate) fn target(&self) -> Rc<dyn Observable> {
        match self {
            Self::Field(model, _) => Rc::clone(model) as Rc<dyn Observable>,
            Self::Items(collection) => Rc::clone(collection) as Rc<dyn Observable>,
        }
    }

    pub(crate) fn topics(&self) -> Vec<Topic> {
        match self {
            Self::Field(_, name) => alloc::vec![Topic::change(name)],
            Self::Items(_) => Topic::STRUCTURAL.to_vec(),
        }
    }
}

// -----------------------------------------------------------------------------
// Accessor

#[derive(Debug)]
enum Link {
    Root,
    Attribute {
        parent: Accessor,
        name: Box<str>,
        node: ExprNode<'static>,
    },
    CollectionItem {
        parent: Accessor,
        index: usize,
        node: ExprNode<'static>,
    },
}

/// A reusable chain of links resolving a model path.
///
/// Each link holds its parent link and the node it realizes, never a target
/// object, so one accessor can be evaluated against any number of roots.
/// Cloning is cheap, the links are shared.
///
/// - `Root`: identity, `get(root) == root`.
/// - `Attribute`: reads a named field of the model its parent resolves to.
/// - `CollectionItem`: reads a fixed position of the collection or array
///   its parent resolves to.
///
/// # Examples
///
/// ```
/// use vc_access::accessor_for;
/// use vc_model::{Model, Value};
///
/// let manufacturer = Model::with_attrs([("name", Value::from("Manufacturer 1"))]);
/// let product = Value::from(Model::with_attrs([
///     ("manufacturer", Value::from(manufacturer.clone())),
/// ]));
///
/// let accessor = accessor_for("manufacturer.name").unwrap();
/// assert_eq!(accessor.get(&product).unwrap(), Some(Value::from("Manufacturer 1")));
///
/// accessor.set(&product, Value::from("New Name!")).unwrap();
/// assert_eq!(manufacturer.get("name"), Some(Value::from("New Name!")));
///
/// let missing = accessor_for("owner.name").unwrap();
/// assert_eq!(missing.get(&product).unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Accessor {
    link: Rc<Link>,
}

impl Default for Accessor {
    #[inline]
    fn default() -> Self {
        Self::root()
    }
}

impl Accessor {
    /// Returns the identity accessor.
    #[inline]
    pub fn root() -> Self {
        Self {
            link: Rc::new(Link::Root),
        }
    }

    /// Returns a new accessor realizing `node` on top of `self`.
    pub fn join(self, node: ExprNode<'_>) -> Self {
        let node = node.into_owned();
        let link = match node.expr {
            Expr::Attribute(ref name) => {
                let name = Box::from(name.as_ref());
                Link::Attribute {
                    parent: self,
                    name,
                    node,
                }
            }
            Expr::CollectionItem(index) => Link::CollectionItem {
                parent: self,
                index,
                node,
            },
        };
        Self {
            link: Rc::new(link),
        }
    }

    #[inline]
    pub fn kind(&self) -> LinkKind {
        match &*self.link {
            Link::Root => LinkKind::Root,
            Link::Attribute { .. } => LinkKind::Attribute,
            Link::CollectionItem { .. } => LinkKind::CollectionItem,
        }
    }

    /// Returns the parent link, `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<&Accessor> {
        match &*self.link {
            Link::Root => None,
            Link::Attribute { parent, .. } | Link::CollectionItem { parent, .. } => Some(parent),
        }
    }

    /// Returns the node this link realizes, `None` for the root.
    #[inline]
    pub fn node(&self) -> Option<&ExprNode<'static>> {
        match &*self.link {
            Link::Root => None,
            Link::Attribute { node, .. } | Link::CollectionItem { node, .. } => Some(node),
        }
    }

    /// Number of nodes in the chain.
    pub fn len(&self) -> usize {
        let mut len = 0;
        let mut cursor = self;
        while let Some(parent) = cursor.parent() {
            len += 1;
            cursor = parent;
        }
        len
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(*self.link, Link::Root)
    }

    /// Resolves the value addressed by this accessor.
    ///
    /// Returns `Ok(None)` as soon as a link resolves to nothing.
    #[inline]
    pub fn get(&self, root: &Value) -> Result<Option<Value>, AccessError> {
        self.walk(root, &mut |_| {})
    }

    /// Assigns the value addressed by this accessor.
    ///
    /// Only attribute links support `set`, it creates the attribute if the
    /// model does not have it yet.
    pub fn set(&self, root: &Value, value: Value) -> Result<(), AccessError> {
        match &*self.link {
            Link::Attribute { parent, name, node } => match parent.get(root)? {
                Some(target) => {
                    expect_model(&target, node)?.set_field(name, value);
                    Ok(())
                }
                None => Err(AccessError::MissingParent { expr: node.clone() }),
            },
            _ => Err(AccessError::Unsupported { kind: self.kind() }),
        }
    }

    /// Subscribes `listener` to every object the resolution of this accessor
    /// currently depends on.
    ///
    /// A link observes the object its parent resolves to, attribute links for
    /// their field, collection item links for added, removed and reset items.
    /// Nothing is observed past a link resolving to nothing, and plain arrays
    /// are not observable.
    ///
    /// On error, the listeners registered so far are removed again.
    pub fn subscribe(&self, root: &Value, listener: &Listener) -> Result<Unsubscribe, AccessError> {
        let mut records = Vec::new();
        match self.subscribe_into(root, listener, &mut records) {
            Ok(_) => Ok(Unsubscribe::new(records)),
            Err(e) => {
                Unsubscribe::new(records).unsubscribe();
                Err(e)
            }
        }
    }

    /// Like [`subscribe`](Self::subscribe), but leaves the records installed
    /// before an error in `records`.
    pub(crate) fn subscribe_into(
        &self,
        root: &Value,
        listener: &Listener,
        records: &mut Vec<SubscriptionRecord>,
    ) -> Result<Option<Value>, AccessError> {
        self.walk(root, &mut |dep| {
            records.push(SubscriptionRecord::attach(dep.target(), dep.topics(), listener));
        })
    }

    /// Resolves the chain from the root, reporting every dependency met
    /// on the way, outermost first.
    pub(crate) fn walk(
        &self,
        root: &Value,
        visit: &mut dyn FnMut(Dependency<'_>),
    ) -> Result<Option<Value>, AccessError> {
        match &*self.link {
            Link::Root => Ok(Some(root.clone())),
            Link::Attribute { parent, name, node } => {
                let Some(target) = parent.walk(root, visit)? else {
                    return Ok(None);
                };
                let model = expect_model(&target, node)?;
                visit(Dependency::Field(model, name));
                Ok(model.field(name))
            }
            Link::CollectionItem {
                parent,
                index,
                node,
            } => match parent.walk(root, visit)? {
                None => Ok(None),
                Some(Value::Collection(collection)) => {
                    visit(Dependency::Items(&collection));
                    Ok(collection.at(*index))
                }
                Some(Value::Array(array)) => Ok(array.get(*index).cloned()),
                Some(other) => Err(AccessError::TypeMismatch {
                    expr: node.clone(),
                    expected: "collection or array",
                    actual: other.kind(),
                }),
            },
        }
    }
}

#[inline]
fn expect_model<'v>(
    value: &'v Value,
    node: &ExprNode<'static>,
) -> Result<&'v Rc<dyn FieldContainer>, AccessError> {
    value.as_model().ok_or_else(|| AccessError::TypeMismatch {
        expr: node.clone(),
        expected: "model",
        actual: value.kind(),
    })
}

impl fmt::Display for Accessor {
    /// Renders the normalized path.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.link {
            Link::Root => Ok(()),
            Link::Attribute { parent, name, .. } => {
                fmt::Display::fmt(parent, f)?;
                if parent.is_root() {
                    f.write_str(name)
                } else {
                    write!(f, ".{name}")
                }
            }
            Link::CollectionItem { parent, index, .. } => {
                fmt::Display::fmt(parent, f)?;
                write!(f, "[{index}]")
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
