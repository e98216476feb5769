//! Provide the dynamic [`Value`] flowing through model paths.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use crate::{Collection, FieldContainer, Model, OrderedContainer};

// -----------------------------------------------------------------------------
// ValueKind

/// The kind of a [`Value`], used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    Array,
    Model,
    Collection,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "string",
            Self::Array => "array",
            Self::Model => "model",
            Self::Collection => "collection",
        })
    }
}

// -----------------------------------------------------------------------------
// Value

/// A value held by a model attribute or a collection slot.
///
/// Absence is expressed as `Option::<Value>::None`, never as a variant.
///
/// # Equality
///
/// `PartialEq` is strict: primitives compare by value (`Float` with IEEE
/// `==`), strings by content, while `Array`, `Model` and `Collection`
/// compare by reference identity.
///
/// ```
/// use vc_model::{Model, Value};
///
/// let a = Model::new();
/// let b = Model::new();
///
/// assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
/// assert_ne!(Value::from(a), Value::from(b));
/// assert_eq!(Value::from("x"), Value::from(String::from("x")));
/// ```
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// A plain array, readable by index but not observable.
    Array(Rc<[Value]>),
    Model(Rc<dyn FieldContainer>),
    Collection(Rc<dyn OrderedContainer>),
}

impl Value {
    /// Wraps any field container.
    #[inline]
    pub fn model(model: Rc<impl FieldContainer + 'static>) -> Self {
        Self::Model(model)
    }

    /// Wraps any ordered container.
    #[inline]
    pub fn collection(collection: Rc<impl OrderedContainer + 'static>) -> Self {
        Self::Collection(collection)
    }

    #[inline]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
            Self::Array(_) => ValueKind::Array,
            Self::Model(_) => ValueKind::Model,
            Self::Collection(_) => ValueKind::Collection,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_model(&self) -> Option<&Rc<dyn FieldContainer>> {
        match self {
            Self::Model(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_collection(&self) -> Option<&Rc<dyn OrderedContainer>> {
        match self {
            Self::Collection(v) => Some(v),
            _ => None,
        }
    }

    /// Orders two primitives of the same kind.
    ///
    /// Returns `None` for mixed kinds and for reference kinds.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Model(a), Self::Model(b)) => Rc::ptr_eq(a, b),
            (Self::Collection(a), Self::Collection(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Array(v) => f.debug_tuple("Array").field(v).finish(),
            Self::Model(v) => write!(f, "Model({:p})", Rc::as_ptr(v).cast::<()>()),
            Self::Collection(v) => write!(f, "Collection({:p})", Rc::as_ptr(v).cast::<()>()),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value $(as $cast)?)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i64 => Int,
    i32 => Int as i64,
    u32 => Int as i64,
    f64 => Float,
    f32 => Float as f64,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for Value {
    #[inline]
    fn from(value: Rc<str>) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(value: Vec<Value>) -> Self {
        Self::Array(Rc::from(value))
    }
}

impl From<Rc<Model>> for Value {
    #[inline]
    fn from(value: Rc<Model>) -> Self {
        Self::Model(value)
    }
}

impl From<Rc<Collection>> for Value {
    #[inline]
    fn from(value: Rc<Collection>) -> Self {
        Self::Collection(value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Value, ValueKind};
    use crate::{Collection, Model};
    use alloc::string::ToString;
    use alloc::vec;
    use core::cmp::Ordering;

    #[test]
    fn primitives_compare_by_value() {
        assert_eq!(Value::from(3), Value::from(3_i64));
        assert_ne!(Value::from(3), Value::from(3.0));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
    }

    #[test]
    fn references_compare_by_identity() {
        let arr = Value::from(vec![Value::from(1)]);
        assert_eq!(arr, arr.clone());
        assert_ne!(arr, Value::from(vec![Value::from(1)]));

        let c = Collection::new();
        assert_eq!(Value::from(c.clone()), Value::from(c));
        assert_ne!(Value::from(Model::new()), Value::from(Model::new()));
    }

    #[test]
    fn kinds() {
        assert_eq!(Value::from("a").kind(), ValueKind::Str);
        assert_eq!(Value::from(Model::new()).kind(), ValueKind::Model);
        assert_eq!(Value::from(Collection::new()).kind(), ValueKind::Collection);
        assert_eq!(ValueKind::Collection.to_string(), "collection");
    }

    #[test]
    fn compare_primitives() {
        assert_eq!(Value::from(1).compare(&Value::from(2)), Some(Ordering::Less));
        assert_eq!(Value::from("b").compare(&Value::from("a")), Some(Ordering::Greater));
        assert_eq!(Value::from(2).compare(&Value::from(1.5)), Some(Ordering::Greater));
        assert_eq!(Value::from(1).compare(&Value::from("1")), None);
    }
}
